use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::IntoResponse,
};
use thiserror::Error;

use crate::db::{StoreError, StoreOverview};
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("StoreOverview: {source}")]
    StoreOverview {
        #[from]
        source: StoreError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::StoreOverview { source } => {
                (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response()
            }
        }
    }
}

/// Axum handler: GET /api/admin/stats
pub async fn handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<StoreOverview>, HandlerError> {
    Ok(Json(state.store.overview().await?))
}
