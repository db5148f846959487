use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use thiserror::Error;

use crate::services::ingest::{RefreshAllSummary, RefreshError};
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("RefreshInProgress: a refresh of all channels is already running")]
    RefreshInProgress,

    #[error("RefreshAll: {source}")]
    RefreshAll {
        #[from]
        source: RefreshError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::RefreshInProgress => (
                StatusCode::CONFLICT,
                HandlerError::RefreshInProgress.to_string(),
            )
                .into_response(),
            HandlerError::RefreshAll { source } => {
                (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response()
            }
        }
    }
}

#[derive(Serialize)]
pub struct RefreshedAll {
    message: String,
    #[serde(flatten)]
    summary: RefreshAllSummary,
}

/// Axum handler: POST /api/admin/refresh-all
///
/// Shares the scheduled refresh job's guard, so it is rejected while that
/// job runs.
pub async fn handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<RefreshedAll>, HandlerError> {
    let _guard = state
        .jobs
        .refresh
        .try_acquire()
        .ok_or(HandlerError::RefreshInProgress)?;

    let summary = state.refresher.refresh_all().await?;

    Ok(Json(RefreshedAll {
        message: format!("Refreshed {} channels", summary.refreshed),
        summary,
    }))
}
