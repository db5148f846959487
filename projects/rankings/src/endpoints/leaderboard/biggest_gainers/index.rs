use axum::{
    extract::{Extension, Json, Query},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use thiserror::Error;

use crate::db::channel::models::Channel;
use crate::endpoints::params::{bounded, LimitQuery, ParamError};
use crate::services::ranking::RankingError;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    InvalidLimit {
        #[from]
        source: ParamError,
    },

    #[error("BiggestGainers: {source}")]
    BiggestGainers {
        #[from]
        source: RankingError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::InvalidLimit { source } => source.into_response(),
            HandlerError::BiggestGainers { source } => {
                (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response()
            }
        }
    }
}

#[derive(Serialize)]
pub struct Channels {
    channels: Vec<Channel>,
}

/// Axum handler: GET /api/leaderboard/biggest-gainers?limit=
pub async fn handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Channels>, HandlerError> {
    let limit = bounded("limit", query.limit, 20, 100)?;
    let channels = state.ranking.biggest_gainers(limit).await?;

    Ok(Json(Channels { channels }))
}
