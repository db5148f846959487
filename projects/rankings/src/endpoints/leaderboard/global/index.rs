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

    #[error("GlobalLeaderboard: {source}")]
    GlobalLeaderboard {
        #[from]
        source: RankingError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::InvalidLimit { source } => source.into_response(),
            HandlerError::GlobalLeaderboard { source } => {
                (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response()
            }
        }
    }
}

#[derive(Serialize)]
pub struct GlobalLeaderboard {
    channels: Vec<Channel>,
    total: usize,
}

/// Axum handler: GET /api/leaderboard/global?limit=
pub async fn handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<GlobalLeaderboard>, HandlerError> {
    let limit = bounded("limit", query.limit, 100, 1000)?;
    let channels = state.ranking.global_leaderboard(limit).await?;

    Ok(Json(GlobalLeaderboard {
        total: channels.len(),
        channels,
    }))
}
