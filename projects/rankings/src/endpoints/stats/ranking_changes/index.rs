use axum::{
    extract::{Extension, Json, Query},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use thiserror::Error;

use crate::db::rank_history::models::RankChangeEvent;
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

    #[error("RecentRankChanges: {source}")]
    RecentRankChanges {
        #[from]
        source: RankingError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::InvalidLimit { source } => source.into_response(),
            HandlerError::RecentRankChanges { source } => {
                (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response()
            }
        }
    }
}

#[derive(Serialize)]
pub struct RankingChanges {
    changes: Vec<RankChangeEvent>,
}

/// Axum handler: GET /api/stats/ranking-changes?limit=
pub async fn handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<RankingChanges>, HandlerError> {
    let limit = bounded("limit", query.limit, 20, 100)?;
    let changes = state.ranking.recent_rank_changes(limit).await?;

    Ok(Json(RankingChanges { changes }))
}
