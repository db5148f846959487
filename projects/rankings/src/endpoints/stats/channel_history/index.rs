use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use thiserror::Error;

use crate::db::stats::models::StatsSnapshot;
use crate::endpoints::params::{bounded, DaysQuery, ParamError};
use crate::services::growth::GrowthError;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    InvalidDays {
        #[from]
        source: ParamError,
    },

    #[error("GrowthHistory: {source}")]
    GrowthHistory {
        #[from]
        source: GrowthError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::InvalidDays { source } => source.into_response(),
            HandlerError::GrowthHistory { source } => {
                (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response()
            }
        }
    }
}

#[derive(Serialize)]
pub struct ChannelHistory {
    channel_id: String,
    history: Vec<StatsSnapshot>,
    days: i64,
}

/// Axum handler: GET /api/stats/channel/{channel_id}/history?days=
pub async fn handler(
    Extension(state): Extension<AppState>,
    Path(channel_id): Path<String>,
    Query(query): Query<DaysQuery>,
) -> Result<Json<ChannelHistory>, HandlerError> {
    let days = bounded("days", query.days, 30, 90)?;
    let history = state.growth.growth_history(&channel_id, days).await?;

    Ok(Json(ChannelHistory {
        channel_id,
        history,
        days,
    }))
}
