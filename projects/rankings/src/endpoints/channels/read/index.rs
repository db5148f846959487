use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use thiserror::Error;

use crate::db::channel::models::Channel;
use crate::db::rank_history::models::RankChangeEvent;
use crate::db::stats::models::StatsSnapshot;
use crate::db::StoreError;
use crate::services::growth::metrics::ViralPrediction;
use crate::services::growth::GrowthError;
use crate::services::ranking::RankingError;
use crate::state::AppState;

const HISTORY_DAYS: i64 = 30;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("GetChannel: {source}")]
    GetChannel {
        #[from]
        source: StoreError,
    },

    #[error("ChannelNotFound: {channel_id}")]
    ChannelNotFound { channel_id: String },

    #[error("Growth: {source}")]
    Growth {
        #[from]
        source: GrowthError,
    },

    #[error("RankHistory: {source}")]
    RankHistory {
        #[from]
        source: RankingError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::ChannelNotFound { channel_id } => (
                StatusCode::NOT_FOUND,
                format!("Channel {channel_id} not found"),
            )
                .into_response(),
            err => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
        }
    }
}

#[derive(Serialize)]
pub struct ChannelDetail {
    #[serde(flatten)]
    channel: Channel,
    growth_history: Vec<StatsSnapshot>,
    rank_history: Vec<RankChangeEvent>,
    viral_prediction: ViralPrediction,
}

/// Axum handler: GET /api/channels/{channel_id}
pub async fn handler(
    Extension(state): Extension<AppState>,
    Path(channel_id): Path<String>,
) -> Result<Json<ChannelDetail>, HandlerError> {
    let channel = state
        .store
        .get_channel(&channel_id)
        .await?
        .ok_or_else(|| HandlerError::ChannelNotFound {
            channel_id: channel_id.clone(),
        })?;

    let growth_history = state
        .growth
        .growth_history(&channel_id, HISTORY_DAYS)
        .await?;
    let rank_history = state
        .ranking
        .rank_history(&channel_id, HISTORY_DAYS)
        .await?;
    let viral_prediction = state.growth.viral_score(&channel_id).await?;

    Ok(Json(ChannelDetail {
        channel,
        growth_history,
        rank_history,
        viral_prediction,
    }))
}
