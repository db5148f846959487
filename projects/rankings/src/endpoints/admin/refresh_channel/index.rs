use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::db::channel::models::StatsUpdate;
use crate::services::ingest::RefreshError;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("RefreshChannel: {source}")]
    RefreshChannel {
        #[from]
        source: RefreshError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        let HandlerError::RefreshChannel { source } = self;
        match source {
            RefreshError::ChannelNotFound { channel_id } => (
                StatusCode::NOT_FOUND,
                format!("Channel {channel_id} not found"),
            )
                .into_response(),
            RefreshError::UpstreamUnavailable { source } => {
                error!("YouTube request failed: {}", source);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("YouTube API unavailable: {source}"),
                )
                    .into_response()
            }
            RefreshError::Store { source } => {
                (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response()
            }
        }
    }
}

#[derive(Serialize)]
pub struct Refreshed {
    message: &'static str,
    data: StatsUpdate,
}

/// Axum handler: POST /api/admin/refresh-channel/{channel_id}
pub async fn handler(
    Extension(state): Extension<AppState>,
    Path(channel_id): Path<String>,
) -> Result<Json<Refreshed>, HandlerError> {
    let data = state.refresher.refresh_channel(&channel_id).await?;

    Ok(Json(Refreshed {
        message: "Channel refreshed",
        data,
    }))
}
