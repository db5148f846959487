use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::IntoResponse,
};
use thiserror::Error;

use crate::services::growth::metrics::OvertakePrediction;
use crate::services::growth::GrowthError;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("PredictOvertake: {source}")]
    PredictOvertake {
        #[from]
        source: GrowthError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::PredictOvertake {
                source: GrowthError::ChannelNotFound { channel_id },
            } => (
                StatusCode::NOT_FOUND,
                format!("Channel {channel_id} not found"),
            )
                .into_response(),
            HandlerError::PredictOvertake { source } => {
                (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response()
            }
        }
    }
}

/// Axum handler: GET /api/predictions/overtake/{channel_id}/{target_id}
pub async fn handler(
    Extension(state): Extension<AppState>,
    Path((channel_id, target_id)): Path<(String, String)>,
) -> Result<Json<OvertakePrediction>, HandlerError> {
    let prediction = state
        .growth
        .predict_overtake(&channel_id, &target_id)
        .await?;

    Ok(Json(prediction))
}
