use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use thiserror::Error;

use crate::services::ranking::{CountryLeader, RankingError};
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("CountryLeaders: {source}")]
    CountryLeaders {
        #[from]
        source: RankingError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::CountryLeaders { source } => {
                (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response()
            }
        }
    }
}

#[derive(Serialize)]
pub struct MapData {
    map_data: Vec<CountryLeader>,
}

/// Axum handler: GET /api/stats/map-data
pub async fn handler(Extension(state): Extension<AppState>) -> Result<Json<MapData>, HandlerError> {
    let map_data = state.ranking.country_leaders().await?;

    Ok(Json(MapData { map_data }))
}
