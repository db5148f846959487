use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use thiserror::Error;

use crate::db::country::models::Country;
use crate::db::StoreError;
use crate::endpoints::params::{bounded, LimitQuery, ParamError};
use crate::services::ranking::{RankedChannel, RankingError};
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    InvalidLimit {
        #[from]
        source: ParamError,
    },

    #[error("GetCountry: {source}")]
    GetCountry {
        #[from]
        source: StoreError,
    },

    #[error("CountryLeaderboard: {source}")]
    CountryLeaderboard {
        #[from]
        source: RankingError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::InvalidLimit { source } => source.into_response(),
            err => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
        }
    }
}

#[derive(Serialize)]
pub struct CountryLeaderboard {
    country: Option<Country>,
    channels: Vec<RankedChannel>,
    total: usize,
}

/// Axum handler: GET /api/leaderboard/country/{code}?limit=
///
/// An unknown country is an empty board with `country: null`.
pub async fn handler(
    Extension(state): Extension<AppState>,
    Path(code): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<CountryLeaderboard>, HandlerError> {
    let limit = bounded("limit", query.limit, 50, 100)?;
    let code = code.to_uppercase();

    let channels = state.ranking.country_leaderboard(&code, limit).await?;
    let country = state.store.get_country(&code).await?;

    Ok(Json(CountryLeaderboard {
        country,
        total: channels.len(),
        channels,
    }))
}
