use axum::extract::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
pub struct Health {
    status: &'static str,
    timestamp: DateTime<Utc>,
}

/// Axum handler: GET /api/health
pub async fn handler() -> Json<Health> {
    Json(Health {
        status: "healthy",
        timestamp: Utc::now(),
    })
}
