use axum::extract::{Extension, Json};

use crate::scheduler::SchedulerStatus;
use crate::state::AppState;

/// Axum handler: GET /api/admin/scheduler
pub async fn handler(Extension(state): Extension<AppState>) -> Json<SchedulerStatus> {
    Json(state.jobs.status())
}
