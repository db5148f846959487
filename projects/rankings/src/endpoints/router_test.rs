use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use interfaces_youtube_channels::{ChannelStatistics, FetchChannelsError};
use serde_json::Value;
use tower::ServiceExt;

use super::*;
use crate::config::Config;
use crate::db::memory::MemoryStore;
use crate::db::Store;
use crate::scheduler::Jobs;
use crate::services::ingest::cache::StatsCache;
use crate::services::ingest::ChannelSource;
use crate::testing::seeded_store;

struct UnavailableSource;

#[async_trait]
impl ChannelSource for UnavailableSource {
    async fn fetch_channels(
        &self,
        _ids: &[String],
    ) -> Result<Vec<ChannelStatistics>, FetchChannelsError> {
        Err(FetchChannelsError::QuotaExceeded)
    }
}

async fn app_state() -> (AppState, Arc<MemoryStore>) {
    let store = seeded_store(&[
        ("UC_us_big", "US", 3000),
        ("UC_us_small", "US", 1000),
        ("UC_gb", "GB", 2000),
    ])
    .await;

    let config = Config::from_lookup(|name| match name {
        "YOUTUBE_API_KEY" => Some("test-key".to_string()),
        _ => None,
    })
    .unwrap();

    let state = AppState::new(
        store.clone(),
        Arc::new(UnavailableSource),
        StatsCache::new(Duration::from_secs(300)),
        Jobs::from_config(&config),
    );
    (state, store)
}

async fn call(state: &AppState, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

    (status, body)
}

#[tokio::test]
async fn health_reports_healthy() {
    let (state, _) = app_state().await;

    let (status, body) = call(&state, Method::GET, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn global_leaderboard_orders_and_limits() {
    let (state, _) = app_state().await;

    let (status, body) = call(&state, Method::GET, "/api/leaderboard/global?limit=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["channels"][0]["channel_id"], "UC_us_big");
    assert_eq!(body["channels"][0]["global_rank"], 1);
    assert_eq!(body["channels"][1]["channel_id"], "UC_gb");
}

#[tokio::test]
async fn limits_out_of_range_are_bad_requests() {
    let (state, _) = app_state().await;

    for uri in [
        "/api/leaderboard/global?limit=1001",
        "/api/leaderboard/global?limit=0",
        "/api/leaderboard/country/US?limit=101",
        "/api/leaderboard/fastest-growing?limit=101",
        "/api/leaderboard/biggest-gainers?limit=-1",
        "/api/stats/ranking-changes?limit=500",
        "/api/stats/channel/UC_gb/history?days=91",
    ] {
        let (status, _) = call(&state, Method::GET, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }

    let (status, _) = call(&state, Method::GET, "/api/leaderboard/global?limit=1000").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn country_leaderboard_uppercases_the_code() {
    let (state, _) = app_state().await;

    let (status, body) = call(&state, Method::GET, "/api/leaderboard/country/us").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["country"]["code"], "US");
    assert_eq!(body["total"], 2);
    assert_eq!(body["channels"][0]["rank"], 1);
    assert_eq!(body["channels"][1]["channel_id"], "UC_us_small");
    assert_eq!(body["channels"][1]["rank"], 2);
}

#[tokio::test]
async fn unknown_country_is_an_empty_board() {
    let (state, _) = app_state().await;

    let (status, body) = call(&state, Method::GET, "/api/leaderboard/country/ZZ").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["country"].is_null());
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn channel_detail_bundles_history_and_prediction() {
    let (state, _) = app_state().await;

    let (status, body) = call(&state, Method::GET, "/api/channels/UC_gb").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["channel_id"], "UC_gb");
    assert_eq!(body["subscriber_count"], 2000);
    assert!(body["growth_history"].as_array().unwrap().is_empty());
    assert!(body["rank_history"].as_array().unwrap().is_empty());
    assert_eq!(body["viral_prediction"]["label"], "Stable");
    assert_eq!(body["viral_prediction"]["viral_score"], 0.0);
}

#[tokio::test]
async fn missing_channel_is_not_found() {
    let (state, _) = app_state().await;

    let (status, _) = call(&state, Method::GET, "/api/channels/UC_nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&state, Method::GET, "/api/predictions/overtake/UC_gb/UC_nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn overtake_prediction_is_served() {
    let (state, _) = app_state().await;

    let (status, body) = call(
        &state,
        Method::GET,
        "/api/predictions/overtake/UC_us_big/UC_gb",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["already_ahead"], true);
}

#[tokio::test]
async fn channel_history_echoes_the_window() {
    let (state, _) = app_state().await;

    let (status, body) = call(
        &state,
        Method::GET,
        "/api/stats/channel/UC_gb/history?days=90",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["channel_id"], "UC_gb");
    assert_eq!(body["days"], 90);
    assert!(body["history"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn ranking_changes_lists_recent_events() {
    let (state, store) = app_state().await;
    state.ranking.update_all_rankings().await.unwrap();
    store.set_active("UC_us_big", false).await;
    state.ranking.update_all_rankings().await.unwrap();

    let (status, body) = call(&state, Method::GET, "/api/stats/ranking-changes").await;

    assert_eq!(status, StatusCode::OK);
    let changes = body["changes"].as_array().unwrap();
    assert!(!changes.is_empty());
    assert!(changes.iter().all(|c| c["change"].as_i64().unwrap() > 0));
}

#[tokio::test]
async fn refresh_channel_maps_upstream_failure_to_bad_gateway() {
    let (state, store) = app_state().await;

    let (status, _) = call(&state, Method::POST, "/api/admin/refresh-channel/UC_gb").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let channel = store.get_channel("UC_gb").await.unwrap().unwrap();
    assert_eq!(channel.subscriber_count, 2000);

    let (status, _) = call(&state, Method::POST, "/api/admin/refresh-channel/UC_nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn refresh_all_is_rejected_while_the_job_runs() {
    let (state, _) = app_state().await;
    let guard = state.jobs.refresh.try_acquire().unwrap();

    let (status, _) = call(&state, Method::POST, "/api/admin/refresh-all").await;
    assert_eq!(status, StatusCode::CONFLICT);

    drop(guard);

    let (status, body) = call(&state, Method::POST, "/api/admin/refresh-all").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requested"], 3);
    assert_eq!(body["failed"], 3);
    assert!(!state.jobs.refresh.is_running());
}

#[tokio::test]
async fn scheduler_status_lists_jobs() {
    let (state, _) = app_state().await;

    let (status, body) = call(&state, Method::GET, "/api/admin/scheduler").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["enabled"], true);
    assert_eq!(body["jobs"].as_array().unwrap().len(), 4);
    assert_eq!(body["jobs"][1]["name"], "update_rankings");
    assert_eq!(body["jobs"][1]["interval_secs"], 600);
}

#[tokio::test]
async fn map_data_lists_each_country_leader() {
    let (state, _) = app_state().await;

    let (status, body) = call(&state, Method::GET, "/api/stats/map-data").await;

    assert_eq!(status, StatusCode::OK);
    let map = body["map_data"].as_array().unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map[0]["country_code"], "GB");
    assert_eq!(map[0]["top_channel"]["channel_id"], "UC_gb");
    assert_eq!(map[1]["country_code"], "US");
    assert_eq!(map[1]["top_channel"]["channel_id"], "UC_us_big");
    assert_eq!(map[1]["top_channel"]["subscriber_count"], 3000);
}

#[tokio::test]
async fn admin_stats_counts_rows_and_last_snapshot() {
    let (state, _) = app_state().await;

    let (status, body) = call(&state, Method::GET, "/api/admin/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_countries"], 2);
    assert_eq!(body["total_channels"], 3);
    assert_eq!(body["total_stats_records"], 0);
    assert!(body["last_update"].is_null());

    state.refresher.record_stats_snapshot().await.unwrap();

    let (_, body) = call(&state, Method::GET, "/api/admin/stats").await;
    assert_eq!(body["total_stats_records"], 3);
    assert!(body["last_update"].is_string());
}
