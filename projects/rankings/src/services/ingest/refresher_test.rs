use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use super::*;
use crate::db::memory::MemoryStore;
use crate::testing::seeded_store;

#[derive(Default)]
struct FakeSource {
    subscribers: HashMap<String, u64>,
    failing: AtomicBool,
    calls: AtomicUsize,
    largest_batch: AtomicUsize,
}

impl FakeSource {
    fn with(channels: &[(&str, u64)]) -> Self {
        Self {
            subscribers: channels
                .iter()
                .map(|(id, subs)| (id.to_string(), *subs))
                .collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl ChannelSource for FakeSource {
    async fn fetch_channels(
        &self,
        ids: &[String],
    ) -> Result<Vec<ChannelStatistics>, FetchChannelsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.largest_batch.fetch_max(ids.len(), Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(FetchChannelsError::QuotaExceeded);
        }

        Ok(ids
            .iter()
            .filter_map(|id| {
                self.subscribers.get(id).map(|subs| ChannelStatistics {
                    channel_id: id.clone(),
                    title: format!("Fresh {id}"),
                    description: "about".to_string(),
                    custom_url: format!("@{id}"),
                    country: Some("US".to_string()),
                    published_at: "2015-01-01T00:00:00Z".to_string(),
                    thumbnail_url: "https://img/high.jpg".to_string(),
                    subscriber_count: *subs,
                    view_count: subs * 10,
                    video_count: 42,
                    hidden_subscriber_count: false,
                    fetched_at: Utc::now(),
                })
            })
            .collect())
    }
}

fn refresher(store: Arc<MemoryStore>, source: Arc<FakeSource>, ttl: Duration) -> Refresher {
    Refresher::new(
        store.clone(),
        source,
        Arc::new(StatsCache::new(ttl)),
        GrowthAnalyzer::new(store.clone()),
        RankingEngine::new(store),
    )
}

async fn snapshot_count(store: &MemoryStore, channel_id: &str) -> usize {
    store
        .snapshots_since(channel_id, Utc::now() - chrono::Duration::days(1))
        .await
        .unwrap()
        .len()
}

#[tokio::test]
async fn refresh_channel_writes_counts_snapshot_and_rank() {
    let store = seeded_store(&[("UC_a", "US", 100), ("UC_b", "US", 500)]).await;
    let source = Arc::new(FakeSource::with(&[("UC_a", 1000)]));
    let refresher = refresher(store.clone(), source, Duration::from_secs(300));

    let update = refresher.refresh_channel("UC_a").await.unwrap();
    assert_eq!(update.subscriber_count, 1000);
    assert_eq!(update.title, "Fresh UC_a");

    let channel = store.get_channel("UC_a").await.unwrap().unwrap();
    assert_eq!(channel.subscriber_count, 1000);
    assert_eq!(channel.video_count, 42);
    assert_eq!(channel.custom_url, "@UC_a");
    assert_eq!(channel.current_rank, Some(1));
    assert!(channel.metrics_updated_at.is_some());

    assert_eq!(snapshot_count(&store, "UC_a").await, 1);
}

#[tokio::test]
async fn refresh_unknown_channel_is_not_found() {
    let store = seeded_store(&[]).await;
    let source = Arc::new(FakeSource::with(&[("UC_a", 1000)]));
    let refresher = refresher(store, source.clone(), Duration::from_secs(300));

    let err = refresher.refresh_channel("UC_a").await.unwrap_err();

    assert!(matches!(err, RefreshError::ChannelNotFound { .. }));
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn channel_missing_upstream_is_not_found() {
    let store = seeded_store(&[("UC_gone", "US", 100)]).await;
    let source = Arc::new(FakeSource::default());
    let refresher = refresher(store.clone(), source, Duration::from_secs(300));

    let err = refresher.refresh_channel("UC_gone").await.unwrap_err();

    assert!(matches!(err, RefreshError::ChannelNotFound { .. }));
    assert_eq!(snapshot_count(&store, "UC_gone").await, 0);
}

#[tokio::test]
async fn upstream_failure_writes_nothing() {
    let store = seeded_store(&[("UC_a", "US", 100)]).await;
    let source = Arc::new(FakeSource::with(&[("UC_a", 1000)]));
    source.failing.store(true, Ordering::SeqCst);
    let refresher = refresher(store.clone(), source, Duration::from_secs(300));

    let err = refresher.refresh_channel("UC_a").await.unwrap_err();

    assert!(matches!(err, RefreshError::UpstreamUnavailable { .. }));
    let channel = store.get_channel("UC_a").await.unwrap().unwrap();
    assert_eq!(channel.subscriber_count, 100);
    assert_eq!(snapshot_count(&store, "UC_a").await, 0);
}

#[tokio::test]
async fn cached_stats_skip_the_api() {
    let store = seeded_store(&[("UC_a", "US", 100)]).await;
    let source = Arc::new(FakeSource::with(&[("UC_a", 1000)]));
    let refresher = refresher(store, source.clone(), Duration::from_secs(300));

    refresher.refresh_channel("UC_a").await.unwrap();
    refresher.refresh_channel("UC_a").await.unwrap();

    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cache_hits_do_not_append_snapshots() {
    let store = seeded_store(&[("UC_a", "US", 100)]).await;
    let source = Arc::new(FakeSource::with(&[("UC_a", 1000)]));
    let refresher = refresher(store.clone(), source, Duration::from_secs(300));

    refresher.refresh_channel("UC_a").await.unwrap();
    let second = refresher.refresh_channel("UC_a").await.unwrap();

    assert_eq!(second.subscriber_count, 1000);
    assert_eq!(snapshot_count(&store, "UC_a").await, 1);
}

#[tokio::test]
async fn refresh_all_fetches_in_batches_of_fifty() {
    let ids: Vec<String> = (0..120).map(|i| format!("UC_{i:03}")).collect();
    let rows: Vec<(&str, &str, i64)> = ids.iter().map(|id| (id.as_str(), "US", 1)).collect();
    let store = seeded_store(&rows).await;

    let known: Vec<(&str, u64)> = ids.iter().take(110).map(|id| (id.as_str(), 5)).collect();
    let source = Arc::new(FakeSource::with(&known));
    let refresher = refresher(store.clone(), source.clone(), Duration::from_secs(300));

    let summary = refresher.refresh_all().await.unwrap();

    assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    assert_eq!(source.largest_batch.load(Ordering::SeqCst), MAX_IDS_PER_REQUEST);
    assert_eq!(
        summary,
        RefreshAllSummary {
            requested: 120,
            refreshed: 110,
            failed: 10,
        }
    );

    let first = store.get_channel("UC_000").await.unwrap().unwrap();
    assert_eq!(first.subscriber_count, 5);
    assert!(first.global_rank.is_some());
}

#[tokio::test]
async fn refresh_all_counts_failed_batches() {
    let store = seeded_store(&[("UC_a", "US", 100), ("UC_b", "GB", 200)]).await;
    let source = Arc::new(FakeSource::with(&[("UC_a", 1), ("UC_b", 2)]));
    source.failing.store(true, Ordering::SeqCst);
    let refresher = refresher(store, source, Duration::from_secs(300));

    let summary = refresher.refresh_all().await.unwrap();

    assert_eq!(summary.refreshed, 0);
    assert_eq!(summary.failed, 2);
}

#[tokio::test]
async fn snapshot_job_records_every_active_channel_at_once() {
    let store = seeded_store(&[("UC_a", "US", 100), ("UC_b", "US", 200), ("UC_c", "GB", 300)]).await;
    store.set_active("UC_c", false).await;
    let refresher = refresher(store.clone(), Arc::new(FakeSource::default()), Duration::from_secs(300));

    assert_eq!(refresher.record_stats_snapshot().await.unwrap(), 2);

    let a = store.latest_snapshot("UC_a").await.unwrap().unwrap();
    let b = store.latest_snapshot("UC_b").await.unwrap().unwrap();
    assert_eq!(a.subscriber_count, 100);
    assert_eq!(a.recorded_at, b.recorded_at);
    assert!(store.latest_snapshot("UC_c").await.unwrap().is_none());
}
