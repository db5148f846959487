//! Fixtures shared by the unit tests.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::db::channel::models::NewChannel;
use crate::db::memory::MemoryStore;
use crate::db::stats::models::NewStatsSnapshot;
use crate::db::Store;

pub fn new_channel(channel_id: &str, country_code: &str, subscriber_count: i64) -> NewChannel {
    NewChannel {
        channel_id: channel_id.to_string(),
        title: format!("Channel {channel_id}"),
        country_code: country_code.to_string(),
        country_name: country_code.to_string(),
        subscriber_count,
        view_count: subscriber_count * 100,
        video_count: 10,
    }
}

/// Memory store seeded with the given `(channel_id, country_code, subscribers)`
/// rows and a country row per distinct code.
pub async fn seeded_store(channels: &[(&str, &str, i64)]) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for (channel_id, country_code, subscribers) in channels {
        store.insert_country(country_code, country_code).await;
        store
            .insert_channel(new_channel(channel_id, country_code, *subscribers))
            .await;
    }
    store
}

pub async fn add_snapshot(
    store: &MemoryStore,
    channel_id: &str,
    subscriber_count: i64,
    at: DateTime<Utc>,
) {
    store
        .insert_snapshots(vec![NewStatsSnapshot::new(
            channel_id,
            subscriber_count,
            subscriber_count * 100,
            10,
            at,
        )])
        .await
        .unwrap();
}
