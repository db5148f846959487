use std::time::Duration;

use interfaces_youtube_channels::ChannelStatistics;
use moka::future::Cache;

/// Bounds memory when the channel list grows past what one refresh touches.
const MAX_CACHED_CHANNELS: u64 = 10_000;

/// Per-channel read cache in front of the YouTube API. Entries expire `ttl`
/// after insertion.
pub struct StatsCache {
    entries: Cache<String, ChannelStatistics>,
}

impl StatsCache {
    pub fn new(ttl: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(MAX_CACHED_CHANNELS)
            .time_to_live(ttl)
            .build();

        Self { entries }
    }

    pub async fn get(&self, channel_id: &str) -> Option<ChannelStatistics> {
        self.entries.get(channel_id).await
    }

    pub async fn insert_all(&self, fetched: &[ChannelStatistics]) {
        for stats in fetched {
            self.entries
                .insert(stats.channel_id.clone(), stats.clone())
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn stats(channel_id: &str) -> ChannelStatistics {
        ChannelStatistics {
            channel_id: channel_id.to_string(),
            title: "t".to_string(),
            description: String::new(),
            custom_url: String::new(),
            country: None,
            published_at: String::new(),
            thumbnail_url: String::new(),
            subscriber_count: 1,
            view_count: 1,
            video_count: 1,
            hidden_subscriber_count: false,
            fetched_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn fresh_entries_are_served() {
        let cache = StatsCache::new(Duration::from_secs(300));
        cache.insert_all(&[stats("UC_a")]).await;

        assert_eq!(cache.get("UC_a").await.map(|s| s.channel_id), Some("UC_a".to_string()));
        assert!(cache.get("UC_b").await.is_none());
    }

    #[tokio::test]
    async fn entries_expire_after_the_ttl() {
        let cache = StatsCache::new(Duration::from_millis(50));
        cache.insert_all(&[stats("UC_a")]).await;
        assert!(cache.get("UC_a").await.is_some());

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(cache.get("UC_a").await.is_none());
    }
}
