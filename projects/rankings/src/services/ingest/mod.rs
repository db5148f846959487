//! Pulls fresh statistics from YouTube into the store.
//!
//! A refresh writes the channel's latest counts and descriptive fields and
//! appends a snapshot. Growth and ranking are recomputed afterwards from what
//! was persisted.

pub mod cache;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use interfaces_youtube_channels::{
    ChannelStatistics, FetchChannelsError, YouTubeClient, MAX_IDS_PER_REQUEST,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::db::channel::models::{RankScope, StatsUpdate};
use crate::db::stats::models::NewStatsSnapshot;
use crate::db::{Store, StoreError};
use crate::services::growth::GrowthAnalyzer;
use crate::services::ranking::RankingEngine;

use cache::StatsCache;

/// Where channel statistics come from.
#[async_trait]
pub trait ChannelSource: Send + Sync {
    /// At most [`MAX_IDS_PER_REQUEST`] ids. Unknown ids are absent from the
    /// result.
    async fn fetch_channels(
        &self,
        ids: &[String],
    ) -> Result<Vec<ChannelStatistics>, FetchChannelsError>;
}

#[async_trait]
impl ChannelSource for YouTubeClient {
    async fn fetch_channels(
        &self,
        ids: &[String],
    ) -> Result<Vec<ChannelStatistics>, FetchChannelsError> {
        YouTubeClient::fetch_channels(self, ids).await
    }
}

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Store: {source}")]
    Store {
        #[from]
        source: StoreError,
    },

    #[error("ChannelNotFound: {channel_id}")]
    ChannelNotFound { channel_id: String },

    #[error("UpstreamUnavailable: {source}")]
    UpstreamUnavailable {
        #[from]
        source: FetchChannelsError,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefreshAllSummary {
    pub requested: usize,
    pub refreshed: usize,
    pub failed: usize,
}

struct Fetched {
    stats: ChannelStatistics,
    cached: bool,
}

#[derive(Clone)]
pub struct Refresher {
    store: Arc<dyn Store>,
    source: Arc<dyn ChannelSource>,
    cache: Arc<StatsCache>,
    growth: GrowthAnalyzer,
    ranking: RankingEngine,
}

impl Refresher {
    pub fn new(
        store: Arc<dyn Store>,
        source: Arc<dyn ChannelSource>,
        cache: Arc<StatsCache>,
        growth: GrowthAnalyzer,
        ranking: RankingEngine,
    ) -> Self {
        Self {
            store,
            source,
            cache,
            growth,
            ranking,
        }
    }

    /// Ingests one channel, then recomputes its growth and its country
    /// ranking. Nothing is written when the fetch fails.
    pub async fn refresh_channel(&self, channel_id: &str) -> Result<StatsUpdate, RefreshError> {
        let channel = self.store.get_channel(channel_id).await?.ok_or_else(|| {
            RefreshError::ChannelNotFound {
                channel_id: channel_id.to_string(),
            }
        })?;

        let fetched = self.fetch_cached(&[channel.channel_id.clone()]).await?;
        let fetched = fetched
            .into_iter()
            .find(|f| f.stats.channel_id == channel.channel_id)
            .ok_or_else(|| RefreshError::ChannelNotFound {
                channel_id: channel_id.to_string(),
            })?;

        let update = self.apply(&fetched, Utc::now()).await?;

        if let Err(e) = self.growth.update_channel_growth_metrics(channel_id).await {
            warn!("Failed to update growth metrics for {}: {}", channel_id, e);
        }
        let scope = RankScope::country(&channel.country_code);
        if let Err(e) = self.ranking.update_rankings(&scope).await {
            warn!("Failed to update rankings for {}: {}", scope, e);
        }

        info!(
            "Refreshed {}: {} subscribers",
            channel_id, update.subscriber_count
        );

        Ok(update)
    }

    /// Refreshes every active channel in batches, then re-ranks everything.
    /// A failed batch or write is logged and counted, never fatal.
    pub async fn refresh_all(&self) -> Result<RefreshAllSummary, RefreshError> {
        let ids: Vec<String> = self
            .store
            .active_channels(None)
            .await?
            .into_iter()
            .map(|c| c.channel_id)
            .collect();

        let mut summary = RefreshAllSummary {
            requested: ids.len(),
            ..Default::default()
        };
        let now = Utc::now();

        for batch in ids.chunks(MAX_IDS_PER_REQUEST) {
            let fetched = match self.fetch_cached(batch).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    warn!("Failed to fetch a batch of {} channels: {}", batch.len(), e);
                    summary.failed += batch.len();
                    continue;
                }
            };

            let mut written = 0;
            for item in &fetched {
                match self.apply(item, now).await {
                    Ok(_) => written += 1,
                    Err(e) => warn!("Failed to store stats for {}: {}", item.stats.channel_id, e),
                }
            }

            summary.refreshed += written;
            summary.failed += batch.len().saturating_sub(written);
        }

        if let Err(e) = self.ranking.update_all_rankings().await {
            warn!("Failed to update rankings after refresh: {}", e);
        }

        info!(
            "Refresh complete: {} requested, {} refreshed, {} failed",
            summary.requested, summary.refreshed, summary.failed
        );

        Ok(summary)
    }

    /// Appends a snapshot of every active channel's current counts, all with
    /// the same timestamp. No API call is made.
    pub async fn record_stats_snapshot(&self) -> Result<usize, RefreshError> {
        let now = Utc::now();
        let snapshots: Vec<NewStatsSnapshot> = self
            .store
            .active_channels(None)
            .await?
            .into_iter()
            .map(|c| {
                NewStatsSnapshot::new(
                    c.channel_id,
                    c.subscriber_count,
                    c.view_count,
                    c.video_count,
                    now,
                )
            })
            .collect();

        let recorded = self.store.insert_snapshots(snapshots).await?;
        info!("Recorded {} stats snapshots", recorded);

        Ok(recorded)
    }

    async fn fetch_cached(&self, ids: &[String]) -> Result<Vec<Fetched>, FetchChannelsError> {
        let mut found = Vec::with_capacity(ids.len());
        let mut missing = Vec::new();

        for id in ids {
            match self.cache.get(id).await {
                Some(stats) => found.push(Fetched {
                    stats,
                    cached: true,
                }),
                None => missing.push(id.clone()),
            }
        }

        if !missing.is_empty() {
            let fetched = self.source.fetch_channels(&missing).await?;
            self.cache.insert_all(&fetched).await;
            found.extend(fetched.into_iter().map(|stats| Fetched {
                stats,
                cached: false,
            }));
        }

        Ok(found)
    }

    /// Writes the channel row. A snapshot is appended only for statistics
    /// that came from the API, not for cache hits.
    async fn apply(&self, fetched: &Fetched, at: DateTime<Utc>) -> Result<StatsUpdate, RefreshError> {
        let stats = &fetched.stats;
        let update = StatsUpdate {
            title: stats.title.clone(),
            description: stats.description.clone(),
            custom_url: stats.custom_url.clone(),
            thumbnail_url: stats.thumbnail_url.clone(),
            published_at: stats.published_at.clone(),
            subscriber_count: to_count(stats.subscriber_count),
            view_count: to_count(stats.view_count),
            video_count: to_count(stats.video_count),
            updated_at: at,
        };

        if !self
            .store
            .update_channel_stats(&stats.channel_id, update.clone())
            .await?
        {
            return Err(RefreshError::ChannelNotFound {
                channel_id: stats.channel_id.clone(),
            });
        }

        if !fetched.cached {
            self.store
                .insert_snapshots(vec![NewStatsSnapshot::new(
                    stats.channel_id.clone(),
                    update.subscriber_count,
                    update.view_count,
                    update.video_count,
                    at,
                )])
                .await?;
        }

        Ok(update)
    }
}

fn to_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
#[path = "refresher_test.rs"]
mod refresher_test;
