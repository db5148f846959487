use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::db::channel::models::{Channel, ChannelOrder, RankScope};
use crate::db::rank_history::models::{NewRankChange, RankChangeEvent};
use crate::db::{Store, StoreError};

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("Store: {source}")]
    Store {
        #[from]
        source: StoreError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingSummary {
    pub scope: String,
    pub ranked: usize,
    pub updated: usize,
    pub changes: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AllRankingsSummary {
    pub countries: usize,
    pub channels_updated: usize,
    pub changes: usize,
}

/// A channel with its position in a country leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedChannel {
    pub rank: i32,
    #[serde(flatten)]
    pub channel: Channel,
}

/// Orders by subscriber count descending, `channel_id` ascending on ties, and
/// pairs each channel with its 1-based rank.
pub fn assign_ranks(mut channels: Vec<Channel>) -> Vec<(i32, Channel)> {
    channels.sort_by(|a, b| {
        b.subscriber_count
            .cmp(&a.subscriber_count)
            .then_with(|| a.channel_id.cmp(&b.channel_id))
    });

    channels
        .into_iter()
        .zip(1..)
        .map(|(channel, rank)| (rank, channel))
        .collect()
}

/// The leading channel of one country, for the world map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryLeader {
    pub country_code: String,
    pub country_name: String,
    pub flag_emoji: String,
    pub top_channel: LeaderChannel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderChannel {
    pub channel_id: String,
    pub title: String,
    pub thumbnail_url: String,
    pub subscriber_count: i64,
    pub viral_label: String,
}

impl From<Channel> for LeaderChannel {
    fn from(channel: Channel) -> Self {
        Self {
            channel_id: channel.channel_id,
            title: channel.title,
            thumbnail_url: channel.thumbnail_url,
            subscriber_count: channel.subscriber_count,
            viral_label: channel.viral_label,
        }
    }
}

#[derive(Clone)]
pub struct RankingEngine {
    store: Arc<dyn Store>,
}

impl RankingEngine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Re-ranks one scope. Only moved channels get an event; a channel placed
    /// for the first time has its rank stored without one. The first failed
    /// write ends the pass.
    pub async fn update_rankings(&self, scope: &RankScope) -> Result<RankingSummary, RankingError> {
        let channels = self.store.active_channels(scope.country_code()).await?;
        let now = Utc::now();

        let mut summary = RankingSummary {
            scope: scope.to_string(),
            ranked: channels.len(),
            updated: 0,
            changes: 0,
        };

        for (new_rank, channel) in assign_ranks(channels) {
            let previous = match channel.rank_in(scope) {
                Some(old) if old == new_rank => continue,
                Some(old) => {
                    let event = NewRankChange::new(&channel.channel_id, scope, old, new_rank, now);
                    self.store.insert_rank_change(event).await?;
                    summary.changes += 1;
                    old
                }
                None => new_rank,
            };

            self.store
                .set_channel_rank(&channel.channel_id, scope, new_rank, previous, now)
                .await?;
            summary.updated += 1;
        }

        info!(
            "Rankings updated for {}: {} ranked, {} updated, {} changes",
            summary.scope, summary.ranked, summary.updated, summary.changes
        );

        Ok(summary)
    }

    /// Every known country, then the global scope. A failing scope is logged
    /// and skipped.
    pub async fn update_all_rankings(&self) -> Result<AllRankingsSummary, RankingError> {
        let codes = self.store.country_codes().await?;
        let mut total = AllRankingsSummary::default();

        for code in &codes {
            match self.update_rankings(&RankScope::country(code)).await {
                Ok(summary) => {
                    total.countries += 1;
                    total.channels_updated += summary.updated;
                    total.changes += summary.changes;
                }
                Err(e) => warn!("Failed to update rankings for country {}: {}", code, e),
            }
        }

        match self.update_rankings(&RankScope::Global).await {
            Ok(summary) => {
                total.channels_updated += summary.updated;
                total.changes += summary.changes;
            }
            Err(e) => warn!("Failed to update global rankings: {}", e),
        }

        Ok(total)
    }

    /// Position is assigned on read and reported as `global_rank`.
    pub async fn global_leaderboard(&self, limit: i64) -> Result<Vec<Channel>, RankingError> {
        let channels = self
            .store
            .top_channels(ChannelOrder::Subscribers, None, limit)
            .await?;

        Ok(assign_ranks(channels)
            .into_iter()
            .map(|(rank, mut channel)| {
                channel.global_rank = Some(rank);
                channel
            })
            .collect())
    }

    pub async fn country_leaderboard(
        &self,
        country_code: &str,
        limit: i64,
    ) -> Result<Vec<RankedChannel>, RankingError> {
        let scope = RankScope::country(country_code);
        let channels = self
            .store
            .top_channels(ChannelOrder::Subscribers, scope.country_code(), limit)
            .await?;

        Ok(assign_ranks(channels)
            .into_iter()
            .map(|(rank, channel)| RankedChannel { rank, channel })
            .collect())
    }

    pub async fn fastest_growing(&self, limit: i64) -> Result<Vec<Channel>, RankingError> {
        Ok(self
            .store
            .top_channels(ChannelOrder::DailyGrowthPercent, None, limit)
            .await?)
    }

    pub async fn biggest_gainers(&self, limit: i64) -> Result<Vec<Channel>, RankingError> {
        Ok(self
            .store
            .top_channels(ChannelOrder::DailySubscriberGain, None, limit)
            .await?)
    }

    pub async fn rank_history(
        &self,
        channel_id: &str,
        days: i64,
    ) -> Result<Vec<RankChangeEvent>, RankingError> {
        let since = Utc::now() - Duration::days(days);
        Ok(self.store.rank_history_since(channel_id, since).await?)
    }

    pub async fn recent_rank_changes(&self, limit: i64) -> Result<Vec<RankChangeEvent>, RankingError> {
        Ok(self.store.recent_rank_changes(limit).await?)
    }

    /// Top active channel of every country, ordered by country code.
    /// Countries without an active channel are left out.
    pub async fn country_leaders(&self) -> Result<Vec<CountryLeader>, RankingError> {
        let countries = self.store.list_countries().await?;
        let mut leaders = Vec::with_capacity(countries.len());

        for country in countries {
            let top = self
                .store
                .top_channels(ChannelOrder::Subscribers, Some(&country.code), 1)
                .await?;

            if let Some(channel) = top.into_iter().next() {
                leaders.push(CountryLeader {
                    country_code: country.code,
                    country_name: country.name,
                    flag_emoji: country.flag_emoji,
                    top_channel: channel.into(),
                });
            }
        }

        Ok(leaders)
    }
}
