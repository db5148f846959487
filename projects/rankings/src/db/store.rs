//! Storage seam for the ranking and growth services.
//!
//! Two implementations exist:
//! - [`PgStore`](crate::db::postgres::PgStore): PostgreSQL through diesel + r2d2
//! - [`MemoryStore`](crate::db::memory::MemoryStore): in-process tables, used
//!   when no database is configured and by the tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::db::channel::models::{Channel, ChannelOrder, GrowthUpdate, RankScope, StatsUpdate};
use crate::db::channel::queries::ChannelQueryError;
use crate::db::country::models::Country;
use crate::db::country::queries::CountryQueryError;
use crate::db::rank_history::models::{NewRankChange, RankChangeEvent};
use crate::db::rank_history::queries::RankHistoryQueryError;
use crate::db::stats::models::{NewStatsSnapshot, StatsSnapshot};
use crate::db::stats::queries::StatsQueryError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("GetConnectionFromPool: {source}")]
    GetConnectionFromPool {
        #[from]
        source: r2d2::Error,
    },

    #[error("BlockingTask: {source}")]
    BlockingTask {
        #[from]
        source: tokio::task::JoinError,
    },

    #[error(transparent)]
    Channel {
        #[from]
        source: ChannelQueryError,
    },

    #[error(transparent)]
    Stats {
        #[from]
        source: StatsQueryError,
    },

    #[error(transparent)]
    Country {
        #[from]
        source: CountryQueryError,
    },

    #[error(transparent)]
    RankHistory {
        #[from]
        source: RankHistoryQueryError,
    },
}

/// Row counts for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreOverview {
    pub total_countries: i64,
    pub total_channels: i64,
    pub total_stats_records: i64,
    /// Time of the newest snapshot; `None` before the first refresh.
    pub last_update: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait Store: Send + Sync {
    // Channels

    async fn get_channel(&self, channel_id: &str) -> Result<Option<Channel>, StoreError>;

    /// Active channels (optionally of one country) ordered by subscriber count
    /// descending, then `channel_id` ascending.
    async fn active_channels(&self, country_code: Option<&str>)
        -> Result<Vec<Channel>, StoreError>;

    async fn top_channels(
        &self,
        order: ChannelOrder,
        country_code: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Channel>, StoreError>;

    /// Returns `false` when the channel does not exist.
    async fn update_channel_stats(
        &self,
        channel_id: &str,
        update: StatsUpdate,
    ) -> Result<bool, StoreError>;

    async fn update_channel_growth(
        &self,
        channel_id: &str,
        update: GrowthUpdate,
    ) -> Result<bool, StoreError>;

    async fn set_channel_rank(
        &self,
        channel_id: &str,
        scope: &RankScope,
        current: i32,
        previous: i32,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    // Snapshots

    async fn insert_snapshots(&self, new: Vec<NewStatsSnapshot>) -> Result<usize, StoreError>;

    async fn latest_snapshot(&self, channel_id: &str) -> Result<Option<StatsSnapshot>, StoreError>;

    async fn latest_snapshot_at_or_before(
        &self,
        channel_id: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Option<StatsSnapshot>, StoreError>;

    /// Ascending by time.
    async fn snapshots_since(
        &self,
        channel_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<StatsSnapshot>, StoreError>;

    // Countries

    async fn get_country(&self, code: &str) -> Result<Option<Country>, StoreError>;

    async fn country_codes(&self) -> Result<Vec<String>, StoreError>;

    /// Ordered by code.
    async fn list_countries(&self) -> Result<Vec<Country>, StoreError>;

    // Rank history

    async fn insert_rank_change(&self, new: NewRankChange) -> Result<RankChangeEvent, StoreError>;

    /// Ascending by time.
    async fn rank_history_since(
        &self,
        channel_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<RankChangeEvent>, StoreError>;

    /// Newest first.
    async fn recent_rank_changes(&self, limit: i64) -> Result<Vec<RankChangeEvent>, StoreError>;

    async fn overview(&self) -> Result<StoreOverview, StoreError>;
}
