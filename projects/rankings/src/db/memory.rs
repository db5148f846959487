use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::db::channel::models::*;
use crate::db::country::models::Country;
use crate::db::rank_history::models::*;
use crate::db::stats::models::*;
use crate::db::stats::queries::HISTORY_ROW_LIMIT;
use crate::db::{Store, StoreError, StoreOverview};

/// In-process tables with the same ordering rules as the PostgreSQL queries.
///
/// Nothing is persisted; a process started without `DATABASE_URL` begins empty.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    channels: Vec<Channel>,
    stats: Vec<StatsSnapshot>,
    countries: Vec<Country>,
    rank_history: Vec<RankChangeEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a channel.
    pub async fn insert_channel(&self, new: NewChannel) -> Channel {
        let channel = new.into_channel(Utc::now());
        let mut tables = self.tables.lock().await;
        tables.channels.retain(|c| c.channel_id != channel.channel_id);
        tables.channels.push(channel.clone());
        channel
    }

    pub async fn insert_country(&self, code: &str, name: &str) -> Country {
        let country = Country {
            code: code.to_uppercase(),
            name: name.to_string(),
            flag_emoji: String::new(),
            region: String::new(),
            created_at: Utc::now(),
        };
        let mut tables = self.tables.lock().await;
        tables.countries.retain(|c| c.code != country.code);
        tables.countries.push(country.clone());
        country
    }

    pub async fn set_active(&self, channel_id: &str, active: bool) -> bool {
        let mut tables = self.tables.lock().await;
        match tables.channels.iter_mut().find(|c| c.channel_id == channel_id) {
            Some(channel) => {
                channel.is_active = active;
                true
            }
            None => false,
        }
    }
}

fn sort_by_order(channels: &mut [Channel], order: ChannelOrder) {
    match order {
        ChannelOrder::Subscribers => channels.sort_by(|a, b| {
            b.subscriber_count
                .cmp(&a.subscriber_count)
                .then_with(|| a.channel_id.cmp(&b.channel_id))
        }),
        ChannelOrder::DailyGrowthPercent => channels.sort_by(|a, b| {
            b.daily_growth_percent
                .total_cmp(&a.daily_growth_percent)
                .then_with(|| a.channel_id.cmp(&b.channel_id))
        }),
        ChannelOrder::DailySubscriberGain => channels.sort_by(|a, b| {
            b.daily_subscriber_gain
                .cmp(&a.daily_subscriber_gain)
                .then_with(|| a.channel_id.cmp(&b.channel_id))
        }),
    }
}

fn active_in(tables: &Tables, country_code: Option<&str>) -> Vec<Channel> {
    tables
        .channels
        .iter()
        .filter(|c| c.is_active)
        .filter(|c| country_code.map_or(true, |code| c.country_code == code))
        .cloned()
        .collect()
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_channel(&self, channel_id: &str) -> Result<Option<Channel>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .channels
            .iter()
            .find(|c| c.channel_id == channel_id)
            .cloned())
    }

    async fn active_channels(
        &self,
        country_code: Option<&str>,
    ) -> Result<Vec<Channel>, StoreError> {
        let tables = self.tables.lock().await;
        let mut channels = active_in(&tables, country_code);
        sort_by_order(&mut channels, ChannelOrder::Subscribers);
        Ok(channels)
    }

    async fn top_channels(
        &self,
        order: ChannelOrder,
        country_code: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Channel>, StoreError> {
        let tables = self.tables.lock().await;
        let mut channels = active_in(&tables, country_code);
        sort_by_order(&mut channels, order);
        channels.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(channels)
    }

    async fn update_channel_stats(
        &self,
        channel_id: &str,
        update: StatsUpdate,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        let Some(channel) = tables.channels.iter_mut().find(|c| c.channel_id == channel_id) else {
            return Ok(false);
        };

        channel.title = update.title;
        channel.description = update.description;
        channel.custom_url = update.custom_url;
        channel.thumbnail_url = update.thumbnail_url;
        channel.published_at = update.published_at;
        channel.subscriber_count = update.subscriber_count;
        channel.view_count = update.view_count;
        channel.video_count = update.video_count;
        channel.updated_at = update.updated_at;
        Ok(true)
    }

    async fn update_channel_growth(
        &self,
        channel_id: &str,
        update: GrowthUpdate,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        let Some(channel) = tables.channels.iter_mut().find(|c| c.channel_id == channel_id) else {
            return Ok(false);
        };

        channel.daily_subscriber_gain = update.daily_subscriber_gain;
        channel.daily_growth_percent = update.daily_growth_percent;
        channel.weekly_subscriber_gain = update.weekly_subscriber_gain;
        channel.weekly_growth_percent = update.weekly_growth_percent;
        channel.monthly_subscriber_gain = update.monthly_subscriber_gain;
        channel.monthly_growth_percent = update.monthly_growth_percent;
        channel.viral_score = update.viral_score;
        channel.viral_label = update.viral_label;
        channel.metrics_updated_at = Some(update.metrics_updated_at);
        Ok(true)
    }

    async fn set_channel_rank(
        &self,
        channel_id: &str,
        scope: &RankScope,
        current: i32,
        previous: i32,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        let Some(channel) = tables.channels.iter_mut().find(|c| c.channel_id == channel_id) else {
            return Ok(false);
        };

        match scope {
            RankScope::Country(_) => {
                channel.current_rank = Some(current);
                channel.previous_rank = Some(previous);
            }
            RankScope::Global => {
                channel.global_rank = Some(current);
                channel.previous_global_rank = Some(previous);
            }
        }
        channel.rank_updated_at = Some(at);
        Ok(true)
    }

    async fn insert_snapshots(&self, new: Vec<NewStatsSnapshot>) -> Result<usize, StoreError> {
        let mut tables = self.tables.lock().await;
        let count = new.len();
        tables.stats.extend(new.into_iter().map(StatsSnapshot::from));
        Ok(count)
    }

    async fn latest_snapshot(&self, channel_id: &str) -> Result<Option<StatsSnapshot>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .stats
            .iter()
            .filter(|s| s.channel_id == channel_id)
            .max_by_key(|s| s.recorded_at)
            .cloned())
    }

    async fn latest_snapshot_at_or_before(
        &self,
        channel_id: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Option<StatsSnapshot>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .stats
            .iter()
            .filter(|s| s.channel_id == channel_id && s.recorded_at <= cutoff)
            .max_by_key(|s| s.recorded_at)
            .cloned())
    }

    async fn snapshots_since(
        &self,
        channel_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<StatsSnapshot>, StoreError> {
        let tables = self.tables.lock().await;
        let mut snapshots: Vec<StatsSnapshot> = tables
            .stats
            .iter()
            .filter(|s| s.channel_id == channel_id && s.recorded_at >= since)
            .cloned()
            .collect();
        snapshots.sort_by_key(|s| s.recorded_at);
        snapshots.truncate(HISTORY_ROW_LIMIT as usize);
        Ok(snapshots)
    }

    async fn get_country(&self, code: &str) -> Result<Option<Country>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.countries.iter().find(|c| c.code == code).cloned())
    }

    async fn country_codes(&self) -> Result<Vec<String>, StoreError> {
        let tables = self.tables.lock().await;
        let mut codes: Vec<String> = tables.countries.iter().map(|c| c.code.clone()).collect();
        codes.sort();
        Ok(codes)
    }

    async fn list_countries(&self) -> Result<Vec<Country>, StoreError> {
        let tables = self.tables.lock().await;
        let mut countries = tables.countries.clone();
        countries.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(countries)
    }

    async fn insert_rank_change(&self, new: NewRankChange) -> Result<RankChangeEvent, StoreError> {
        let event = RankChangeEvent::from(new);
        let mut tables = self.tables.lock().await;
        tables.rank_history.push(event.clone());
        Ok(event)
    }

    async fn rank_history_since(
        &self,
        channel_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<RankChangeEvent>, StoreError> {
        let tables = self.tables.lock().await;
        let mut events: Vec<RankChangeEvent> = tables
            .rank_history
            .iter()
            .filter(|e| e.channel_id == channel_id && e.recorded_at >= since)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.recorded_at);
        events.truncate(HISTORY_ROW_LIMIT as usize);
        Ok(events)
    }

    async fn recent_rank_changes(&self, limit: i64) -> Result<Vec<RankChangeEvent>, StoreError> {
        let tables = self.tables.lock().await;
        let mut events = tables.rank_history.clone();
        // Stable sort keeps insertion order among events of one pass.
        events.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        events.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(events)
    }

    async fn overview(&self) -> Result<StoreOverview, StoreError> {
        let tables = self.tables.lock().await;
        Ok(StoreOverview {
            total_countries: tables.countries.len() as i64,
            total_channels: tables.channels.len() as i64,
            total_stats_records: tables.stats.len() as i64,
            last_update: tables.stats.iter().map(|s| s.recorded_at).max(),
        })
    }
}
