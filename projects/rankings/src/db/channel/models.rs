use std::fmt;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::db::schema::channels;

/// The mutable channel aggregate: identity, latest counts, rank and growth fields.
///
/// `current_rank`/`previous_rank` belong to the country scope and
/// `global_rank`/`previous_global_rank` to the global scope. `None` means the
/// channel has not been placed by a ranking pass in that scope yet.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = channels, primary_key(channel_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Channel {
    pub channel_id: String,
    pub title: String,
    pub description: String,
    pub custom_url: String,
    pub thumbnail_url: String,
    pub country_code: String,
    pub country_name: String,
    pub published_at: String,
    pub subscriber_count: i64,
    pub view_count: i64,
    pub video_count: i64,
    pub current_rank: Option<i32>,
    pub previous_rank: Option<i32>,
    pub global_rank: Option<i32>,
    pub previous_global_rank: Option<i32>,
    pub daily_subscriber_gain: i64,
    pub daily_growth_percent: f64,
    pub weekly_subscriber_gain: i64,
    pub weekly_growth_percent: f64,
    pub monthly_subscriber_gain: i64,
    pub monthly_growth_percent: f64,
    pub viral_score: f64,
    pub viral_label: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub metrics_updated_at: Option<DateTime<Utc>>,
    pub rank_updated_at: Option<DateTime<Utc>>,
}

impl Channel {
    /// Rank stored by the last pass over `scope`.
    pub fn rank_in(&self, scope: &RankScope) -> Option<i32> {
        match scope {
            RankScope::Country(_) => self.current_rank,
            RankScope::Global => self.global_rank,
        }
    }
}

/// A ranking scope: one country, or every active channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RankScope {
    Country(String),
    Global,
}

impl RankScope {
    pub fn country(code: &str) -> Self {
        RankScope::Country(code.to_uppercase())
    }

    pub fn country_code(&self) -> Option<&str> {
        match self {
            RankScope::Country(code) => Some(code),
            RankScope::Global => None,
        }
    }
}

impl fmt::Display for RankScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankScope::Country(code) => write!(f, "country:{code}"),
            RankScope::Global => f.write_str("global"),
        }
    }
}

/// Sort key for the read-side leaderboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Subscribers,
    DailyGrowthPercent,
    DailySubscriberGain,
}

/// Fields a tracked channel starts with; everything else takes its default.
#[derive(Debug, Clone)]
pub struct NewChannel {
    pub channel_id: String,
    pub title: String,
    pub country_code: String,
    pub country_name: String,
    pub subscriber_count: i64,
    pub view_count: i64,
    pub video_count: i64,
}

impl NewChannel {
    pub fn into_channel(self, now: DateTime<Utc>) -> Channel {
        Channel {
            channel_id: self.channel_id,
            title: self.title,
            description: String::new(),
            custom_url: String::new(),
            thumbnail_url: String::new(),
            country_code: self.country_code.to_uppercase(),
            country_name: self.country_name,
            published_at: String::new(),
            subscriber_count: self.subscriber_count,
            view_count: self.view_count,
            video_count: self.video_count,
            current_rank: None,
            previous_rank: None,
            global_rank: None,
            previous_global_rank: None,
            daily_subscriber_gain: 0,
            daily_growth_percent: 0.0,
            weekly_subscriber_gain: 0,
            weekly_growth_percent: 0.0,
            monthly_subscriber_gain: 0,
            monthly_growth_percent: 0.0,
            viral_score: 0.0,
            viral_label: "Stable".to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
            metrics_updated_at: None,
            rank_updated_at: None,
        }
    }
}

/// Growth fields written by the growth analyzer in a single update.
#[derive(Debug, Clone, PartialEq, AsChangeset, Serialize)]
#[diesel(table_name = channels)]
pub struct GrowthUpdate {
    pub daily_subscriber_gain: i64,
    pub daily_growth_percent: f64,
    pub weekly_subscriber_gain: i64,
    pub weekly_growth_percent: f64,
    pub monthly_subscriber_gain: i64,
    pub monthly_growth_percent: f64,
    pub viral_score: f64,
    pub viral_label: String,
    pub metrics_updated_at: DateTime<Utc>,
}

/// Latest counts and descriptive fields written by ingestion.
#[derive(Debug, Clone, PartialEq, AsChangeset, Serialize)]
#[diesel(table_name = channels)]
pub struct StatsUpdate {
    pub title: String,
    pub description: String,
    pub custom_url: String,
    pub thumbnail_url: String,
    pub published_at: String,
    pub subscriber_count: i64,
    pub view_count: i64,
    pub video_count: i64,
    pub updated_at: DateTime<Utc>,
}
