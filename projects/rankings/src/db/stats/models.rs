use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::db::schema::channel_stats;

/// One recorded observation of a channel's counts. Never updated.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = channel_stats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StatsSnapshot {
    #[serde(skip)]
    pub id: Uuid,
    pub channel_id: String,
    pub subscriber_count: i64,
    pub view_count: i64,
    pub video_count: i64,
    #[serde(rename = "timestamp")]
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = channel_stats)]
pub struct NewStatsSnapshot {
    pub id: Uuid,
    pub channel_id: String,
    pub subscriber_count: i64,
    pub view_count: i64,
    pub video_count: i64,
    pub recorded_at: DateTime<Utc>,
}

impl NewStatsSnapshot {
    pub fn new(
        channel_id: impl Into<String>,
        subscriber_count: i64,
        view_count: i64,
        video_count: i64,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel_id: channel_id.into(),
            subscriber_count,
            view_count,
            video_count,
            recorded_at,
        }
    }
}

impl From<NewStatsSnapshot> for StatsSnapshot {
    fn from(new: NewStatsSnapshot) -> Self {
        Self {
            id: new.id,
            channel_id: new.channel_id,
            subscriber_count: new.subscriber_count,
            view_count: new.view_count,
            video_count: new.video_count,
            recorded_at: new.recorded_at,
        }
    }
}
