use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::db::channel::models::RankScope;
use crate::db::schema::rank_history;

/// A logged rank movement. `country_code` is `None` for global passes and
/// `change` is positive when the channel moved up.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = rank_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RankChangeEvent {
    #[serde(skip)]
    pub id: Uuid,
    pub channel_id: String,
    pub country_code: Option<String>,
    pub old_rank: i32,
    pub new_rank: i32,
    pub change: i32,
    #[serde(rename = "timestamp")]
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = rank_history)]
pub struct NewRankChange {
    pub id: Uuid,
    pub channel_id: String,
    pub country_code: Option<String>,
    pub old_rank: i32,
    pub new_rank: i32,
    pub change: i32,
    pub recorded_at: DateTime<Utc>,
}

impl NewRankChange {
    pub fn new(
        channel_id: impl Into<String>,
        scope: &RankScope,
        old_rank: i32,
        new_rank: i32,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel_id: channel_id.into(),
            country_code: scope.country_code().map(str::to_string),
            old_rank,
            new_rank,
            change: old_rank - new_rank,
            recorded_at,
        }
    }
}

impl From<NewRankChange> for RankChangeEvent {
    fn from(new: NewRankChange) -> Self {
        Self {
            id: new.id,
            channel_id: new.channel_id,
            country_code: new.country_code,
            old_rank: new.old_rank,
            new_rank: new.new_rank,
            change: new.change,
            recorded_at: new.recorded_at,
        }
    }
}
