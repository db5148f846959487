use chrono::{DateTime, Utc};
use diesel::prelude::*;
use thiserror::Error;

use crate::db::{schema::channel_stats::dsl::*, stats::models::*};

/// Upper bound on rows returned for one channel's history.
pub const HISTORY_ROW_LIMIT: i64 = 1000;

#[derive(Debug, Error)]
pub enum StatsQueryError {
    #[error("InsertSnapshots: {source}")]
    InsertSnapshots { source: diesel::result::Error },

    #[error("LatestSnapshot: {source}")]
    LatestSnapshot { source: diesel::result::Error },

    #[error("SnapshotsSince: {source}")]
    SnapshotsSince { source: diesel::result::Error },

    #[error("CountSnapshots: {source}")]
    CountSnapshots { source: diesel::result::Error },

    #[error("LastRecordedAt: {source}")]
    LastRecordedAt { source: diesel::result::Error },
}

pub fn insert_snapshots(
    conn: &mut PgConnection,
    new: &[NewStatsSnapshot],
) -> Result<usize, StatsQueryError> {
    diesel::insert_into(channel_stats)
        .values(new)
        .execute(conn)
        .map_err(|source| StatsQueryError::InsertSnapshots { source })
}

/// Most recent snapshot of a channel, or the most recent one taken at or
/// before `cutoff` when given.
pub fn latest_snapshot(
    conn: &mut PgConnection,
    channel_id_val: &str,
    cutoff: Option<DateTime<Utc>>,
) -> Result<Option<StatsSnapshot>, StatsQueryError> {
    let mut query = channel_stats
        .filter(channel_id.eq(channel_id_val))
        .select(StatsSnapshot::as_select())
        .into_boxed();

    if let Some(cutoff) = cutoff {
        query = query.filter(recorded_at.le(cutoff));
    }

    query
        .order(recorded_at.desc())
        .first(conn)
        .optional()
        .map_err(|source| StatsQueryError::LatestSnapshot { source })
}

pub fn snapshots_since(
    conn: &mut PgConnection,
    channel_id_val: &str,
    since: DateTime<Utc>,
) -> Result<Vec<StatsSnapshot>, StatsQueryError> {
    channel_stats
        .filter(channel_id.eq(channel_id_val))
        .filter(recorded_at.ge(since))
        .select(StatsSnapshot::as_select())
        .order(recorded_at.asc())
        .limit(HISTORY_ROW_LIMIT)
        .load(conn)
        .map_err(|source| StatsQueryError::SnapshotsSince { source })
}

pub fn count_snapshots(conn: &mut PgConnection) -> Result<i64, StatsQueryError> {
    channel_stats
        .count()
        .get_result(conn)
        .map_err(|source| StatsQueryError::CountSnapshots { source })
}

pub fn last_recorded_at(conn: &mut PgConnection) -> Result<Option<DateTime<Utc>>, StatsQueryError> {
    channel_stats
        .select(diesel::dsl::max(recorded_at))
        .first(conn)
        .map_err(|source| StatsQueryError::LastRecordedAt { source })
}
