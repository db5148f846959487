use chrono::{DateTime, Utc};
use diesel::prelude::*;
use thiserror::Error;

use crate::db::{rank_history::models::*, schema::rank_history::dsl::*};
use crate::db::stats::queries::HISTORY_ROW_LIMIT;

#[derive(Debug, Error)]
pub enum RankHistoryQueryError {
    #[error("InsertRankChange: {source}")]
    InsertRankChange { source: diesel::result::Error },

    #[error("RankHistorySince: {source}")]
    RankHistorySince { source: diesel::result::Error },

    #[error("RecentRankChanges: {source}")]
    RecentRankChanges { source: diesel::result::Error },
}

pub fn insert_rank_change(
    conn: &mut PgConnection,
    new: &NewRankChange,
) -> Result<RankChangeEvent, RankHistoryQueryError> {
    diesel::insert_into(rank_history)
        .values(new)
        .returning(RankChangeEvent::as_returning())
        .get_result(conn)
        .map_err(|source| RankHistoryQueryError::InsertRankChange { source })
}

pub fn rank_history_since(
    conn: &mut PgConnection,
    channel_id_val: &str,
    since: DateTime<Utc>,
) -> Result<Vec<RankChangeEvent>, RankHistoryQueryError> {
    rank_history
        .filter(channel_id.eq(channel_id_val))
        .filter(recorded_at.ge(since))
        .select(RankChangeEvent::as_select())
        .order(recorded_at.asc())
        .limit(HISTORY_ROW_LIMIT)
        .load(conn)
        .map_err(|source| RankHistoryQueryError::RankHistorySince { source })
}

pub fn recent_rank_changes(
    conn: &mut PgConnection,
    limit: i64,
) -> Result<Vec<RankChangeEvent>, RankHistoryQueryError> {
    rank_history
        .select(RankChangeEvent::as_select())
        .order(recorded_at.desc())
        .limit(limit)
        .load(conn)
        .map_err(|source| RankHistoryQueryError::RecentRankChanges { source })
}
