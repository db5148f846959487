use chrono::{DateTime, Utc};
use diesel::prelude::*;
use thiserror::Error;

use crate::db::{channel::models::*, schema::channels::dsl::*};

#[derive(Debug, Error)]
pub enum ChannelQueryError {
    #[error("GetChannel: {source}")]
    GetChannel { source: diesel::result::Error },

    #[error("ListActiveChannels: {source}")]
    ListActiveChannels { source: diesel::result::Error },

    #[error("TopChannels: {source}")]
    TopChannels { source: diesel::result::Error },

    #[error("UpdateChannelStats: {source}")]
    UpdateChannelStats { source: diesel::result::Error },

    #[error("UpdateChannelGrowth: {source}")]
    UpdateChannelGrowth { source: diesel::result::Error },

    #[error("SetChannelRank: {source}")]
    SetChannelRank { source: diesel::result::Error },

    #[error("CountChannels: {source}")]
    CountChannels { source: diesel::result::Error },
}

pub fn get_channel(
    conn: &mut PgConnection,
    channel_id_val: &str,
) -> Result<Option<Channel>, ChannelQueryError> {
    channels
        .filter(channel_id.eq(channel_id_val))
        .select(Channel::as_select())
        .first(conn)
        .optional()
        .map_err(|source| ChannelQueryError::GetChannel { source })
}

/// Active channels, optionally limited to one country, in rank order.
pub fn list_active_channels(
    conn: &mut PgConnection,
    country_code_val: Option<&str>,
) -> Result<Vec<Channel>, ChannelQueryError> {
    let mut query = channels
        .filter(is_active.eq(true))
        .select(Channel::as_select())
        .into_boxed();

    if let Some(code) = country_code_val {
        query = query.filter(country_code.eq(code));
    }

    query
        .order((subscriber_count.desc(), channel_id.asc()))
        .load(conn)
        .map_err(|source| ChannelQueryError::ListActiveChannels { source })
}

pub fn top_channels(
    conn: &mut PgConnection,
    order: ChannelOrder,
    country_code_val: Option<&str>,
    limit: i64,
) -> Result<Vec<Channel>, ChannelQueryError> {
    let mut query = channels
        .filter(is_active.eq(true))
        .select(Channel::as_select())
        .into_boxed();

    if let Some(code) = country_code_val {
        query = query.filter(country_code.eq(code));
    }

    query = match order {
        ChannelOrder::Subscribers => query.order((subscriber_count.desc(), channel_id.asc())),
        ChannelOrder::DailyGrowthPercent => {
            query.order((daily_growth_percent.desc(), channel_id.asc()))
        }
        ChannelOrder::DailySubscriberGain => {
            query.order((daily_subscriber_gain.desc(), channel_id.asc()))
        }
    };

    query
        .limit(limit)
        .load(conn)
        .map_err(|source| ChannelQueryError::TopChannels { source })
}

pub fn update_channel_stats(
    conn: &mut PgConnection,
    channel_id_val: &str,
    update: &StatsUpdate,
) -> Result<bool, ChannelQueryError> {
    diesel::update(channels.filter(channel_id.eq(channel_id_val)))
        .set(update)
        .execute(conn)
        .map(|rows| rows > 0)
        .map_err(|source| ChannelQueryError::UpdateChannelStats { source })
}

pub fn update_channel_growth(
    conn: &mut PgConnection,
    channel_id_val: &str,
    update: &GrowthUpdate,
) -> Result<bool, ChannelQueryError> {
    diesel::update(channels.filter(channel_id.eq(channel_id_val)))
        .set(update)
        .execute(conn)
        .map(|rows| rows > 0)
        .map_err(|source| ChannelQueryError::UpdateChannelGrowth { source })
}

/// Writes the (current, previous) rank pair of one scope.
pub fn set_channel_rank(
    conn: &mut PgConnection,
    channel_id_val: &str,
    scope: &RankScope,
    current: i32,
    previous: i32,
    at: DateTime<Utc>,
) -> Result<bool, ChannelQueryError> {
    let target = channels.filter(channel_id.eq(channel_id_val));

    let rows = match scope {
        RankScope::Country(_) => diesel::update(target)
            .set((
                current_rank.eq(Some(current)),
                previous_rank.eq(Some(previous)),
                rank_updated_at.eq(Some(at)),
            ))
            .execute(conn),
        RankScope::Global => diesel::update(target)
            .set((
                global_rank.eq(Some(current)),
                previous_global_rank.eq(Some(previous)),
                rank_updated_at.eq(Some(at)),
            ))
            .execute(conn),
    };

    rows.map(|rows| rows > 0)
        .map_err(|source| ChannelQueryError::SetChannelRank { source })
}

/// Every channel, active or not.
pub fn count_channels(conn: &mut PgConnection) -> Result<i64, ChannelQueryError> {
    channels
        .count()
        .get_result(conn)
        .map_err(|source| ChannelQueryError::CountChannels { source })
}
