use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::r2d2::ConnectionManager;
use diesel::PgConnection;
use thiserror::Error;
use tracing::info;

use crate::db::channel::{models::*, queries as channel_queries};
use crate::db::country::{models::Country, queries as country_queries};
use crate::db::rank_history::{models::*, queries as rank_queries};
use crate::db::stats::{models::*, queries as stats_queries};
use crate::db::{PgPool, Store, StoreError, StoreOverview};

#[derive(Debug, Error)]
pub enum ConnectPgStoreError {
    #[error("BuildPool: {source}")]
    BuildPool {
        #[from]
        source: r2d2::Error,
    },
}

/// PostgreSQL store. Diesel is blocking, so every query runs on the blocking
/// thread pool with its own pooled connection.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn connect(database_url: &str, pool_size: u32) -> Result<Self, ConnectPgStoreError> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = PgPool::builder().max_size(pool_size).build(manager)?;

        info!("Connected to PostgreSQL with pool size {}", pool_size);

        Ok(Self::new(pool))
    }

    async fn run<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> Result<T, StoreError> + Send + 'static,
    {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut *conn)
        })
        .await?
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get_channel(&self, channel_id: &str) -> Result<Option<Channel>, StoreError> {
        let channel_id = channel_id.to_owned();
        self.run(move |conn| Ok(channel_queries::get_channel(conn, &channel_id)?))
            .await
    }

    async fn active_channels(
        &self,
        country_code: Option<&str>,
    ) -> Result<Vec<Channel>, StoreError> {
        let country_code = country_code.map(str::to_owned);
        self.run(move |conn| {
            Ok(channel_queries::list_active_channels(
                conn,
                country_code.as_deref(),
            )?)
        })
        .await
    }

    async fn top_channels(
        &self,
        order: ChannelOrder,
        country_code: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Channel>, StoreError> {
        let country_code = country_code.map(str::to_owned);
        self.run(move |conn| {
            Ok(channel_queries::top_channels(
                conn,
                order,
                country_code.as_deref(),
                limit,
            )?)
        })
        .await
    }

    async fn update_channel_stats(
        &self,
        channel_id: &str,
        update: StatsUpdate,
    ) -> Result<bool, StoreError> {
        let channel_id = channel_id.to_owned();
        self.run(move |conn| {
            Ok(channel_queries::update_channel_stats(
                conn,
                &channel_id,
                &update,
            )?)
        })
        .await
    }

    async fn update_channel_growth(
        &self,
        channel_id: &str,
        update: GrowthUpdate,
    ) -> Result<bool, StoreError> {
        let channel_id = channel_id.to_owned();
        self.run(move |conn| {
            Ok(channel_queries::update_channel_growth(
                conn,
                &channel_id,
                &update,
            )?)
        })
        .await
    }

    async fn set_channel_rank(
        &self,
        channel_id: &str,
        scope: &RankScope,
        current: i32,
        previous: i32,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let channel_id = channel_id.to_owned();
        let scope = scope.clone();
        self.run(move |conn| {
            Ok(channel_queries::set_channel_rank(
                conn,
                &channel_id,
                &scope,
                current,
                previous,
                at,
            )?)
        })
        .await
    }

    async fn insert_snapshots(&self, new: Vec<NewStatsSnapshot>) -> Result<usize, StoreError> {
        if new.is_empty() {
            return Ok(0);
        }
        self.run(move |conn| Ok(stats_queries::insert_snapshots(conn, &new)?))
            .await
    }

    async fn latest_snapshot(&self, channel_id: &str) -> Result<Option<StatsSnapshot>, StoreError> {
        let channel_id = channel_id.to_owned();
        self.run(move |conn| Ok(stats_queries::latest_snapshot(conn, &channel_id, None)?))
            .await
    }

    async fn latest_snapshot_at_or_before(
        &self,
        channel_id: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Option<StatsSnapshot>, StoreError> {
        let channel_id = channel_id.to_owned();
        self.run(move |conn| {
            Ok(stats_queries::latest_snapshot(
                conn,
                &channel_id,
                Some(cutoff),
            )?)
        })
        .await
    }

    async fn snapshots_since(
        &self,
        channel_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<StatsSnapshot>, StoreError> {
        let channel_id = channel_id.to_owned();
        self.run(move |conn| Ok(stats_queries::snapshots_since(conn, &channel_id, since)?))
            .await
    }

    async fn get_country(&self, code: &str) -> Result<Option<Country>, StoreError> {
        let code = code.to_owned();
        self.run(move |conn| Ok(country_queries::get_country(conn, &code)?))
            .await
    }

    async fn country_codes(&self) -> Result<Vec<String>, StoreError> {
        self.run(|conn| Ok(country_queries::list_country_codes(conn)?))
            .await
    }

    async fn list_countries(&self) -> Result<Vec<Country>, StoreError> {
        self.run(|conn| Ok(country_queries::list_countries(conn)?))
            .await
    }

    async fn insert_rank_change(&self, new: NewRankChange) -> Result<RankChangeEvent, StoreError> {
        self.run(move |conn| Ok(rank_queries::insert_rank_change(conn, &new)?))
            .await
    }

    async fn rank_history_since(
        &self,
        channel_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<RankChangeEvent>, StoreError> {
        let channel_id = channel_id.to_owned();
        self.run(move |conn| Ok(rank_queries::rank_history_since(conn, &channel_id, since)?))
            .await
    }

    async fn recent_rank_changes(&self, limit: i64) -> Result<Vec<RankChangeEvent>, StoreError> {
        self.run(move |conn| Ok(rank_queries::recent_rank_changes(conn, limit)?))
            .await
    }

    async fn overview(&self) -> Result<StoreOverview, StoreError> {
        self.run(|conn| {
            Ok(StoreOverview {
                total_countries: country_queries::count_countries(conn)?,
                total_channels: channel_queries::count_channels(conn)?,
                total_stats_records: stats_queries::count_snapshots(conn)?,
                last_update: stats_queries::last_recorded_at(conn)?,
            })
        })
        .await
    }
}
