pub mod metrics;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::db::channel::models::GrowthUpdate;
use crate::db::stats::models::StatsSnapshot;
use crate::db::{Store, StoreError};

use metrics::{
    growth_between, overtake, viral_score_for, Growth, GrowthWindow, OvertakePrediction,
    ViralPrediction,
};

#[derive(Debug, Error)]
pub enum GrowthError {
    #[error("Store: {source}")]
    Store {
        #[from]
        source: StoreError,
    },

    #[error("ChannelNotFound: {channel_id}")]
    ChannelNotFound { channel_id: String },
}

/// Derives growth figures from the snapshot series and writes them back onto
/// the channel.
#[derive(Clone)]
pub struct GrowthAnalyzer {
    store: Arc<dyn Store>,
}

impl GrowthAnalyzer {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn daily_growth(&self, channel_id: &str) -> Result<Growth, GrowthError> {
        self.growth_over(channel_id, GrowthWindow::Daily, Utc::now())
            .await
    }

    pub async fn weekly_growth(&self, channel_id: &str) -> Result<Growth, GrowthError> {
        self.growth_over(channel_id, GrowthWindow::Weekly, Utc::now())
            .await
    }

    pub async fn monthly_growth(&self, channel_id: &str) -> Result<Growth, GrowthError> {
        self.growth_over(channel_id, GrowthWindow::Monthly, Utc::now())
            .await
    }

    /// Compares the latest snapshot with the latest one at or before the
    /// window cutoff.
    async fn growth_over(
        &self,
        channel_id: &str,
        window: GrowthWindow,
        now: DateTime<Utc>,
    ) -> Result<Growth, GrowthError> {
        let Some(current) = self.store.latest_snapshot(channel_id).await? else {
            return Ok(Growth::default());
        };

        let baseline = self
            .store
            .latest_snapshot_at_or_before(channel_id, window.cutoff(now))
            .await?;

        Ok(growth_between(
            baseline.map(|s| s.subscriber_count),
            Some(current.subscriber_count),
        ))
    }

    pub async fn viral_score(&self, channel_id: &str) -> Result<ViralPrediction, GrowthError> {
        let now = Utc::now();
        let daily = self.growth_over(channel_id, GrowthWindow::Daily, now).await?;
        let weekly = self
            .growth_over(channel_id, GrowthWindow::Weekly, now)
            .await?;
        let subscribers = self.latest_subscribers(channel_id).await?;

        Ok(viral_score_for(daily.percent, weekly.percent, subscribers))
    }

    async fn latest_subscribers(&self, channel_id: &str) -> Result<i64, GrowthError> {
        Ok(self
            .store
            .latest_snapshot(channel_id)
            .await?
            .map_or(0, |s| s.subscriber_count))
    }

    /// Uses the stored counts and daily gains of both channels.
    pub async fn predict_overtake(
        &self,
        channel_id: &str,
        target_id: &str,
    ) -> Result<OvertakePrediction, GrowthError> {
        let subject = self.store.get_channel(channel_id).await?.ok_or_else(|| {
            GrowthError::ChannelNotFound {
                channel_id: channel_id.to_string(),
            }
        })?;
        let target = self.store.get_channel(target_id).await?.ok_or_else(|| {
            GrowthError::ChannelNotFound {
                channel_id: target_id.to_string(),
            }
        })?;

        Ok(overtake(
            subject.subscriber_count,
            subject.daily_subscriber_gain,
            target.subscriber_count,
            target.daily_subscriber_gain,
            Utc::now(),
        ))
    }

    /// Recomputes every growth field of one channel and stores them in a
    /// single write.
    pub async fn update_channel_growth_metrics(
        &self,
        channel_id: &str,
    ) -> Result<GrowthUpdate, GrowthError> {
        let now = Utc::now();

        let daily = self.growth_over(channel_id, GrowthWindow::Daily, now).await?;
        let weekly = self
            .growth_over(channel_id, GrowthWindow::Weekly, now)
            .await?;
        let monthly = self
            .growth_over(channel_id, GrowthWindow::Monthly, now)
            .await?;
        let subscribers = self.latest_subscribers(channel_id).await?;
        let viral = viral_score_for(daily.percent, weekly.percent, subscribers);

        let update = GrowthUpdate {
            daily_subscriber_gain: daily.gain,
            daily_growth_percent: daily.percent,
            weekly_subscriber_gain: weekly.gain,
            weekly_growth_percent: weekly.percent,
            monthly_subscriber_gain: monthly.gain,
            monthly_growth_percent: monthly.percent,
            viral_score: viral.viral_score,
            viral_label: viral.label.to_string(),
            metrics_updated_at: now,
        };

        if !self
            .store
            .update_channel_growth(channel_id, update.clone())
            .await?
        {
            return Err(GrowthError::ChannelNotFound {
                channel_id: channel_id.to_string(),
            });
        }

        debug!(
            channel_id,
            daily_percent = update.daily_growth_percent,
            label = %update.viral_label,
            "growth metrics updated"
        );

        Ok(update)
    }

    /// Snapshots of the last `days` days, oldest first.
    pub async fn growth_history(
        &self,
        channel_id: &str,
        days: i64,
    ) -> Result<Vec<StatsSnapshot>, GrowthError> {
        let since = Utc::now() - Duration::days(days);
        Ok(self.store.snapshots_since(channel_id, since).await?)
    }

    /// Returns how many channels were updated. A failing channel is logged and
    /// skipped.
    pub async fn update_all_growth_metrics(&self) -> Result<usize, GrowthError> {
        let channels = self.store.active_channels(None).await?;
        let mut updated = 0;

        for channel in &channels {
            match self.update_channel_growth_metrics(&channel.channel_id).await {
                Ok(_) => updated += 1,
                Err(e) => warn!(
                    "Failed to update growth metrics for {}: {}",
                    channel.channel_id, e
                ),
            }
        }

        info!(
            "Growth metrics updated for {}/{} channels",
            updated,
            channels.len()
        );

        Ok(updated)
    }
}
