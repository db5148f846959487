//! Periodic background jobs.
//!
//! Each job owns a [`JobState`]. A run must acquire the job's guard first; a
//! tick that finds the previous run still active is skipped, never queued.
//! Failures are logged and the next tick is the retry.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::state::AppState;

const NEVER: i64 = i64::MIN;

pub struct JobState {
    name: &'static str,
    interval: Duration,
    running: AtomicBool,
    last_started: AtomicI64,
    last_finished: AtomicI64,
}

/// Held for the duration of one run. Dropping it releases the job.
pub struct JobGuard {
    job: Arc<JobState>,
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        self.job
            .last_finished
            .store(Utc::now().timestamp_millis(), Ordering::SeqCst);
        self.job.running.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobStatus {
    pub name: &'static str,
    pub is_running: bool,
    pub interval_secs: u64,
    pub last_started: Option<DateTime<Utc>>,
    pub last_finished: Option<DateTime<Utc>>,
}

impl JobState {
    pub fn new(name: &'static str, interval: Duration) -> Arc<Self> {
        Arc::new(Self {
            name,
            interval,
            running: AtomicBool::new(false),
            last_started: AtomicI64::new(NEVER),
            last_finished: AtomicI64::new(NEVER),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// `None` while another run holds the guard.
    pub fn try_acquire(self: &Arc<Self>) -> Option<JobGuard> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;

        self.last_started
            .store(Utc::now().timestamp_millis(), Ordering::SeqCst);

        Some(JobGuard {
            job: Arc::clone(self),
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> JobStatus {
        JobStatus {
            name: self.name,
            is_running: self.is_running(),
            interval_secs: self.interval.as_secs(),
            last_started: from_millis(self.last_started.load(Ordering::SeqCst)),
            last_finished: from_millis(self.last_finished.load(Ordering::SeqCst)),
        }
    }
}

fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
    if millis == NEVER {
        return None;
    }
    Utc.timestamp_millis_opt(millis).single()
}

/// The four periodic jobs. `refresh` is also taken by the manual
/// refresh-all endpoint so the two never overlap.
#[derive(Clone)]
pub struct Jobs {
    pub enabled: bool,
    pub refresh: Arc<JobState>,
    pub rankings: Arc<JobState>,
    pub growth: Arc<JobState>,
    pub snapshot: Arc<JobState>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulerStatus {
    pub enabled: bool,
    pub jobs: Vec<JobStatus>,
}

impl Jobs {
    pub fn from_config(config: &Config) -> Self {
        Self {
            enabled: config.scheduler_enabled,
            refresh: JobState::new("refresh_channels", config.refresh_interval),
            rankings: JobState::new("update_rankings", config.ranking_interval),
            growth: JobState::new("calculate_growth", config.growth_interval),
            snapshot: JobState::new("record_stats_snapshot", config.snapshot_interval),
        }
    }

    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            enabled: self.enabled,
            jobs: [&self.refresh, &self.rankings, &self.growth, &self.snapshot]
                .into_iter()
                .map(|job| job.status())
                .collect(),
        }
    }
}

/// Runs `run` every `job.interval` after `initial_delay`, each run on its own
/// task behind the job guard.
fn spawn_job<F, Fut>(job: Arc<JobState>, initial_delay: Duration, run: F)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::time::sleep(initial_delay).await;

        let mut ticker = interval(job.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            let Some(guard) = job.try_acquire() else {
                warn!("Job {} is still running, skipping this tick", job.name);
                continue;
            };

            debug!("Running scheduled job {}", job.name);
            let fut = run();
            tokio::spawn(async move {
                if let Err(e) = fut.await {
                    warn!("Scheduled job {} failed: {:#}", guard.job.name, e);
                }
                drop(guard);
            });
        }
    });
}

pub fn spawn_all(state: AppState) {
    let jobs = state.jobs.clone();

    if !jobs.enabled {
        info!("Scheduler disabled");
        return;
    }

    {
        let refresher = state.refresher.clone();
        spawn_job(jobs.refresh.clone(), Duration::from_secs(60), move || {
            let refresher = refresher.clone();
            async move {
                let summary = refresher.refresh_all().await?;
                info!(
                    "Scheduled refresh: {} refreshed, {} failed",
                    summary.refreshed, summary.failed
                );
                Ok(())
            }
        });
    }

    {
        let ranking = state.ranking.clone();
        spawn_job(jobs.rankings.clone(), Duration::from_secs(10), move || {
            let ranking = ranking.clone();
            async move {
                let summary = ranking.update_all_rankings().await?;
                info!(
                    "Scheduled ranking update: {} countries, {} changes",
                    summary.countries, summary.changes
                );
                Ok(())
            }
        });
    }

    {
        let growth = state.growth.clone();
        spawn_job(jobs.growth.clone(), Duration::from_secs(30), move || {
            let growth = growth.clone();
            async move {
                growth.update_all_growth_metrics().await?;
                Ok(())
            }
        });
    }

    {
        let refresher = state.refresher.clone();
        spawn_job(jobs.snapshot.clone(), Duration::from_secs(20), move || {
            let refresher = refresher.clone();
            async move {
                refresher.record_stats_snapshot().await?;
                Ok(())
            }
        });
    }

    info!("Scheduler started with 4 jobs");
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;
