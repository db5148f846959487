use std::sync::Arc;

use crate::db::Store;
use crate::scheduler::Jobs;
use crate::services::growth::GrowthAnalyzer;
use crate::services::ingest::cache::StatsCache;
use crate::services::ingest::{ChannelSource, Refresher};
use crate::services::ranking::RankingEngine;

/// Everything the handlers and the scheduler share. Built once in `main`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub growth: GrowthAnalyzer,
    pub ranking: RankingEngine,
    pub refresher: Refresher,
    pub jobs: Jobs,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        source: Arc<dyn ChannelSource>,
        cache: StatsCache,
        jobs: Jobs,
    ) -> Self {
        let growth = GrowthAnalyzer::new(store.clone());
        let ranking = RankingEngine::new(store.clone());
        let refresher = Refresher::new(
            store.clone(),
            source,
            Arc::new(cache),
            growth.clone(),
            ranking.clone(),
        );

        Self {
            store,
            growth,
            ranking,
            refresher,
            jobs,
        }
    }
}
