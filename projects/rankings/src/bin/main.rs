use std::sync::Arc;

use axum::serve;
use interfaces_youtube_channels::{ClientBuildError, YouTubeClient};
use thiserror::Error;
use tracing::{info, warn};

use projects_rankings::config::{Config, ConfigError};
use projects_rankings::db::memory::MemoryStore;
use projects_rankings::db::postgres::{ConnectPgStoreError, PgStore};
use projects_rankings::db::Store;
use projects_rankings::endpoints::router;
use projects_rankings::scheduler::{self, Jobs};
use projects_rankings::services::ingest::cache::StatsCache;
use projects_rankings::state::AppState;

#[derive(Debug, Error)]
pub enum MainError {
    #[error("LoadConfig: {source}")]
    LoadConfig {
        #[from]
        source: ConfigError,
    },

    #[error("TracingInit: {source}")]
    TracingInit {
        #[from]
        source: utils_trace::TracingInitError,
    },

    #[error("ConnectDatabase: {source}")]
    ConnectDatabase {
        #[from]
        source: ConnectPgStoreError,
    },

    #[error("BuildYouTubeClient: {source}")]
    BuildYouTubeClient {
        #[from]
        source: ClientBuildError,
    },

    #[error("TcpListenerBind: {source}")]
    TcpListenerBind { source: std::io::Error },

    #[error("Serve: {source}")]
    Serve { source: std::io::Error },
}

#[tokio::main]
async fn main() -> Result<(), MainError> {
    let config = Config::from_env()?;

    utils_trace::init(&config.log_level)?;

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => Arc::new(PgStore::connect(url, config.database_pool_size)?),
        None => {
            warn!("DATABASE_URL is not set, using the in-memory store; data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let youtube = YouTubeClient::new(config.youtube_api_key.clone(), config.youtube_timeout)?;

    let state = AppState::new(
        store,
        Arc::new(youtube),
        StatsCache::new(config.stats_cache_ttl),
        Jobs::from_config(&config),
    );

    scheduler::spawn_all(state.clone());

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .map_err(|source| MainError::TcpListenerBind { source })?;

    info!("Server running on addr: {}", config.bind_addr);

    serve(listener, app)
        .await
        .map_err(|source| MainError::Serve { source })?;

    Ok(())
}
