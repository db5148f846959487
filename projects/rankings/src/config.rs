use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("MissingVar: {name} must be set")]
    MissingVar { name: &'static str },

    #[error("InvalidVar: {name}={value}: {reason}")]
    InvalidVar {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// Without it the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub database_pool_size: u32,
    pub youtube_api_key: String,
    pub youtube_timeout: Duration,
    pub stats_cache_ttl: Duration,
    pub log_level: String,
    pub scheduler_enabled: bool,
    pub refresh_interval: Duration,
    pub ranking_interval: Duration,
    pub growth_interval: Duration,
    pub snapshot_interval: Duration,
}

impl Config {
    /// Reads the process environment after loading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let youtube_api_key = lookup("YOUTUBE_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingVar {
                name: "YOUTUBE_API_KEY",
            })?;

        Ok(Config {
            bind_addr: parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8000)))?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            database_pool_size: parse_or(&lookup, "DATABASE_POOL_SIZE", 10)?,
            youtube_api_key,
            youtube_timeout: secs_or(&lookup, "YOUTUBE_TIMEOUT_SECS", 10)?,
            stats_cache_ttl: secs_or(&lookup, "STATS_CACHE_TTL_SECS", 300)?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            scheduler_enabled: parse_or(&lookup, "SCHEDULER_ENABLED", true)?,
            refresh_interval: secs_or(&lookup, "REFRESH_INTERVAL_SECS", 6 * 3600)?,
            ranking_interval: secs_or(&lookup, "RANKING_INTERVAL_SECS", 600)?,
            growth_interval: secs_or(&lookup, "GROWTH_INTERVAL_SECS", 3600)?,
            snapshot_interval: secs_or(&lookup, "SNAPSHOT_INTERVAL_SECS", 4 * 3600)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidVar {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}

/// Intervals must be positive; a zero period would panic the ticker.
fn secs_or<F>(lookup: &F, name: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secs: u64 = parse_or(lookup, name, default)?;
    if secs == 0 {
        return Err(ConfigError::InvalidVar {
            name,
            value: secs.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_the_key_is_set() {
        let config = Config::from_lookup(lookup(&[("YOUTUBE_API_KEY", "abc")])).unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:8000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.database_url, None);
        assert_eq!(config.database_pool_size, 10);
        assert_eq!(config.youtube_timeout, Duration::from_secs(10));
        assert_eq!(config.stats_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.log_level, "info");
        assert!(config.scheduler_enabled);
        assert_eq!(config.refresh_interval, Duration::from_secs(21600));
        assert_eq!(config.ranking_interval, Duration::from_secs(600));
        assert_eq!(config.growth_interval, Duration::from_secs(3600));
        assert_eq!(config.snapshot_interval, Duration::from_secs(14400));
    }

    #[test]
    fn api_key_is_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar { name: "YOUTUBE_API_KEY" }));

        let blank = Config::from_lookup(lookup(&[("YOUTUBE_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(blank, ConfigError::MissingVar { .. }));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("YOUTUBE_API_KEY", "abc"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("DATABASE_URL", "postgres://localhost/rankings"),
            ("SCHEDULER_ENABLED", "false"),
            ("RANKING_INTERVAL_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/rankings")
        );
        assert!(!config.scheduler_enabled);
        assert_eq!(config.ranking_interval, Duration::from_secs(30));
    }

    #[test]
    fn invalid_values_are_errors() {
        let err = Config::from_lookup(lookup(&[
            ("YOUTUBE_API_KEY", "abc"),
            ("DATABASE_POOL_SIZE", "lots"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidVar { name: "DATABASE_POOL_SIZE", .. }
        ));

        let zero = Config::from_lookup(lookup(&[
            ("YOUTUBE_API_KEY", "abc"),
            ("GROWTH_INTERVAL_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(
            zero,
            ConfigError::InvalidVar { name: "GROWTH_INTERVAL_SECS", .. }
        ));
    }
}
