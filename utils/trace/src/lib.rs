//! Process-wide tracing setup shared by the workspace binaries.

use thiserror::Error;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber.
///
/// `RUST_LOG` wins when it is set; otherwise `fallback` is used as the filter
/// directive (for example `info` or `projects_rankings=debug,info`).
pub fn init(fallback: &str) -> Result<(), TracingInitError> {
    let filter = build_filter(fallback)?;

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(true));

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|source| TracingInitError::SetGlobalDefault { source })?;

    Ok(())
}

fn build_filter(fallback: &str) -> Result<EnvFilter, TracingInitError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(fallback).map_err(|source| TracingInitError::InvalidFilter {
            directive: fallback.to_string(),
            source,
        }),
    }
}

#[derive(Debug, Error)]
pub enum TracingInitError {
    #[error("Invalid filter directive {directive:?}: {source}")]
    InvalidFilter {
        directive: String,
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("Failed to set global default subscriber")]
    SetGlobalDefault {
        #[from]
        source: tracing::subscriber::SetGlobalDefaultError,
    },
}
