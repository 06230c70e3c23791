//! Logging bootstrap built on `tracing-subscriber`.

use crate::{CachetError, CachetResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing_subscriber::{fmt as fmt_layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,cachet=debug";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `filter`. Returns an error instead of
/// panicking when a global subscriber is already installed.
pub fn init_logging(filter: &str, format: LogFormat) -> CachetResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .map_err(|e| CachetError::Configuration(format!("Invalid log filter '{}': {}", filter, e)))?;

    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Pretty => registry
            .with(fmt_layer::layer().with_target(true))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt_layer::layer().json().with_target(true))
            .try_init(),
    };

    installed.map_err(|e| CachetError::Internal(format!("Failed to install logging: {}", e)))?;

    tracing::debug!(format = %format, "Logging initialized");
    Ok(())
}
