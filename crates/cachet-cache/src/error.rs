//! Cache error types.

use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-related errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// No pooled connection could be obtained.
    #[error("Redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    /// The store rejected or failed the command.
    #[error("Store error: {0}")]
    Store(#[source] redis::RedisError),

    /// The key holds a different kind of value than the command expects.
    #[error("Wrong type: {0}")]
    WrongType(String),

    /// Value could not be encoded to or decoded from JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A bulk write was given nothing to write.
    #[error("Empty input for {operation}")]
    EmptyInput { operation: &'static str },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CacheError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Pool(_) => "POOL_ERROR",
            Self::Store(_) => "STORE_ERROR",
            Self::WrongType(_) => "WRONG_TYPE",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::EmptyInput { .. } => "EMPTY_INPUT",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    /// Returns true if the store could not be reached at all.
    #[must_use]
    pub fn is_connectivity(&self) -> bool {
        match self {
            Self::Pool(_) => true,
            Self::Store(e) => {
                e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout()
            }
            _ => false,
        }
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        if err.code() == Some("WRONGTYPE") {
            Self::WrongType(err.to_string())
        } else {
            Self::Store(err)
        }
    }
}

impl From<cachet_core::CachetError> for CacheError {
    fn from(err: cachet_core::CachetError) -> Self {
        Self::Configuration(err.to_string())
    }
}
