//! Result type aliases for Cachet.

use crate::CachetError;

/// A specialized `Result` type for Cachet bootstrap operations.
pub type CachetResult<T> = Result<T, CachetError>;
