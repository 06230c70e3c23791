//! # Cachet Cache
//!
//! Typed cache facade over Redis-compatible stores.
//!
//! [`CacheFacade`] wraps a shared [`CacheStore`] handle and exposes typed
//! operations over plain values, sets, lists, sorted sets and hashes.
//! Values are stored as JSON. Every operation returns a [`CacheResult`];
//! [`CacheFacade::lenient`] gives the same operations with `bool`/`Option`
//! results for callers that only care whether something worked.
//!
//! ```no_run
//! use cachet_cache::{CacheFacade, MemoryStore, NO_EXPIRY};
//! use std::sync::Arc;
//!
//! # async fn run() -> cachet_cache::CacheResult<()> {
//! let cache = CacheFacade::new(Arc::new(MemoryStore::new()));
//! cache.set_value("greeting", "hello", NO_EXPIRY).await?;
//! let greeting: Option<String> = cache.get_value("greeting").await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
mod facade;
mod lenient;
pub mod metrics;
pub mod store;

pub use error::{CacheError, CacheResult};
pub use facade::{CacheFacade, DEFAULT_SCORE, NO_EXPIRY};
pub use lenient::LenientCache;
pub use store::{connect_store, create_pool, CacheStore, MemoryStore, RedisStore};
