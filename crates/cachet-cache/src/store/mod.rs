//! Store boundary: the commands the facade needs from a key-value store.
//!
//! Values cross this boundary as JSON text so the trait stays object-safe
//! and a single `Arc<dyn CacheStore>` can be shared by every caller.

mod memory_store;
mod redis_store;

pub use memory_store::MemoryStore;
pub use redis_store::{create_pool, RedisStore};

use crate::error::CacheResult;
use async_trait::async_trait;
use cachet_config::{AppConfig, StoreBackend};
use std::sync::Arc;
use tracing::info;

/// Commands a Redis-compatible store must provide.
///
/// Range arguments follow Redis conventions: indices are inclusive and
/// negative values count from the end.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// `GET key`
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// `SET key value KEEPTTL`; an existing expiration survives the write.
    async fn set(&self, key: &str, value: &str) -> CacheResult<()>;

    /// `EXPIRE key seconds`; false when the key does not exist.
    async fn expire(&self, key: &str, seconds: i64) -> CacheResult<bool>;

    /// `EXISTS key`
    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// `DEL key [key ...]`; returns how many keys were removed.
    async fn delete(&self, keys: &[String]) -> CacheResult<u64>;

    /// `SADD key member [member ...]`
    async fn sadd(&self, key: &str, members: &[String]) -> CacheResult<u64>;

    /// `SREM key member [member ...]`
    async fn srem(&self, key: &str, members: &[String]) -> CacheResult<u64>;

    /// `SMEMBERS key`
    async fn smembers(&self, key: &str) -> CacheResult<Vec<String>>;

    /// `RPUSH key value [value ...]`; returns the new length.
    async fn rpush(&self, key: &str, values: &[String]) -> CacheResult<u64>;

    /// `LPOP key`
    async fn lpop(&self, key: &str) -> CacheResult<Option<String>>;

    /// `RPOP key`
    async fn rpop(&self, key: &str) -> CacheResult<Option<String>>;

    /// `LRANGE key start stop`
    async fn lrange(&self, key: &str, start: isize, stop: isize) -> CacheResult<Vec<String>>;

    /// `LLEN key`
    async fn llen(&self, key: &str) -> CacheResult<u64>;

    /// `ZADD key score member [score member ...]`, given as (member, score).
    async fn zadd(&self, key: &str, members: &[(String, f64)]) -> CacheResult<u64>;

    /// `ZRANGE key start stop`
    async fn zrange(&self, key: &str, start: isize, stop: isize) -> CacheResult<Vec<String>>;

    /// `ZRANGEBYSCORE key min max`, both bounds inclusive.
    async fn zrangebyscore(&self, key: &str, min: f64, max: f64) -> CacheResult<Vec<String>>;

    /// `ZCARD key`
    async fn zcard(&self, key: &str) -> CacheResult<u64>;

    /// `HSET key field value`
    async fn hset(&self, key: &str, field: &str, value: &str) -> CacheResult<()>;

    /// `HSET key field value [field value ...]`
    async fn hset_multiple(&self, key: &str, fields: &[(String, String)]) -> CacheResult<()>;

    /// `HGET key field`
    async fn hget(&self, key: &str, field: &str) -> CacheResult<Option<String>>;

    /// `HMGET key field [field ...]`; one slot per requested field.
    async fn hmget(&self, key: &str, fields: &[String]) -> CacheResult<Vec<Option<String>>>;

    /// `HDEL key field [field ...]`
    async fn hdel(&self, key: &str, fields: &[String]) -> CacheResult<u64>;

    /// `PING`
    async fn ping(&self) -> CacheResult<()>;
}

/// Builds the store selected by `cache.backend`.
///
/// The Redis backend verifies connectivity before returning.
pub async fn connect_store(config: &AppConfig) -> CacheResult<Arc<dyn CacheStore>> {
    match config.cache.backend {
        StoreBackend::Redis => {
            let pool = create_pool(&config.redis).await?;
            Ok(Arc::new(RedisStore::new(pool)))
        }
        StoreBackend::Memory => {
            info!("Using in-memory cache store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
