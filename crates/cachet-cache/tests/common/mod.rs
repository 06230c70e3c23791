//! Common test infrastructure for cache integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use cachet_cache::{CacheError, CacheFacade, CacheResult, CacheStore, MemoryStore, RedisStore};
use cachet_config::RedisConfig;
use std::sync::Arc;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::redis::Redis;

/// Facade over a fresh in-memory store.
pub fn memory_cache() -> CacheFacade {
    CacheFacade::new(Arc::new(MemoryStore::new()))
}

/// Facade whose store refuses every command.
pub fn failing_cache() -> CacheFacade {
    CacheFacade::new(Arc::new(FailingStore))
}

fn refused() -> CacheError {
    CacheError::from(redis::RedisError::from(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "connection refused",
    )))
}

/// Store that behaves like an unreachable Redis server.
pub struct FailingStore;

#[async_trait]
impl CacheStore for FailingStore {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Err(refused())
    }

    async fn set(&self, _key: &str, _value: &str) -> CacheResult<()> {
        Err(refused())
    }

    async fn expire(&self, _key: &str, _seconds: i64) -> CacheResult<bool> {
        Err(refused())
    }

    async fn exists(&self, _key: &str) -> CacheResult<bool> {
        Err(refused())
    }

    async fn delete(&self, _keys: &[String]) -> CacheResult<u64> {
        Err(refused())
    }

    async fn sadd(&self, _key: &str, _members: &[String]) -> CacheResult<u64> {
        Err(refused())
    }

    async fn srem(&self, _key: &str, _members: &[String]) -> CacheResult<u64> {
        Err(refused())
    }

    async fn smembers(&self, _key: &str) -> CacheResult<Vec<String>> {
        Err(refused())
    }

    async fn rpush(&self, _key: &str, _values: &[String]) -> CacheResult<u64> {
        Err(refused())
    }

    async fn lpop(&self, _key: &str) -> CacheResult<Option<String>> {
        Err(refused())
    }

    async fn rpop(&self, _key: &str) -> CacheResult<Option<String>> {
        Err(refused())
    }

    async fn lrange(&self, _key: &str, _start: isize, _stop: isize) -> CacheResult<Vec<String>> {
        Err(refused())
    }

    async fn llen(&self, _key: &str) -> CacheResult<u64> {
        Err(refused())
    }

    async fn zadd(&self, _key: &str, _members: &[(String, f64)]) -> CacheResult<u64> {
        Err(refused())
    }

    async fn zrange(&self, _key: &str, _start: isize, _stop: isize) -> CacheResult<Vec<String>> {
        Err(refused())
    }

    async fn zrangebyscore(&self, _key: &str, _min: f64, _max: f64) -> CacheResult<Vec<String>> {
        Err(refused())
    }

    async fn zcard(&self, _key: &str) -> CacheResult<u64> {
        Err(refused())
    }

    async fn hset(&self, _key: &str, _field: &str, _value: &str) -> CacheResult<()> {
        Err(refused())
    }

    async fn hset_multiple(&self, _key: &str, _fields: &[(String, String)]) -> CacheResult<()> {
        Err(refused())
    }

    async fn hget(&self, _key: &str, _field: &str) -> CacheResult<Option<String>> {
        Err(refused())
    }

    async fn hmget(&self, _key: &str, _fields: &[String]) -> CacheResult<Vec<Option<String>>> {
        Err(refused())
    }

    async fn hdel(&self, _key: &str, _fields: &[String]) -> CacheResult<u64> {
        Err(refused())
    }

    async fn ping(&self) -> CacheResult<()> {
        Err(refused())
    }
}

/// Redis testcontainer with a facade connected to it.
pub struct TestRedis {
    _container: ContainerAsync<Redis>,
    cache: CacheFacade,
}

impl TestRedis {
    /// Starts a fresh Redis container and connects a pooled store to it.
    pub async fn new() -> Self {
        let container = Redis::default()
            .start()
            .await
            .expect("Failed to start Redis container");

        let port = container
            .get_host_port_ipv4(6379)
            .await
            .expect("Failed to get Redis port");

        let config = RedisConfig {
            url: format!("redis://127.0.0.1:{}", port),
            pool_size: 4,
            connect_timeout_secs: 5,
        };

        let pool = cachet_cache::create_pool(&config)
            .await
            .expect("Failed to create Redis pool");

        Self {
            _container: container,
            cache: CacheFacade::new(Arc::new(RedisStore::new(pool))),
        }
    }

    /// Returns a facade backed by the container.
    pub fn cache(&self) -> CacheFacade {
        self.cache.clone()
    }
}
