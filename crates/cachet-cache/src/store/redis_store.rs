//! Redis-backed store over a `deadpool-redis` connection pool.

use super::CacheStore;
use crate::error::{CacheError, CacheResult};
use async_trait::async_trait;
use cachet_config::RedisConfig;
use deadpool_redis::{Config, Pool, Runtime};
use redis::{AsyncCommands, SetExpiry, SetOptions};
use tracing::{debug, info};

/// Create a Redis connection pool and check it with `PING`.
pub async fn create_pool(config: &RedisConfig) -> CacheResult<Pool> {
    info!("Creating Redis connection pool...");

    let cfg = Config::from_url(&config.url);

    let pool = cfg
        .builder()
        .map_err(|e| CacheError::Configuration(format!("Invalid Redis config: {}", e)))?
        .max_size(config.pool_size)
        .wait_timeout(Some(config.connect_timeout()))
        .create_timeout(Some(config.connect_timeout()))
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| CacheError::Configuration(format!("Failed to create pool: {}", e)))?;

    let mut conn = pool.get().await?;
    redis::cmd("PING")
        .query_async::<String>(&mut *conn)
        .await?;

    info!(max_size = config.pool_size, "Redis connection pool created successfully");

    Ok(pool)
}

/// Store that forwards every command to Redis.
#[derive(Clone)]
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Get a connection from the pool.
    async fn conn(&self) -> CacheResult<deadpool_redis::Connection> {
        Ok(self.pool.get().await?)
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.pool.status();
        f.debug_struct("RedisStore")
            .field("size", &status.size)
            .field("available", &status.available)
            .finish()
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn().await?;
        Ok(conn.get(key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        let mut conn = self.conn().await?;
        let options = SetOptions::default().with_expiration(SetExpiry::KEEPTTL);
        conn.set_options::<_, _, ()>(key, value, options).await?;
        Ok(())
    }

    async fn expire(&self, key: &str, seconds: i64) -> CacheResult<bool> {
        let mut conn = self.conn().await?;
        let applied: bool = conn.expire(key, seconds).await?;
        debug!(key, seconds, applied, "Set expiration");
        Ok(applied)
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.conn().await?;
        Ok(conn.exists(key).await?)
    }

    async fn delete(&self, keys: &[String]) -> CacheResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn().await?;
        Ok(conn.del(keys).await?)
    }

    async fn sadd(&self, key: &str, members: &[String]) -> CacheResult<u64> {
        let mut conn = self.conn().await?;
        Ok(conn.sadd(key, members).await?)
    }

    async fn srem(&self, key: &str, members: &[String]) -> CacheResult<u64> {
        let mut conn = self.conn().await?;
        Ok(conn.srem(key, members).await?)
    }

    async fn smembers(&self, key: &str) -> CacheResult<Vec<String>> {
        let mut conn = self.conn().await?;
        Ok(conn.smembers(key).await?)
    }

    async fn rpush(&self, key: &str, values: &[String]) -> CacheResult<u64> {
        let mut conn = self.conn().await?;
        Ok(conn.rpush(key, values).await?)
    }

    async fn lpop(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn().await?;
        Ok(conn.lpop(key, None).await?)
    }

    async fn rpop(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn().await?;
        Ok(conn.rpop(key, None).await?)
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> CacheResult<Vec<String>> {
        let mut conn = self.conn().await?;
        Ok(conn.lrange(key, start, stop).await?)
    }

    async fn llen(&self, key: &str) -> CacheResult<u64> {
        let mut conn = self.conn().await?;
        Ok(conn.llen(key).await?)
    }

    async fn zadd(&self, key: &str, members: &[(String, f64)]) -> CacheResult<u64> {
        let items: Vec<(f64, &str)> = members
            .iter()
            .map(|(member, score)| (*score, member.as_str()))
            .collect();
        let mut conn = self.conn().await?;
        Ok(conn.zadd_multiple(key, items.as_slice()).await?)
    }

    async fn zrange(&self, key: &str, start: isize, stop: isize) -> CacheResult<Vec<String>> {
        let mut conn = self.conn().await?;
        Ok(conn.zrange(key, start, stop).await?)
    }

    async fn zrangebyscore(&self, key: &str, min: f64, max: f64) -> CacheResult<Vec<String>> {
        let mut conn = self.conn().await?;
        Ok(conn.zrangebyscore(key, min, max).await?)
    }

    async fn zcard(&self, key: &str) -> CacheResult<u64> {
        let mut conn = self.conn().await?;
        Ok(conn.zcard(key).await?)
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> CacheResult<()> {
        let mut conn = self.conn().await?;
        conn.hset::<_, _, _, ()>(key, field, value).await?;
        Ok(())
    }

    async fn hset_multiple(&self, key: &str, fields: &[(String, String)]) -> CacheResult<()> {
        let mut conn = self.conn().await?;
        conn.hset_multiple::<_, _, _, ()>(key, fields).await?;
        Ok(())
    }

    async fn hget(&self, key: &str, field: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn().await?;
        Ok(conn.hget(key, field).await?)
    }

    async fn hmget(&self, key: &str, fields: &[String]) -> CacheResult<Vec<Option<String>>> {
        if fields.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn().await?;
        let values: Vec<Option<String>> = redis::cmd("HMGET")
            .arg(key)
            .arg(fields)
            .query_async(&mut *conn)
            .await?;
        Ok(values)
    }

    async fn hdel(&self, key: &str, fields: &[String]) -> CacheResult<u64> {
        if fields.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn().await?;
        Ok(conn.hdel(key, fields).await?)
    }

    async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.conn().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut *conn)
            .await?;
        Ok(())
    }
}
