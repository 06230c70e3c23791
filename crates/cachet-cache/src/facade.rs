//! Typed cache facade over a shared store handle.
//!
//! Every method maps to one store command (plus an `EXPIRE` when a TTL is
//! given). Values are JSON-encoded. Failures are logged at the call site
//! with the key and cause, counted, and returned to the caller; nothing is
//! retried. Use [`CacheFacade::lenient`] for the boolean/absent view.

use crate::error::{CacheError, CacheResult};
use crate::lenient::LenientCache;
use crate::metrics::{CacheMetrics, OUTCOME_OK};
use crate::store::{connect_store, CacheStore};
use cachet_config::AppConfig;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Write without touching the key's expiration.
pub const NO_EXPIRY: Option<Duration> = None;

/// Score used by sorted-set writes that do not care about ordering.
pub const DEFAULT_SCORE: f64 = 0.0;

/// Typed cache operations over five Redis data shapes.
///
/// Cloning is cheap; clones share the same store handle.
#[derive(Clone)]
pub struct CacheFacade {
    store: Arc<dyn CacheStore>,
}

impl std::fmt::Debug for CacheFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheFacade").finish_non_exhaustive()
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> CacheResult<String> {
    Ok(serde_json::to_string(value)?)
}

fn encode_all<'a, T: Serialize + 'a>(
    values: impl IntoIterator<Item = &'a T>,
) -> CacheResult<Vec<String>> {
    values.into_iter().map(|value| encode(value)).collect()
}

fn decode<T: DeserializeOwned>(raw: &str) -> CacheResult<T> {
    Ok(serde_json::from_str(raw)?)
}

fn decode_all<T: DeserializeOwned, C: FromIterator<T>>(raw: Vec<String>) -> CacheResult<C> {
    raw.iter().map(|value| decode(value)).collect()
}

fn owned_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names.into_iter().map(|name| name.as_ref().to_string()).collect()
}

/// Whole seconds to pass to `EXPIRE`, or `None` when no expiration applies.
/// Partial seconds round up.
fn ttl_seconds(ttl: Option<Duration>) -> Option<i64> {
    ttl.filter(|ttl| !ttl.is_zero()).map(|ttl| {
        let seconds = ttl.as_secs().saturating_add(u64::from(ttl.subsec_nanos() > 0));
        i64::try_from(seconds).unwrap_or(i64::MAX)
    })
}

fn observe<R>(operation: &'static str, key: &str, result: CacheResult<R>) -> CacheResult<R> {
    match &result {
        Ok(_) => CacheMetrics::operation(operation, OUTCOME_OK),
        Err(e) => {
            error!(operation, key, kind = e.kind(), error = %e, "Cache operation failed");
            CacheMetrics::operation(operation, e.kind());
        }
    }
    result
}

fn record_lookup(operation: &'static str, key: &str, found: bool) {
    if found {
        debug!(key, "Cache hit for key");
        CacheMetrics::hit(operation);
    } else {
        debug!(key, "Cache miss for key");
        CacheMetrics::miss(operation);
    }
}

impl CacheFacade {
    /// Create a facade over an existing store handle.
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Build the configured store and wrap it.
    pub async fn connect(config: &AppConfig) -> CacheResult<Self> {
        Ok(Self::new(connect_store(config).await?))
    }

    /// The shared store handle.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// View that reports `bool`/`Option` instead of errors.
    #[must_use]
    pub fn lenient(&self) -> LenientCache<'_> {
        LenientCache::new(self)
    }

    /// Check that the store answers.
    pub async fn ping(&self) -> CacheResult<()> {
        observe("ping", "", self.store.ping().await)
    }

    async fn apply_ttl(&self, key: &str, ttl: Option<Duration>) -> CacheResult<()> {
        if let Some(seconds) = ttl_seconds(ttl) {
            self.store.expire(key, seconds).await?;
        }
        Ok(())
    }

    // ============ Values ============

    /// Store `value` at `key`, replacing whatever was there.
    pub async fn set_value<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let result = async {
            let json = encode(value)?;
            self.store.set(key, &json).await?;
            self.apply_ttl(key, ttl).await
        }
        .await;
        observe("set_value", key, result)
    }

    /// Read the value at `key`; `Ok(None)` when the key is absent.
    pub async fn get_value<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        let result = async {
            let raw = self.store.get(key).await?;
            raw.as_deref().map(decode).transpose()
        }
        .await;
        let result = observe("get_value", key, result);
        if let Ok(value) = &result {
            record_lookup("get_value", key, value.is_some());
        }
        result
    }

    // ============ Keys ============

    /// Whether `key` exists, whatever kind of value it holds.
    pub async fn contains_key(&self, key: &str) -> CacheResult<bool> {
        observe("contains_key", key, self.store.exists(key).await)
    }

    /// Delete `key`. Deleting an absent key succeeds.
    pub async fn remove(&self, key: &str) -> CacheResult<()> {
        let result = self
            .store
            .delete(&[key.to_string()])
            .await
            .map(|removed| debug!(key, removed, "Removed key"));
        observe("remove", key, result)
    }

    /// Delete several keys in one command.
    pub async fn remove_many<I, S>(&self, keys: I) -> CacheResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys = owned_names(keys);
        if keys.is_empty() {
            return Ok(());
        }
        let label = keys.join(",");
        let result = self
            .store
            .delete(&keys)
            .await
            .map(|removed| debug!(keys = %label, removed, "Removed keys"));
        observe("remove_many", &label, result)
    }

    // ============ Sets ============

    /// Add one member to the set at `key`.
    pub async fn add_to_set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let result = async {
            let member = encode(value)?;
            self.store.sadd(key, &[member]).await?;
            self.apply_ttl(key, ttl).await
        }
        .await;
        observe("add_to_set", key, result)
    }

    /// Add every member of `values` to the set at `key`.
    ///
    /// An empty input fails with [`CacheError::EmptyInput`] without touching
    /// the store.
    pub async fn add_all_to_set<T: Serialize>(
        &self,
        key: &str,
        values: &HashSet<T>,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let result = async {
            if values.is_empty() {
                return Err(CacheError::EmptyInput {
                    operation: "add_all_to_set",
                });
            }
            let members = encode_all(values)?;
            self.store.sadd(key, &members).await?;
            self.apply_ttl(key, ttl).await
        }
        .await;
        observe("add_all_to_set", key, result)
    }

    /// Remove members from several sets, one `SREM` per key.
    ///
    /// Stops at the first failing key; keys already processed stay modified.
    pub async fn remove_set_members<T: Serialize>(
        &self,
        removals: &HashMap<String, HashSet<T>>,
    ) -> CacheResult<()> {
        for (key, values) in removals {
            if values.is_empty() {
                continue;
            }
            let result = async {
                let members = encode_all(values)?;
                self.store.srem(key, &members).await
            }
            .await;
            let removed = observe("remove_set_members", key, result)?;
            debug!(key = %key, removed, "Removed set members");
        }
        Ok(())
    }

    /// All members of the set at `key`; empty when the key is absent.
    pub async fn get_set<T: DeserializeOwned + Eq + Hash>(
        &self,
        key: &str,
    ) -> CacheResult<HashSet<T>> {
        let result: CacheResult<HashSet<T>> =
            async { decode_all(self.store.smembers(key).await?) }.await;
        observe("get_set", key, result)
    }

    // ============ Lists ============

    /// Append one element to the list at `key`.
    pub async fn push_to_list<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let result = async {
            let element = encode(value)?;
            self.store.rpush(key, &[element]).await?;
            self.apply_ttl(key, ttl).await
        }
        .await;
        observe("push_to_list", key, result)
    }

    /// Append `values` in order to the list at `key`.
    pub async fn push_all_to_list<T: Serialize>(
        &self,
        key: &str,
        values: &[T],
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let result = async {
            if values.is_empty() {
                return Err(CacheError::EmptyInput {
                    operation: "push_all_to_list",
                });
            }
            let elements = encode_all(values)?;
            let len = self.store.rpush(key, &elements).await?;
            debug!(key, len, "Pushed list elements");
            self.apply_ttl(key, ttl).await
        }
        .await;
        observe("push_all_to_list", key, result)
    }

    /// Elements `start..=end` of the list at `key`. Negative indices count
    /// from the end, so `(0, -1)` is the whole list.
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        key: &str,
        start: isize,
        end: isize,
    ) -> CacheResult<Vec<T>> {
        let result: CacheResult<Vec<T>> =
            async { decode_all(self.store.lrange(key, start, end).await?) }.await;
        observe("get_list", key, result)
    }

    /// Length of the list at `key`.
    pub async fn list_len(&self, key: &str) -> CacheResult<u64> {
        observe("list_len", key, self.store.llen(key).await)
    }

    /// Drop the first element of the list at `key`.
    pub async fn pop_list_left(&self, key: &str) -> CacheResult<()> {
        let result = self
            .store
            .lpop(key)
            .await
            .map(|popped| debug!(key, popped = popped.is_some(), "Popped list head"));
        observe("pop_list_left", key, result)
    }

    /// Drop the last element of the list at `key`.
    pub async fn pop_list_right(&self, key: &str) -> CacheResult<()> {
        let result = self
            .store
            .rpop(key)
            .await
            .map(|popped| debug!(key, popped = popped.is_some(), "Popped list tail"));
        observe("pop_list_right", key, result)
    }

    // ============ Sorted sets ============

    /// Add one member with `score` to the sorted set at `key`.
    pub async fn add_to_sorted_set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        score: f64,
    ) -> CacheResult<()> {
        let result = async {
            let member = encode(value)?;
            self.store.zadd(key, &[(member, score)]).await
        }
        .await;
        observe("add_to_sorted_set", key, result).map(|_| ())
    }

    /// Add every member of `values` with the same `score`.
    pub async fn add_all_to_sorted_set<T: Serialize>(
        &self,
        key: &str,
        values: &HashSet<T>,
        score: f64,
    ) -> CacheResult<()> {
        let result = async {
            if values.is_empty() {
                return Err(CacheError::EmptyInput {
                    operation: "add_all_to_sorted_set",
                });
            }
            let members: Vec<(String, f64)> = encode_all(values)?
                .into_iter()
                .map(|member| (member, score))
                .collect();
            self.store.zadd(key, &members).await
        }
        .await;
        observe("add_all_to_sorted_set", key, result).map(|_| ())
    }

    /// Members ranked `start..=end` by ascending score.
    ///
    /// Returned as a set: rank order is not preserved.
    pub async fn sorted_set_by_rank<T: DeserializeOwned + Eq + Hash>(
        &self,
        key: &str,
        start: isize,
        end: isize,
    ) -> CacheResult<HashSet<T>> {
        let result: CacheResult<HashSet<T>> =
            async { decode_all(self.store.zrange(key, start, end).await?) }.await;
        observe("sorted_set_by_rank", key, result)
    }

    /// Members whose score lies in `min..=max`.
    pub async fn sorted_set_by_score<T: DeserializeOwned + Eq + Hash>(
        &self,
        key: &str,
        min: f64,
        max: f64,
    ) -> CacheResult<HashSet<T>> {
        let result: CacheResult<HashSet<T>> =
            async { decode_all(self.store.zrangebyscore(key, min, max).await?) }.await;
        observe("sorted_set_by_score", key, result)
    }

    /// Number of members in the sorted set at `key`.
    pub async fn sorted_set_len(&self, key: &str) -> CacheResult<u64> {
        observe("sorted_set_len", key, self.store.zcard(key).await)
    }

    // ============ Hashes ============

    /// Write every field of `fields` into the hash at `key`.
    pub async fn put_hash<T: Serialize>(
        &self,
        key: &str,
        fields: &HashMap<String, T>,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let result = async {
            if fields.is_empty() {
                return Err(CacheError::EmptyInput {
                    operation: "put_hash",
                });
            }
            let encoded = fields
                .iter()
                .map(|(field, value)| encode(value).map(|json| (field.clone(), json)))
                .collect::<CacheResult<Vec<(String, String)>>>()?;
            self.store.hset_multiple(key, &encoded).await?;
            self.apply_ttl(key, ttl).await
        }
        .await;
        observe("put_hash", key, result)
    }

    /// Write a single hash field.
    pub async fn put_hash_field<T: Serialize + ?Sized>(
        &self,
        key: &str,
        field: &str,
        value: &T,
    ) -> CacheResult<()> {
        let result = async {
            let json = encode(value)?;
            self.store.hset(key, field, &json).await
        }
        .await;
        observe("put_hash_field", key, result)
    }

    /// Values of `fields` in request order, `None` for missing fields.
    pub async fn get_hash_fields<T, I, S>(&self, key: &str, fields: I) -> CacheResult<Vec<Option<T>>>
    where
        T: DeserializeOwned,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields = owned_names(fields);
        if fields.is_empty() {
            return Ok(Vec::new());
        }
        let result: CacheResult<Vec<Option<T>>> = async {
            self.store
                .hmget(key, &fields)
                .await?
                .iter()
                .map(|raw| raw.as_deref().map(decode).transpose())
                .collect()
        }
        .await;
        observe("get_hash_fields", key, result)
    }

    /// Value of a single hash field.
    pub async fn get_hash_field<T: DeserializeOwned>(
        &self,
        key: &str,
        field: &str,
    ) -> CacheResult<Option<T>> {
        let result = async {
            let raw = self.store.hget(key, field).await?;
            raw.as_deref().map(decode).transpose()
        }
        .await;
        let result = observe("get_hash_field", key, result);
        if let Ok(value) = &result {
            record_lookup("get_hash_field", key, value.is_some());
        }
        result
    }

    /// Delete fields from the hash at `key`.
    pub async fn remove_hash_fields<I, S>(&self, key: &str, fields: I) -> CacheResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields = owned_names(fields);
        if fields.is_empty() {
            return Ok(());
        }
        let result = self
            .store
            .hdel(key, &fields)
            .await
            .map(|removed| debug!(key, removed, "Removed hash fields"));
        observe("remove_hash_fields", key, result)
    }

    /// Delete the whole hash at `key`.
    pub async fn remove_hash(&self, key: &str) -> CacheResult<()> {
        self.remove(key).await
    }
}
