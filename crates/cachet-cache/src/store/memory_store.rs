//! In-process store with Redis command semantics.

use super::CacheStore;
use crate::error::{CacheError, CacheResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;
use tokio::time::Instant;

/// Stored value, one variant per Redis data type.
#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Set(HashSet<String>),
    List(VecDeque<String>),
    SortedSet(HashMap<String, f64>),
    Hash(HashMap<String, String>),
}

impl Value {
    fn is_empty(&self) -> bool {
        match self {
            Self::Str(_) => false,
            Self::Set(set) => set.is_empty(),
            Self::List(list) => list.is_empty(),
            Self::SortedSet(zset) => zset.is_empty(),
            Self::Hash(hash) => hash.is_empty(),
        }
    }
}

#[derive(Debug)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-memory store.
///
/// Expired keys are dropped lazily when touched. Collections that become
/// empty are removed, as Redis does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

fn wrong_type(key: &str) -> CacheError {
    CacheError::WrongType(format!(
        "key '{}' holds a different kind of value",
        key
    ))
}

/// The reply Redis sends for a NaN score.
fn invalid_float() -> CacheError {
    CacheError::from(redis::RedisError::from((
        redis::ErrorKind::ResponseError,
        "value is not a valid float",
    )))
}

/// Resolves an inclusive Redis range against a collection length.
fn resolve_range(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = isize::try_from(len).ok()?;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

    if len == 0 || start > stop || start >= len {
        return None;
    }
    Some((usize::try_from(start).ok()?, usize::try_from(stop).ok()?))
}

/// Members ordered by (score, member), as Redis orders sorted sets.
fn ordered_members(zset: &HashMap<String, f64>) -> Vec<(&String, f64)> {
    let mut members: Vec<(&String, f64)> = zset.iter().map(|(m, s)| (m, *s)).collect();
    members.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));
    members
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    /// Returns true if no live keys remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs `f` against the live entry at `key`, if any.
    fn read<R>(&self, key: &str, f: impl FnOnce(&Value) -> CacheResult<R>) -> CacheResult<Option<R>> {
        let mut entries = self.entries.lock();
        Self::purge(&mut entries, key);
        entries.get(key).map(|entry| f(&entry.value)).transpose()
    }

    /// Runs `f` against the entry at `key`, creating it with `init` when absent.
    /// The key is removed if `f` leaves an empty collection behind.
    fn write<R>(
        &self,
        key: &str,
        init: impl FnOnce() -> Value,
        f: impl FnOnce(&mut Value) -> CacheResult<R>,
    ) -> CacheResult<R> {
        let mut entries = self.entries.lock();
        Self::purge(&mut entries, key);
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(init()));
        let result = f(&mut entry.value);
        if entry.value.is_empty() {
            entries.remove(key);
        }
        result
    }

    /// Like `write`, but leaves a missing key missing.
    fn modify<R: Default>(
        &self,
        key: &str,
        f: impl FnOnce(&mut Value) -> CacheResult<R>,
    ) -> CacheResult<R> {
        let mut entries = self.entries.lock();
        Self::purge(&mut entries, key);
        let Some(entry) = entries.get_mut(key) else {
            return Ok(R::default());
        };
        let result = f(&mut entry.value);
        if entry.value.is_empty() {
            entries.remove(key);
        }
        result
    }

    fn purge(entries: &mut HashMap<String, Entry>, key: &str) {
        let now = Instant::now();
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }
    }

    fn pop(&self, key: &str, front: bool) -> CacheResult<Option<String>> {
        self.modify(key, |value| match value {
            Value::List(list) if front => Ok(list.pop_front()),
            Value::List(list) => Ok(list.pop_back()),
            _ => Err(wrong_type(key)),
        })
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.read(key, |value| match value {
            Value::Str(s) => Ok(s.clone()),
            _ => Err(wrong_type(key)),
        })
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        let mut entries = self.entries.lock();
        Self::purge(&mut entries, key);
        let value = Value::Str(value.to_string());
        match entries.get_mut(key) {
            Some(entry) => entry.value = value,
            None => {
                entries.insert(key.to_string(), Entry::new(value));
            }
        }
        Ok(())
    }

    async fn expire(&self, key: &str, seconds: i64) -> CacheResult<bool> {
        let mut entries = self.entries.lock();
        Self::purge(&mut entries, key);
        if !entries.contains_key(key) {
            return Ok(false);
        }
        if seconds <= 0 {
            entries.remove(key);
            return Ok(true);
        }
        if let Some(entry) = entries.get_mut(key) {
            let ttl = Duration::from_secs(seconds.unsigned_abs());
            // Past the clock's range means the key effectively never expires.
            entry.expires_at = Instant::now().checked_add(ttl);
        }
        Ok(true)
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        Ok(self.read(key, |_| Ok(()))?.is_some())
    }

    async fn delete(&self, keys: &[String]) -> CacheResult<u64> {
        let mut entries = self.entries.lock();
        let now = Instant::now();
        let mut removed = 0;
        for key in keys {
            if let Some(entry) = entries.remove(key) {
                if !entry.is_expired(now) {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    async fn sadd(&self, key: &str, members: &[String]) -> CacheResult<u64> {
        self.write(
            key,
            || Value::Set(HashSet::new()),
            |value| match value {
                Value::Set(set) => Ok(members.iter().filter(|m| set.insert((*m).clone())).count() as u64),
                _ => Err(wrong_type(key)),
            },
        )
    }

    async fn srem(&self, key: &str, members: &[String]) -> CacheResult<u64> {
        self.modify(key, |value| match value {
            Value::Set(set) => Ok(members.iter().filter(|m| set.remove(*m)).count() as u64),
            _ => Err(wrong_type(key)),
        })
    }

    async fn smembers(&self, key: &str) -> CacheResult<Vec<String>> {
        let members = self.read(key, |value| match value {
            Value::Set(set) => Ok(set.iter().cloned().collect()),
            _ => Err(wrong_type(key)),
        })?;
        Ok(members.unwrap_or_default())
    }

    async fn rpush(&self, key: &str, values: &[String]) -> CacheResult<u64> {
        self.write(
            key,
            || Value::List(VecDeque::new()),
            |value| match value {
                Value::List(list) => {
                    list.extend(values.iter().cloned());
                    Ok(list.len() as u64)
                }
                _ => Err(wrong_type(key)),
            },
        )
    }

    async fn lpop(&self, key: &str) -> CacheResult<Option<String>> {
        self.pop(key, true)
    }

    async fn rpop(&self, key: &str) -> CacheResult<Option<String>> {
        self.pop(key, false)
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> CacheResult<Vec<String>> {
        let range = self.read(key, |value| match value {
            Value::List(list) => Ok(resolve_range(list.len(), start, stop)
                .map(|(from, to)| list.range(from..=to).cloned().collect())
                .unwrap_or_default()),
            _ => Err(wrong_type(key)),
        })?;
        Ok(range.unwrap_or_default())
    }

    async fn llen(&self, key: &str) -> CacheResult<u64> {
        let len = self.read(key, |value| match value {
            Value::List(list) => Ok(list.len() as u64),
            _ => Err(wrong_type(key)),
        })?;
        Ok(len.unwrap_or(0))
    }

    async fn zadd(&self, key: &str, members: &[(String, f64)]) -> CacheResult<u64> {
        if members.iter().any(|(_, score)| score.is_nan()) {
            return Err(invalid_float());
        }
        self.write(
            key,
            || Value::SortedSet(HashMap::new()),
            |value| match value {
                Value::SortedSet(zset) => Ok(members
                    .iter()
                    .filter(|(member, score)| zset.insert(member.clone(), *score).is_none())
                    .count() as u64),
                _ => Err(wrong_type(key)),
            },
        )
    }

    async fn zrange(&self, key: &str, start: isize, stop: isize) -> CacheResult<Vec<String>> {
        let range = self.read(key, |value| match value {
            Value::SortedSet(zset) => {
                let ordered = ordered_members(zset);
                Ok(resolve_range(ordered.len(), start, stop)
                    .map(|(from, to)| {
                        ordered[from..=to]
                            .iter()
                            .map(|(member, _)| (*member).clone())
                            .collect()
                    })
                    .unwrap_or_default())
            }
            _ => Err(wrong_type(key)),
        })?;
        Ok(range.unwrap_or_default())
    }

    async fn zrangebyscore(&self, key: &str, min: f64, max: f64) -> CacheResult<Vec<String>> {
        let range = self.read(key, |value| match value {
            Value::SortedSet(zset) => Ok(ordered_members(zset)
                .into_iter()
                .filter(|(_, score)| *score >= min && *score <= max)
                .map(|(member, _)| member.clone())
                .collect()),
            _ => Err(wrong_type(key)),
        })?;
        Ok(range.unwrap_or_default())
    }

    async fn zcard(&self, key: &str) -> CacheResult<u64> {
        let len = self.read(key, |value| match value {
            Value::SortedSet(zset) => Ok(zset.len() as u64),
            _ => Err(wrong_type(key)),
        })?;
        Ok(len.unwrap_or(0))
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> CacheResult<()> {
        self.write(
            key,
            || Value::Hash(HashMap::new()),
            |stored| match stored {
                Value::Hash(hash) => {
                    hash.insert(field.to_string(), value.to_string());
                    Ok(())
                }
                _ => Err(wrong_type(key)),
            },
        )
    }

    async fn hset_multiple(&self, key: &str, fields: &[(String, String)]) -> CacheResult<()> {
        self.write(
            key,
            || Value::Hash(HashMap::new()),
            |stored| match stored {
                Value::Hash(hash) => {
                    hash.extend(fields.iter().cloned());
                    Ok(())
                }
                _ => Err(wrong_type(key)),
            },
        )
    }

    async fn hget(&self, key: &str, field: &str) -> CacheResult<Option<String>> {
        let value = self.read(key, |stored| match stored {
            Value::Hash(hash) => Ok(hash.get(field).cloned()),
            _ => Err(wrong_type(key)),
        })?;
        Ok(value.flatten())
    }

    async fn hmget(&self, key: &str, fields: &[String]) -> CacheResult<Vec<Option<String>>> {
        let values = self.read(key, |stored| match stored {
            Value::Hash(hash) => Ok(fields.iter().map(|f| hash.get(f).cloned()).collect()),
            _ => Err(wrong_type(key)),
        })?;
        Ok(values.unwrap_or_else(|| vec![None; fields.len()]))
    }

    async fn hdel(&self, key: &str, fields: &[String]) -> CacheResult<u64> {
        self.modify(key, |stored| match stored {
            Value::Hash(hash) => Ok(fields.iter().filter(|f| hash.remove(*f).is_some()).count() as u64),
            _ => Err(wrong_type(key)),
        })
    }

    async fn ping(&self) -> CacheResult<()> {
        Ok(())
    }
}
