//! Error-swallowing view over [`CacheFacade`].
//!
//! Writes report `true`/`false`, reads report a value or nothing, counts
//! fall back to zero. Failures are still logged and counted by the facade
//! underneath, so nothing goes unrecorded. A `false` or `None` here does
//! not say whether the store failed or the data was missing; use the
//! facade directly when that matters.

use crate::facade::CacheFacade;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::time::Duration;

/// Borrowed lenient view, created by [`CacheFacade::lenient`].
#[derive(Debug, Clone, Copy)]
pub struct LenientCache<'a> {
    facade: &'a CacheFacade,
}

impl<'a> LenientCache<'a> {
    pub(crate) fn new(facade: &'a CacheFacade) -> Self {
        Self { facade }
    }

    /// Whether the store answers.
    pub async fn ping(&self) -> bool {
        self.facade.ping().await.is_ok()
    }

    /// Store `value` at `key`; `false` on failure.
    pub async fn set_value<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> bool {
        self.facade.set_value(key, value, ttl).await.is_ok()
    }

    /// Value at `key`; `None` on a miss or failure.
    pub async fn get_value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.facade.get_value(key).await.ok().flatten()
    }

    /// `false` both for a missing key and for a failed lookup.
    pub async fn contains_key(&self, key: &str) -> bool {
        self.facade.contains_key(key).await.unwrap_or(false)
    }

    /// Delete `key`; `false` on failure.
    pub async fn remove(&self, key: &str) -> bool {
        self.facade.remove(key).await.is_ok()
    }

    /// Delete several keys; `false` on failure.
    pub async fn remove_many<I, S>(&self, keys: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.facade.remove_many(keys).await.is_ok()
    }

    /// Add one set member; `false` on failure.
    pub async fn add_to_set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> bool {
        self.facade.add_to_set(key, value, ttl).await.is_ok()
    }

    /// Add set members; `false` on failure or empty input.
    pub async fn add_all_to_set<T: Serialize>(
        &self,
        key: &str,
        values: &HashSet<T>,
        ttl: Option<Duration>,
    ) -> bool {
        self.facade.add_all_to_set(key, values, ttl).await.is_ok()
    }

    /// Remove members from several sets; `false` if any key failed.
    pub async fn remove_set_members<T: Serialize>(
        &self,
        removals: &HashMap<String, HashSet<T>>,
    ) -> bool {
        self.facade.remove_set_members(removals).await.is_ok()
    }

    /// All set members; `None` on failure.
    pub async fn get_set<T: DeserializeOwned + Eq + Hash>(&self, key: &str) -> Option<HashSet<T>> {
        self.facade.get_set(key).await.ok()
    }

    /// Append one list element; `false` on failure.
    pub async fn push_to_list<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> bool {
        self.facade.push_to_list(key, value, ttl).await.is_ok()
    }

    /// Append list elements; `false` on failure or empty input.
    pub async fn push_all_to_list<T: Serialize>(
        &self,
        key: &str,
        values: &[T],
        ttl: Option<Duration>,
    ) -> bool {
        self.facade.push_all_to_list(key, values, ttl).await.is_ok()
    }

    /// List elements in `start..=end`; `None` on failure.
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        key: &str,
        start: isize,
        end: isize,
    ) -> Option<Vec<T>> {
        self.facade.get_list(key, start, end).await.ok()
    }

    /// Zero on failure.
    pub async fn list_len(&self, key: &str) -> u64 {
        self.facade.list_len(key).await.unwrap_or(0)
    }

    /// Drop the list head; `false` on failure.
    pub async fn pop_list_left(&self, key: &str) -> bool {
        self.facade.pop_list_left(key).await.is_ok()
    }

    /// Drop the list tail; `false` on failure.
    pub async fn pop_list_right(&self, key: &str) -> bool {
        self.facade.pop_list_right(key).await.is_ok()
    }

    /// Add one sorted-set member; `false` on failure.
    pub async fn add_to_sorted_set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        score: f64,
    ) -> bool {
        self.facade.add_to_sorted_set(key, value, score).await.is_ok()
    }

    /// Add sorted-set members with one score; `false` on failure or empty input.
    pub async fn add_all_to_sorted_set<T: Serialize>(
        &self,
        key: &str,
        values: &HashSet<T>,
        score: f64,
    ) -> bool {
        self.facade
            .add_all_to_sorted_set(key, values, score)
            .await
            .is_ok()
    }

    /// Members ranked `start..=end`; `None` on failure.
    pub async fn sorted_set_by_rank<T: DeserializeOwned + Eq + Hash>(
        &self,
        key: &str,
        start: isize,
        end: isize,
    ) -> Option<HashSet<T>> {
        self.facade.sorted_set_by_rank(key, start, end).await.ok()
    }

    /// Members scored in `min..=max`; `None` on failure.
    pub async fn sorted_set_by_score<T: DeserializeOwned + Eq + Hash>(
        &self,
        key: &str,
        min: f64,
        max: f64,
    ) -> Option<HashSet<T>> {
        self.facade.sorted_set_by_score(key, min, max).await.ok()
    }

    /// Zero on failure.
    pub async fn sorted_set_len(&self, key: &str) -> u64 {
        self.facade.sorted_set_len(key).await.unwrap_or(0)
    }

    /// Write hash fields; `false` on failure or empty input.
    pub async fn put_hash<T: Serialize>(
        &self,
        key: &str,
        fields: &HashMap<String, T>,
        ttl: Option<Duration>,
    ) -> bool {
        self.facade.put_hash(key, fields, ttl).await.is_ok()
    }

    /// Write one hash field; `false` on failure.
    pub async fn put_hash_field<T: Serialize + ?Sized>(
        &self,
        key: &str,
        field: &str,
        value: &T,
    ) -> bool {
        self.facade.put_hash_field(key, field, value).await.is_ok()
    }

    /// Field values in request order; `None` on failure.
    pub async fn get_hash_fields<T, I, S>(&self, key: &str, fields: I) -> Option<Vec<Option<T>>>
    where
        T: DeserializeOwned,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.facade.get_hash_fields(key, fields).await.ok()
    }

    /// One hash field; `None` on a miss or failure.
    pub async fn get_hash_field<T: DeserializeOwned>(&self, key: &str, field: &str) -> Option<T> {
        self.facade.get_hash_field(key, field).await.ok().flatten()
    }

    /// Delete hash fields; `false` on failure.
    pub async fn remove_hash_fields<I, S>(&self, key: &str, fields: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.facade.remove_hash_fields(key, fields).await.is_ok()
    }

    /// Delete the whole hash; `false` on failure.
    pub async fn remove_hash(&self, key: &str) -> bool {
        self.facade.remove_hash(key).await.is_ok()
    }
}
