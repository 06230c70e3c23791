//! Integration tests for CacheFacade over the in-memory store.

mod common;

use cachet_cache::{CacheError, CacheFacade, DEFAULT_SCORE, NO_EXPIRY};
use cachet_config::{AppConfig, StoreBackend};
use common::{failing_cache, memory_cache};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct Session {
    user: String,
    visits: u32,
}

fn session(user: &str, visits: u32) -> Session {
    Session {
        user: user.to_string(),
        visits,
    }
}

#[tokio::test]
async fn test_set_and_get_value() {
    let cache = memory_cache();

    cache.set_value("k1", "v1", NO_EXPIRY).await.unwrap();

    let value: Option<String> = cache.get_value("k1").await.unwrap();
    assert_eq!(value.as_deref(), Some("v1"));
    assert!(cache.contains_key("k1").await.unwrap());
}

#[tokio::test]
async fn test_get_missing_value_is_none() {
    let cache = memory_cache();

    let value: Option<String> = cache.get_value("missing").await.unwrap();
    assert!(value.is_none());
    assert!(!cache.contains_key("missing").await.unwrap());
}

#[tokio::test]
async fn test_structured_value_round_trip() {
    let cache = memory_cache();
    let stored = session("alice", 3);

    cache.set_value("session:alice", &stored, NO_EXPIRY).await.unwrap();

    let loaded: Option<Session> = cache.get_value("session:alice").await.unwrap();
    assert_eq!(loaded, Some(stored));
}

#[tokio::test]
async fn test_set_value_overwrites() {
    let cache = memory_cache();

    cache.set_value("k1", &1, NO_EXPIRY).await.unwrap();
    cache.set_value("k1", &2, NO_EXPIRY).await.unwrap();

    assert_eq!(cache.get_value::<i32>("k1").await.unwrap(), Some(2));
}

#[tokio::test(start_paused = true)]
async fn test_value_expires_after_ttl() {
    let cache = memory_cache();

    cache
        .set_value("k1", "v1", Some(Duration::from_secs(2)))
        .await
        .unwrap();
    tokio::time::advance(Duration::from_secs(1)).await;
    assert!(cache.contains_key("k1").await.unwrap());

    tokio::time::advance(Duration::from_secs(2)).await;
    assert!(!cache.contains_key("k1").await.unwrap());
    assert_eq!(cache.get_value::<String>("k1").await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn test_no_expiry_write_keeps_existing_ttl() {
    let cache = memory_cache();

    cache
        .add_to_set("s1", &1, Some(Duration::from_secs(5)))
        .await
        .unwrap();
    cache.add_to_set("s1", &2, NO_EXPIRY).await.unwrap();

    tokio::time::advance(Duration::from_secs(6)).await;
    assert!(!cache.contains_key("s1").await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_value_overwrite_keeps_existing_ttl() {
    let cache = memory_cache();

    cache
        .set_value("k1", "v1", Some(Duration::from_secs(5)))
        .await
        .unwrap();
    cache.set_value("k1", "v2", NO_EXPIRY).await.unwrap();
    cache.set_value("k1", "v3", Some(Duration::ZERO)).await.unwrap();
    assert_eq!(
        cache.get_value::<String>("k1").await.unwrap().as_deref(),
        Some("v3")
    );

    tokio::time::advance(Duration::from_secs(6)).await;
    assert!(!cache.contains_key("k1").await.unwrap());
}

#[tokio::test]
async fn test_remove_is_idempotent() {
    let cache = memory_cache();
    cache.set_value("k1", "v1", NO_EXPIRY).await.unwrap();

    cache.remove("k1").await.unwrap();
    cache.remove("k1").await.unwrap();

    assert!(!cache.contains_key("k1").await.unwrap());
}

#[tokio::test]
async fn test_remove_many() {
    let cache = memory_cache();
    cache.set_value("a", &1, NO_EXPIRY).await.unwrap();
    cache.set_value("b", &2, NO_EXPIRY).await.unwrap();
    cache.set_value("c", &3, NO_EXPIRY).await.unwrap();

    cache.remove_many(["a", "b", "missing"]).await.unwrap();

    assert!(!cache.contains_key("a").await.unwrap());
    assert!(!cache.contains_key("b").await.unwrap());
    assert!(cache.contains_key("c").await.unwrap());
}

#[tokio::test]
async fn test_set_membership_after_removal() {
    let cache = memory_cache();

    cache
        .add_all_to_set("s1", &HashSet::from([1, 2, 3]), NO_EXPIRY)
        .await
        .unwrap();

    let mut removals = HashMap::new();
    removals.insert("s1".to_string(), HashSet::from([2]));
    cache.remove_set_members(&removals).await.unwrap();

    let members: HashSet<i32> = cache.get_set("s1").await.unwrap();
    assert_eq!(members, HashSet::from([1, 3]));
}

#[tokio::test]
async fn test_set_ignores_duplicates() {
    let cache = memory_cache();

    cache.add_to_set("tags", "rust", NO_EXPIRY).await.unwrap();
    cache.add_to_set("tags", "rust", NO_EXPIRY).await.unwrap();
    cache.add_to_set("tags", "redis", NO_EXPIRY).await.unwrap();

    let tags: HashSet<String> = cache.get_set("tags").await.unwrap();
    assert_eq!(tags.len(), 2);
}

#[tokio::test]
async fn test_missing_set_is_empty() {
    let cache = memory_cache();

    let members: HashSet<i32> = cache.get_set("nothing").await.unwrap();
    assert!(members.is_empty());
}

#[tokio::test]
async fn test_empty_bulk_write_leaves_state_unchanged() {
    let cache = memory_cache();
    cache
        .add_all_to_set("s1", &HashSet::from([1]), NO_EXPIRY)
        .await
        .unwrap();

    let err = cache
        .add_all_to_set("s1", &HashSet::<i32>::new(), NO_EXPIRY)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "EMPTY_INPUT");

    let err = cache
        .push_all_to_list::<i32>("l1", &[], NO_EXPIRY)
        .await
        .unwrap_err();
    assert!(matches!(err, CacheError::EmptyInput { .. }));

    assert_eq!(cache.get_set::<i32>("s1").await.unwrap(), HashSet::from([1]));
    assert!(!cache.contains_key("l1").await.unwrap());
}

#[tokio::test]
async fn test_list_pop_left() {
    let cache = memory_cache();

    cache
        .push_all_to_list("l1", &["a", "b", "c"], NO_EXPIRY)
        .await
        .unwrap();
    cache.pop_list_left("l1").await.unwrap();

    let items: Vec<String> = cache.get_list("l1", 0, -1).await.unwrap();
    assert_eq!(items, vec!["b", "c"]);
    assert_eq!(cache.list_len("l1").await.unwrap(), 2);
}

#[tokio::test]
async fn test_list_pop_right_and_ranges() {
    let cache = memory_cache();

    for item in ["a", "b", "c", "d"] {
        cache.push_to_list("l1", item, NO_EXPIRY).await.unwrap();
    }
    cache.pop_list_right("l1").await.unwrap();

    let head: Vec<String> = cache.get_list("l1", 0, 1).await.unwrap();
    assert_eq!(head, vec!["a", "b"]);
    let tail: Vec<String> = cache.get_list("l1", -1, -1).await.unwrap();
    assert_eq!(tail, vec!["c"]);
    let past_end: Vec<String> = cache.get_list("l1", 10, 20).await.unwrap();
    assert!(past_end.is_empty());
}

#[tokio::test]
async fn test_pop_empty_list_succeeds() {
    let cache = memory_cache();

    cache.pop_list_left("nothing").await.unwrap();
    cache.pop_list_right("nothing").await.unwrap();
    assert_eq!(cache.list_len("nothing").await.unwrap(), 0);
}

#[tokio::test]
async fn test_sorted_set_rank_and_score() {
    let cache = memory_cache();

    cache.add_to_sorted_set("z", "low", 1.0).await.unwrap();
    cache.add_to_sorted_set("z", "mid", 5.0).await.unwrap();
    cache.add_to_sorted_set("z", "high", 10.0).await.unwrap();

    let bottom: HashSet<String> = cache.sorted_set_by_rank("z", 0, 1).await.unwrap();
    assert_eq!(bottom, HashSet::from(["low".to_string(), "mid".to_string()]));

    let scored: HashSet<String> = cache.sorted_set_by_score("z", 5.0, 10.0).await.unwrap();
    assert_eq!(scored, HashSet::from(["mid".to_string(), "high".to_string()]));

    assert_eq!(cache.sorted_set_len("z").await.unwrap(), 3);
}

#[tokio::test]
async fn test_sorted_set_bulk_uses_shared_score() {
    let cache = memory_cache();

    cache
        .add_all_to_sorted_set("z", &HashSet::from([1, 2, 3]), DEFAULT_SCORE)
        .await
        .unwrap();

    let at_default: HashSet<i32> = cache
        .sorted_set_by_score("z", DEFAULT_SCORE, DEFAULT_SCORE)
        .await
        .unwrap();
    assert_eq!(at_default, HashSet::from([1, 2, 3]));
}

#[tokio::test]
async fn test_sorted_set_score_update() {
    let cache = memory_cache();

    cache.add_to_sorted_set("z", "a", 1.0).await.unwrap();
    cache.add_to_sorted_set("z", "a", 7.0).await.unwrap();

    assert_eq!(cache.sorted_set_len("z").await.unwrap(), 1);
    let moved: HashSet<String> = cache.sorted_set_by_score("z", 6.0, 8.0).await.unwrap();
    assert!(moved.contains("a"));
}

#[tokio::test]
async fn test_hash_fields() {
    let cache = memory_cache();

    let fields = HashMap::from([
        ("alice".to_string(), session("alice", 1)),
        ("bob".to_string(), session("bob", 2)),
    ]);
    cache.put_hash("sessions", &fields, NO_EXPIRY).await.unwrap();
    cache
        .put_hash_field("sessions", "carol", &session("carol", 3))
        .await
        .unwrap();

    let values: Vec<Option<Session>> = cache
        .get_hash_fields("sessions", ["carol", "nobody", "alice"])
        .await
        .unwrap();
    assert_eq!(
        values,
        vec![Some(session("carol", 3)), None, Some(session("alice", 1))]
    );

    let bob: Option<Session> = cache.get_hash_field("sessions", "bob").await.unwrap();
    assert_eq!(bob, Some(session("bob", 2)));
}

#[tokio::test]
async fn test_hash_removal() {
    let cache = memory_cache();
    let fields = HashMap::from([("a".to_string(), 1), ("b".to_string(), 2)]);
    cache.put_hash("h", &fields, NO_EXPIRY).await.unwrap();

    cache.remove_hash_fields("h", ["a", "missing"]).await.unwrap();
    assert_eq!(cache.get_hash_field::<i32>("h", "a").await.unwrap(), None);
    assert_eq!(cache.get_hash_field::<i32>("h", "b").await.unwrap(), Some(2));

    cache.remove_hash("h").await.unwrap();
    assert!(!cache.contains_key("h").await.unwrap());
}

#[tokio::test]
async fn test_hash_fields_on_missing_key() {
    let cache = memory_cache();

    let values: Vec<Option<i32>> = cache.get_hash_fields("nothing", ["a", "b"]).await.unwrap();
    assert_eq!(values, vec![None, None]);
}

#[tokio::test]
async fn test_wrong_type_is_reported() {
    let cache = memory_cache();
    cache.set_value("k1", "v1", NO_EXPIRY).await.unwrap();

    let err = cache.add_to_set("k1", &1, NO_EXPIRY).await.unwrap_err();
    assert!(matches!(err, CacheError::WrongType(_)));
    assert!(!err.is_connectivity());
}

#[tokio::test]
async fn test_undecodable_value_is_serialization_error() {
    let cache = memory_cache();
    cache.set_value("k1", "not a number", NO_EXPIRY).await.unwrap();

    let err = cache.get_value::<u64>("k1").await.unwrap_err();
    assert_eq!(err.kind(), "SERIALIZATION_ERROR");
}

#[tokio::test]
async fn test_failing_store_reports_connectivity() {
    let cache = failing_cache();

    let err = cache.set_value("k1", "v1", NO_EXPIRY).await.unwrap_err();
    assert!(err.is_connectivity());
    assert!(cache.get_value::<String>("k1").await.is_err());
    assert!(cache.ping().await.is_err());
}

#[tokio::test]
async fn test_lenient_view_on_failing_store() {
    let cache = failing_cache();
    let lenient = cache.lenient();

    assert!(!lenient.ping().await);
    assert!(!lenient.set_value("k1", "v1", NO_EXPIRY).await);
    assert_eq!(lenient.get_value::<String>("k1").await, None);
    assert!(!lenient.contains_key("k1").await);
    assert!(!lenient.remove("k1").await);
    assert!(!lenient.add_to_set("s1", &1, NO_EXPIRY).await);
    assert_eq!(lenient.get_set::<i32>("s1").await, None);
    assert!(!lenient.push_to_list("l1", "a", NO_EXPIRY).await);
    assert_eq!(lenient.list_len("l1").await, 0);
    assert!(!lenient.pop_list_left("l1").await);
    assert!(!lenient.add_to_sorted_set("z", "a", DEFAULT_SCORE).await);
    assert_eq!(lenient.sorted_set_len("z").await, 0);
    assert!(!lenient.put_hash_field("h", "a", &1).await);
    assert_eq!(lenient.get_hash_field::<i32>("h", "a").await, None);
}

#[tokio::test]
async fn test_lenient_collections_on_failing_store() {
    let cache = failing_cache();
    let lenient = cache.lenient();

    let removals = HashMap::from([("s1".to_string(), HashSet::from([1]))]);
    let fields = HashMap::from([("a".to_string(), 1)]);

    assert!(!lenient.remove_many(["a", "b"]).await);
    assert!(!lenient.add_all_to_set("s1", &HashSet::from([1]), NO_EXPIRY).await);
    assert!(!lenient.remove_set_members(&removals).await);
    assert!(!lenient.push_all_to_list("l1", &["a"], NO_EXPIRY).await);
    assert_eq!(lenient.get_list::<String>("l1", 0, -1).await, None);
    assert!(!lenient.pop_list_right("l1").await);
    assert!(
        !lenient
            .add_all_to_sorted_set("z", &HashSet::from(["a"]), DEFAULT_SCORE)
            .await
    );
    assert_eq!(lenient.sorted_set_by_rank::<String>("z", 0, -1).await, None);
    assert_eq!(
        lenient.sorted_set_by_score::<String>("z", 0.0, 10.0).await,
        None
    );
    assert!(!lenient.put_hash("h", &fields, NO_EXPIRY).await);
    assert_eq!(lenient.get_hash_fields::<i32, _, _>("h", ["a"]).await, None);
    assert!(!lenient.remove_hash_fields("h", ["a"]).await);
    assert!(!lenient.remove_hash("h").await);
}

#[tokio::test]
async fn test_lenient_view_on_memory_store() {
    let cache = memory_cache();
    let lenient = cache.lenient();

    assert!(lenient.ping().await);
    assert!(lenient.set_value("k1", "v1", NO_EXPIRY).await);
    assert_eq!(lenient.get_value::<String>("k1").await.as_deref(), Some("v1"));
    assert!(lenient.contains_key("k1").await);
    assert!(lenient.push_all_to_list("l1", &[1, 2], NO_EXPIRY).await);
    assert_eq!(lenient.list_len("l1").await, 2);
    assert!(!lenient.add_all_to_set("s1", &HashSet::<i32>::new(), NO_EXPIRY).await);
}

#[tokio::test]
async fn test_connect_memory_backend() {
    let mut config = AppConfig::default();
    config.cache.backend = StoreBackend::Memory;

    let cache = CacheFacade::connect(&config).await.unwrap();
    cache.ping().await.unwrap();
    cache.set_value("k1", &42, NO_EXPIRY).await.unwrap();
    assert_eq!(cache.get_value::<i32>("k1").await.unwrap(), Some(42));
}

#[tokio::test]
async fn test_clones_share_store() {
    let cache = memory_cache();
    let other = cache.clone();

    let writer = tokio::spawn(async move {
        other.set_value("shared", "yes", NO_EXPIRY).await.unwrap();
    });
    writer.await.unwrap();

    assert_eq!(
        cache.get_value::<String>("shared").await.unwrap().as_deref(),
        Some("yes")
    );
}
