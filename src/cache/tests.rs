use std::sync::Arc;
use std::thread;

use super::exact::ExactCache;
use super::types::{EmbeddingCache, RerankCache, RerankKey};

#[test]
fn test_get_missing_returns_none() {
    let cache: ExactCache<String, u32> = ExactCache::with_capacity(4);

    assert_eq!(cache.get(&"absent".to_string()), None);
    assert_eq!(cache.stats().snapshot().misses, 1);
}

#[test]
fn test_set_then_get() {
    let cache: ExactCache<String, u32> = ExactCache::with_capacity(4);
    cache.set("a".to_string(), 1);

    assert_eq!(cache.get(&"a".to_string()), Some(1));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.stats().snapshot().hits, 1);
}

#[test]
fn test_set_overwrites_existing_key() {
    let cache: ExactCache<String, u32> = ExactCache::with_capacity(2);
    cache.set("a".to_string(), 1);
    cache.set("a".to_string(), 2);

    assert_eq!(cache.get(&"a".to_string()), Some(2));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.stats().snapshot().evictions, 0);
}

#[test]
fn test_never_exceeds_capacity() {
    let cache: ExactCache<u32, u32> = ExactCache::with_capacity(8);

    for i in 0..100 {
        cache.set(i, i * 10);
        assert!(cache.len() <= 8);
    }

    assert_eq!(cache.len(), 8);
    assert_eq!(cache.stats().snapshot().evictions, 92);
    for i in 92..100 {
        assert_eq!(cache.get(&i), Some(i * 10));
    }
}

#[test]
fn test_evicts_least_recently_inserted() {
    let cache: ExactCache<&'static str, u32> = ExactCache::with_capacity(3);
    cache.set("a", 1);
    cache.set("b", 2);
    cache.set("c", 3);
    cache.set("d", 4);

    assert!(!cache.contains(&"a"));
    assert!(cache.contains(&"b"));
    assert!(cache.contains(&"c"));
    assert!(cache.contains(&"d"));
}

#[test]
fn test_get_refreshes_recency() {
    let cache: ExactCache<&'static str, u32> = ExactCache::with_capacity(3);
    cache.set("a", 1);
    cache.set("b", 2);
    cache.set("c", 3);

    // "a" becomes most-recently-used, so "b" is now the eviction victim.
    assert_eq!(cache.get(&"a"), Some(1));
    cache.set("d", 4);

    assert!(cache.contains(&"a"));
    assert!(!cache.contains(&"b"));
    assert!(cache.contains(&"c"));
    assert!(cache.contains(&"d"));
}

#[test]
fn test_contains_does_not_refresh_recency() {
    let cache: ExactCache<&'static str, u32> = ExactCache::with_capacity(2);
    cache.set("a", 1);
    cache.set("b", 2);

    assert!(cache.contains(&"a"));
    cache.set("c", 3);

    assert!(!cache.contains(&"a"));
}

#[test]
fn test_zero_capacity_clamps_to_one() {
    let cache: ExactCache<u32, u32> = ExactCache::with_capacity(0);
    cache.set(1, 1);
    cache.set(2, 2);

    assert_eq!(cache.capacity(), 1);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get(&2), Some(2));
}

#[test]
fn test_clear() {
    let cache: ExactCache<u32, u32> = ExactCache::with_capacity(4);
    cache.set(1, 1);
    cache.set(2, 2);
    cache.clear();

    assert!(cache.is_empty());
    assert_eq!(cache.get(&1), None);
}

#[test]
fn test_hit_rate() {
    let cache: ExactCache<u32, u32> = ExactCache::with_capacity(4);
    assert_eq!(cache.stats().snapshot().hit_rate(), 0.0);

    cache.set(1, 1);
    let _ = cache.get(&1);
    let _ = cache.get(&2);

    assert_eq!(cache.stats().snapshot().hit_rate(), 0.5);
}

#[test]
fn test_rerank_key_distinguishes_query_and_document() {
    let cache = RerankCache::with_capacity(16);
    cache.set(RerankKey::new("refund", "doc a"), 0.9);
    cache.set(RerankKey::new("refund", "doc b"), 0.1);
    cache.set(RerankKey::new("baggage", "doc a"), 0.4);

    assert_eq!(cache.get(&RerankKey::new("refund", "doc a")), Some(0.9));
    assert_eq!(cache.get(&RerankKey::new("refund", "doc b")), Some(0.1));
    assert_eq!(cache.get(&RerankKey::new("baggage", "doc a")), Some(0.4));
    assert_eq!(cache.get(&RerankKey::new("baggage", "doc b")), None);
}

#[test]
fn test_embedding_cache_shares_vector() {
    let cache = EmbeddingCache::with_capacity(4);
    let vector: Arc<[f32]> = Arc::from(vec![0.6, 0.8]);
    cache.set("query: hello".to_string(), Arc::clone(&vector));

    let cached = cache.get(&"query: hello".to_string()).unwrap();
    assert!(Arc::ptr_eq(&cached, &vector));
}

#[test]
fn test_concurrent_access_keeps_values_bound_to_keys() {
    let cache: Arc<ExactCache<String, String>> = Arc::new(ExactCache::with_capacity(64));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..500 {
                    let key = format!("k{}", (t * 31 + i) % 200);
                    cache.set(key.clone(), format!("v-{key}"));
                    if let Some(value) = cache.get(&key) {
                        assert_eq!(value, format!("v-{key}"));
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(cache.len() <= 64);
}

#[test]
fn test_debug_reports_size_and_capacity() {
    let cache: ExactCache<String, u32> = ExactCache::with_capacity(3);
    cache.set("a".to_string(), 1);

    let rendered = format!("{cache:?}");

    assert!(rendered.contains("ExactCache"));
    assert!(rendered.contains("len: 1"));
    assert!(rendered.contains("capacity: 3"));
}
