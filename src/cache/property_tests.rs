//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache and key invariants against simple models.

use proptest::prelude::*;
use std::collections::{HashMap, VecDeque};

use crate::cache::{CacheStats, ConversionCache, Normalize};
use crate::engine::{Direction, ForwardOptions};

// == Test Configuration ==
const TEST_CAPACITY: usize = 100;

// == Strategies ==
/// Formula-like text drawn from a small alphabet so collisions are common
fn formula_strategy() -> impl Strategy<Value = String> {
    r"[a-c\\{}^_ ]{0,6}".prop_map(|s| s)
}

fn output_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,32}".prop_map(|s| s)
}

fn flag_strategy() -> impl Strategy<Value = Option<bool>> {
    prop::option::of(any::<bool>())
}

fn macros_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("[a-z]{1,4}", "[a-z]{0,4}"), 0..6)
}

fn forward_options_strategy() -> impl Strategy<Value = ForwardOptions> {
    (
        flag_strategy(),
        flag_strategy(),
        flag_strategy(),
        flag_strategy(),
        flag_strategy(),
        flag_strategy(),
    )
        .prop_map(|(a, b, c, d, e, f)| ForwardOptions {
            non_strict: a,
            prefer_shorthands: b,
            keep_spaces: c,
            frac_to_slash: d,
            infty_to_oo: e,
            optimize: f,
            custom_macros: None,
        })
}

/// A sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Store { text: String, key: u8, output: String },
    Lookup { text: String, key: u8 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (formula_strategy(), 0u8..3, output_strategy())
            .prop_map(|(text, key, output)| CacheOp::Store { text, key, output }),
        (formula_strategy(), 0u8..3).prop_map(|(text, key)| CacheOp::Lookup { text, key }),
    ]
}

fn new_cache(capacity: usize) -> ConversionCache<u8> {
    ConversionCache::new(Direction::Forward, capacity)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // **Property 1: Statistics Accuracy**
    // *For any* sequence of cache operations, hits and misses SHALL equal the
    // number of lookups that found and did not find an entry.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let mut cache = new_cache(TEST_CAPACITY);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Store { text, key, output } => cache.store(&text, key, output),
                CacheOp::Lookup { text, key } => match cache.lookup(&text, &key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
            }
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.size, cache.len(), "Size mismatch");
        prop_assert_eq!(stats.capacity, TEST_CAPACITY);
    }

    // **Property 2: Last Write Wins**
    // *For any* (text, key), storing V1 then V2 SHALL make lookup return V2,
    // with exactly one entry for that pair.
    #[test]
    fn prop_last_write_wins(
        text in formula_strategy(),
        first in output_strategy(),
        second in output_strategy()
    ) {
        let mut cache = new_cache(TEST_CAPACITY);

        cache.store(&text, 0, first);
        cache.store(&text, 0, second.clone());

        prop_assert_eq!(cache.lookup(&text, &0), Some(second));
        prop_assert_eq!(cache.len(), 1, "Overwrite should not add an entry");
    }

    // **Property 3: Capacity Enforcement**
    // *For any* sequence of stores, the number of entries SHALL never exceed
    // the capacity.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((formula_strategy(), 0u8..3, output_strategy()), 1..200),
        capacity in 1usize..20
    ) {
        let mut cache = new_cache(capacity);

        for (text, key, output) in entries {
            cache.store(&text, key, output);
            prop_assert!(
                cache.len() <= capacity,
                "Cache size {} exceeds capacity {}",
                cache.len(),
                capacity
            );
        }
    }

    // **Property 4: LRU Order Matches Model**
    // *For any* sequence of operations, the set of cached keys SHALL be the
    // set a reference LRU (most recent at the front) would hold, and the
    // eviction counter SHALL count every key it dropped.
    #[test]
    fn prop_lru_matches_model(
        ops in prop::collection::vec(cache_op_strategy(), 1..120),
        capacity in 1usize..8
    ) {
        let mut cache = new_cache(capacity);
        let mut model: VecDeque<(String, u8)> = VecDeque::new();
        let mut evictions: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Store { text, key, output } => {
                    cache.store(&text, key, output);
                    let entry = (text, key);
                    model.retain(|e| e != &entry);
                    model.push_front(entry);
                    if model.len() > capacity {
                        model.pop_back();
                        evictions += 1;
                    }
                }
                CacheOp::Lookup { text, key } => {
                    let found = cache.lookup(&text, &key).is_some();
                    let entry = (text, key);
                    let position = model.iter().position(|e| e == &entry);
                    prop_assert_eq!(found, position.is_some(), "Presence diverged for {:?}", entry);
                    if let Some(position) = position {
                        if let Some(entry) = model.remove(position) {
                            model.push_front(entry);
                        }
                    }
                }
            }
        }

        prop_assert_eq!(cache.len(), model.len());
        prop_assert_eq!(cache.stats().evictions, evictions);
    }

    // **Property 5: Lookup Protects From Eviction**
    // *For any* full cache, looking up the oldest entry SHALL make the second
    // oldest the next one evicted.
    #[test]
    fn prop_lookup_protects_from_eviction(
        texts in prop::collection::hash_set("[a-z]{1,8}", 3..8),
        new_text in "[0-9]{1,8}"
    ) {
        let texts: Vec<String> = texts.into_iter().collect();
        let capacity = texts.len();
        let mut cache = new_cache(capacity);

        for text in &texts {
            cache.store(text, 0, format!("out_{}", text));
        }

        prop_assert!(cache.lookup(&texts[0], &0).is_some());
        cache.store(&new_text, 0, "new".to_string());

        prop_assert!(cache.lookup(&texts[0], &0).is_some(), "Touched entry was evicted");
        prop_assert!(cache.lookup(&texts[1], &0).is_none(), "Second oldest should be evicted");
        prop_assert!(cache.lookup(&new_text, &0).is_some());
    }

    // **Property 6: Clear Resets Everything But Capacity**
    #[test]
    fn prop_clear_resets(
        ops in prop::collection::vec(cache_op_strategy(), 0..60),
        capacity in 1usize..20
    ) {
        let mut cache = new_cache(capacity);
        for op in ops {
            match op {
                CacheOp::Store { text, key, output } => cache.store(&text, key, output),
                CacheOp::Lookup { text, key } => {
                    cache.lookup(&text, &key);
                }
            }
        }

        cache.clear();

        prop_assert_eq!(cache.stats(), CacheStats::new(capacity));
        prop_assert!(cache.is_empty());
    }
}

// Property tests for option key normalization
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // **Property 7: Key Order Independence**
    // *For any* macro mapping, building it in forward or reverse insertion
    // order SHALL produce the same key, and hit the same cache entry.
    #[test]
    fn prop_key_order_independence(
        base in forward_options_strategy(),
        pairs in macros_strategy(),
        text in formula_strategy()
    ) {
        let forward: HashMap<String, String> = pairs.into_iter().collect();
        let mut entries: Vec<(String, String)> = forward
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort();
        let mut reverse = HashMap::new();
        for (k, v) in entries.into_iter().rev() {
            reverse.insert(k, v);
        }

        let a = base.clone().custom_macros(forward);
        let b = base.custom_macros(reverse);
        prop_assert_eq!(a.normalize(), b.normalize());

        let mut cache = ConversionCache::new(Direction::Forward, TEST_CAPACITY);
        cache.store(&text, a.normalize(), "out".to_string());
        prop_assert_eq!(cache.lookup(&text, &b.normalize()), Some("out".to_string()));
    }

    // **Property 8: Distinct Options, Distinct Keys**
    // *For any* two option sets, their keys SHALL be equal exactly when the
    // option sets are equal.
    #[test]
    fn prop_key_equality_matches_options(
        a in forward_options_strategy(),
        b in forward_options_strategy(),
        with_macros in any::<bool>()
    ) {
        let (a, b) = if with_macros {
            (a.custom_macros(HashMap::new()), b)
        } else {
            (a, b)
        };
        prop_assert_eq!(a == b, a.normalize() == b.normalize());
    }
}

// == Property Test for Error Response Format ==
// This tests the ConvertError -> HTTP response conversion

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // **Property 9: Error Response Format**
    // *For any* error, the HTTP response SHALL be JSON with a string "error"
    // field carrying the error's message and a "kind" tag.
    #[test]
    fn prop_error_response_format(message in "[a-zA-Z0-9 _-]{1,100}") {
        use crate::error::ConvertError;
        use axum::body::to_bytes;
        use axum::response::IntoResponse;

        let variants = vec![
            ConvertError::type_mismatch(message.clone()),
            ConvertError::conversion(message.clone()),
            ConvertError::InvalidRequest(message.clone()),
            ConvertError::Internal(message.clone()),
        ];

        let rt = tokio::runtime::Runtime::new().unwrap();
        for error in variants {
            let expected = error.to_string();
            let kind = error.kind();
            let response = error.into_response();

            let content_type = response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok());
            prop_assert!(
                content_type.map(|ct| ct.contains("application/json")).unwrap_or(false),
                "Response should have JSON content-type"
            );

            let bytes = rt.block_on(async {
                to_bytes(response.into_body(), usize::MAX).await.unwrap()
            });
            let json: serde_json::Value = serde_json::from_slice(&bytes)
                .expect("Response body should be valid JSON");

            prop_assert_eq!(json["error"].as_str(), Some(expected.as_str()));
            prop_assert_eq!(json["kind"].as_str(), Some(kind));
        }
    }
}

// == Property Test for Concurrent Operation Correctness ==
// Shared access through parking_lot::Mutex, as the dispatch layer uses it

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    // **Property 10: Concurrent Operation Correctness**
    // *For any* set of operations spread over threads, every hit SHALL return
    // a complete stored value, counters SHALL add up to the lookups made, and
    // the capacity SHALL hold.
    #[test]
    fn prop_concurrent_operation_correctness(
        ops in prop::collection::vec(cache_op_strategy(), 10..80),
        capacity in 1usize..10
    ) {
        use parking_lot::Mutex;
        use std::sync::Arc;

        let cache = Arc::new(Mutex::new(new_cache(capacity)));
        let lookups = ops
            .iter()
            .filter(|op| matches!(op, CacheOp::Lookup { .. }))
            .count() as u64;
        let stored: Vec<String> = ops
            .iter()
            .filter_map(|op| match op {
                CacheOp::Store { output, .. } => Some(output.clone()),
                CacheOp::Lookup { .. } => None,
            })
            .collect();

        let chunks: Vec<Vec<CacheOp>> = ops.chunks(8).map(<[CacheOp]>::to_vec).collect();
        let handles: Vec<_> = chunks
            .into_iter()
            .map(|chunk| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    let mut seen = Vec::new();
                    for op in chunk {
                        match op {
                            CacheOp::Store { text, key, output } => {
                                cache.lock().store(&text, key, output)
                            }
                            CacheOp::Lookup { text, key } => {
                                if let Some(value) = cache.lock().lookup(&text, &key) {
                                    seen.push(value);
                                }
                            }
                        }
                    }
                    seen
                })
            })
            .collect();

        for handle in handles {
            let seen = handle.join().expect("Worker should not panic");
            for value in seen {
                prop_assert!(stored.contains(&value), "Read a value never stored: {:?}", value);
            }
        }

        let stats = cache.lock().stats();
        prop_assert_eq!(stats.hits + stats.misses, lookups);
        prop_assert!(stats.size <= capacity);
        let hit_rate = stats.hit_rate();
        prop_assert!((0.0..=1.0).contains(&hit_rate), "Hit rate out of range: {}", hit_rate);
    }
}
