use std::collections::HashMap;

use proptest::prelude::*;
use weightcache::{CacheConfig, Error, WeightedCache};

#[derive(Debug, Clone)]
enum Op {
    Insert(u8, u64),
    Retrieve(u8),
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0u8..32, 0u64..40).prop_map(|(k, w)| Op::Insert(k, w)),
        3 => (0u8..32).prop_map(Op::Retrieve),
        1 => Just(Op::Clear),
    ]
}

proptest! {
    #[test]
    fn test_weight_matches_resident_entries(
        budget in -5i64..100,
        ops in prop::collection::vec(op(), 1..200),
    ) {
        let cache = WeightedCache::with_config(CacheConfig::new(budget));
        // weight each key was inserted with, valid while the key is resident
        let mut weights: HashMap<String, u64> = HashMap::new();

        for op in ops {
            match op {
                Op::Insert(k, w) => {
                    let key = k.to_string();
                    let resident = cache.contains_key(&key);
                    match cache.insert(key.clone(), w, w) {
                        Ok(()) => {
                            prop_assert!(!resident);
                            weights.insert(key, w);
                        }
                        Err(Error::AlreadyExists(_)) => prop_assert!(resident),
                        Err(e) => prop_assert!(false, "unexpected error: {}", e),
                    }

                    let total = cache.weight();
                    prop_assert!(
                        i128::from(total) <= i128::from(budget) || cache.len() == 1,
                        "weight {} over budget {} with {} entries", total, budget, cache.len()
                    );
                }
                Op::Retrieve(k) => {
                    let key = k.to_string();
                    let before = cache.keys();
                    let weight_before = cache.weight();
                    match cache.retrieve(&key) {
                        Some(value) => {
                            prop_assert_eq!(Some(&value), weights.get(&key));
                            let after = cache.keys();
                            prop_assert_eq!(after.first(), Some(&key));
                        }
                        None => prop_assert_eq!(cache.keys(), before),
                    }
                    prop_assert_eq!(cache.weight(), weight_before);
                }
                Op::Clear => {
                    cache.clear();
                    prop_assert_eq!(cache.weight(), 0);
                    prop_assert!(cache.is_empty());
                }
            }

            let keys = cache.keys();
            let sum: u64 = keys.iter().map(|k| weights[k]).sum();
            prop_assert_eq!(sum, cache.weight());
            prop_assert_eq!(keys.len(), cache.len());
        }
    }

    #[test]
    fn test_eviction_follows_recency(
        weights in prop::collection::vec(1u64..10, 2..30),
        touched in prop::collection::vec(any::<prop::sample::Index>(), 0..10),
    ) {
        let total: u64 = weights.iter().sum();
        let cache = WeightedCache::new(total as i64);

        for (i, w) in weights.iter().enumerate() {
            cache.insert(format!("k{}", i), (), *w).unwrap();
        }
        for idx in &touched {
            cache.retrieve(&format!("k{}", idx.index(weights.len())));
        }

        let order = cache.keys();
        let newcomer = total.saturating_sub(1).max(1);
        cache.insert("new", (), newcomer).unwrap();

        // survivors are exactly the most recent prefix of the old order
        let survivors: Vec<String> = cache.keys().into_iter().skip(1).collect();
        prop_assert_eq!(&survivors[..], &order[..survivors.len()]);
    }
}
