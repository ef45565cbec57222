//! # weightcache
//!
//! In-memory cache bounded by total entry weight, with LRU eviction.
//!
//! ## Architecture
//! - **HashMap**: AHash index from key to arena slot (O(1))
//! - **LRU List**: Slot-indexed doubly-linked list for promotion and eviction (O(1))
//! - **Locking**: One `parking_lot::Mutex` around the whole store
//! - **Notices**: Optional [`NoticeSink`] told about each eviction in verbose mode
//!
//! ```
//! use weightcache::WeightedCache;
//!
//! let cache = WeightedCache::new(10);
//! cache.insert("a", "alpha", 4).unwrap();
//! cache.insert("b", "beta", 4).unwrap();
//! cache.insert("c", "gamma", 4).unwrap(); // evicts "a"
//!
//! assert_eq!(cache.retrieve("a"), None);
//! assert_eq!(cache.retrieve("b"), Some("beta"));
//! assert_eq!(cache.weight(), 8);
//! ```

#![warn(missing_docs)]

mod cache;
mod config;
mod error;
mod lru;
mod sink;
mod stats;

pub use cache::{eviction_notice, WeightedCache};
pub use config::{CacheConfig, DEFAULT_BUDGET};
pub use error::{Error, Result};
pub use lru::{Evicted, WeightedLru};
pub use sink::{FnSink, LogSink, NoticeSink, WriteSink};
pub use stats::CacheStats;
