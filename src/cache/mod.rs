//! Local cache for threat-intel lookups
//!
//! Results are kept in daily buckets inside a generic key-value store, so a
//! repeated lookup within the retention window never reaches a rate-limited
//! upstream API. SQLite backs the CLI; an in-memory store is available for
//! embedding and tests.

pub mod clock;
pub mod key;
pub mod manager;
pub mod storage;
pub mod store;

// Re-export main types
pub use clock::{Clock, SystemClock};
pub use manager::{
    CacheEntry, CacheManager, CacheSettings, CacheStatistics, DEFAULT_RETENTION_DAYS, DailyBucket,
    MAX_RETENTION_DAYS,
};
pub use storage::SqliteStore;
pub use store::{KeyValueStore, MemoryStore, StoreResult};
