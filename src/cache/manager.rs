//! Day-bucketed result cache
//!
//! Results are grouped into one bucket per UTC day. Reads search the buckets
//! inside the retention window, newest first; cleanup deletes buckets that
//! have fallen out of it. The cache is advisory: apart from saving settings,
//! every failure is logged and treated as a miss or a no-op.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use super::clock::{Clock, SystemClock};
use super::key;
use super::store::{KeyValueStore, StoreResult};
use crate::detect::IndicatorType;
use crate::error::{CacheError, StoreError};
use crate::models::AnalysisResult;

/// Default number of days a result stays readable
pub const DEFAULT_RETENTION_DAYS: u32 = 5;

/// Longest accepted retention. Reads scan one bucket key per day, so the
/// window must stay small.
pub const MAX_RETENTION_DAYS: u32 = 365;

/// Persisted cache settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSettings {
    pub retention_days: u32,
    pub enabled: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            retention_days: DEFAULT_RETENTION_DAYS,
            enabled: true,
        }
    }
}

/// One cached result inside a daily bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub indicator_value: String,
    pub indicator_type: IndicatorType,
    pub provider: String,
    pub result: AnalysisResult,
    pub cached_at: DateTime<Utc>,
}

/// Composite key -> entry, last write wins
pub type DailyBucket = BTreeMap<String, CacheEntry>;

/// Snapshot of what the cache holds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStatistics {
    pub total_entries: usize,
    /// Approximate serialized size in bytes
    pub total_size: usize,
    pub bucket_count: usize,
    /// Oldest bucket date present (YYYYMMDD)
    pub oldest_date: Option<String>,
    /// Newest bucket date present (YYYYMMDD)
    pub newest_date: Option<String>,
}

/// Cache of provider results over a key-value store
pub struct CacheManager<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: KeyValueStore> CacheManager<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> CacheManager<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current settings, or the defaults if none are stored or the store
    /// cannot be read.
    pub async fn get_settings(&self) -> CacheSettings {
        let keys = [key::SETTINGS_KEY.to_string()];
        let stored = match self.store.get(&keys).await {
            Ok(mut found) => found.remove(key::SETTINGS_KEY),
            Err(e) => {
                warn!("Failed to read cache settings, using defaults: {}", e);
                None
            }
        };

        let Some(value) = stored else {
            return CacheSettings::default();
        };

        match serde_json::from_value::<CacheSettings>(value) {
            Ok(mut settings) => {
                settings.retention_days = settings.retention_days.clamp(1, MAX_RETENTION_DAYS);
                settings
            }
            Err(e) => {
                warn!("Stored cache settings are invalid, using defaults: {}", e);
                CacheSettings::default()
            }
        }
    }

    /// Persist settings, then drop buckets outside the new retention window.
    ///
    /// Fails if the settings cannot be written. Cleanup problems are only
    /// logged.
    pub async fn save_settings(&self, settings: &CacheSettings) -> Result<(), CacheError> {
        if !(1..=MAX_RETENTION_DAYS).contains(&settings.retention_days) {
            return Err(CacheError::InvalidRetention(settings.retention_days));
        }

        let value = serde_json::to_value(settings)
            .map_err(|e| CacheError::SaveSettings(StoreError::from(e)))?;
        self.store
            .set(HashMap::from([(key::SETTINGS_KEY.to_string(), value)]))
            .await
            .map_err(CacheError::SaveSettings)?;

        debug!(
            "Saved cache settings: retention {} days, enabled {}",
            settings.retention_days, settings.enabled
        );
        self.clean_old_cache().await;
        Ok(())
    }

    /// Record a result in today's bucket. No-op when the cache is disabled.
    pub async fn store_result(&self, result: &AnalysisResult) {
        if !self.get_settings().await.enabled {
            debug!("Cache disabled, not storing {} result", result.provider);
            return;
        }

        let now = self.clock.now();
        let bucket_key = key::bucket_key_at(now);
        let entry_key = key::indicator_key(
            &result.provider,
            result.indicator_type,
            &result.indicator_value,
        );
        let entry = CacheEntry {
            indicator_value: result.indicator_value.clone(),
            indicator_type: result.indicator_type,
            provider: result.provider.clone(),
            result: result.clone(),
            cached_at: now,
        };

        match self.upsert(&bucket_key, entry_key, entry).await {
            Ok(()) => debug!("Cached {} in {}", result.indicator_value, bucket_key),
            Err(e) => warn!("Failed to cache {} result: {}", result.provider, e),
        }
    }

    async fn upsert(
        &self,
        bucket_key: &str,
        entry_key: String,
        entry: CacheEntry,
    ) -> StoreResult<()> {
        let keys = [bucket_key.to_string()];
        let mut bucket: DailyBucket = match self.store.get(&keys).await?.remove(bucket_key) {
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!("Discarding unreadable bucket {}: {}", bucket_key, e);
                DailyBucket::new()
            }),
            None => DailyBucket::new(),
        };

        bucket.insert(entry_key, entry);

        let value = serde_json::to_value(&bucket)?;
        self.store
            .set(HashMap::from([(bucket_key.to_string(), value)]))
            .await
    }

    /// Most recent cached result for (provider, type, value) within the
    /// retention window, or `None`.
    pub async fn get_result(
        &self,
        provider: &str,
        indicator_type: IndicatorType,
        value: &str,
    ) -> Option<AnalysisResult> {
        let settings = self.get_settings().await;
        if !settings.enabled {
            return None;
        }

        let entry_key = key::indicator_key(provider, indicator_type, value);
        let window = key::window_keys(self.clock.now(), settings.retention_days);

        let buckets = match self.store.get(&window).await {
            Ok(buckets) => buckets,
            Err(e) => {
                warn!("Cache read failed, treating as miss: {}", e);
                return None;
            }
        };

        // window is newest first, so the freshest entry wins
        for bucket_key in &window {
            let Some(entry) = buckets.get(bucket_key).and_then(|b| b.get(&entry_key)) else {
                continue;
            };
            match serde_json::from_value::<CacheEntry>(entry.clone()) {
                Ok(entry) => {
                    debug!("Cache hit: {} in {}", entry_key, bucket_key);
                    return Some(entry.result);
                }
                Err(e) => warn!("Skipping unreadable cache entry {}: {}", entry_key, e),
            }
        }

        debug!("Cache miss: {}", entry_key);
        None
    }

    /// Delete buckets dated before now - retention_days. Returns how many
    /// buckets were removed; errors are logged and count as zero.
    pub async fn clean_old_cache(&self) -> usize {
        let settings = self.get_settings().await;
        let cutoff = key::cutoff_key(self.clock.now(), settings.retention_days);

        let result = async {
            let stale: Vec<String> = self
                .store
                .list_all_keys()
                .await?
                .into_iter()
                .filter(|k| key::is_bucket_key(k) && k.as_str() < cutoff.as_str())
                .collect();

            if !stale.is_empty() {
                self.store.remove(&stale).await?;
            }
            Ok::<_, StoreError>(stale.len())
        }
        .await;

        match result {
            Ok(removed) => {
                if removed > 0 {
                    debug!("Removed {} stale cache buckets (before {})", removed, cutoff);
                }
                removed
            }
            Err(e) => {
                warn!("Cache cleanup failed: {}", e);
                0
            }
        }
    }

    /// Entry count, size and date range across all buckets
    pub async fn get_statistics(&self) -> CacheStatistics {
        match self.collect_statistics().await {
            Ok(stats) => stats,
            Err(e) => {
                warn!("Failed to read cache statistics: {}", e);
                CacheStatistics::default()
            }
        }
    }

    async fn collect_statistics(&self) -> StoreResult<CacheStatistics> {
        let bucket_keys = self.bucket_keys().await?;
        if bucket_keys.is_empty() {
            return Ok(CacheStatistics::default());
        }

        let buckets = self.store.get(&bucket_keys).await?;
        let mut stats = CacheStatistics::default();

        for (bucket_key, bucket) in &buckets {
            stats.bucket_count += 1;
            stats.total_entries += bucket.as_object().map(|m| m.len()).unwrap_or(0);
            stats.total_size += bucket_key.len() + approximate_size(bucket);

            if let Some(date) = key::bucket_date_of(bucket_key) {
                if stats.oldest_date.as_deref().is_none_or(|d| date < d) {
                    stats.oldest_date = Some(date.to_string());
                }
                if stats.newest_date.as_deref().is_none_or(|d| date > d) {
                    stats.newest_date = Some(date.to_string());
                }
            }
        }

        Ok(stats)
    }

    /// Remove every bucket regardless of age. Returns the number removed.
    ///
    /// Storage failures are returned, not swallowed.
    pub async fn clear_all(&self) -> Result<usize, StoreError> {
        let bucket_keys = self.bucket_keys().await?;
        if !bucket_keys.is_empty() {
            self.store.remove(&bucket_keys).await?;
        }
        debug!("Cleared {} cache buckets", bucket_keys.len());
        Ok(bucket_keys.len())
    }

    async fn bucket_keys(&self) -> StoreResult<Vec<String>> {
        Ok(self
            .store
            .list_all_keys()
            .await?
            .into_iter()
            .filter(|k| key::is_bucket_key(k))
            .collect())
    }
}

fn approximate_size(value: &Value) -> usize {
    serde_json::to_string(value).map(|s| s.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;
    use crate::cache::store::MemoryStore;
    use crate::detect::{DetectedIndicator, Position};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    type TestCache = CacheManager<Arc<MemoryStore>, Arc<ManualClock>>;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn test_cache() -> (TestCache, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = ManualClock::at(day(2024, 3, 10));
        let cache = CacheManager::with_clock(Arc::clone(&store), Arc::clone(&clock));
        (cache, store, clock)
    }

    fn result(provider: &str, indicator_type: IndicatorType, value: &str) -> AnalysisResult {
        let indicator = DetectedIndicator {
            indicator_type,
            value: value.to_string(),
            position: Position::new(0, value.len()),
        };
        AnalysisResult::success(provider, &indicator, json!({"score": 42}))
    }

    async fn seed_bucket(store: &MemoryStore, date: &str, entries: usize) {
        let mut bucket = serde_json::Map::new();
        for i in 0..entries {
            bucket.insert(format!("p_ipv4_10.0.0.{i}"), json!({}));
        }
        store
            .set(HashMap::from([(
                format!("{}{}", key::BUCKET_PREFIX, date),
                Value::Object(bucket),
            )]))
            .await
            .unwrap();
    }

    /// Store whose every call fails
    struct BrokenStore {
        broken: AtomicBool,
        inner: MemoryStore,
    }

    impl BrokenStore {
        fn check(&self) -> StoreResult<()> {
            if self.broken.load(Ordering::SeqCst) {
                Err(StoreError::Unavailable("disk on fire".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, keys: &[String]) -> StoreResult<HashMap<String, Value>> {
            self.check()?;
            self.inner.get(keys).await
        }
        async fn set(&self, items: HashMap<String, Value>) -> StoreResult<()> {
            self.check()?;
            self.inner.set(items).await
        }
        async fn remove(&self, keys: &[String]) -> StoreResult<()> {
            self.check()?;
            self.inner.remove(keys).await
        }
        async fn list_all_keys(&self) -> StoreResult<Vec<String>> {
            self.check()?;
            self.inner.list_all_keys().await
        }
    }

    fn broken_cache() -> CacheManager<BrokenStore> {
        CacheManager::new(BrokenStore {
            broken: AtomicBool::new(true),
            inner: MemoryStore::new(),
        })
    }

    #[tokio::test]
    async fn test_default_settings() {
        let (cache, _, _) = test_cache();
        assert_eq!(
            cache.get_settings().await,
            CacheSettings {
                retention_days: 5,
                enabled: true
            }
        );
    }

    #[tokio::test]
    async fn test_settings_roundtrip_and_layout() {
        let (cache, store, _) = test_cache();
        let settings = CacheSettings {
            retention_days: 9,
            enabled: false,
        };
        cache.save_settings(&settings).await.unwrap();
        assert_eq!(cache.get_settings().await, settings);

        let raw = store.get(&[key::SETTINGS_KEY.to_string()]).await.unwrap();
        assert_eq!(raw[key::SETTINGS_KEY]["retentionDays"], 9);
    }

    #[tokio::test]
    async fn test_save_settings_rejects_zero_retention() {
        let (cache, _, _) = test_cache();
        let err = cache
            .save_settings(&CacheSettings {
                retention_days: 0,
                enabled: true,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::InvalidRetention(0)));
    }

    #[tokio::test]
    async fn test_save_settings_rejects_huge_retention() {
        let (cache, _, _) = test_cache();
        for days in [MAX_RETENTION_DAYS + 1, 30_000_000, u32::MAX] {
            let err = cache
                .save_settings(&CacheSettings {
                    retention_days: days,
                    enabled: true,
                })
                .await
                .unwrap_err();
            assert!(matches!(err, CacheError::InvalidRetention(d) if d == days));
        }
        assert_eq!(cache.get_settings().await.retention_days, DEFAULT_RETENTION_DAYS);

        cache
            .save_settings(&CacheSettings {
                retention_days: MAX_RETENTION_DAYS,
                enabled: true,
            })
            .await
            .unwrap();
        assert_eq!(cache.get_settings().await.retention_days, MAX_RETENTION_DAYS);
    }

    #[tokio::test]
    async fn test_stored_huge_retention_clamped_on_read() {
        let (cache, store, _) = test_cache();
        store
            .set(HashMap::from([(
                key::SETTINGS_KEY.to_string(),
                json!({"retentionDays": 4_000_000_000u32, "enabled": true}),
            )]))
            .await
            .unwrap();

        assert_eq!(cache.get_settings().await.retention_days, MAX_RETENTION_DAYS);

        let stored = result("virustotal", IndicatorType::Ipv4, "8.8.8.8");
        cache.store_result(&stored).await;
        assert_eq!(
            cache
                .get_result("virustotal", IndicatorType::Ipv4, "8.8.8.8")
                .await,
            Some(stored)
        );
    }

    #[tokio::test]
    async fn test_store_then_get() {
        let (cache, _, _) = test_cache();
        let stored = result("virustotal", IndicatorType::Ipv4, "8.8.8.8");
        cache.store_result(&stored).await;

        let got = cache
            .get_result("virustotal", IndicatorType::Ipv4, "8.8.8.8")
            .await;
        assert_eq!(got, Some(stored));
    }

    #[tokio::test]
    async fn test_miss_for_other_provider_or_type() {
        let (cache, _, _) = test_cache();
        cache
            .store_result(&result("otx", IndicatorType::Domain, "evil.example.com"))
            .await;

        assert!(
            cache
                .get_result("shodan", IndicatorType::Domain, "evil.example.com")
                .await
                .is_none()
        );
        assert!(
            cache
                .get_result("otx", IndicatorType::Url, "evil.example.com")
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_same_day_overwrites() {
        let (cache, _, _) = test_cache();
        let first = result("otx", IndicatorType::Md5, "abc");
        let mut second = first.clone();
        second.data = json!({"score": 99});

        cache.store_result(&first).await;
        cache.store_result(&second).await;

        assert_eq!(cache.get_statistics().await.total_entries, 1);
        assert_eq!(
            cache.get_result("otx", IndicatorType::Md5, "abc").await,
            Some(second)
        );
    }

    #[tokio::test]
    async fn test_unreadable_bucket_replaced_on_write() {
        let (cache, store, _) = test_cache();
        let today = format!("{}20240310", key::BUCKET_PREFIX);
        store
            .set(HashMap::from([(today.clone(), json!("garbage"))]))
            .await
            .unwrap();

        let stored = result("otx", IndicatorType::Domain, "evil.example.com");
        cache.store_result(&stored).await;

        let bucket = store
            .get(std::slice::from_ref(&today))
            .await
            .unwrap()
            .remove(&today)
            .unwrap();
        let entries = bucket.as_object().unwrap();
        assert_eq!(entries.len(), 1);
        let entry_key = key::indicator_key("otx", IndicatorType::Domain, "evil.example.com");
        assert!(entries.contains_key(&entry_key));
        assert_eq!(
            cache
                .get_result("otx", IndicatorType::Domain, "evil.example.com")
                .await,
            Some(stored)
        );
    }

    #[tokio::test]
    async fn test_newest_day_wins() {
        let (cache, _, clock) = test_cache();
        let old = result("otx", IndicatorType::Md5, "abc");
        cache.store_result(&old).await;

        clock.advance_days(1);
        let mut fresh = old.clone();
        fresh.data = json!({"score": 7});
        cache.store_result(&fresh).await;

        assert_eq!(cache.get_statistics().await.bucket_count, 2);
        assert_eq!(
            cache.get_result("otx", IndicatorType::Md5, "abc").await,
            Some(fresh)
        );
    }

    #[tokio::test]
    async fn test_retention_window_boundary() {
        let (cache, _, clock) = test_cache();
        let retention = cache.get_settings().await.retention_days as i64;
        let stored = result("abuseipdb", IndicatorType::Ipv4, "1.2.3.4");
        cache.store_result(&stored).await;

        clock.advance_days(retention - 1);
        assert_eq!(
            cache
                .get_result("abuseipdb", IndicatorType::Ipv4, "1.2.3.4")
                .await,
            Some(stored)
        );

        clock.advance_days(1);
        assert!(
            cache
                .get_result("abuseipdb", IndicatorType::Ipv4, "1.2.3.4")
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_disabled_cache_persists_nothing() {
        let (cache, store, _) = test_cache();
        cache
            .save_settings(&CacheSettings {
                retention_days: 5,
                enabled: false,
            })
            .await
            .unwrap();

        let stored = result("greynoise", IndicatorType::Ipv4, "4.4.4.4");
        cache.store_result(&stored).await;
        assert!(
            cache
                .get_result("greynoise", IndicatorType::Ipv4, "4.4.4.4")
                .await
                .is_none()
        );

        cache
            .save_settings(&CacheSettings {
                retention_days: 5,
                enabled: true,
            })
            .await
            .unwrap();
        assert!(
            cache
                .get_result("greynoise", IndicatorType::Ipv4, "4.4.4.4")
                .await
                .is_none()
        );
        assert_eq!(store.list_all_keys().await.unwrap(), vec![key::SETTINGS_KEY]);
    }

    #[tokio::test]
    async fn test_clean_old_cache_removes_only_stale_buckets() {
        let (cache, store, _) = test_cache();
        // now = 2024-03-10, retention 5 -> cutoff 20240305
        for date in ["20240228", "20240304", "20240305", "20240308", "20240310"] {
            seed_bucket(&store, date, 1).await;
        }

        let removed = cache.clean_old_cache().await;
        assert_eq!(removed, 2);

        let mut remaining: Vec<String> = store
            .list_all_keys()
            .await
            .unwrap()
            .into_iter()
            .filter(|k| key::is_bucket_key(k))
            .collect();
        remaining.sort();
        assert_eq!(
            remaining,
            vec![
                "iocscout_cache_20240305",
                "iocscout_cache_20240308",
                "iocscout_cache_20240310",
            ]
        );
    }

    #[tokio::test]
    async fn test_save_settings_triggers_cleanup() {
        let (cache, store, _) = test_cache();
        seed_bucket(&store, "20240308", 1).await;
        seed_bucket(&store, "20240310", 1).await;

        cache
            .save_settings(&CacheSettings {
                retention_days: 1,
                enabled: true,
            })
            .await
            .unwrap();

        let stats = cache.get_statistics().await;
        assert_eq!(stats.bucket_count, 1);
        assert_eq!(stats.oldest_date.as_deref(), Some("20240310"));
    }

    #[tokio::test]
    async fn test_statistics() {
        let (cache, store, _) = test_cache();
        assert_eq!(cache.get_statistics().await, CacheStatistics::default());

        seed_bucket(&store, "20240307", 2).await;
        seed_bucket(&store, "20240309", 3).await;
        cache
            .save_settings(&CacheSettings::default())
            .await
            .unwrap();

        let stats = cache.get_statistics().await;
        assert_eq!(stats.total_entries, 5);
        assert_eq!(stats.bucket_count, 2);
        assert!(stats.total_size > 0);
        assert_eq!(stats.oldest_date.as_deref(), Some("20240307"));
        assert_eq!(stats.newest_date.as_deref(), Some("20240309"));
    }

    #[tokio::test]
    async fn test_clear_all_keeps_settings() {
        let (cache, store, _) = test_cache();
        cache
            .save_settings(&CacheSettings {
                retention_days: 3,
                enabled: true,
            })
            .await
            .unwrap();
        cache
            .store_result(&result("otx", IndicatorType::Cve, "CVE-2021-44228"))
            .await;
        seed_bucket(&store, "20200101", 4).await;

        let removed = cache.clear_all().await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(cache.get_statistics().await.total_entries, 0);
        assert_eq!(cache.get_settings().await.retention_days, 3);
    }

    #[tokio::test]
    async fn test_broken_store_degrades() {
        let cache = broken_cache();

        assert_eq!(cache.get_settings().await, CacheSettings::default());
        cache
            .store_result(&result("otx", IndicatorType::Ipv4, "1.1.1.1"))
            .await;
        assert!(
            cache
                .get_result("otx", IndicatorType::Ipv4, "1.1.1.1")
                .await
                .is_none()
        );
        assert_eq!(cache.clean_old_cache().await, 0);
        assert_eq!(cache.get_statistics().await, CacheStatistics::default());
    }

    #[tokio::test]
    async fn test_broken_store_fails_settings_save() {
        let cache = broken_cache();
        let err = cache
            .save_settings(&CacheSettings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::SaveSettings(_)));
    }

    #[tokio::test]
    async fn test_recovers_when_store_comes_back() {
        let cache = broken_cache();
        cache.store().broken.store(false, Ordering::SeqCst);

        let stored = result("arin", IndicatorType::Ipv4, "9.9.9.9");
        cache.store_result(&stored).await;
        assert_eq!(
            cache.get_result("arin", IndicatorType::Ipv4, "9.9.9.9").await,
            Some(stored)
        );
    }
}
