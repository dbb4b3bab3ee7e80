use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt::Debug;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::ServiceError;
use crate::models::ForecastRecord;
use crate::normalize::CacheKey;

/// Lifetime of every cached forecast
pub const FORECAST_TTL: Duration = Duration::from_secs(30 * 60);

/// Source of the current time for expiry checks and timestamps
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Key-value store for formatted forecasts.
///
/// Expiry is checked on read; implementations are not required to evict
/// eagerly. Single-key operations must be atomic, nothing more.
#[async_trait]
pub trait ForecastCache: Send + Sync {
    /// Returns `None` for cache misses or expired entries.
    async fn read(&self, key: &CacheKey) -> crate::Result<Option<ForecastRecord>>;

    /// Stores a record, replacing any previous entry for the key.
    async fn write(&self, key: &CacheKey, record: ForecastRecord, ttl: Duration)
    -> crate::Result<()>;

    /// Removes one key. Returns whether a live entry was removed.
    async fn delete(&self, key: &CacheKey) -> crate::Result<bool>;

    /// Removes every entry.
    async fn clear(&self) -> crate::Result<()>;
}

#[derive(Debug, Clone)]
struct StoredEntry {
    value: ForecastRecord,
    inserted_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl StoredEntry {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Process-wide in-memory forecast cache
#[derive(Debug)]
pub struct MemoryCache {
    entries: RwLock<HashMap<CacheKey, StoredEntry>>,
    clock: std::sync::Arc<dyn Clock>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(std::sync::Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(clock: std::sync::Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Number of stored entries, expired ones included until purged
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Insertion time of a live entry
    #[cfg(test)]
    pub(crate) async fn inserted_at(&self, key: &CacheKey) -> Option<DateTime<Utc>> {
        let now = self.clock.now();
        self.entries
            .read()
            .await
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.inserted_at)
    }

    /// Eagerly drop expired entries. Returns how many were removed.
    #[tracing::instrument(name = "purge_cache", level = "debug", skip(self))]
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now));
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!("Purged {} expired forecast entries", removed);
        }
        removed
    }
}

#[async_trait]
impl ForecastCache for MemoryCache {
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    async fn read(&self, key: &CacheKey) -> crate::Result<Option<ForecastRecord>> {
        let now = self.clock.now();

        let expired = {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.is_fresh(now) => {
                    tracing::debug!(
                        "Key found and still fresh, inserted at {}",
                        entry.inserted_at
                    );
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => true,
                None => false,
            }
        };

        if expired {
            tracing::debug!("Key found but expired");
            let mut entries = self.entries.write().await;
            // A concurrent writer may have refreshed the key in between
            if entries.get(key).is_some_and(|entry| !entry.is_fresh(now)) {
                entries.remove(key);
            }
        } else {
            tracing::debug!("Key not found");
        }
        Ok(None)
    }

    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, record))]
    async fn write(
        &self,
        key: &CacheKey,
        record: ForecastRecord,
        ttl: Duration,
    ) -> crate::Result<()> {
        let inserted_at = self.clock.now();
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| ServiceError::cache(format!("TTL out of range: {e}")))?;
        let expires_at = inserted_at
            .checked_add_signed(ttl)
            .ok_or_else(|| ServiceError::cache("TTL overflow"))?;

        let entry = StoredEntry {
            value: record,
            inserted_at,
            expires_at,
        };
        self.entries.write().await.insert(key.clone(), entry);
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> crate::Result<bool> {
        let now = self.clock.now();
        let removed = self.entries.write().await.remove(key);
        Ok(removed.is_some_and(|entry| entry.is_fresh(now)))
    }

    async fn clear(&self) -> crate::Result<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::normalize::normalize;
    use chrono::TimeZone;
    use std::sync::{Arc, Mutex};

    /// Clock that only moves when told to
    #[derive(Debug)]
    pub(crate) struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        pub(crate) fn starting_at(at: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(at)))
        }

        pub(crate) fn advance(&self, by: Duration) {
            let mut now = self.0.lock().unwrap();
            *now += chrono::Duration::from_std(by).unwrap();
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    pub(crate) fn sample_record(location: &str) -> ForecastRecord {
        ForecastRecord {
            location_name: location.to_string(),
            current_temp: 70,
            feels_like: 69,
            description: "Clear Sky".to_string(),
            humidity: 40,
            wind_speed: 3.2,
            icon: "01d".to_string(),
            today_high: 75,
            today_low: 58,
            daily_forecast: Vec::new(),
            from_cache: false,
            cached_at: "2025-08-01T12:00:00Z".to_string(),
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_read_after_write() {
        let cache = MemoryCache::with_clock(ManualClock::starting_at(start()));
        let key = normalize("Vancouver, BC");

        cache
            .write(&key, sample_record("Vancouver"), FORECAST_TTL)
            .await
            .unwrap();

        let cached = cache.read(&key).await.unwrap().unwrap();
        assert_eq!(cached.location_name, "Vancouver");
        assert_eq!(cache.inserted_at(&key).await, Some(start()));
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let cache = MemoryCache::new();
        assert!(cache.read(&normalize("nowhere")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let clock = ManualClock::starting_at(start());
        let cache = MemoryCache::with_clock(clock.clone());
        let key = normalize("Seattle, WA");
        cache
            .write(&key, sample_record("Seattle"), FORECAST_TTL)
            .await
            .unwrap();

        clock.advance(Duration::from_secs(29 * 60 + 59));
        assert!(cache.read(&key).await.unwrap().is_some());

        clock.advance(Duration::from_secs(1));
        assert!(cache.read(&key).await.unwrap().is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_leaves_other_keys() {
        let cache = MemoryCache::new();
        let a = normalize("Vancouver, BC");
        let b = normalize("Seattle, WA");
        cache.write(&a, sample_record("Vancouver"), FORECAST_TTL).await.unwrap();
        cache.write(&b, sample_record("Seattle"), FORECAST_TTL).await.unwrap();

        assert!(cache.delete(&a).await.unwrap());
        assert!(!cache.delete(&a).await.unwrap());
        assert!(cache.read(&a).await.unwrap().is_none());
        assert!(cache.read(&b).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let cache = MemoryCache::new();
        for address in ["Vancouver", "Seattle", "Portland"] {
            cache
                .write(&normalize(address), sample_record(address), FORECAST_TTL)
                .await
                .unwrap();
        }
        assert_eq!(cache.len().await, 3);

        cache.clear().await.unwrap();
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_purge_expired_keeps_fresh_entries() {
        let clock = ManualClock::starting_at(start());
        let cache = MemoryCache::with_clock(clock.clone());
        cache
            .write(&normalize("old"), sample_record("old"), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .write(&normalize("new"), sample_record("new"), FORECAST_TTL)
            .await
            .unwrap();

        clock.advance(Duration::from_secs(120));
        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.len().await, 1);
        assert!(cache.read(&normalize("new")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_rewrite_replaces_entry() {
        let clock = ManualClock::starting_at(start());
        let cache = MemoryCache::with_clock(clock.clone());
        let key = normalize("Denver");
        cache.write(&key, sample_record("first"), FORECAST_TTL).await.unwrap();

        clock.advance(Duration::from_secs(10 * 60));
        cache.write(&key, sample_record("second"), FORECAST_TTL).await.unwrap();

        let cached = cache.read(&key).await.unwrap().unwrap();
        assert_eq!(cached.location_name, "second");
        assert_eq!(
            cache.inserted_at(&key).await,
            Some(start() + chrono::Duration::minutes(10))
        );
    }
}
