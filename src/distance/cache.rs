use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;

use super::types::{Distance, DistanceQuery};

/// Default time-to-live for cached distances (1 hour)
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Default maximum number of cached routes
pub const DEFAULT_CAPACITY: usize = 1024;

/// Source of "now" for cache expiry.
pub trait Clock: Send + Sync {
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

/// Clock that only moves when told to. Lets callers exercise expiry without
/// waiting an hour.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += TimeDelta::from_std(by).unwrap_or(TimeDelta::MAX);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

struct CacheEntry {
    distance: Distance,
    inserted_at: DateTime<Utc>,
}

/// In-memory distance cache with TTL and a capacity bound.
///
/// Only successful lookups are stored. Expired entries are removed lazily
/// when their key is read, or in bulk when an insert finds the cache full.
/// All access goes through one mutex; concurrent inserts for the same key are
/// last-writer-wins.
pub struct DistanceCache {
    entries: Mutex<HashMap<DistanceQuery, CacheEntry>>,
    ttl: TimeDelta,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl DistanceCache {
    pub fn new(ttl: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            capacity,
            clock,
        }
    }

    pub fn with_system_clock(ttl: Duration, capacity: usize) -> Self {
        Self::new(ttl, capacity, Arc::new(SystemClock))
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<DistanceQuery, CacheEntry>> {
        // Entries are plain values; a panic mid-insert cannot leave one half-written
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.inserted_at) < self.ttl
    }

    /// Look up a live entry. A stale entry for this key is removed.
    pub fn get(&self, query: &DistanceQuery) -> Option<Distance> {
        let now = self.clock.now();
        let mut entries = self.lock();

        match entries.get(query) {
            Some(entry) if self.is_fresh(entry, now) => return Some(entry.distance),
            Some(_) => {}
            None => return None,
        }

        entries.remove(query);
        debug!(
            origin = query.origin(),
            destination = query.destination(),
            "Expired distance cache entry removed"
        );
        None
    }

    /// Store a successful lookup, evicting if the cache is full.
    pub fn insert(&self, query: DistanceQuery, distance: Distance) {
        if self.capacity == 0 {
            return;
        }

        let now = self.clock.now();
        let mut entries = self.lock();

        if !entries.contains_key(&query) && entries.len() >= self.capacity {
            entries.retain(|_, entry| self.is_fresh(entry, now));

            if entries.len() >= self.capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.inserted_at)
                    .map(|(key, _)| key.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            query,
            CacheEntry {
                distance,
                inserted_at: now,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn manual_cache(ttl: Duration, capacity: usize) -> (DistanceCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 12, 1, 14, 30, 0).unwrap(),
        ));
        (DistanceCache::new(ttl, capacity, clock.clone()), clock)
    }

    #[test]
    fn test_hit_within_ttl() {
        let (cache, clock) = manual_cache(DEFAULT_TTL, 16);
        let query = DistanceQuery::new("Brou, France", "Dangeau, France");
        cache.insert(query.clone(), Distance::new(9_800, 660));

        clock.advance(Duration::from_secs(59 * 60));
        assert_eq!(cache.get(&query), Some(Distance::new(9_800, 660)));
    }

    #[test]
    fn test_expired_entry_is_purged_on_read() {
        let (cache, clock) = manual_cache(DEFAULT_TTL, 16);
        let query = DistanceQuery::new("Brou, France", "Dangeau, France");
        cache.insert(query.clone(), Distance::new(9_800, 660));
        assert_eq!(cache.len(), 1);

        clock.advance(DEFAULT_TTL);
        assert_eq!(cache.get(&query), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_reading_other_key_leaves_stale_entry() {
        let (cache, clock) = manual_cache(DEFAULT_TTL, 16);
        cache.insert(DistanceQuery::new("A", "B"), Distance::new(1_000, 60));
        clock.advance(Duration::from_secs(2 * 3600));

        assert_eq!(cache.get(&DistanceQuery::new("C", "D")), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_direction_matters() {
        let (cache, _clock) = manual_cache(DEFAULT_TTL, 16);
        cache.insert(DistanceQuery::new("A", "B"), Distance::new(1_000, 60));
        assert_eq!(cache.get(&DistanceQuery::new("B", "A")), None);
    }

    #[test]
    fn test_full_cache_evicts_expired_first() {
        let (cache, clock) = manual_cache(Duration::from_secs(600), 2);
        cache.insert(DistanceQuery::new("old", "x"), Distance::new(1, 1));
        clock.advance(Duration::from_secs(601));
        cache.insert(DistanceQuery::new("fresh", "x"), Distance::new(2, 2));
        cache.insert(DistanceQuery::new("newest", "x"), Distance::new(3, 3));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&DistanceQuery::new("fresh", "x")).is_some());
        assert!(cache.get(&DistanceQuery::new("newest", "x")).is_some());
    }

    #[test]
    fn test_full_cache_evicts_oldest() {
        let (cache, clock) = manual_cache(DEFAULT_TTL, 2);
        cache.insert(DistanceQuery::new("first", "x"), Distance::new(1, 1));
        clock.advance(Duration::from_secs(1));
        cache.insert(DistanceQuery::new("second", "x"), Distance::new(2, 2));
        clock.advance(Duration::from_secs(1));
        cache.insert(DistanceQuery::new("third", "x"), Distance::new(3, 3));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&DistanceQuery::new("first", "x")), None);
        assert!(cache.get(&DistanceQuery::new("third", "x")).is_some());
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let (cache, _clock) = manual_cache(DEFAULT_TTL, 1);
        cache.insert(DistanceQuery::new("A", "B"), Distance::new(1, 1));
        cache.insert(DistanceQuery::new("A", "B"), Distance::new(2, 2));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&DistanceQuery::new("A", "B")), Some(Distance::new(2, 2)));
    }

    #[test]
    fn test_zero_capacity_disables_caching() {
        let (cache, _clock) = manual_cache(DEFAULT_TTL, 0);
        cache.insert(DistanceQuery::new("A", "B"), Distance::new(1, 1));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let (cache, _clock) = manual_cache(DEFAULT_TTL, 4);
        cache.insert(DistanceQuery::new("A", "B"), Distance::new(1, 1));
        cache.clear();
        assert!(cache.is_empty());
    }
}
