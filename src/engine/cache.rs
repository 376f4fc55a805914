//! Time-bounded memo of enhanced assessments.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use super::types::EnhancedAssessment;

/// Cache identity of one assessment request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub package_id: String,
    pub expected_delivery_date: String,
}

struct CacheEntry {
    assessment: EnhancedAssessment,
    inserted_at: Instant,
    last_used: Instant,
}

/// Mutex-guarded TTL cache with a capacity bound.
///
/// Entries expire a fixed interval after insertion and are dropped on the
/// read that finds them expired. When the cache is full, the
/// least-recently-used live entry is evicted to make room. Concurrent
/// requests that miss on the same key may both compute; the later insert
/// simply replaces the earlier one, which is harmless because recomputation
/// is idempotent.
pub struct AssessmentCache {
    ttl: Duration,
    capacity: usize,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl AssessmentCache {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
    pub const DEFAULT_CAPACITY: usize = 1024;

    pub fn new() -> Self {
        Self::with_limits(Self::DEFAULT_TTL, Self::DEFAULT_CAPACITY)
    }

    pub fn with_limits(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached assessment if present and still live. An expired
    /// entry is removed and reported as a miss.
    pub fn get(&self, key: &CacheKey) -> Option<EnhancedAssessment> {
        let mut entries = self.lock();
        let now = Instant::now();

        match entries.get_mut(key) {
            Some(entry) if now.duration_since(entry.inserted_at) < self.ttl => {
                entry.last_used = now;
                Some(entry.assessment.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores an assessment, evicting expired entries first and then the
    /// least-recently-used entry if the cache is still at capacity.
    pub fn insert(&self, key: CacheKey, assessment: EnhancedAssessment) {
        let mut entries = self.lock();
        let now = Instant::now();

        entries.retain(|_, entry| now.duration_since(entry.inserted_at) < self.ttl);

        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone());
            if let Some(evict) = oldest {
                entries.remove(&evict);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                assessment,
                inserted_at: now,
                last_used: now,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for AssessmentCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::EnhancedAssessment;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use std::thread;

    fn key(package_id: &str) -> CacheKey {
        CacheKey {
            package_id: package_id.to_string(),
            expected_delivery_date: "2025-06-20".to_string(),
        }
    }

    fn assessment(score: u8) -> EnhancedAssessment {
        EnhancedAssessment {
            score,
            confidence_level: 80,
            predicted_delay_days: 0,
            factors: BTreeMap::new(),
            original_delivery_date: NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
            revised_delivery_date: NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
        }
    }

    #[test]
    fn test_hit_returns_identical_assessment() {
        let cache = AssessmentCache::new();
        cache.insert(key("PKG-1"), assessment(42));

        let hit = cache.get(&key("PKG-1")).unwrap();
        assert_eq!(hit, assessment(42));
    }

    #[test]
    fn test_miss_on_unknown_key() {
        let cache = AssessmentCache::new();
        assert!(cache.get(&key("PKG-404")).is_none());
    }

    #[test]
    fn test_same_package_different_date_is_a_different_entry() {
        let cache = AssessmentCache::new();
        cache.insert(key("PKG-1"), assessment(42));

        let other = CacheKey {
            package_id: "PKG-1".to_string(),
            expected_delivery_date: "2025-07-01".to_string(),
        };
        assert!(cache.get(&other).is_none());
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let cache = AssessmentCache::with_limits(Duration::from_millis(20), 16);
        cache.insert(key("PKG-1"), assessment(42));

        assert!(cache.get(&key("PKG-1")).is_some());

        thread::sleep(Duration::from_millis(30));
        assert!(cache.get(&key("PKG-1")).is_none());
        // The expired entry was dropped, not just hidden.
        assert!(cache.is_empty());
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let cache = AssessmentCache::with_limits(Duration::from_secs(60), 2);
        cache.insert(key("PKG-1"), assessment(1));
        thread::sleep(Duration::from_millis(2));
        cache.insert(key("PKG-2"), assessment(2));
        thread::sleep(Duration::from_millis(2));

        // Touch PKG-1 so PKG-2 becomes the eviction candidate.
        assert!(cache.get(&key("PKG-1")).is_some());
        thread::sleep(Duration::from_millis(2));

        cache.insert(key("PKG-3"), assessment(3));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key("PKG-1")).is_some());
        assert!(cache.get(&key("PKG-2")).is_none());
        assert!(cache.get(&key("PKG-3")).is_some());
    }

    #[test]
    fn test_reinsert_existing_key_does_not_evict_others() {
        let cache = AssessmentCache::with_limits(Duration::from_secs(60), 2);
        cache.insert(key("PKG-1"), assessment(1));
        cache.insert(key("PKG-2"), assessment(2));
        cache.insert(key("PKG-1"), assessment(10));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&key("PKG-1")).unwrap().score, 10);
        assert!(cache.get(&key("PKG-2")).is_some());
    }
}
