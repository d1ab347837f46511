//! Telegram update deduplication cache

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default dedup TTL (5 minutes)
const DEDUP_TTL_SECS: u64 = 300;

/// Maximum dedup cache entries
const DEDUP_MAX_ENTRIES: usize = 2000;

/// Remembers recently seen `update_id`s
///
/// Guards against the same update being delivered twice around an offset
/// reset or a reconnect.
#[derive(Debug)]
pub struct UpdateDedup {
    cache: HashMap<i64, Instant>,
    ttl: Duration,
    max_entries: usize,
}

impl Default for UpdateDedup {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEDUP_TTL_SECS), DEDUP_MAX_ENTRIES)
    }
}

impl UpdateDedup {
    /// Create a cache with an explicit TTL and capacity
    #[must_use]
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            cache: HashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Returns `true` if `update_id` was already seen within the TTL,
    /// otherwise records it and returns `false`
    pub fn is_duplicate(&mut self, update_id: i64) -> bool {
        let now = Instant::now();

        if self.cache.len() >= self.max_entries {
            self.cache.retain(|_, ts| now.duration_since(*ts) < self.ttl);
        }

        // Still full after eviction: drop the oldest entry
        if self.cache.len() >= self.max_entries
            && let Some(oldest) = self
                .cache
                .iter()
                .min_by_key(|(_, ts)| **ts)
                .map(|(id, _)| *id)
        {
            self.cache.remove(&oldest);
        }

        if let Some(ts) = self.cache.get(&update_id)
            && now.duration_since(*ts) < self.ttl
        {
            return true;
        }

        self.cache.insert(update_id, now);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sight_is_not_duplicate() {
        let mut dedup = UpdateDedup::default();
        assert!(!dedup.is_duplicate(1));
        assert!(dedup.is_duplicate(1));
        assert!(!dedup.is_duplicate(2));
    }

    #[test]
    fn expired_entries_are_forgotten() {
        let mut dedup = UpdateDedup::new(Duration::ZERO, 10);
        assert!(!dedup.is_duplicate(1));
        assert!(!dedup.is_duplicate(1));
    }

    #[test]
    fn capacity_is_bounded() {
        let mut dedup = UpdateDedup::new(Duration::from_secs(60), 3);
        for id in 0..10 {
            dedup.is_duplicate(id);
        }
        assert!(dedup.cache.len() <= 3);
    }
}
