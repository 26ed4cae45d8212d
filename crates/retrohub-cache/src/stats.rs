//! Store operation counters

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time view of a store's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Total number of get operations
    pub get_count: u64,
    /// Gets that returned an entry
    pub hit_count: u64,
    /// Gets that found nothing
    pub miss_count: u64,
    /// Gets that failed in the backend
    pub read_failures: u64,
    /// Successful puts
    pub put_count: u64,
    /// Puts that failed in the backend
    pub write_failures: u64,
    /// Entries removed
    pub remove_count: u64,
}

impl StoreStats {
    /// Hit rate as a percentage of all gets
    pub fn hit_rate(&self) -> f64 {
        if self.get_count == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let rate = self.hit_count as f64 / self.get_count as f64 * 100.0;
            rate
        }
    }
}

/// Lock-free counters shared by the store backends
#[derive(Debug, Default)]
pub struct AtomicStoreMetrics {
    get_count: AtomicU64,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
    read_failures: AtomicU64,
    put_count: AtomicU64,
    write_failures: AtomicU64,
    remove_count: AtomicU64,
}

impl AtomicStoreMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_get(&self, hit: bool) {
        self.get_count.fetch_add(1, Ordering::Relaxed);
        if hit {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
        } else {
            self.miss_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_read_failure(&self) {
        self.get_count.fetch_add(1, Ordering::Relaxed);
        self.read_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_put(&self, ok: bool) {
        if ok {
            self.put_count.fetch_add(1, Ordering::Relaxed);
        } else {
            self.write_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_remove(&self) {
        self.remove_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StoreStats {
        StoreStats {
            get_count: self.get_count.load(Ordering::Relaxed),
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
            put_count: self.put_count.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            remove_count: self.remove_count.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.get_count,
            &self.hit_count,
            &self.miss_count,
            &self.read_failures,
            &self.put_count,
            &self.write_failures,
            &self.remove_count,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = AtomicStoreMetrics::new();
        metrics.record_get(true);
        metrics.record_get(false);
        metrics.record_read_failure();
        metrics.record_put(true);
        metrics.record_put(false);

        let stats = metrics.snapshot();
        assert_eq!(stats.get_count, 3);
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.read_failures, 1);
        assert_eq!(stats.put_count, 1);
        assert_eq!(stats.write_failures, 1);

        metrics.reset();
        assert_eq!(metrics.snapshot(), StoreStats::default());
    }

    #[test]
    fn test_hit_rate() {
        assert_eq!(StoreStats::default().hit_rate(), 0.0);
        let stats = StoreStats {
            get_count: 4,
            hit_count: 3,
            ..StoreStats::default()
        };
        assert_eq!(stats.hit_rate(), 75.0);
    }
}
