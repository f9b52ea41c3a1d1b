//! Conversion statistics with atomic counters.
//!
//! This module provides [`ConvertStats`] for counting what a directory
//! conversion did and [`StatsSnapshot`] for point-in-time views.
//!
//! # Examples
//!
//! ```
//! use cmc_scanner::ConvertStats;
//!
//! let stats = ConvertStats::new();
//! stats.increment_all();
//! stats.increment_convertible();
//! stats.increment_converted();
//!
//! let snapshot = stats.snapshot();
//! assert_eq!(snapshot.converted, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Atomic counters for a directory conversion run.
///
/// Uses relaxed atomic ordering; the counters are informational.
#[derive(Debug, Default)]
pub struct ConvertStats {
    /// Files visited (not skipped).
    all: AtomicU64,
    /// Files handed to the converter.
    convertible: AtomicU64,
    /// Converted outputs written because they changed.
    converted: AtomicU64,
    /// Files copied because they changed.
    copied: AtomicU64,
    /// Files that failed to read, convert, or write.
    errors: AtomicU64,
}

impl ConvertStats {
    /// Creates a new [`ConvertStats`] with all counters at zero.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the visited files counter.
    #[inline]
    pub fn increment_all(&self) {
        self.all.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the convertible files counter.
    #[inline]
    pub fn increment_convertible(&self) {
        self.convertible.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the written outputs counter.
    #[inline]
    pub fn increment_converted(&self) {
        self.converted.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the copied files counter.
    #[inline]
    pub fn increment_copied(&self) {
        self.copied.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the error counter.
    #[inline]
    pub fn increment_errors(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time snapshot of all statistics.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmc_scanner::ConvertStats;
    ///
    /// let stats = ConvertStats::new();
    /// stats.increment_all();
    /// stats.increment_copied();
    ///
    /// let snap = stats.snapshot();
    /// assert_eq!(snap.all, 1);
    /// assert_eq!(snap.copied, 1);
    /// ```
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            all: self.all.load(Ordering::Relaxed),
            convertible: self.convertible.load(Ordering::Relaxed),
            converted: self.converted.load(Ordering::Relaxed),
            copied: self.copied.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }

    /// Resets all counters to zero.
    pub fn reset(&self) {
        self.all.store(0, Ordering::Relaxed);
        self.convertible.store(0, Ordering::Relaxed);
        self.converted.store(0, Ordering::Relaxed);
        self.copied.store(0, Ordering::Relaxed);
        self.errors.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time snapshot of conversion statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Files visited.
    pub all: u64,
    /// Files handed to the converter.
    pub convertible: u64,
    /// Converted outputs written.
    pub converted: u64,
    /// Files copied.
    pub copied: u64,
    /// Files that failed.
    pub errors: u64,
}

impl StatsSnapshot {
    /// Returns the number of files written to the destination, converted
    /// or copied.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmc_scanner::StatsSnapshot;
    ///
    /// let snap = StatsSnapshot { all: 3, convertible: 2, converted: 2, copied: 1, errors: 0 };
    /// assert_eq!(snap.written(), 3);
    /// ```
    #[inline]
    #[must_use]
    pub const fn written(&self) -> u64 {
        self.converted + self.copied
    }

    /// Returns `true` if the run wrote nothing.
    #[inline]
    #[must_use]
    pub const fn is_up_to_date(&self) -> bool {
        self.written() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_stats_new() {
        let stats = ConvertStats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_convert_stats_increment() {
        let stats = ConvertStats::new();

        stats.increment_all();
        stats.increment_all();
        stats.increment_convertible();
        stats.increment_converted();
        stats.increment_copied();
        stats.increment_errors();

        let snap = stats.snapshot();
        assert_eq!(snap.all, 2);
        assert_eq!(snap.convertible, 1);
        assert_eq!(snap.converted, 1);
        assert_eq!(snap.copied, 1);
        assert_eq!(snap.errors, 1);
        assert_eq!(snap.written(), 2);
        assert!(!snap.is_up_to_date());
    }

    #[test]
    fn test_convert_stats_reset() {
        let stats = ConvertStats::new();
        stats.increment_all();
        stats.increment_copied();

        stats.reset();

        let snap = stats.snapshot();
        assert_eq!(snap.all, 0);
        assert!(snap.is_up_to_date());
    }

    #[test]
    fn test_stats_snapshot_serialization() {
        let snap = StatsSnapshot {
            all: 3,
            convertible: 2,
            converted: 2,
            copied: 1,
            errors: 0,
        };

        let json = serde_json::to_string(&snap).expect("Serialization failed");
        assert!(json.contains("\"convertible\":2"));
        let parsed: StatsSnapshot = serde_json::from_str(&json).expect("Deserialization failed");
        assert_eq!(snap, parsed);
    }
}
