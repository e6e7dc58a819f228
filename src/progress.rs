use std::sync::atomic::{AtomicU64, Ordering};

/// A point-in-time view of scan progress.
///
/// `total` is an estimate taken before traversal starts. `processed` may
/// overshoot it when the tree grows during the scan; only the displayed
/// percentage is clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanProgress {
    pub processed: u64,
    pub total:     u64,
}

impl ScanProgress {
    /// Whole percentage for display, clamped to 100.
    ///
    /// Returns `None` when the estimate is zero, the "no entries" state.
    pub fn percent(&self) -> Option<u8> {
        if self.total == 0 {
            return None;
        }
        let pct = self.processed.saturating_mul(100) / self.total;
        Some(pct.min(100) as u8)
    }

    /// Fraction in `[0.0, 1.0]` for progress bars. `0.0` when there is no estimate.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.processed as f64 / self.total as f64).min(1.0)
        }
    }
}

/// Counts visited entries across all walkers of one scan.
///
/// Every tick is a single `fetch_add`, so concurrent ticks are never lost and
/// each caller observes a distinct post-increment value.
#[derive(Debug)]
pub struct ProgressAggregator {
    processed: AtomicU64,
    total:     u64,
}

impl ProgressAggregator {
    pub fn new(total: u64) -> Self {
        Self {
            processed: AtomicU64::new(0),
            total,
        }
    }

    /// Record one visited entry and return the progress it produced.
    pub fn tick(&self) -> ScanProgress {
        let processed = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
        ScanProgress {
            processed,
            total: self.total,
        }
    }

    pub fn snapshot(&self) -> ScanProgress {
        ScanProgress {
            processed: self.processed.load(Ordering::Relaxed),
            total:     self.total,
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}
