use std::path::PathBuf;
use std::time::Duration;

use crate::error::ScanError;

/// The finalized output of one scan.
///
/// Built once by the result collector after every walker has finished;
/// read-only afterwards.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Matched directories, sorted by path.
    pub directories: Vec<PathBuf>,

    /// Matched files, sorted by path.
    pub files: Vec<PathBuf>,

    /// `directories.len() + files.len()`.
    pub total_count: usize,

    /// Scan statistics.
    pub stats: ScanStats,

    /// Non-fatal errors encountered during the scan.
    /// Only populated if `.collect_errors(true)` was set on the builder.
    pub errors: Vec<ScanError>,
}

impl ScanResult {
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// All matched paths, directories first, each group sorted.
    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.directories.iter().chain(self.files.iter())
    }
}

/// Counters for a completed scan.
#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    /// Entries visited by the walkers (one per progress tick).
    pub processed: u64,

    /// The pre-scan estimate used as the progress denominator.
    pub estimated_total: u64,

    /// Recoverable errors logged during the walk.
    pub errors: u64,

    /// Wall-clock time from count start to finalize.
    pub duration: Duration,

    /// `processed / duration.as_secs_f64()`, 0 on zero-duration runs.
    pub entries_per_sec: u64,

    /// The scan stopped early because its cancel token fired.
    pub cancelled: bool,
}

impl ScanStats {
    pub(crate) fn compute(
        processed: u64,
        estimated_total: u64,
        errors: u64,
        duration: Duration,
        cancelled: bool,
    ) -> Self {
        let eps = if duration.as_secs_f64() > 0.0 {
            (processed as f64 / duration.as_secs_f64()) as u64
        } else {
            0
        };
        Self {
            processed,
            estimated_total,
            errors,
            duration,
            entries_per_sec: eps,
            cancelled,
        }
    }
}
