use std::sync::Arc;

use crate::engine::{ScanCoordinator, ScanOptions, DEFAULT_WORKERS};
use crate::error::ScanError;
use crate::traits::{NoopObserver, ScanObserver};

// ---------------------------------------------------------------------------
// ScanBuilder
// ---------------------------------------------------------------------------

/// Configures a [`ScanCoordinator`].
///
/// Created via [`namescan::coordinator()`](crate::coordinator). Chain the
/// options, then call [`build()`](ScanBuilder::build).
///
/// # Example
///
/// ```rust,ignore
/// let scanner = namescan::coordinator()
///     .workers(4)
///     .observer(my_observer)
///     .collect_errors(true)
///     .build()?;
///
/// let result = scanner.run(["/home/me/projects"], "invoice")?;
/// ```
pub struct ScanBuilder {
    workers:        usize,
    observer:       Option<Arc<dyn ScanObserver>>,
    collect_errors: bool,
}

impl Default for ScanBuilder {
    fn default() -> Self {
        Self {
            workers:        DEFAULT_WORKERS,
            observer:       None,
            collect_errors: false,
        }
    }
}

impl ScanBuilder {
    // ── Options ───────────────────────────────────────────────────────────

    /// Worker pool size: how many roots are walked at the same time.
    ///
    /// Defaults to 4 regardless of core count or root count. Extra roots
    /// wait for a free slot.
    pub fn workers(mut self, n: usize) -> Self {
        self.workers = n;
        self
    }

    /// Collect non-fatal errors into [`ScanResult::errors`](crate::ScanResult::errors).
    ///
    /// Disabled by default. Errors are always logged and counted in
    /// [`ScanStats::errors`](crate::ScanStats::errors) either way.
    pub fn collect_errors(mut self, yes: bool) -> Self {
        self.collect_errors = yes;
        self
    }

    // ── Observer ──────────────────────────────────────────────────────────

    /// Set the callback interface that receives log, progress and
    /// completion events. Without one, events are dropped.
    pub fn observer(mut self, o: impl ScanObserver + 'static) -> Self {
        self.observer = Some(Arc::new(o));
        self
    }

    // ── Build ─────────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns [`ScanError::InvalidWorkerCount`] for a zero-sized pool.
    pub fn build(self) -> Result<ScanCoordinator, ScanError> {
        if self.workers == 0 {
            return Err(ScanError::InvalidWorkerCount(self.workers));
        }

        let observer = self.observer.unwrap_or_else(|| Arc::new(NoopObserver));

        let opts = ScanOptions {
            workers:        self.workers,
            collect_errors: self.collect_errors,
        };

        Ok(ScanCoordinator::new(opts, observer))
    }
}
