use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use rayon::ThreadPoolBuilder;
use tracing::info;

use crate::cancel::CancelToken;
use crate::collector::ResultCollector;
use crate::counter;
use crate::error::ScanError;
use crate::keyword::Keyword;
use crate::progress::ProgressAggregator;
use crate::results::{ScanResult, ScanStats};
use crate::traits::ScanObserver;
use crate::walker::{DirWalker, ErrorSink};

/// Default worker pool size.
pub const DEFAULT_WORKERS: usize = 4;

// ---------------------------------------------------------------------------
// ScanOptions
// ---------------------------------------------------------------------------

/// Scan parameters passed from the builder to the coordinator.
///
/// `pub(crate)`: callers configure these via `.workers()` and
/// `.collect_errors()` on [`ScanBuilder`](crate::ScanBuilder).
pub(crate) struct ScanOptions {
    pub workers:        usize,
    pub collect_errors: bool,
}

// ---------------------------------------------------------------------------
// ScanCoordinator
// ---------------------------------------------------------------------------

/// Runs scans: counts, walks every root on a bounded pool, finalizes.
///
/// A coordinator runs at most one scan at a time. A second `run` or `spawn`
/// while one is in flight fails immediately with
/// [`ScanError::ConcurrentScanRejected`]. Clones share that state, so a clone
/// handed to another thread sees the same in-flight scan.
#[derive(Clone)]
pub struct ScanCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    options:  ScanOptions,
    observer: Arc<dyn ScanObserver>,
    running:  AtomicBool,
}

/// Marks the coordinator idle again when the scan ends, panics included.
struct RunGuard {
    inner: Arc<Inner>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.inner.running.store(false, Ordering::SeqCst);
    }
}

impl ScanCoordinator {
    pub(crate) fn new(options: ScanOptions, observer: Arc<dyn ScanObserver>) -> Self {
        Self {
            inner: Arc::new(Inner {
                options,
                observer,
                running: AtomicBool::new(false),
            }),
        }
    }

    /// Whether a scan is currently in flight.
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Configured worker pool size.
    pub fn workers(&self) -> usize {
        self.inner.options.workers
    }

    /// Scan `roots` for names containing `keyword` and block until done.
    ///
    /// # Errors
    ///
    /// Fails before touching the filesystem if `roots` is empty, if another
    /// scan is in flight, or if the worker pool cannot be built. Filesystem
    /// errors never fail the scan; they are logged and skipped.
    pub fn run<I, P>(&self, roots: I, keyword: impl Into<Keyword>) -> Result<ScanResult, ScanError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.run_with_cancel(roots, keyword, &CancelToken::new())
    }

    /// Like [`run`](Self::run), stopping early once `cancel` fires.
    ///
    /// A cancelled scan still finalizes whatever it matched so far and still
    /// reports completion, with `stats.cancelled` set.
    pub fn run_with_cancel<I, P>(
        &self,
        roots: I,
        keyword: impl Into<Keyword>,
        cancel: &CancelToken,
    ) -> Result<ScanResult, ScanError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let roots = collect_roots(roots)?;
        let _guard = self.acquire()?;
        self.inner.execute(&roots, &keyword.into(), cancel)
    }

    /// Start a scan on a background thread.
    ///
    /// Rejection (empty roots, scan already running) happens here, in the
    /// caller's thread, before anything is spawned.
    pub fn spawn<I, P>(&self, roots: I, keyword: impl Into<Keyword>) -> Result<ScanHandle, ScanError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let roots   = collect_roots(roots)?;
        let keyword = keyword.into();
        let guard   = self.acquire()?;
        let cancel  = CancelToken::new();

        let inner  = Arc::clone(&self.inner);
        let token  = cancel.clone();
        let handle = thread::Builder::new()
            .name("namescan-scan".into())
            .spawn(move || {
                let _guard = guard;
                inner.execute(&roots, &keyword, &token)
            })
            .map_err(|e| ScanError::ThreadPool(e.to_string()))?;

        Ok(ScanHandle { handle, cancel })
    }

    fn acquire(&self) -> Result<RunGuard, ScanError> {
        self.inner
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| ScanError::ConcurrentScanRejected)?;
        Ok(RunGuard {
            inner: Arc::clone(&self.inner),
        })
    }
}

impl Inner {
    /// The scan itself. The caller holds the run guard.
    fn execute(
        &self,
        roots: &[PathBuf],
        keyword: &Keyword,
        cancel: &CancelToken,
    ) -> Result<ScanResult, ScanError> {
        let workers = self.options.workers;
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("namescan-walker-{i}"))
            .build()
            .map_err(|e| ScanError::ThreadPool(e.to_string()))?;

        let start = Instant::now();
        info!(roots = roots.len(), keyword = keyword.as_str(), workers, "starting scan");

        let total = counter::count_all(roots, workers, cancel);
        info!(estimated_total = total, "pre-scan count finished");

        let progress  = ProgressAggregator::new(total);
        let collector = ResultCollector::new();
        let errors    = ErrorSink::new(self.options.collect_errors);
        let observer: &dyn ScanObserver = &*self.observer;

        // One task per root; a task holds its pool slot until its whole tree is done.
        pool.scope(|s| {
            for root in roots {
                let walker = DirWalker {
                    keyword,
                    matches:  &collector,
                    progress: &progress,
                    errors:   &errors,
                    observer,
                    cancel,
                };
                s.spawn(move |_| walker.walk(root));
            }
        });

        let processed = progress.snapshot().processed;
        let mut result = collector.finalize();
        result.stats = ScanStats::compute(
            processed,
            total,
            errors.count(),
            start.elapsed(),
            cancel.is_cancelled(),
        );
        result.errors = errors.into_errors();

        info!(
            directories = result.directories.len(),
            files = result.files.len(),
            processed,
            errors = result.stats.errors,
            cancelled = result.stats.cancelled,
            elapsed_ms = result.stats.duration.as_millis() as u64,
            "scan finished"
        );

        self.observer.on_complete(&result);
        Ok(result)
    }
}

fn collect_roots<I, P>(roots: I) -> Result<Vec<PathBuf>, ScanError>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let roots: Vec<PathBuf> = roots.into_iter().map(Into::into).collect();
    if roots.is_empty() {
        return Err(ScanError::NoRoots);
    }
    Ok(roots)
}

// ---------------------------------------------------------------------------
// ScanHandle
// ---------------------------------------------------------------------------

/// A scan running on a background thread, returned by
/// [`ScanCoordinator::spawn`].
pub struct ScanHandle {
    handle: JoinHandle<Result<ScanResult, ScanError>>,
    cancel: CancelToken,
}

impl ScanHandle {
    /// Ask the scan to stop at the next directory boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that cancels this scan, for handing to other threads.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the scan and return its result.
    pub fn join(self) -> Result<ScanResult, ScanError> {
        match self.handle.join() {
            Ok(result) => result,
            Err(_) => Err(ScanError::ThreadPool("scan thread panicked".into())),
        }
    }
}
