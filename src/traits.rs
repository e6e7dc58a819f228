use std::path::PathBuf;
use std::sync::Arc;

use crossbeam_channel::Sender;

use crate::progress::ScanProgress;
use crate::results::{ScanResult, ScanStats};

/// Receives everything a scan reports while it runs.
///
/// This is the only way the core talks to a presentation layer. All methods
/// have no-op defaults, so implementors override only what they display.
///
/// # Thread Safety
///
/// `on_log` and `on_progress` are called concurrently from every worker
/// thread. If the presentation layer needs its updates on a single thread
/// (a UI loop, a terminal writer), the observer is where that marshaling
/// happens: forward into a channel and drain it on the owning thread. The
/// `Sender<ScanEvent>` implementation below does exactly that.
///
/// `on_complete` is called exactly once per scan, from the thread that ran
/// the coordinator, after finalize.
///
/// # Example
///
/// ```rust
/// use namescan::{ScanObserver, ScanProgress};
///
/// struct PrintPercent;
///
/// impl ScanObserver for PrintPercent {
///     fn on_progress(&self, p: ScanProgress) {
///         if let Some(pct) = p.percent() {
///             eprint!("\r{pct}%");
///         }
///     }
/// }
/// ```
pub trait ScanObserver: Send + Sync {
    /// A visited entry or a recovered error.
    fn on_log(&self, _message: &str) {}

    /// One entry was visited somewhere in the scan.
    fn on_progress(&self, _progress: ScanProgress) {}

    /// The scan finished and its result is final.
    fn on_complete(&self, _result: &ScanResult) {}
}

impl<T: ScanObserver + ?Sized> ScanObserver for Arc<T> {
    fn on_log(&self, message: &str) {
        (**self).on_log(message)
    }

    fn on_progress(&self, progress: ScanProgress) {
        (**self).on_progress(progress)
    }

    fn on_complete(&self, result: &ScanResult) {
        (**self).on_complete(result)
    }
}

/// Observer that ignores everything. Used when none is configured.
pub(crate) struct NoopObserver;

impl ScanObserver for NoopObserver {}

/// Owned form of the observer callbacks, for delivery across a channel.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    Log(String),
    Progress(ScanProgress),
    Complete {
        directories: Vec<PathBuf>,
        files:       Vec<PathBuf>,
        stats:       ScanStats,
    },
}

/// Forwards every callback into a channel.
///
/// Send errors mean the receiving side hung up; the scan keeps running
/// and the event is dropped.
impl ScanObserver for Sender<ScanEvent> {
    fn on_log(&self, message: &str) {
        let _ = self.send(ScanEvent::Log(message.to_owned()));
    }

    fn on_progress(&self, progress: ScanProgress) {
        let _ = self.send(ScanEvent::Progress(progress));
    }

    fn on_complete(&self, result: &ScanResult) {
        let _ = self.send(ScanEvent::Complete {
            directories: result.directories.clone(),
            files:       result.files.clone(),
            stats:       result.stats.clone(),
        });
    }
}
