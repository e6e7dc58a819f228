//! # namescan
//!
//! Concurrent filesystem name search with live progress.
//!
//! Give it one or more root directories and a keyword. Each root is walked
//! on a bounded worker pool; every file or directory whose name contains the
//! keyword (case-insensitively) is collected, and the final result is
//! deduplicated, sorted, and split into directories and files.
//!
//! Unreadable directories, vanished entries and bad roots never abort a
//! scan. They are reported through the [`ScanObserver`] log callback and
//! skipped; the result is always the best effort over what was reachable.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! let scanner = namescan::coordinator().build().unwrap();
//! let result = scanner.run(["/tmp"], "invoice").unwrap();
//!
//! for dir in &result.directories {
//!     println!("dir  {}", dir.display());
//! }
//! for file in &result.files {
//!     println!("file {}", file.display());
//! }
//! println!("{} matches, {} entries visited", result.total_count, result.stats.processed);
//! ```
//!
//! # Observing a scan
//!
//! ```rust,no_run
//! use namescan::{ScanObserver, ScanProgress, ScanResult};
//!
//! struct Console;
//!
//! impl ScanObserver for Console {
//!     fn on_progress(&self, p: ScanProgress) {
//!         match p.percent() {
//!             Some(pct) => eprint!("\r{pct}% ({}/{})", p.processed, p.total),
//!             None      => eprint!("\rno entries"),
//!         }
//!     }
//!
//!     fn on_complete(&self, r: &ScanResult) {
//!         eprintln!("\ndone: {} matches", r.total_count);
//!     }
//! }
//!
//! let scanner = namescan::coordinator().observer(Console).build().unwrap();
//! let handle = scanner.spawn(["/tmp"], "log").unwrap();
//! let result = handle.join().unwrap();
//! # let _ = result;
//! ```

#![forbid(unsafe_code)]

mod builder;
mod cancel;
mod collector;
mod counter;
mod engine;
mod entry;
mod error;
mod keyword;
mod progress;
mod results;
mod traits;
mod walker;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::ScanBuilder;
pub use cancel::CancelToken;
pub use collector::ResultCollector;
pub use counter::{count_all, count_entries};
pub use engine::{ScanCoordinator, ScanHandle, DEFAULT_WORKERS};
pub use entry::{Entry, EntryKind};
pub use error::ScanError;
pub use keyword::Keyword;
pub use progress::{ProgressAggregator, ScanProgress};
pub use results::{ScanResult, ScanStats};
pub use traits::{ScanEvent, ScanObserver};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`ScanBuilder`] to configure a scan coordinator.
///
/// # Example
///
/// ```rust
/// let scanner = namescan::coordinator().workers(2).build().unwrap();
/// assert_eq!(scanner.workers(), 2);
/// assert!(!scanner.is_running());
/// ```
pub fn coordinator() -> ScanBuilder {
    ScanBuilder::default()
}
