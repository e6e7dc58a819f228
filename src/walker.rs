use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, trace, warn};

use crate::cancel::CancelToken;
use crate::collector::ResultCollector;
use crate::entry::{Entry, EntryKind};
use crate::error::ScanError;
use crate::keyword::Keyword;
use crate::progress::ProgressAggregator;
use crate::traits::ScanObserver;

// ---------------------------------------------------------------------------
// ErrorSink
// ---------------------------------------------------------------------------

/// Where walkers report recovered errors.
///
/// Every error is logged through the observer and `tracing`, and counted.
/// Errors are kept only when the scan was configured to collect them.
pub(crate) struct ErrorSink {
    count:     AtomicU64,
    collected: Option<Mutex<Vec<ScanError>>>,
}

impl ErrorSink {
    pub fn new(collect: bool) -> Self {
        Self {
            count:     AtomicU64::new(0),
            collected: collect.then(|| Mutex::new(Vec::new())),
        }
    }

    pub fn record(&self, context: &str, err: ScanError, observer: &dyn ScanObserver) {
        warn!(error = %err, "{context}");
        observer.on_log(&format!("{context}: {err}"));
        self.count.fetch_add(1, Ordering::Relaxed);

        if let Some(errs) = &self.collected {
            errs.lock().unwrap_or_else(PoisonError::into_inner).push(err);
        }
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn into_errors(self) -> Vec<ScanError> {
        self.collected
            .map(|m| m.into_inner().unwrap_or_else(PoisonError::into_inner))
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// DirWalker
// ---------------------------------------------------------------------------

/// Walks one root to completion, reporting only through its sinks.
///
/// Traversal is iterative: a stack of pending directories seeded with the
/// root. Each pop enumerates one directory's direct children. For each child
/// the walker logs the path, ticks progress exactly once, then classifies it:
///
/// - directories (symbolic links are never followed) are matched by name and
///   always pushed for later expansion;
/// - regular files, and links resolving to one, are matched by name;
/// - everything else is skipped after its tick.
///
/// A directory that cannot be enumerated is logged and abandoned; an entry
/// whose type cannot be read is logged and skipped. Neither stops the walk.
pub(crate) struct DirWalker<'a> {
    pub keyword:  &'a Keyword,
    pub matches:  &'a ResultCollector,
    pub progress: &'a ProgressAggregator,
    pub errors:   &'a ErrorSink,
    pub observer: &'a dyn ScanObserver,
    pub cancel:   &'a CancelToken,
}

impl DirWalker<'_> {
    pub fn walk(&self, root: &Path) {
        match fs::metadata(root) {
            Ok(md) if md.is_dir() => {}
            _ => {
                self.errors.record(
                    "skipping root",
                    ScanError::InvalidRoot(root.to_path_buf()),
                    self.observer,
                );
                return;
            }
        }

        let mut stack = vec![root.to_path_buf()];

        while let Some(dir) = stack.pop() {
            if self.cancel.is_cancelled() {
                debug!(root = %root.display(), pending = stack.len() + 1, "walk cancelled");
                return;
            }
            self.expand(&dir, &mut stack);
        }
    }

    fn expand(&self, dir: &Path, stack: &mut Vec<PathBuf>) {
        let read = match fs::read_dir(dir) {
            Ok(read) => read,
            Err(e) => {
                self.errors.record(
                    "cannot access directory",
                    ScanError::from_io(dir, e),
                    self.observer,
                );
                return;
            }
        };

        for item in read {
            let dent = match item {
                Ok(dent) => dent,
                Err(e) => {
                    self.errors.record(
                        "skipping unreadable entry",
                        ScanError::from_io(dir, e),
                        self.observer,
                    );
                    continue;
                }
            };

            let path = dent.path();
            trace!(path = %path.display(), "visiting");
            self.observer.on_log(&format!("visiting {}", path.display()));
            self.observer.on_progress(self.progress.tick());

            let kind = match dent.file_type() {
                Ok(ft) => EntryKind::classify(ft, || fs::metadata(&path).ok().map(|m| m.file_type())),
                Err(e) => {
                    self.errors.record(
                        "skipping inaccessible entry",
                        ScanError::from_io(&path, e),
                        self.observer,
                    );
                    EntryKind::Inaccessible
                }
            };

            let entry = Entry {
                name: dent.file_name().to_string_lossy().into_owned(),
                path,
                kind,
            };
            self.visit(entry, stack);
        }
    }

    fn visit(&self, entry: Entry, stack: &mut Vec<PathBuf>) {
        if entry.kind.is_matchable() && self.keyword.matches(&entry.name) {
            self.matches.add(entry.path.clone());
        }
        if entry.kind == EntryKind::Dir {
            stack.push(entry.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ScanProgress;

    #[derive(Default)]
    struct Recorder {
        logs:  Mutex<Vec<String>>,
        ticks: Mutex<Vec<ScanProgress>>,
    }

    impl ScanObserver for Recorder {
        fn on_log(&self, message: &str) {
            self.logs.lock().unwrap().push(message.to_owned());
        }
        fn on_progress(&self, progress: ScanProgress) {
            self.ticks.lock().unwrap().push(progress);
        }
    }

    struct Harness {
        keyword:  Keyword,
        matches:  ResultCollector,
        progress: ProgressAggregator,
        errors:   ErrorSink,
        observer: Recorder,
        cancel:   CancelToken,
    }

    impl Harness {
        fn new(keyword: &str) -> Self {
            Self {
                keyword:  Keyword::new(keyword),
                matches:  ResultCollector::new(),
                progress: ProgressAggregator::new(0),
                errors:   ErrorSink::new(true),
                observer: Recorder::default(),
                cancel:   CancelToken::new(),
            }
        }

        fn walker(&self) -> DirWalker<'_> {
            DirWalker {
                keyword:  &self.keyword,
                matches:  &self.matches,
                progress: &self.progress,
                errors:   &self.errors,
                observer: &self.observer,
                cancel:   &self.cancel,
            }
        }

        fn walk(&self, root: &Path) {
            self.walker().walk(root);
        }
    }

    #[test]
    fn ticks_once_per_entry_and_matches_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("Foo")).unwrap();
        fs::write(root.join("Foo/inner_foo.txt"), "").unwrap();
        fs::write(root.join("bar.txt"), "").unwrap();

        let h = Harness::new("foo");
        h.walk(root);

        assert_eq!(h.progress.snapshot().processed, 3);
        assert_eq!(h.observer.ticks.lock().unwrap().len(), 3);
        assert_eq!(h.matches.len(), 2);
        assert_eq!(h.errors.count(), 0);

        let visits = h.observer.logs.lock().unwrap()
            .iter()
            .filter(|m| m.starts_with("visiting "))
            .count();
        assert_eq!(visits, 3);
    }

    #[test]
    fn missing_root_is_reported_and_contributes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let h = Harness::new("");
        h.walk(&dir.path().join("missing"));

        assert_eq!(h.progress.snapshot().processed, 0);
        assert!(h.matches.is_empty());
        let errors = h.errors.into_errors();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ScanError::InvalidRoot(_)));
    }

    #[test]
    fn unreadable_directory_is_logged_and_abandoned() {
        let dir = tempfile::tempdir().unwrap();
        let not_a_dir = dir.path().join("plain.txt");
        fs::write(&not_a_dir, "").unwrap();

        let h = Harness::new("");
        let mut stack = vec![dir.path().join("queued")];
        h.walker().expand(&not_a_dir, &mut stack);

        assert_eq!(stack, vec![dir.path().join("queued")]);
        assert_eq!(h.progress.snapshot().processed, 0);
        assert_eq!(h.errors.count(), 1);

        let logs = h.observer.logs.lock().unwrap().clone();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].starts_with("cannot access directory: "));
        assert!(logs[0].contains(&not_a_dir.display().to_string()));

        let errors = h.errors.into_errors();
        assert_eq!(errors[0].path(), Some(&not_a_dir));
        assert!(errors[0].is_recoverable());
    }

    #[test]
    fn vanished_directory_is_reported_as_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("gone");

        let h = Harness::new("");
        let mut stack = Vec::new();
        h.walker().expand(&gone, &mut stack);

        assert!(stack.is_empty());
        let errors = h.errors.into_errors();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ScanError::NotFound(ref p) if *p == gone));
    }

    #[test]
    fn cancelled_walk_visits_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), "").unwrap();

        let h = Harness::new("");
        h.cancel.cancel();
        h.walk(dir.path());

        assert_eq!(h.progress.snapshot().processed, 0);
        assert!(h.matches.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_to_dirs_are_ticked_but_not_followed() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("target_dir")).unwrap();
        fs::write(root.join("target_dir/hit_file"), "").unwrap();
        fs::write(root.join("hit_plain"), "").unwrap();
        std::os::unix::fs::symlink(root.join("target_dir"), root.join("hit_dirlink")).unwrap();
        std::os::unix::fs::symlink(root.join("hit_plain"), root.join("hit_filelink")).unwrap();
        std::os::unix::fs::symlink(root.join("nowhere"), root.join("hit_broken")).unwrap();

        let h = Harness::new("hit");
        h.walk(root);

        // target_dir, hit_file, hit_plain, hit_dirlink, hit_filelink, hit_broken
        assert_eq!(h.progress.snapshot().processed, 6);

        let mut found: Vec<_> = h.matches.finalize().files
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        found.sort();
        assert_eq!(found, vec!["hit_file", "hit_filelink", "hit_plain"]);
    }
}
