use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ignore::{DirEntry, WalkBuilder, WalkState};
use tracing::{debug, trace};

use crate::cancel::CancelToken;
use crate::error::ScanError;

/// Count every entry below `root`, the root itself excluded.
///
/// Uses the same policy as the walker: nothing is filtered, symbolic links
/// are never followed, and a directory that cannot be read is skipped without
/// stopping the rest of the count. A missing or non-directory root counts 0.
///
/// The count runs on its own `threads`-wide parallel walk and returns early
/// (with a partial count) if `cancel` fires.
pub fn count_entries(root: &Path, threads: usize, cancel: &CancelToken) -> u64 {
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .ignore(false)
        .parents(false)
        .hidden(false)
        .follow_links(false)
        .same_file_system(false)
        .threads(threads);

    let walker = builder.build_parallel();
    let count = Arc::new(AtomicU64::new(0));

    walker.run(|| {
        let count  = Arc::clone(&count);
        let cancel = cancel.clone();

        Box::new(move |res: Result<DirEntry, ignore::Error>| -> WalkState {
            if cancel.is_cancelled() {
                return WalkState::Quit;
            }

            match res {
                Ok(entry) if entry.depth() == 0 => {}
                Ok(_) => {
                    count.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    let err = map_ignore_error(e);
                    trace!(error = %err, "count: skipping unreadable path");
                }
            }
            WalkState::Continue
        })
    });

    let n = count.load(Ordering::Relaxed);
    debug!(root = %root.display(), entries = n, "counted entries");
    n
}

/// Sum of [`count_entries`] over every root, one root at a time.
pub fn count_all(roots: &[PathBuf], threads: usize, cancel: &CancelToken) -> u64 {
    roots
        .iter()
        .take_while(|_| !cancel.is_cancelled())
        .map(|root| count_entries(root, threads, cancel))
        .sum()
}

fn map_ignore_error(e: ignore::Error) -> ScanError {
    match e {
        ignore::Error::WithPath { path, err } => match *err {
            ignore::Error::Io(io_err) => ScanError::from_io(path, io_err),
            other => ScanError::Io {
                path,
                source: std::io::Error::new(std::io::ErrorKind::Other, other.to_string()),
            },
        },
        ignore::Error::WithDepth { err, .. } => map_ignore_error(*err),
        ignore::Error::Loop { child, .. } => ScanError::Io {
            path:   child,
            source: std::io::Error::new(std::io::ErrorKind::Other, "filesystem loop"),
        },
        other => ScanError::Io {
            path:   PathBuf::new(),
            source: std::io::Error::new(std::io::ErrorKind::Other, other.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn counts_files_and_dirs_below_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::create_dir_all(root.join("sub/deeper")).unwrap();
        fs::write(root.join("sub/b.txt"), "b").unwrap();
        fs::write(root.join("sub/deeper/c.txt"), "c").unwrap();

        // a.txt, sub, sub/b.txt, sub/deeper, sub/deeper/c.txt
        assert_eq!(count_entries(root, 2, &CancelToken::new()), 5);
    }

    #[test]
    fn hidden_entries_are_counted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".hidden"), "").unwrap();
        fs::write(dir.path().join(".gitignore"), "*\n").unwrap();
        fs::write(dir.path().join("shown"), "").unwrap();

        assert_eq!(count_entries(dir.path(), 1, &CancelToken::new()), 3);
    }

    #[test]
    fn missing_root_counts_zero() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert_eq!(count_entries(&missing, 1, &CancelToken::new()), 0);
    }

    #[test]
    fn file_root_counts_zero() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        fs::write(&file, "x").unwrap();
        assert_eq!(count_entries(&file, 1, &CancelToken::new()), 0);
    }

    #[test]
    fn sums_over_roots() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        fs::write(a.path().join("1"), "").unwrap();
        fs::write(b.path().join("2"), "").unwrap();
        fs::write(b.path().join("3"), "").unwrap();

        let roots = vec![a.path().to_path_buf(), b.path().to_path_buf()];
        assert_eq!(count_all(&roots, 2, &CancelToken::new()), 3);
    }

    #[test]
    fn cancelled_before_start_counts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x"), "").unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();
        let roots = vec![dir.path().to_path_buf()];
        assert_eq!(count_all(&roots, 1, &cancel), 0);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_dirs_are_not_descended() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("real")).unwrap();
        fs::write(root.join("real/inside"), "").unwrap();
        std::os::unix::fs::symlink(root.join("real"), root.join("link")).unwrap();

        // real, real/inside, link
        assert_eq!(count_entries(root, 1, &CancelToken::new()), 3);
    }
}
