use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::results::ScanResult;

/// Accumulates matched paths from every walker of one scan.
///
/// The concurrent phase only appends, duplicates included. All ordering and
/// classification work happens once, single-threaded, in [`finalize`].
///
/// [`finalize`]: ResultCollector::finalize
#[derive(Debug, Default)]
pub struct ResultCollector {
    paths: Mutex<Vec<PathBuf>>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a matched path. Safe to call from any worker.
    pub fn add(&self, path: PathBuf) {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path);
    }

    /// Raw number of paths added so far, duplicates included.
    pub fn len(&self) -> usize {
        self.paths.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deduplicate, sort and split the collected paths.
    ///
    /// Order is byte-wise on the path string, not per component.
    ///
    /// Kind is re-read from the filesystem here, following symbolic links.
    /// Paths that no longer exist, or that are now neither a directory nor a
    /// regular file, are dropped from both lists.
    pub fn finalize(self) -> ScanResult {
        let raw = self.paths.into_inner().unwrap_or_else(PoisonError::into_inner);

        let mut seen = HashSet::with_capacity(raw.len());
        let mut unique: Vec<PathBuf> = raw
            .into_iter()
            .filter(|p| seen.insert(p.clone()))
            .collect();
        unique.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));

        let mut directories = Vec::new();
        let mut files = Vec::new();
        for path in unique {
            match fs::metadata(&path) {
                Ok(md) if md.is_dir()  => directories.push(path),
                Ok(md) if md.is_file() => files.push(path),
                Ok(_) => debug!(path = %path.display(), "dropping match of unsupported kind"),
                Err(e) => debug!(path = %path.display(), error = %e, "dropping vanished match"),
            }
        }

        ScanResult {
            total_count: directories.len() + files.len(),
            directories,
            files,
            ..ScanResult::default()
        }
    }
}
