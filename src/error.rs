use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    // Traversal
    #[error("permission denied: {}", .0.display())]
    AccessDenied(PathBuf),

    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("invalid root (missing or not a directory): {}", .0.display())]
    InvalidRoot(PathBuf),

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // Config
    #[error("no root paths supplied")]
    NoRoots,

    #[error("invalid worker count")]
    InvalidWorkerCount(usize),

    // Runtime
    #[error("scan already in progress")]
    ConcurrentScanRejected,

    #[error("thread pool failure: {0}")]
    ThreadPool(String),
}

impl ScanError {
    /// Classify an `io::Error` raised while touching `path`.
    pub fn from_io(path: impl AsRef<Path>, err: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::AccessDenied(path),
            io::ErrorKind::NotFound         => Self::NotFound(path),
            _                               => Self::Io { path, source: err },
        }
    }

    /// The path this error occurred at, if applicable.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::AccessDenied(p)
            | Self::NotFound(p)
            | Self::InvalidRoot(p)
            | Self::Io { path: p, .. } => Some(p),
            _ => None,
        }
    }

    /// Whether the scan keeps going after this error.
    ///
    /// Everything the filesystem throws at a walker is recoverable: the
    /// affected entry, directory or root is skipped and the rest of the scan
    /// continues. Configuration and scheduling errors stop `run` before any
    /// walker starts.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::AccessDenied(_) | Self::NotFound(_) | Self::InvalidRoot(_) | Self::Io { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_io_errors_by_kind() {
        let denied = ScanError::from_io("/a", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(denied, ScanError::AccessDenied(ref p) if p == Path::new("/a")));

        let gone = ScanError::from_io("/b", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(gone, ScanError::NotFound(_)));

        let other = ScanError::from_io("/c", io::Error::new(io::ErrorKind::Other, "boom"));
        assert!(matches!(other, ScanError::Io { .. }));
        assert_eq!(other.path().map(|p| p.as_path()), Some(Path::new("/c")));
    }

    #[test]
    fn only_filesystem_errors_are_recoverable() {
        assert!(ScanError::InvalidRoot("/x".into()).is_recoverable());
        assert!(!ScanError::ConcurrentScanRejected.is_recoverable());
        assert!(!ScanError::NoRoots.is_recoverable());
        assert!(ScanError::ConcurrentScanRejected.path().is_none());
    }

    #[test]
    fn messages_carry_the_path() {
        let msg = ScanError::AccessDenied("/secret".into()).to_string();
        assert!(msg.contains("/secret"));
    }
}
