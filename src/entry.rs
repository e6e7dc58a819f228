use std::fs::FileType;
use std::path::PathBuf;

/// A single child discovered while enumerating a directory.
///
/// Entries are transient: the walker builds one per visited child, tests it,
/// and drops it. Only matched paths survive into the collector.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Full path to the entry.
    pub path: PathBuf,

    /// Base name, lossily converted for matching.
    pub name: String,

    /// What the walker classified this entry as.
    pub kind: EntryKind,
}

/// The kind of a traversed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A directory reached without following a symbolic link.
    Dir,

    /// A regular file, or a symbolic link that resolves to one.
    File,

    /// The entry's type could not be read.
    Inaccessible,

    /// Anything else: sockets, pipes, devices, links to directories, broken links.
    Other,
}

impl EntryKind {
    /// Classify from a non-following file type.
    ///
    /// `resolve` is only consulted for symbolic links, to decide whether the
    /// link points at a regular file. Links to directories stay `Other` so
    /// they are never descended into.
    pub(crate) fn classify(ft: FileType, resolve: impl FnOnce() -> Option<FileType>) -> Self {
        if ft.is_dir() {
            EntryKind::Dir
        } else if ft.is_file() {
            EntryKind::File
        } else if ft.is_symlink() {
            match resolve() {
                Some(target) if target.is_file() => EntryKind::File,
                _                                => EntryKind::Other,
            }
        } else {
            EntryKind::Other
        }
    }

    /// Whether entries of this kind are candidates for a match.
    pub fn is_matchable(self) -> bool {
        matches!(self, EntryKind::Dir | EntryKind::File)
    }
}
