//! Work item identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// An opaque identifier naming one unit of work, typically a source path.
///
/// Work items are supplied by the caller and never mutated by the runner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkItem(PathBuf);

impl WorkItem {
    /// Creates a new work item.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Returns the identifier as a path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Returns true if the identifier is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.as_os_str().is_empty()
    }

    /// Returns the final path component, if any.
    #[must_use]
    pub fn file_name(&self) -> Option<&std::ffi::OsStr> {
        self.0.file_name()
    }

    /// Builds a list of work items from anything path-like.
    pub fn from_paths<I, P>(paths: I) -> Vec<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        paths.into_iter().map(Self::new).collect()
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl AsRef<Path> for WorkItem {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl From<&str> for WorkItem {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for WorkItem {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<PathBuf> for WorkItem {
    fn from(value: PathBuf) -> Self {
        Self(value)
    }
}

impl From<&Path> for WorkItem {
    fn from(value: &Path) -> Self {
        Self::new(value)
    }
}

impl From<WorkItem> for PathBuf {
    fn from(item: WorkItem) -> Self {
        item.0
    }
}

impl From<WorkItem> for String {
    fn from(item: WorkItem) -> Self {
        item.to_string()
    }
}
