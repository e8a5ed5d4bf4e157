//! File discovery service
//!
//! The configuration core never walks directories. It asks a
//! [`FileDiscovery`] for candidate files by name and works on the returned
//! list, which keeps the core testable against any enumeration strategy.

use crate::{Error, NormalizedPath, Result};
use walkdir::WalkDir;

/// Enumerates files with a given name below a root directory.
pub trait FileDiscovery {
    /// Return every file named `file_name` under `root`, in a stable order.
    fn discover(&self, file_name: &str, root: &NormalizedPath) -> Result<Vec<NormalizedPath>>;
}

/// Recursive directory walk, sorted by file name at every level so the
/// discovery order is deterministic across platforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkDiscovery {
    follow_links: bool,
}

impl WalkDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow symbolic links while walking.
    pub fn follow_links(mut self, yes: bool) -> Self {
        self.follow_links = yes;
        self
    }
}

impl FileDiscovery for WalkDiscovery {
    fn discover(&self, file_name: &str, root: &NormalizedPath) -> Result<Vec<NormalizedPath>> {
        let mut found = Vec::new();

        for entry in WalkDir::new(root.to_native())
            .follow_links(self.follow_links)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        {
            let entry = entry.map_err(|e| Error::Walk {
                root: root.to_native(),
                message: e.to_string(),
            })?;
            if entry.file_type().is_file() && entry.file_name() == file_name {
                found.push(NormalizedPath::new(entry.path()));
            }
        }

        tracing::debug!(%root, file_name, count = found.len(), "Discovered files");
        Ok(found)
    }
}
