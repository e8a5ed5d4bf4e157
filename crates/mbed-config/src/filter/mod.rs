//! Candidate file filtering
//!
//! A library descriptor takes part in a pass only when its path survives
//! both the label rules ([`labels`]) and the ignore files ([`ignore`]).
//! Nothing here walks the filesystem; candidates come from a
//! [`mbed_fs::FileDiscovery`].

pub mod ignore;
pub mod labels;

pub use ignore::IgnoreRules;
pub use labels::{AllowedLabels, LabelType, is_eligible};

use mbed_fs::NormalizedPath;

/// Combined label and ignore-pattern filter.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    root: Option<NormalizedPath>,
    ignore: IgnoreRules,
}

impl FileFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only inspect path segments below `root` for labels, so a program that
    /// happens to live under e.g. `/work/TARGET_X/` is not filtered by it.
    pub fn rooted_at(mut self, root: NormalizedPath) -> Self {
        self.root = Some(root);
        self
    }

    pub fn with_ignore_rules(mut self, ignore: IgnoreRules) -> Self {
        self.ignore = ignore;
        self
    }

    pub fn ignore_rules(&self) -> &IgnoreRules {
        &self.ignore
    }

    /// Whether `path` is eligible under `allowed`.
    pub fn is_eligible(&self, path: &NormalizedPath, allowed: &AllowedLabels) -> bool {
        if self.ignore.is_ignored(path) {
            return false;
        }
        match self.root.as_ref().and_then(|root| path.strip_prefix(root)) {
            Some(relative) => is_eligible(&relative, allowed),
            None => is_eligible(path, allowed),
        }
    }

    /// The eligible subset of `candidates`, order preserved.
    pub fn filter<'a, I>(&self, candidates: I, allowed: &AllowedLabels) -> Vec<NormalizedPath>
    where
        I: IntoIterator<Item = &'a NormalizedPath>,
    {
        candidates
            .into_iter()
            .filter(|path| self.is_eligible(path, allowed))
            .cloned()
            .collect()
    }
}
