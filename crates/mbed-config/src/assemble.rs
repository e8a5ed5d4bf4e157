//! Fixed-point configuration assembly
//!
//! Which library descriptors are eligible depends on the target labels,
//! features and components, but those sets are themselves edited by the
//! libraries. The assembler therefore repeats filter, load and merge until
//! the cumulative metadata stops changing:
//!
//! ```text
//! metadata_0 = merge([target]).target_metadata
//! pass i:    eligible = filter(candidates, metadata_{i-1})
//!            config_i = merge([target] + load(eligible) + [app])
//!            stop when config_i.target_metadata == metadata_{i-1}
//! ```
//!
//! Overrides of undeclared keys are only fatal in the converged pass: an
//! application may override a library that becomes eligible a pass later.
//!
//! Convergence is not assumed: after `max_iterations` passes without a
//! fixed point the assembly fails with [`Error::ConfigDidNotConverge`].

use mbed_fs::NormalizedPath;
use std::collections::BTreeSet;

use crate::filter::{AllowedLabels, FileFilter};
use crate::merge::{DeferredMerge, merge_deferred};
use crate::model::{Config, TargetMetadata};
use crate::options::DEFAULT_MAX_ITERATIONS;
use crate::source::Source;
use crate::{Error, Result};

/// Assemble with default settings: no ignore rules, no app descriptor.
pub fn assemble(target: Source, candidates: &[NormalizedPath]) -> Result<Config> {
    ConfigAssembler::new(target).assemble(candidates)
}

/// Drives the fixed-point iteration for one target.
#[derive(Debug, Clone)]
pub struct ConfigAssembler {
    target: Source,
    app: Option<Source>,
    filter: FileFilter,
    max_iterations: usize,
}

impl ConfigAssembler {
    pub fn new(target: Source) -> Self {
        Self {
            target,
            app: None,
            filter: FileFilter::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Merge an application descriptor after the libraries on every pass.
    pub fn with_app(mut self, app: Source) -> Self {
        self.app = Some(app);
        self
    }

    pub fn with_filter(mut self, filter: FileFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Pass limit; values below 1 are treated as 1.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Metadata contributed by the target descriptor alone.
    pub fn seed(&self) -> Result<TargetMetadata> {
        Ok(merge_deferred([&self.target], &BTreeSet::new())?.config.target_metadata)
    }

    /// Run the fixed point from the target's own metadata.
    pub fn assemble(&self, candidates: &[NormalizedPath]) -> Result<Config> {
        let seed = self.seed()?;
        self.assemble_from(seed, candidates)
    }

    /// Run the fixed point from an explicit starting metadata.
    ///
    /// Starting from a converged result's `target_metadata` reproduces that
    /// result in a single pass.
    pub fn assemble_from(
        &self,
        seed: TargetMetadata,
        candidates: &[NormalizedPath],
    ) -> Result<Config> {
        let mut previous = seed;
        let mut pass = 0;

        loop {
            pass += 1;
            let merged = self.run_pass(pass, &previous, candidates)?;

            if merged.config.target_metadata == previous {
                tracing::debug!(
                    pass,
                    options = merged.config.options.len(),
                    "Configuration converged"
                );
                return merged.into_config();
            }

            if !merged.unknown.is_empty() {
                tracing::debug!(
                    pass,
                    unknown = merged.unknown.len(),
                    "Deferring overrides of keys not declared yet"
                );
            }
            let config = merged.config;

            if pass >= self.max_iterations {
                tracing::warn!(
                    pass,
                    previous = %previous,
                    current = %config.target_metadata,
                    "Configuration did not converge"
                );
                return Err(Error::ConfigDidNotConverge {
                    iterations: pass,
                    previous: Box::new(previous),
                    current: Box::new(config.target_metadata),
                });
            }

            previous = config.target_metadata;
        }
    }

    fn run_pass(
        &self,
        pass: usize,
        metadata: &TargetMetadata,
        candidates: &[NormalizedPath],
    ) -> Result<DeferredMerge> {
        let allowed = AllowedLabels::from_metadata(metadata);
        let eligible = self.filter.filter(candidates, &allowed);
        tracing::debug!(
            pass,
            candidates = candidates.len(),
            eligible = eligible.len(),
            metadata = %metadata,
            "Assembly pass"
        );

        let libraries = eligible
            .iter()
            .map(Source::from_library_file)
            .collect::<Result<Vec<_>>>()?;

        let sources = std::iter::once(&self.target)
            .chain(libraries.iter())
            .chain(self.app.as_ref());
        merge_deferred(sources, metadata.labels())
    }
}
