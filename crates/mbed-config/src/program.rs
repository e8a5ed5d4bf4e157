//! Whole-program assembly
//!
//! Glue between the file-discovery service and the assembler: find library
//! descriptors and ignore files under a program root, pick up the
//! application descriptor at the root if discovery reports one, and run the
//! fixed point.

use mbed_fs::{FileDiscovery, NormalizedPath};

use crate::assemble::ConfigAssembler;
use crate::filter::{FileFilter, IgnoreRules};
use crate::model::Config;
use crate::options::AssemblyOptions;
use crate::source::Source;
use crate::Result;

/// Assemble the configuration of the program at `root` for the target
/// described by `target_descriptor`.
pub fn assemble_program<D>(
    target_descriptor: &NormalizedPath,
    root: &NormalizedPath,
    discovery: &D,
    options: &AssemblyOptions,
) -> Result<Config>
where
    D: FileDiscovery + ?Sized,
{
    let target = Source::from_target_file(target_descriptor)?;

    let ignore_files = discovery.discover(&options.ignore_file_name, root)?;
    let ignore = IgnoreRules::from_files(&ignore_files)?;

    let candidates = discovery.discover(&options.library_file_name, root)?;
    tracing::debug!(
        %root,
        libraries = candidates.len(),
        ignore_files = ignore_files.len(),
        "Discovered program descriptors"
    );

    let filter = FileFilter::new()
        .rooted_at(root.clone())
        .with_ignore_rules(ignore);
    let mut assembler = ConfigAssembler::new(target)
        .with_filter(filter)
        .with_max_iterations(options.max_iterations);

    let app_path = root.join(&options.app_file_name);
    let apps = discovery.discover(&options.app_file_name, root)?;
    if apps.contains(&app_path) {
        assembler = assembler.with_app(Source::from_app_file(&app_path)?);
    }

    assembler.assemble(&candidates)
}
