//! Build configuration assembly for mbed programs
//!
//! This crate computes the effective configuration of an embedded program
//! from a target descriptor and the library descriptors found in its tree:
//!
//! - **Loading**: descriptors become normalized [`Source`] fragments
//! - **Classification**: override keys are plain settings or cumulative edits
//! - **Filtering**: label directories and ignore files narrow the libraries
//! - **Merging**: sources fold, in order, into one [`Config`]
//! - **Assembly**: filter and merge repeat until the metadata is stable
//!
//! # Architecture
//!
//! ```text
//!              assemble_program
//!                     |
//!              ConfigAssembler
//!                /         \
//!         FileFilter      merge
//!                          |
//!                 Source   classify
//!                     |
//!                  mbed-fs
//! ```
//!
//! # Example
//!
//! ```ignore
//! use mbed_config::{AssemblyOptions, assemble_program};
//! use mbed_fs::{NormalizedPath, WalkDiscovery};
//!
//! let config = assemble_program(
//!     &NormalizedPath::new("targets/K64F.json"),
//!     &NormalizedPath::new("/path/to/program"),
//!     &WalkDiscovery::new(),
//!     &AssemblyOptions::default(),
//! )?;
//! for option in config.header_entries() {
//!     println!("#define {} {}", option.macro_name, option.value);
//! }
//! ```

pub mod assemble;
pub mod classify;
pub mod error;
pub mod filter;
pub mod merge;
pub mod model;
pub mod options;
pub mod program;
pub mod source;

pub use assemble::{ConfigAssembler, assemble};
pub use classify::{CumulativeAttribute, KeyKind, Modifier, classify};
pub use error::{Error, Result};
pub use filter::{AllowedLabels, FileFilter, IgnoreRules, LabelType};
pub use merge::{merge, namespace_key};
pub use model::{Config, ConfigOption, TargetMetadata, derive_macro_name};
pub use options::AssemblyOptions;
pub use program::assemble_program;
pub use source::{Selector, Setting, Source, TargetOverride};
