//! Filesystem abstraction for mbed config assembly
//!
//! Provides forward-slash path values, text I/O with path-carrying errors,
//! and the file-discovery service consumed by the configuration core.

pub mod discovery;
pub mod error;
pub mod io;
pub mod path;

pub use discovery::{FileDiscovery, WalkDiscovery};
pub use error::{Error, Result};
pub use path::NormalizedPath;
