//! Assembly options
//!
//! Knobs for a single assembly run. They can be built in code or parsed
//! from TOML; every field is optional there.
//!
//! ```toml
//! max_iterations = 25
//! library_file_name = "mbed_lib.json"
//! app_file_name = "mbed_app.json"
//! ignore_file_name = ".mbedignore"
//! ```

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Upper bound on fixed-point passes before giving up.
pub const DEFAULT_MAX_ITERATIONS: usize = 25;

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

fn default_library_file_name() -> String {
    "mbed_lib.json".to_string()
}

fn default_app_file_name() -> String {
    "mbed_app.json".to_string()
}

fn default_ignore_file_name() -> String {
    ".mbedignore".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssemblyOptions {
    /// Fixed-point pass limit
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Library descriptor file name looked up by discovery
    #[serde(default = "default_library_file_name")]
    pub library_file_name: String,

    /// Application descriptor expected at the program root
    #[serde(default = "default_app_file_name")]
    pub app_file_name: String,

    /// Ignore-pattern file name looked up by discovery
    #[serde(default = "default_ignore_file_name")]
    pub ignore_file_name: String,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            library_file_name: default_library_file_name(),
            app_file_name: default_app_file_name(),
            ignore_file_name: default_ignore_file_name(),
        }
    }
}

impl AssemblyOptions {
    /// Parse options from TOML content.
    pub fn parse(content: &str) -> Result<Self> {
        let options: AssemblyOptions = toml::from_str(content).map_err(|e| Error::InvalidOptions {
            message: e.to_string(),
        })?;
        if options.max_iterations == 0 {
            return Err(Error::InvalidOptions {
                message: "max_iterations must be at least 1".to_string(),
            });
        }
        Ok(options)
    }
}
