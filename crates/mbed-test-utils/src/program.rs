//! [`TestProgram`] builder for assembly test scenarios.

use mbed_fs::NormalizedPath;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A temporary program tree with helpers for writing descriptors.
///
/// # Example
///
/// ```rust,no_run
/// use mbed_test_utils::program::TestProgram;
/// use serde_json::json;
///
/// let program = TestProgram::new();
/// program.write_library("FEATURE_A/lib", json!({"name": "lib", "config": {"size": 10}}));
/// let target = program.write_target(json!({"features": ["A"]}));
/// ```
pub struct TestProgram {
    temp_dir: TempDir,
}

impl Default for TestProgram {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProgram {
    /// Create an empty program directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Root of the program tree.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Root of the program tree as a [`NormalizedPath`].
    pub fn normalized_root(&self) -> NormalizedPath {
        NormalizedPath::new(self.root())
    }

    /// Absolute normalized path of `rel` inside the program.
    pub fn path(&self, rel: &str) -> NormalizedPath {
        self.normalized_root().join(rel)
    }

    /// Write `contents` to `rel`, creating parent directories.
    ///
    /// # Panics
    /// Panics if the filesystem operations fail.
    pub fn write_file(&self, rel: &str, contents: &str) -> NormalizedPath {
        let full_path = self.root().join(rel);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("write_file: failed to create {}: {e}", parent.display()));
        }
        fs::write(&full_path, contents)
            .unwrap_or_else(|e| panic!("write_file: failed to write {}: {e}", full_path.display()));
        NormalizedPath::new(full_path)
    }

    /// Write `descriptor` as pretty JSON to `rel`.
    pub fn write_json(&self, rel: &str, descriptor: Value) -> NormalizedPath {
        let text = serde_json::to_string_pretty(&descriptor).unwrap();
        self.write_file(rel, &text)
    }

    /// Write `<dir>/mbed_lib.json`.
    pub fn write_library(&self, dir: &str, descriptor: Value) -> NormalizedPath {
        self.write_json(&format!("{dir}/mbed_lib.json"), descriptor)
    }

    /// Write `mbed_app.json` at the program root.
    pub fn write_app(&self, descriptor: Value) -> NormalizedPath {
        self.write_json("mbed_app.json", descriptor)
    }

    /// Write the target descriptor to `targets/target.json`.
    ///
    /// It lives under a directory without labels so it never shows up as a
    /// library candidate.
    pub fn write_target(&self, descriptor: Value) -> NormalizedPath {
        self.write_json("targets/target.json", descriptor)
    }

    /// Write `<dir>/.mbedignore` (use `""` for the program root).
    pub fn write_ignore(&self, dir: &str, patterns: &[&str]) -> NormalizedPath {
        let rel = if dir.is_empty() {
            ".mbedignore".to_string()
        } else {
            format!("{dir}/.mbedignore")
        };
        self.write_file(&rel, &(patterns.join("\n") + "\n"))
    }
}
