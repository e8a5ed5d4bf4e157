//! Ignore files (`.mbedignore`)
//!
//! One shell-glob pattern per line; blank lines and `#` comments are
//! skipped. Patterns are rooted at the directory holding the ignore file
//! and only ever match paths below it. `*` crosses directory separators,
//! so `*/test/*` under `/program` excludes `/program/a/b/test/x.json`.
//!
//! The grammar is `fnmatch`'s: `*`, `?` and `[...]` classes are special,
//! braces and backslashes are literal, and an unclosed `[` matches itself.
//! A pattern matching a directory excludes everything below it.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use mbed_fs::NormalizedPath;

use crate::{Error, Result};

/// Patterns from one ignore file.
#[derive(Debug, Clone)]
struct IgnoreScope {
    root: NormalizedPath,
    patterns: Vec<String>,
    matcher: GlobSet,
}

impl IgnoreScope {
    fn matches_within(&self, path: &NormalizedPath) -> bool {
        let mut current = Some(path.clone());
        while let Some(candidate) = current {
            if candidate == self.root || !candidate.starts_with(&self.root) {
                return false;
            }
            if self.matcher.is_match(candidate.as_str()) {
                return true;
            }
            current = candidate.parent();
        }
        false
    }
}

/// Patterns from any number of ignore files.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    scopes: Vec<IgnoreScope>,
}

impl IgnoreRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules from a single ignore file.
    pub fn from_file(path: &NormalizedPath) -> Result<Self> {
        let mut rules = Self::new();
        rules.add_file(path)?;
        Ok(rules)
    }

    /// Rules from several ignore files, e.g. everything discovery found.
    pub fn from_files<'a, I>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a NormalizedPath>,
    {
        let mut rules = Self::new();
        for path in paths {
            rules.add_file(path)?;
        }
        Ok(rules)
    }

    /// Read an ignore file and root its patterns at the file's directory.
    pub fn add_file(&mut self, path: &NormalizedPath) -> Result<()> {
        let contents = mbed_fs::io::read_text(path)?;
        let dir = path.parent().unwrap_or_else(|| NormalizedPath::new(""));
        self.add_patterns(&dir, &contents, path)
    }

    /// Add the patterns in `contents`, rooted at `dir`. `origin` is only
    /// used to report a bad pattern.
    pub fn add_patterns(
        &mut self,
        dir: &NormalizedPath,
        contents: &str,
        origin: &NormalizedPath,
    ) -> Result<()> {
        let mut builder = GlobSetBuilder::new();
        let mut patterns = Vec::new();

        for line in contents.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let rooted = root_pattern(dir, &translate(line));
            let glob = GlobBuilder::new(&rooted)
                .literal_separator(false)
                .backslash_escape(false)
                .build()
                .map_err(|e| Error::InvalidIgnorePattern {
                    path: origin.to_native(),
                    pattern: line.to_string(),
                    message: e.to_string(),
                })?;
            builder.add(glob);
            patterns.push(rooted);
        }

        if patterns.is_empty() {
            return Ok(());
        }

        let matcher = builder.build().map_err(|e| Error::InvalidIgnorePattern {
            path: origin.to_native(),
            pattern: patterns.join(", "),
            message: e.to_string(),
        })?;

        tracing::debug!(%origin, root = %dir, count = patterns.len(), "Loaded ignore patterns");
        self.scopes.push(IgnoreScope {
            root: dir.clone(),
            patterns,
            matcher,
        });
        Ok(())
    }

    /// Whether any applicable pattern matches `path` or one of its
    /// directories below the pattern's root.
    pub fn is_ignored(&self, path: &NormalizedPath) -> bool {
        self.scopes
            .iter()
            .filter(|scope| path.starts_with(&scope.root))
            .any(|scope| scope.matches_within(path))
    }

    /// All rooted patterns, in load order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.scopes
            .iter()
            .flat_map(|scope| scope.patterns.iter().map(String::as_str))
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

/// Prefix a pattern with its (glob-escaped) root directory. A leading `/` in
/// the pattern still means "relative to the ignore file".
fn root_pattern(dir: &NormalizedPath, pattern: &str) -> String {
    let pattern = pattern.trim_start_matches('/');
    let root = dir.as_str();
    if root.is_empty() {
        pattern.to_string()
    } else if root.ends_with('/') {
        format!("{}{pattern}", globset::escape(root))
    } else {
        format!("{}/{pattern}", globset::escape(root))
    }
}

/// Rewrite an `fnmatch` pattern in globset syntax.
fn translate(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                out.push('*');
                while chars.get(i + 1) == Some(&'*') {
                    i += 1;
                }
            }
            brace @ ('{' | '}') => {
                out.push('[');
                out.push(brace);
                out.push(']');
            }
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.extend(&chars[i..=end]);
                    i = end;
                }
                None => out.push_str("[[]"),
            },
            c => out.push(c),
        }
        i += 1;
    }
    out
}

/// Index of the `]` closing the class opened at `start`. A leading `!`
/// and a `]` directly after the opening are part of the class.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    chars
        .get(j..)?
        .iter()
        .position(|&c| c == ']')
        .map(|offset| j + offset)
}
