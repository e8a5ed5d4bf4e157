//! Folding sources into a [`Config`]
//!
//! Sources are applied strictly in the order given. For each source:
//!
//! 1. every `config` entry creates or overwrites an option,
//! 2. the source's bare `macros` are added to the `macros` attribute,
//! 3. every override block whose selector matches the label set is applied,
//!    entry by entry: plain keys overwrite an existing option's value,
//!    cumulative keys edit the target metadata.

use serde_json::Value;
use std::collections::BTreeSet;

use crate::classify::{CumulativeAttribute, KeyKind, Modifier, classify};
use crate::model::{Config, ConfigOption, derive_macro_name};
use crate::source::{Setting, Source};
use crate::{Error, Result};

/// Prefix `key` with `namespace` unless it is already qualified.
pub fn namespace_key(key: &str, namespace: &str) -> String {
    if key.contains('.') {
        key.to_string()
    } else {
        format!("{namespace}.{key}")
    }
}

/// Merge `sources` in order.
///
/// `labels` is the resolved target label set for this pass; it decides which
/// `target_overrides` blocks apply. The first override of an undeclared key
/// fails the merge.
pub fn merge<'a, I>(sources: I, labels: &BTreeSet<String>) -> Result<Config>
where
    I: IntoIterator<Item = &'a Source>,
{
    let merged = merge_deferred(sources, labels)?;
    merged.into_config()
}

/// An override of a key that no `config` block declared (yet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UnknownKey {
    pub key: String,
    pub origin: String,
}

impl From<UnknownKey> for Error {
    fn from(unknown: UnknownKey) -> Self {
        Error::UnknownConfigKey {
            key: unknown.key,
            origin: unknown.origin,
        }
    }
}

/// A merge result whose unknown-key overrides have not been judged yet.
#[derive(Debug)]
pub(crate) struct DeferredMerge {
    pub config: Config,
    pub unknown: Vec<UnknownKey>,
}

impl DeferredMerge {
    /// Fail with the first unknown key, if any.
    pub fn into_config(self) -> Result<Config> {
        match self.unknown.into_iter().next() {
            Some(unknown) => Err(unknown.into()),
            None => Ok(self.config),
        }
    }
}

/// Merge without failing on unknown plain keys; they are skipped and
/// reported alongside the config. Cumulative metadata never depends on
/// plain settings, so it is the same as a strict merge would produce.
pub(crate) fn merge_deferred<'a, I>(sources: I, labels: &BTreeSet<String>) -> Result<DeferredMerge>
where
    I: IntoIterator<Item = &'a Source>,
{
    let mut merged = DeferredMerge {
        config: Config::default(),
        unknown: Vec::new(),
    };
    for source in sources {
        apply_source(&mut merged, source, labels)?;
    }
    Ok(merged)
}

fn apply_source(merged: &mut DeferredMerge, source: &Source, labels: &BTreeSet<String>) -> Result<()> {
    let config = &mut merged.config;
    for (key, setting) in &source.config {
        declare(config, namespace_key(key, &source.namespace), setting, &source.origin);
    }

    if !source.macros.is_empty() {
        config.target_metadata.apply(
            CumulativeAttribute::Macros,
            Modifier::Add,
            source.macros.iter().cloned(),
        );
    }

    for block in &source.target_overrides {
        if !block.selector.matches(labels) {
            continue;
        }
        for (key, setting) in &block.entries {
            let key = namespace_key(key, &source.namespace);
            if let Some(unknown) = apply_override(&mut merged.config, key, setting, &source.origin)? {
                merged.unknown.push(unknown);
            }
        }
    }
    Ok(())
}

fn declare(config: &mut Config, key: String, setting: &Setting, origin: &str) {
    match config.options.get_mut(&key) {
        Some(existing) => {
            existing.value = setting.value.clone();
            existing.set_by = origin.to_string();
            if existing.help_text.is_none() {
                existing.help_text = setting.help.clone();
            }
        }
        None => {
            let macro_name = setting
                .macro_name
                .clone()
                .unwrap_or_else(|| derive_macro_name(&key));
            config.options.insert(
                key.clone(),
                ConfigOption {
                    key,
                    value: setting.value.clone(),
                    macro_name,
                    help_text: setting.help.clone(),
                    set_by: origin.to_string(),
                },
            );
        }
    }
}

fn apply_override(
    config: &mut Config,
    key: String,
    setting: &Setting,
    origin: &str,
) -> Result<Option<UnknownKey>> {
    match classify(&key) {
        KeyKind::Plain => {
            let Some(option) = config.options.get_mut(&key) else {
                return Ok(Some(UnknownKey {
                    key,
                    origin: origin.to_string(),
                }));
            };
            tracing::trace!(%key, origin, "Overriding config value");
            option.value = setting.value.clone();
            option.set_by = origin.to_string();
        }
        KeyKind::Cumulative(attribute, modifier) => {
            let values = string_list(&setting.value).ok_or_else(|| Error::InvalidCumulativeValue {
                key: key.clone(),
                origin: origin.to_string(),
            })?;
            tracing::trace!(%attribute, ?modifier, ?values, origin, "Applying cumulative override");
            config.target_metadata.apply(attribute, modifier, values);
        }
    }
    Ok(None)
}

fn string_list(value: &Value) -> Option<Vec<&str>> {
    value
        .as_array()?
        .iter()
        .map(Value::as_str)
        .collect::<Option<Vec<_>>>()
}
