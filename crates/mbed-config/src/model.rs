//! Resolved configuration model
//!
//! A [`Config`] is the output of one merge: every declared option keyed by
//! its fully namespaced name, plus the cumulative target attributes. It is
//! rebuilt from scratch on every assembly pass and handed to renderers
//! read-only once the assembly converges.

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::classify::{CumulativeAttribute, Modifier};

const MACRO_PREFIX: &str = "MBED_CONF_";

/// Derive the preprocessor symbol for a fully namespaced key.
///
/// `target.stack-size` becomes `MBED_CONF_TARGET_STACK_SIZE`. Distinct keys
/// may map to the same symbol (`a.b-c` and `a.b.c`); that is not checked.
pub fn derive_macro_name(key: &str) -> String {
    format!("{MACRO_PREFIX}{}", key.to_uppercase().replace(['.', '-'], "_"))
}

/// One resolved configuration setting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigOption {
    /// Fully namespaced key, unique within a [`Config`]
    pub key: String,
    /// Most recently applied value
    pub value: Value,
    /// Preprocessor symbol name
    pub macro_name: String,
    /// First declared help text; survives later value overwrites
    pub help_text: Option<String>,
    /// Origin of the source that last set the value
    pub set_by: String,
}

/// Cumulative target attributes, one string set per [`CumulativeAttribute`].
///
/// Every attribute is always present (possibly empty), so equality compares
/// the sets and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TargetMetadata {
    attributes: BTreeMap<CumulativeAttribute, BTreeSet<String>>,
}

impl Default for TargetMetadata {
    fn default() -> Self {
        Self {
            attributes: CumulativeAttribute::ALL
                .into_iter()
                .map(|attr| (attr, BTreeSet::new()))
                .collect(),
        }
    }
}

impl TargetMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current set for an attribute.
    pub fn get(&self, attribute: CumulativeAttribute) -> &BTreeSet<String> {
        static EMPTY: BTreeSet<String> = BTreeSet::new();
        self.attributes.get(&attribute).unwrap_or(&EMPTY)
    }

    pub fn labels(&self) -> &BTreeSet<String> {
        self.get(CumulativeAttribute::Labels)
    }

    pub fn features(&self) -> &BTreeSet<String> {
        self.get(CumulativeAttribute::Features)
    }

    pub fn components(&self) -> &BTreeSet<String> {
        self.get(CumulativeAttribute::Components)
    }

    pub fn macros(&self) -> &BTreeSet<String> {
        self.get(CumulativeAttribute::Macros)
    }

    /// Apply one cumulative edit.
    pub fn apply<I, S>(&mut self, attribute: CumulativeAttribute, modifier: Modifier, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set = self.attributes.entry(attribute).or_default();
        match modifier {
            Modifier::Replace => {
                *set = values.into_iter().map(Into::into).collect();
            }
            Modifier::Add => {
                set.extend(values.into_iter().map(Into::into));
            }
            Modifier::Remove => {
                for value in values {
                    set.remove(&value.into());
                }
            }
        }
    }

    /// Builder-style [`TargetMetadata::apply`] with `Replace`.
    pub fn with<I, S>(mut self, attribute: CumulativeAttribute, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.apply(attribute, Modifier::Replace, values);
        self
    }

    /// Iterate over all attributes in name order.
    pub fn iter(&self) -> impl Iterator<Item = (CumulativeAttribute, &BTreeSet<String>)> {
        self.attributes.iter().map(|(attr, set)| (*attr, set))
    }
}

impl fmt::Display for TargetMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (attr, set) in self.iter().filter(|(_, set)| !set.is_empty()) {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            let values: Vec<&str> = set.iter().map(String::as_str).collect();
            write!(f, "{attr}=[{}]", values.join(","))?;
        }
        if first {
            f.write_str("(empty)")?;
        }
        Ok(())
    }
}

/// The assembled configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Config {
    pub options: BTreeMap<String, ConfigOption>,
    pub target_metadata: TargetMetadata,
}

impl Config {
    /// Look up an option by fully namespaced key.
    pub fn option(&self, key: &str) -> Option<&ConfigOption> {
        self.options.get(key)
    }

    /// Shorthand for the value of an option.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.option(key).map(|option| &option.value)
    }

    /// Options ordered by macro name, the order a config header lists them in.
    pub fn header_entries(&self) -> Vec<&ConfigOption> {
        let mut entries: Vec<&ConfigOption> = self.options.values().collect();
        entries.sort_by(|a, b| a.macro_name.cmp(&b.macro_name).then_with(|| a.key.cmp(&b.key)));
        entries
    }

    /// Bare macros collected from descriptors and `macros` overrides.
    pub fn macros(&self) -> &BTreeSet<String> {
        self.target_metadata.macros()
    }
}
