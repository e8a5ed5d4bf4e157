//! Override key classification
//!
//! A `target_overrides` key either overwrites a plain setting or edits one of
//! the cumulative target attributes. Cumulative keys follow the grammar
//! `[target.]<attribute>[_add|_remove]`, where `<attribute>` is one of a closed
//! set of names. Nothing else is cumulative, however similar it looks.

use serde::{Deserialize, Serialize};
use std::fmt;

const TARGET_PREFIX: &str = "target.";

/// Target attributes whose values accumulate as sets of strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CumulativeAttribute {
    Components,
    DeviceHas,
    ExtraLabels,
    Features,
    Labels,
    Macros,
}

impl CumulativeAttribute {
    pub const ALL: [CumulativeAttribute; 6] = [
        CumulativeAttribute::Components,
        CumulativeAttribute::DeviceHas,
        CumulativeAttribute::ExtraLabels,
        CumulativeAttribute::Features,
        CumulativeAttribute::Labels,
        CumulativeAttribute::Macros,
    ];

    /// Name as written in descriptor keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            CumulativeAttribute::Components => "components",
            CumulativeAttribute::DeviceHas => "device_has",
            CumulativeAttribute::ExtraLabels => "extra_labels",
            CumulativeAttribute::Features => "features",
            CumulativeAttribute::Labels => "labels",
            CumulativeAttribute::Macros => "macros",
        }
    }

    /// Exact-match lookup; no trimming, no case folding.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|attr| attr.as_str() == name)
    }
}

impl fmt::Display for CumulativeAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a cumulative override changes the attribute's current set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// `key`: the set becomes exactly the given values
    Replace,
    /// `key_add`: union
    Add,
    /// `key_remove`: difference
    Remove,
}

/// Result of classifying an override key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Overwrites the value of an already declared option
    Plain,
    /// Edits a cumulative attribute
    Cumulative(CumulativeAttribute, Modifier),
}

/// Classify a (namespaced) override key.
pub fn classify(key: &str) -> KeyKind {
    let name = key.strip_prefix(TARGET_PREFIX).unwrap_or(key);

    if let Some(attr) = CumulativeAttribute::from_name(name) {
        return KeyKind::Cumulative(attr, Modifier::Replace);
    }

    let suffixed = [("_add", Modifier::Add), ("_remove", Modifier::Remove)];
    for (suffix, modifier) in suffixed {
        if let Some(attr) = name
            .strip_suffix(suffix)
            .and_then(CumulativeAttribute::from_name)
        {
            return KeyKind::Cumulative(attr, modifier);
        }
    }

    KeyKind::Plain
}
