//! Label-based path eligibility
//!
//! Directories named `TARGET_<value>`, `FEATURE_<value>` or
//! `COMPONENT_<value>` gate everything below them. A path is eligible when
//! every labelled segment it contains carries an allowed value for its
//! type. Nested labels are conjunctive: `FEATURE_X/FEATURE_Y/` needs both.

use mbed_fs::NormalizedPath;
use std::collections::{BTreeMap, BTreeSet};

use crate::model::TargetMetadata;

/// Directory label families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LabelType {
    Target,
    Feature,
    Component,
}

impl LabelType {
    pub const ALL: [LabelType; 3] = [LabelType::Target, LabelType::Feature, LabelType::Component];

    /// Segment prefix, separator included.
    pub fn prefix(&self) -> &'static str {
        match self {
            LabelType::Target => "TARGET_",
            LabelType::Feature => "FEATURE_",
            LabelType::Component => "COMPONENT_",
        }
    }

    /// Split a path segment into its label type and value.
    pub fn parse_segment(segment: &str) -> Option<(LabelType, &str)> {
        Self::ALL.into_iter().find_map(|label_type| {
            segment
                .strip_prefix(label_type.prefix())
                .map(|value| (label_type, value))
        })
    }
}

/// Allowed values per label type. A type with no entry allows nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedLabels {
    allowed: BTreeMap<LabelType, BTreeSet<String>>,
}

impl AllowedLabels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<I, S>(mut self, label_type: LabelType, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed
            .entry(label_type)
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// `TARGET` from labels, `FEATURE` from features, `COMPONENT` from components.
    pub fn from_metadata(metadata: &TargetMetadata) -> Self {
        Self::new()
            .with(LabelType::Target, metadata.labels().iter().cloned())
            .with(LabelType::Feature, metadata.features().iter().cloned())
            .with(LabelType::Component, metadata.components().iter().cloned())
    }

    pub fn allows(&self, label_type: LabelType, value: &str) -> bool {
        self.allowed
            .get(&label_type)
            .is_some_and(|values| values.contains(value))
    }
}

/// Label eligibility of a single path.
pub fn is_eligible(path: &NormalizedPath, allowed: &AllowedLabels) -> bool {
    path.segments()
        .filter_map(LabelType::parse_segment)
        .all(|(label_type, value)| allowed.allows(label_type, value))
}
