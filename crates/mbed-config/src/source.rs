//! Descriptor loading
//!
//! A [`Source`] is one normalized configuration fragment: the target
//! descriptor, a library's `mbed_lib.json`, or the application's
//! `mbed_app.json`. Loading validates the descriptor's shape and passes the
//! data through untouched otherwise. Keys are *not* namespaced here; that is
//! the merger's job.
//!
//! # Descriptor shape
//!
//! ```json
//! {
//!     "name": "events",
//!     "config": {
//!         "present": 1,
//!         "shared-stacksize": { "value": 2048, "help": "Stack size", "macro_name": "EVENTS_STACK" }
//!     },
//!     "target_overrides": {
//!         "*": { "target.features_add": ["BLE"] },
//!         "K64F": { "shared-stacksize": 4096 }
//!     },
//!     "macros": ["EVENTS_ENABLED"]
//! }
//! ```

use mbed_fs::NormalizedPath;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::classify::CumulativeAttribute;
use crate::{Error, Result};

/// Namespace of the target descriptor.
pub const TARGET_NAMESPACE: &str = "target";

/// Namespace of the application descriptor.
pub const APP_NAMESPACE: &str = "app";

/// Selector that applies an override block regardless of target labels.
pub const ANY_SELECTOR: &str = "*";

/// A declared or overriding value, normalized from either the bare
/// (`"key": 10`) or structured (`"key": {"value": 10, "help": ...}`) form.
#[derive(Debug, Clone, PartialEq)]
pub struct Setting {
    pub value: Value,
    pub help: Option<String>,
    pub macro_name: Option<String>,
}

impl Setting {
    /// A bare value with no help text or explicit macro name.
    pub fn bare(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            help: None,
            macro_name: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_macro_name(mut self, macro_name: impl Into<String>) -> Self {
        self.macro_name = Some(macro_name.into());
        self
    }

    /// Normalize a raw descriptor value.
    ///
    /// Objects are the structured form: `value` defaults to `null`, and
    /// `help`/`macro_name` must be strings when present.
    fn from_raw(key: &str, raw: Value) -> std::result::Result<Self, String> {
        let mut fields = match raw {
            Value::Object(fields) => fields,
            other => return Ok(Self::bare(other)),
        };

        let value = fields.remove("value").unwrap_or(Value::Null);
        let help = optional_string(&mut fields, key, "help")?;
        let macro_name = optional_string(&mut fields, key, "macro_name")?;
        Ok(Self {
            value,
            help,
            macro_name,
        })
    }
}

fn optional_string(
    fields: &mut Map<String, Value>,
    key: &str,
    field: &str,
) -> std::result::Result<Option<String>, String> {
    match fields.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(format!(
            "`{field}` of `{key}` must be a string, found {other}"
        )),
    }
}

/// Which target labels an override block applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// `"*"`: always applies
    Any,
    /// Applies when the label is in the resolved label set
    Label(String),
}

impl Selector {
    pub fn parse(raw: &str) -> Self {
        if raw == ANY_SELECTOR {
            Selector::Any
        } else {
            Selector::Label(raw.to_string())
        }
    }

    /// Whether this block applies under the given label set.
    pub fn matches(&self, labels: &BTreeSet<String>) -> bool {
        match self {
            Selector::Any => true,
            Selector::Label(label) => labels.contains(label),
        }
    }
}

/// One `target_overrides` block, entries in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetOverride {
    pub selector: Selector,
    pub entries: Vec<(String, Setting)>,
}

/// A normalized configuration fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    /// Human-readable provenance, used in diagnostics and `set_by`
    pub origin: String,
    /// Prefix for un-namespaced keys
    pub namespace: String,
    /// Declared settings in declaration order (keys unique, last duplicate wins)
    pub config: Vec<(String, Setting)>,
    /// Override blocks in declaration order
    pub target_overrides: Vec<TargetOverride>,
    /// Bare preprocessor symbols
    pub macros: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawDescriptor {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    config: Map<String, Value>,
    #[serde(default)]
    target_overrides: Map<String, Value>,
    #[serde(default)]
    macros: Vec<String>,
}

/// Top-level cumulative arrays only a target descriptor may carry.
#[derive(Debug, Default, Deserialize)]
struct RawTargetAttributes {
    #[serde(default)]
    components: Option<Vec<String>>,
    #[serde(default)]
    device_has: Option<Vec<String>>,
    #[serde(default)]
    extra_labels: Option<Vec<String>>,
    #[serde(default)]
    features: Option<Vec<String>>,
    #[serde(default)]
    labels: Option<Vec<String>>,
}

impl RawTargetAttributes {
    fn declared(self) -> Vec<(CumulativeAttribute, Vec<String>)> {
        [
            (CumulativeAttribute::Components, self.components),
            (CumulativeAttribute::DeviceHas, self.device_has),
            (CumulativeAttribute::ExtraLabels, self.extra_labels),
            (CumulativeAttribute::Features, self.features),
            (CumulativeAttribute::Labels, self.labels),
        ]
        .into_iter()
        .filter_map(|(attr, values)| values.map(|v| (attr, v)))
        .collect()
    }
}

impl Source {
    /// An empty fragment; mostly useful for building sources in code.
    pub fn new(origin: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            namespace: namespace.into(),
            config: Vec::new(),
            target_overrides: Vec::new(),
            macros: Vec::new(),
        }
    }

    /// Declare a setting (replaces an earlier declaration of the same key).
    pub fn with_config(mut self, key: impl Into<String>, setting: Setting) -> Self {
        let key = key.into();
        self.config.retain(|(existing, _)| *existing != key);
        self.config.push((key, setting));
        self
    }

    /// Append an override entry to the block for `selector`, creating the
    /// block if needed.
    pub fn with_override(
        mut self,
        selector: &str,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        let selector = Selector::parse(selector);
        let entry = (key.into(), Setting::bare(value));
        match self
            .target_overrides
            .iter_mut()
            .find(|block| block.selector == selector)
        {
            Some(block) => block.entries.push(entry),
            None => self.target_overrides.push(TargetOverride {
                selector,
                entries: vec![entry],
            }),
        }
        self
    }

    pub fn with_macros<I, S>(mut self, macros: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.macros.extend(macros.into_iter().map(Into::into));
        self
    }

    /// Load a library descriptor (`mbed_lib.json`); its namespace is its
    /// declared `name`, which is mandatory.
    pub fn from_library_file(path: &NormalizedPath) -> Result<Self> {
        let content = mbed_fs::io::read_text(path)?;
        Self::from_library_str(path.as_str(), &content)
    }

    /// Parse library descriptor text. `origin` names the file in errors.
    pub fn from_library_str(origin: &str, content: &str) -> Result<Self> {
        let raw = parse_raw(origin, content)?;
        let namespace = raw
            .name
            .clone()
            .ok_or_else(|| Error::descriptor(origin, "library descriptor has no `name`"))?;
        Self::from_raw(origin, namespace, raw)
    }

    /// Load the application descriptor (`mbed_app.json`), namespace `app`.
    pub fn from_app_file(path: &NormalizedPath) -> Result<Self> {
        let content = mbed_fs::io::read_text(path)?;
        Self::from_app_str(path.as_str(), &content)
    }

    /// Parse application descriptor text; any `name` it declares is ignored.
    pub fn from_app_str(origin: &str, content: &str) -> Result<Self> {
        let raw = parse_raw(origin, content)?;
        Self::from_raw(origin, APP_NAMESPACE.to_string(), raw)
    }

    /// Load a target descriptor, namespace `target`.
    pub fn from_target_file(path: &NormalizedPath) -> Result<Self> {
        let content = mbed_fs::io::read_text(path)?;
        Self::from_target_str(path.as_str(), &content)
    }

    /// Parse target descriptor text.
    ///
    /// Top-level `labels`, `features`, `components`, `device_has` and
    /// `extra_labels` arrays become a leading `"*"` block of
    /// `target.<attribute>` replace overrides, so the target seeds the
    /// cumulative metadata through the ordinary merge path. Its `macros`
    /// are bare macros like any other descriptor's.
    pub fn from_target_str(origin: &str, content: &str) -> Result<Self> {
        let value = parse_object(origin, content)?;
        let attributes = RawTargetAttributes::deserialize(&value)
            .map_err(|e| Error::descriptor(origin, e.to_string()))?;
        let raw = RawDescriptor::deserialize(value)
            .map_err(|e| Error::descriptor(origin, e.to_string()))?;

        let mut source = Self::from_raw(origin, TARGET_NAMESPACE.to_string(), raw)?;
        let declared: Vec<(String, Setting)> = attributes
            .declared()
            .into_iter()
            .map(|(attr, values)| {
                (
                    format!("{TARGET_NAMESPACE}.{attr}"),
                    Setting::bare(Value::from(values)),
                )
            })
            .collect();
        if !declared.is_empty() {
            source.target_overrides.insert(
                0,
                TargetOverride {
                    selector: Selector::Any,
                    entries: declared,
                },
            );
        }
        Ok(source)
    }

    fn from_raw(origin: &str, namespace: String, raw: RawDescriptor) -> Result<Self> {
        let mut config = Vec::with_capacity(raw.config.len());
        for (key, value) in raw.config {
            let setting =
                Setting::from_raw(&key, value).map_err(|message| Error::descriptor(origin, message))?;
            config.push((key, setting));
        }

        let mut target_overrides = Vec::with_capacity(raw.target_overrides.len());
        for (selector, block) in raw.target_overrides {
            let Value::Object(block) = block else {
                return Err(Error::descriptor(
                    origin,
                    format!("target_overrides[\"{selector}\"] must be an object"),
                ));
            };
            let mut entries = Vec::with_capacity(block.len());
            for (key, value) in block {
                let setting = Setting::from_raw(&key, value)
                    .map_err(|message| Error::descriptor(origin, message))?;
                entries.push((key, setting));
            }
            target_overrides.push(TargetOverride {
                selector: Selector::parse(&selector),
                entries,
            });
        }

        tracing::debug!(
            origin,
            namespace = %namespace,
            settings = config.len(),
            override_blocks = target_overrides.len(),
            "Loaded descriptor"
        );

        Ok(Self {
            origin: origin.to_string(),
            namespace,
            config,
            target_overrides,
            macros: raw.macros,
        })
    }
}

/// Parse descriptor text; the top level must be an object.
fn parse_object(origin: &str, content: &str) -> Result<Value> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| Error::descriptor(origin, e.to_string()))?;
    if !value.is_object() {
        return Err(Error::descriptor(origin, "top-level value must be an object"));
    }
    Ok(value)
}

fn parse_raw(origin: &str, content: &str) -> Result<RawDescriptor> {
    let value = parse_object(origin, content)?;
    RawDescriptor::deserialize(value).map_err(|e| Error::descriptor(origin, e.to_string()))
}
