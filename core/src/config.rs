//! Processor configuration - optional key lookup with default fallback.
//!
//! A [`ProcessorConfig`] is a flat mapping of keys to JSON values. Builders
//! read the keys they understand with [`ProcessorConfig::get_or`]; keys that
//! are missing (or explicitly `null`) fall back to the builder's default.
//!
//! Training configurations select a processor with a [`ProcessorSpec`]:
//!
//! ```yaml
//! name: blip_coco_text
//! prompt: "a picture of "
//! max_words: 30
//! ```

use crate::error::{ProcessorError, ProcessorResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key/value configuration consumed by processor builders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessorConfig {
    values: Map<String, Value>,
}

impl ProcessorConfig {
    /// Create an empty config. Every lookup returns its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a config from a JSON value.
    ///
    /// `null` is treated as an empty config; any other non-object root is rejected.
    pub fn from_value(value: Value) -> ProcessorResult<Self> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            Value::Null => Ok(Self::default()),
            other => Err(ProcessorError::InvalidConfig(format!(
                "processor config must be a mapping (got {})",
                value_kind(&other)
            ))),
        }
    }

    /// Parse a config from a JSON document.
    pub fn from_json_str(json: &str) -> ProcessorResult<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parse a config from a YAML document.
    pub fn from_yaml_str(yaml: &str) -> ProcessorResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_yaml::from_str(yaml)?;
        Self::from_value(value)
    }

    /// Set a key, returning the updated config.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Set a key in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Look up `key`, returning `None` when it is missing or `null`.
    ///
    /// A value that cannot be deserialized as `T` is a config error rather
    /// than a silent fallback to the default.
    pub fn get_opt<T: DeserializeOwned>(&self, key: &str) -> ProcessorResult<Option<T>> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| {
                    ProcessorError::InvalidConfig(format!(
                        "key '{}' has an unexpected value {}: {}",
                        key, value, e
                    ))
                }),
        }
    }

    /// Look up `key`, falling back to `default` when it is missing or `null`.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> ProcessorResult<T> {
        Ok(self.get_opt(key)?.unwrap_or(default))
    }

    /// Whether `key` is present (even if `null`).
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Configured keys in insertion-independent (sorted) order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl From<Map<String, Value>> for ProcessorConfig {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

/// A processor selection: registry name plus its configuration keys.
///
/// The configuration keys sit next to `name` in the same mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorSpec {
    /// Registry key (e.g. `blip_coco_vis_eval`)
    pub name: String,

    /// Remaining keys, passed to the processor builder
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl ProcessorSpec {
    /// Create a spec with no configuration keys.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Map::new(),
        }
    }

    /// Add a configuration key.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn from_json_str(json: &str) -> ProcessorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_yaml_str(yaml: &str) -> ProcessorResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// The configuration handed to the processor builder.
    pub fn config(&self) -> ProcessorConfig {
        ProcessorConfig::from(self.params.clone())
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}
