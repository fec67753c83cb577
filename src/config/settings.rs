//! Merged values at one point in time.

use super::sources::{normalize_key, KEY_DELIMITER, ROOT_KEY};
use crate::error::ConfigurationError;
use config::builder::DefaultState;
use config::{ConfigBuilder, Map, Source, Value, ValueKind};
use serde::de::DeserializeOwned;

/// Merged configuration values.
///
/// Keys are sections joined by `:` and match case-insensitively. A numeric
/// section indexes into an array (`Tags:0`).
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: Map<String, Value>,
}

impl Settings {
    /// Merge the builder's sources in order.
    pub(crate) fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigurationError> {
        let mut merged = builder.build()?.collect()?;
        let values = match merged.remove(ROOT_KEY) {
            Some(root) => root.into_table()?,
            None => Map::new(),
        };
        Ok(Self { values })
    }

    /// Raw value at `key`.
    pub fn value(&self, key: &str) -> Option<&Value> {
        let key = normalize_key(key);
        if key.is_empty() {
            return None;
        }

        let mut sections = key.split(KEY_DELIMITER);
        let first = sections.next()?;
        let mut current = self.values.get(first)?;
        for section in sections {
            current = match &current.kind {
                ValueKind::Table(table) => table.get(section)?,
                ValueKind::Array(items) => items.get(section.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Typed value at `key`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigurationError> {
        let value = self
            .value(key)
            .cloned()
            .ok_or_else(|| config::ConfigError::NotFound(key.to_string()))?;
        Ok(value.try_deserialize()?)
    }

    /// Like [`get`](Self::get), but a missing key is `Ok(None)`.
    pub fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigurationError> {
        match self.value(key) {
            Some(value) => Ok(Some(value.clone().try_deserialize()?)),
            None => Ok(None),
        }
    }

    pub fn get_string(&self, key: &str) -> Result<String, ConfigurationError> {
        self.get(key)
    }

    /// Deserialize every value.
    pub fn try_deserialize<T: DeserializeOwned>(&self) -> Result<T, ConfigurationError> {
        Ok(Value::from(self.values.clone()).try_deserialize()?)
    }

    /// Top-level sections, keyed by lowercased name.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
