//! Environment variable source.
//!
//! `__` in a variable name nests like `:` (so `LOGGING__LEVEL` sets
//! `logging:level`); names are matched case-insensitively.

use super::{normalize_key, KeyTree, KEY_DELIMITER};
use config::builder::DefaultState;
use config::{ConfigBuilder, Map, Value};

/// Nesting separator for shells that do not allow `:` in variable names.
pub const SEPARATOR: &str = "__";

#[derive(Debug, Clone, Default)]
pub struct EnvironmentVariablesSource {
    /// Only variables starting with `<prefix>_` are read, with the prefix stripped.
    pub prefix: Option<String>,
    /// Fixed variables to read instead of the process environment.
    pub vars: Option<Map<String, String>>,
}

impl EnvironmentVariablesSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to variables named `<prefix>_...`. A trailing `_` on `prefix` is ignored.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            prefix: Some(prefix.trim_end_matches('_').to_string()),
            vars: None,
        }
    }

    /// Read from a fixed set of variables rather than the process environment.
    pub fn with_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.vars = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Variables sorted by name, so a key spelled two ways resolves the same on every run.
    fn variables(&self) -> Vec<(String, String)> {
        let mut vars: Vec<(String, String)> = match &self.vars {
            Some(vars) => vars.clone().into_iter().collect(),
            None => std::env::vars_os()
                .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
                .collect(),
        };
        vars.sort();
        vars
    }

    /// Configuration key for a variable name, or `None` when the prefix does not match.
    fn key_for(&self, name: &str) -> Option<String> {
        let name = match self.prefix.as_deref().filter(|p| !p.is_empty()) {
            Some(prefix) => {
                let head = name.get(..prefix.len())?;
                if !head.eq_ignore_ascii_case(prefix) {
                    return None;
                }
                name[prefix.len()..].strip_prefix('_')?
            }
            None => name,
        };
        let key = normalize_key(&name.replace(SEPARATOR, &KEY_DELIMITER.to_string()));
        (!key.is_empty()).then_some(key)
    }
}

/// Add environment variables to builder.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    source: &EnvironmentVariablesSource,
) -> ConfigBuilder<DefaultState> {
    let origin = "the environment".to_string();
    let mut values = KeyTree::new();
    for (name, value) in source.variables() {
        if let Some(key) = source.key_for(&name) {
            values.insert(&key, Value::new(Some(&origin), value));
        }
    }
    builder.add_source(values)
}
