//! Command-line argument source.
//!
//! Recognized forms:
//!
//! - `--key=value`, `/key=value`, `key=value`
//! - `--key value`, `/key value`
//! - `-k value`, `--alias value`, `-k=value` through switch mappings only
//!
//! A switch with no following token is ignored, as are bare tokens without `=`.
//! A single-dash switch with no mapping is rejected. Keys nest on `:` only.

use super::{normalize_key, KeyTree};
use crate::error::ConfigurationError;
use config::builder::DefaultState;
use config::{ConfigBuilder, Value};
use std::collections::HashMap;

/// Maps short or alias switches (`-p`, `--port`) to configuration keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitchMappings {
    // lowercased switch -> configuration key
    mappings: HashMap<String, String>,
}

impl SwitchMappings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(switch, key)` pairs.
    ///
    /// Every switch must start with `-` or `--`, and no switch may appear twice
    /// (compared case-insensitively).
    pub fn try_from_pairs<I, S, K>(pairs: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (S, K)>,
        S: AsRef<str>,
        K: AsRef<str>,
    {
        let mut mappings = HashMap::new();
        for (switch, key) in pairs {
            let switch = switch.as_ref();
            if !switch.starts_with('-') || switch.trim_start_matches('-').is_empty() {
                return Err(ConfigurationError::InvalidSwitchMapping(format!(
                    "'{}' must start with '-' or '--'",
                    switch
                )));
            }
            if mappings
                .insert(switch.to_lowercase(), key.as_ref().to_string())
                .is_some()
            {
                return Err(ConfigurationError::InvalidSwitchMapping(format!(
                    "'{}' is mapped more than once",
                    switch
                )));
            }
        }
        Ok(Self { mappings })
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    fn get(&self, switch: &str) -> Option<&str> {
        self.mappings.get(&switch.to_lowercase()).map(String::as_str)
    }
}

/// Command-line tokens to parse at build time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLineSource {
    pub args: Vec<String>,
    pub switch_mappings: SwitchMappings,
}

impl CommandLineSource {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            switch_mappings: SwitchMappings::default(),
        }
    }

    pub fn with_switch_mappings(mut self, switch_mappings: SwitchMappings) -> Self {
        self.switch_mappings = switch_mappings;
        self
    }

    /// Parse the arguments into `(key, value)` pairs, in argument order.
    pub fn parse(&self) -> Result<Vec<(String, String)>, ConfigurationError> {
        let mut pairs = Vec::new();
        let mut tokens = self.args.iter();

        while let Some(token) = tokens.next() {
            // `/key` is treated as `--key`
            let (switch, key_start) = if token.starts_with("--") {
                (token.clone(), 2)
            } else if token.starts_with('-') {
                (token.clone(), 1)
            } else if let Some(rest) = token.strip_prefix('/') {
                (format!("--{}", rest), 2)
            } else {
                (token.clone(), 0)
            };

            let (key, value) = match switch.find('=') {
                Some(eq) => {
                    let name = &switch[..eq];
                    let key = match self.switch_mappings.get(name) {
                        Some(mapped) => mapped.to_string(),
                        None if key_start == 1 => return Err(unmapped_short_switch(token)),
                        None => name[key_start..].to_string(),
                    };
                    (key, switch[eq + 1..].to_string())
                }
                None => {
                    if key_start == 0 {
                        continue;
                    }
                    let key = match self.switch_mappings.get(&switch) {
                        Some(mapped) => mapped.to_string(),
                        None if key_start == 1 => return Err(unmapped_short_switch(token)),
                        None => switch[key_start..].to_string(),
                    };
                    match tokens.next() {
                        Some(value) => (key, value.clone()),
                        None => continue,
                    }
                }
            };

            let key = normalize_key(&key);
            if !key.is_empty() {
                pairs.push((key, value));
            }
        }

        Ok(pairs)
    }
}

fn unmapped_short_switch(token: &str) -> ConfigurationError {
    ConfigurationError::CommandLineFormat(format!(
        "short switch '{}' is not defined in the switch mappings",
        token
    ))
}

/// Parse the arguments and add them to builder.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    source: &CommandLineSource,
) -> Result<ConfigBuilder<DefaultState>, ConfigurationError> {
    let origin = "command line".to_string();
    let mut values = KeyTree::new();
    for (key, value) in source.parse()? {
        values.insert(&key, Value::new(Some(&origin), value));
    }
    Ok(builder.add_source(values))
}
