//! Configuration source descriptors.
//!
//! A [`ConfigSource`] records what to load; nothing is read until the owning
//! builder is materialized. Each submodule knows how to add its source to a
//! `config` crate builder, which then merges them in order (last wins).
//!
//! Keys are sections joined by `:` (`Logging:LogLevel:Default`) and compared
//! case-insensitively. Any other character, `.` included, is part of a section
//! name.

use crate::error::ConfigurationError;
use crate::file_provider::FileProvider;
use config::builder::DefaultState;
use config::{ConfigBuilder, Map, Source, Value, ValueKind};
use std::path::PathBuf;
use std::sync::Arc;

pub mod command_line;
pub mod env_vars;
pub mod json_file;
pub mod user_secrets;

pub use command_line::{CommandLineSource, SwitchMappings};
pub use env_vars::EnvironmentVariablesSource;
pub use json_file::JsonFileSource;
pub use user_secrets::UserSecretsSource;

/// One entry in a builder's ordered source list
#[derive(Debug, Clone)]
pub enum ConfigSource {
    JsonFile(JsonFileSource),
    UserSecrets(UserSecretsSource),
    EnvironmentVariables(EnvironmentVariablesSource),
    CommandLine(CommandLineSource),
}

impl ConfigSource {
    /// Stable short name of the source kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigSource::JsonFile(_) => "json",
            ConfigSource::UserSecrets(_) => "user-secrets",
            ConfigSource::EnvironmentVariables(_) => "environment",
            ConfigSource::CommandLine(_) => "command-line",
        }
    }

    /// Human-readable description for listings and logs.
    pub fn describe(&self) -> String {
        match self {
            ConfigSource::JsonFile(source) => source.path.display().to_string(),
            ConfigSource::UserSecrets(source) => {
                format!("{} ({})", source.secrets_id, source.path.display())
            }
            ConfigSource::EnvironmentVariables(source) => match &source.prefix {
                Some(prefix) => format!("prefix {}", prefix),
                None => "all variables".to_string(),
            },
            ConfigSource::CommandLine(source) => format!("{} argument(s)", source.args.len()),
        }
    }

    /// Whether the source is optional. Only file-backed sources can be required.
    pub fn is_optional(&self) -> bool {
        match self {
            ConfigSource::JsonFile(source) => source.optional,
            ConfigSource::UserSecrets(source) => source.optional,
            ConfigSource::EnvironmentVariables(_) | ConfigSource::CommandLine(_) => true,
        }
    }

    /// Whether edits to the backing file trigger a reload.
    pub fn reload_on_change(&self) -> bool {
        match self {
            ConfigSource::JsonFile(source) => source.reload_on_change,
            ConfigSource::UserSecrets(source) => source.reload_on_change,
            ConfigSource::EnvironmentVariables(_) | ConfigSource::CommandLine(_) => false,
        }
    }

    pub fn as_json_file(&self) -> Option<&JsonFileSource> {
        match self {
            ConfigSource::JsonFile(source) => Some(source),
            _ => None,
        }
    }

    pub fn as_user_secrets(&self) -> Option<&UserSecretsSource> {
        match self {
            ConfigSource::UserSecrets(source) => Some(source),
            _ => None,
        }
    }

    /// Physical file to watch, if this source reloads on change and lives on disk.
    pub(crate) fn watch_target(&self, default_provider: &Arc<dyn FileProvider>) -> Option<PathBuf> {
        if !self.reload_on_change() {
            return None;
        }
        match self {
            ConfigSource::JsonFile(source) => source
                .provider_or(default_provider)
                .physical_path(&source.path),
            ConfigSource::UserSecrets(source) => Some(source.path.clone()),
            _ => None,
        }
    }

    /// Add this source's data to a `config` builder.
    pub(crate) fn add_to_builder(
        &self,
        builder: ConfigBuilder<DefaultState>,
        default_provider: &Arc<dyn FileProvider>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigurationError> {
        match self {
            ConfigSource::JsonFile(source) => {
                json_file::add_to_builder(builder, source, source.provider_or(default_provider).as_ref())
            }
            ConfigSource::UserSecrets(source) => user_secrets::add_to_builder(builder, source),
            ConfigSource::EnvironmentVariables(source) => Ok(env_vars::add_to_builder(builder, source)),
            ConfigSource::CommandLine(source) => command_line::add_to_builder(builder, source),
        }
    }
}

/// Separates sections in a configuration key.
pub const KEY_DELIMITER: char = ':';

/// Every source nests its values under this key in the `config` builder.
///
/// `config` splits top-level keys on `.` but merges nested tables verbatim.
/// This key is not a valid `config` path, so it is stored as is and section
/// names below it are never split.
pub(crate) const ROOT_KEY: &str = "$root";

/// Normalize a configuration key: trimmed and lowercased.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Values of one source, nested into tables on [`KEY_DELIMITER`].
#[derive(Debug, Clone, Default)]
pub(crate) struct KeyTree {
    values: Map<String, Value>,
}

impl KeyTree {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Set `value` at a normalized `key`. A section replaces a scalar in its way.
    pub(crate) fn insert(&mut self, key: &str, value: Value) {
        let segments: Vec<&str> = key.split(KEY_DELIMITER).collect();
        let Some((last, sections)) = segments.split_last() else {
            return;
        };

        let mut table = &mut self.values;
        for section in sections {
            let entry = table
                .entry((*section).to_string())
                .or_insert_with(|| Value::from(Map::<String, Value>::new()));
            if !matches!(entry.kind, ValueKind::Table(_)) {
                entry.kind = ValueKind::Table(Map::new());
            }
            table = match &mut entry.kind {
                ValueKind::Table(next) => next,
                _ => return,
            };
        }
        table.insert((*last).to_string(), value);
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }
}

impl Source for KeyTree {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
        let mut root = Map::new();
        root.insert(ROOT_KEY.to_string(), Value::from(self.values.clone()));
        Ok(root)
    }
}
