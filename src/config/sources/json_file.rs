//! JSON file source: appsettings.json, appsettings.{env}.json and friends.

use super::{KeyTree, KEY_DELIMITER};
use crate::error::ConfigurationError;
use crate::file_provider::FileProvider;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, FileFormat, Format, Map, Value, ValueKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// A JSON file read through a [`FileProvider`].
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    /// Path relative to the provider root.
    pub path: PathBuf,
    /// A missing optional file contributes nothing; a missing required file fails the build.
    pub optional: bool,
    pub reload_on_change: bool,
    /// Provider for this file; `None` uses the builder's default provider.
    pub file_provider: Option<Arc<dyn FileProvider>>,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            optional: false,
            reload_on_change: false,
            file_provider: None,
        }
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn reload_on_change(mut self, reload_on_change: bool) -> Self {
        self.reload_on_change = reload_on_change;
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn FileProvider>) -> Self {
        self.file_provider = Some(provider);
        self
    }

    /// This source's provider, falling back to `default`.
    pub fn provider_or<'a>(&'a self, default: &'a Arc<dyn FileProvider>) -> &'a Arc<dyn FileProvider> {
        self.file_provider.as_ref().unwrap_or(default)
    }
}

/// Add a JSON file source to builder.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    source: &JsonFileSource,
    provider: &dyn FileProvider,
) -> Result<ConfigBuilder<DefaultState>, ConfigurationError> {
    add_json(builder, provider, &source.path, source.optional)
}

/// Read `path` through `provider` and, if present, add it to builder.
pub(crate) fn add_json(
    builder: ConfigBuilder<DefaultState>,
    provider: &dyn FileProvider,
    path: &Path,
    optional: bool,
) -> Result<ConfigBuilder<DefaultState>, ConfigurationError> {
    let contents = provider
        .read_to_string(path)
        .map_err(|e| ConfigurationError::io(path, e))?;

    match contents {
        Some(text) => {
            let values = parse_document(&text, path)?;
            debug!(path = %path.display(), keys = values.len(), "Loaded JSON configuration file");
            Ok(builder.add_source(values))
        }
        None if optional => {
            debug!(path = %path.display(), "Optional JSON configuration file not found; skipping");
            Ok(builder)
        }
        None => Err(ConfigurationError::MissingFile(path.to_path_buf())),
    }
}

/// Parse a JSON document into keyed values. Whitespace-only input is an empty document.
fn parse_document(text: &str, path: &Path) -> Result<KeyTree, ConfigurationError> {
    let mut tree = KeyTree::new();
    if text.trim().is_empty() {
        return Ok(tree);
    }

    let origin = path.display().to_string();
    let document = <FileFormat as Format>::parse(&FileFormat::Json, Some(&origin), text)
        .map_err(|cause| ConfigError::FileParse {
            uri: Some(origin.clone()),
            cause,
        })?;
    add_section(&mut tree, "", document, &origin);
    Ok(tree)
}

/// Add every leaf under `table` at `prefix:<name>`. Property names may contain
/// `:` to nest further.
fn add_section(tree: &mut KeyTree, prefix: &str, table: Map<String, Value>, origin: &String) {
    for (name, value) in table {
        let name = name.to_lowercase();
        let key = if prefix.is_empty() {
            name
        } else {
            format!("{}{}{}", prefix, KEY_DELIMITER, name)
        };
        match value.kind {
            ValueKind::Table(section) => add_section(tree, &key, section, origin),
            kind => tree.insert(&key, Value::new(Some(origin), lowercase_names(kind, origin))),
        }
    }
}

/// Lowercase property names of objects nested in arrays.
fn lowercase_names(kind: ValueKind, origin: &String) -> ValueKind {
    match kind {
        ValueKind::Table(table) => ValueKind::Table(
            table
                .into_iter()
                .map(|(name, value)| {
                    let kind = lowercase_names(value.kind, origin);
                    (name.to_lowercase(), Value::new(Some(origin), kind))
                })
                .collect(),
        ),
        ValueKind::Array(items) => ValueKind::Array(
            items
                .into_iter()
                .map(|item| Value::new(Some(origin), lowercase_names(item.kind, origin)))
                .collect(),
        ),
        other => other,
    }
}
