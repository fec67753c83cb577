//! User secrets source: `<secrets root>/<id>/secrets.json`.

use super::json_file;
use crate::error::ConfigurationError;
use crate::file_provider::PhysicalFileProvider;
use config::builder::DefaultState;
use config::ConfigBuilder;
use std::path::{Path, PathBuf};

/// The secrets file for one secrets id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSecretsSource {
    pub secrets_id: String,
    /// Full path of the secrets file.
    pub path: PathBuf,
    pub optional: bool,
    pub reload_on_change: bool,
}

impl UserSecretsSource {
    pub fn new(secrets_id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            secrets_id: secrets_id.into(),
            path: path.into(),
            optional: true,
            reload_on_change: false,
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
}

/// Add the secrets file to builder; a missing optional file adds nothing.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    source: &UserSecretsSource,
) -> Result<ConfigBuilder<DefaultState>, ConfigurationError> {
    let dir = source.path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = source
        .path
        .file_name()
        .map(Path::new)
        .ok_or_else(|| ConfigurationError::MissingFile(source.path.clone()))?;

    let provider = PhysicalFileProvider::new(dir);
    json_file::add_json(builder, &provider, file_name, source.optional)
}
