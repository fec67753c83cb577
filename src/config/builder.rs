//! Ordered list of configuration sources.

use super::root::Configuration;
use super::sources::{
    CommandLineSource, ConfigSource, EnvironmentVariablesSource, JsonFileSource, SwitchMappings,
    UserSecretsSource,
};
use crate::error::ConfigurationError;
use crate::file_provider::{FileProvider, PhysicalFileProvider};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Accumulates configuration sources in order; later sources override earlier
/// ones for the same key once built.
///
/// Adding a source never touches the filesystem; files are read by [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct ConfigurationBuilder {
    sources: Vec<ConfigSource>,
    file_provider: Option<Arc<dyn FileProvider>>,
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve JSON files without their own provider under `path`.
    pub fn set_base_path(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.file_provider = Some(Arc::new(PhysicalFileProvider::new(path)));
        self
    }

    /// Default provider for JSON files without their own provider.
    pub fn set_file_provider(&mut self, provider: Arc<dyn FileProvider>) -> &mut Self {
        self.file_provider = Some(provider);
        self
    }

    pub fn file_provider(&self) -> Option<&Arc<dyn FileProvider>> {
        self.file_provider.as_ref()
    }

    pub fn add_source(&mut self, source: ConfigSource) -> &mut Self {
        debug!(
            kind = source.kind(),
            source = %source.describe(),
            position = self.sources.len(),
            "Added configuration source"
        );
        self.sources.push(source);
        self
    }

    pub fn add_json_file(
        &mut self,
        path: impl Into<PathBuf>,
        optional: bool,
        reload_on_change: bool,
    ) -> &mut Self {
        self.add_source(ConfigSource::JsonFile(
            JsonFileSource::new(path)
                .optional(optional)
                .reload_on_change(reload_on_change),
        ))
    }

    pub fn add_json_file_with_provider(
        &mut self,
        provider: Arc<dyn FileProvider>,
        path: impl Into<PathBuf>,
        optional: bool,
        reload_on_change: bool,
    ) -> &mut Self {
        self.add_source(ConfigSource::JsonFile(
            JsonFileSource::new(path)
                .optional(optional)
                .reload_on_change(reload_on_change)
                .with_provider(provider),
        ))
    }

    pub fn add_user_secrets(&mut self, source: UserSecretsSource) -> &mut Self {
        self.add_source(ConfigSource::UserSecrets(source))
    }

    pub fn add_environment_variables(&mut self) -> &mut Self {
        self.add_source(ConfigSource::EnvironmentVariables(
            EnvironmentVariablesSource::new(),
        ))
    }

    pub fn add_environment_variables_with_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.add_source(ConfigSource::EnvironmentVariables(
            EnvironmentVariablesSource::with_prefix(prefix),
        ))
    }

    pub fn add_command_line<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_source(ConfigSource::CommandLine(CommandLineSource::new(args)))
    }

    pub fn add_command_line_with_mappings<I, S>(
        &mut self,
        args: I,
        switch_mappings: SwitchMappings,
    ) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_source(ConfigSource::CommandLine(
            CommandLineSource::new(args).with_switch_mappings(switch_mappings),
        ))
    }

    /// Sources in insertion order.
    pub fn sources(&self) -> &[ConfigSource] {
        &self.sources
    }

    /// Read every source in order and merge them.
    ///
    /// Without an explicit provider, JSON paths resolve against the current
    /// directory. Sources added with reload-on-change are watched from here on.
    pub fn build(&self) -> Result<Configuration, ConfigurationError> {
        let provider: Arc<dyn FileProvider> = match &self.file_provider {
            Some(provider) => Arc::clone(provider),
            None => {
                let cwd = std::env::current_dir().map_err(|e| ConfigurationError::io(".", e))?;
                Arc::new(PhysicalFileProvider::new(cwd))
            }
        };
        Configuration::load(self.sources.clone(), provider)
    }
}
