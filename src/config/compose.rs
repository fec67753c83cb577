//! Default source layering
//!
//! Registers, in order:
//!
//! 1. `appsettings.json` (optional)
//! 2. `appsettings.{env}.json` (optional, only when an environment name is set)
//! 3. user secrets (only in `Development`, skipped when not set up)
//! 4. environment variables
//! 5. command-line arguments
//!
//! Later sources override earlier ones. Nothing is read until the builder is built.

use super::builder::ConfigurationBuilder;
use super::sources::{ConfigSource, JsonFileSource, UserSecretsSource};
use crate::environment::{
    resolve_environment_name, EnvironmentName, EnvironmentNameResolver, ProcessEnvironment,
};
use crate::error::ConfigurationError;
use crate::file_provider::FileProvider;
use crate::secrets::{LocalSecretsStore, SecretsLookup, SecretsStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Base settings file, always registered.
pub const BASE_SETTINGS_FILE: &str = "appsettings.json";

/// Settings file for a specific environment, e.g. `appsettings.Staging.json`.
pub fn environment_settings_file(environment: &EnvironmentName) -> PathBuf {
    PathBuf::from(format!("appsettings.{}.json", environment))
}

/// Inputs for the default source layering.
#[derive(Debug, Clone)]
pub struct DefaultLayers {
    /// Command-line tokens, without the program name.
    pub args: Vec<String>,
    /// Provider for the settings files; `None` uses the builder's default.
    pub file_provider: Option<Arc<dyn FileProvider>>,
    /// Watch file-backed sources and reload on change.
    pub reload_on_change: bool,
    /// Identifier scoping the user secrets; `None` means none configured.
    pub secrets_id: Option<String>,
}

impl Default for DefaultLayers {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            file_provider: None,
            reload_on_change: true,
            secrets_id: None,
        }
    }
}

impl DefaultLayers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn file_provider(mut self, provider: Arc<dyn FileProvider>) -> Self {
        self.file_provider = Some(provider);
        self
    }

    pub fn reload_on_change(mut self, reload_on_change: bool) -> Self {
        self.reload_on_change = reload_on_change;
        self
    }

    pub fn secrets_id(mut self, secrets_id: impl Into<String>) -> Self {
        self.secrets_id = Some(secrets_id.into());
        self
    }

    /// Append the default sources to `builder` and hand it back for chaining.
    ///
    /// Fails only when the secrets store reports a genuine misconfiguration;
    /// secrets that are simply not set up are skipped.
    pub fn apply<'b>(
        &self,
        builder: &'b mut ConfigurationBuilder,
        environment: &dyn EnvironmentNameResolver,
        secrets: &dyn SecretsStore,
    ) -> Result<&'b mut ConfigurationBuilder, ConfigurationError> {
        let environment_name = resolve_environment_name(environment);
        debug!(
            environment = environment_name
                .as_ref()
                .map(EnvironmentName::as_str)
                .unwrap_or("<none>"),
            reload_on_change = self.reload_on_change,
            "Adding default configuration sources"
        );

        builder.add_source(ConfigSource::JsonFile(self.settings_file(BASE_SETTINGS_FILE)));

        if let Some(name) = &environment_name {
            builder.add_source(ConfigSource::JsonFile(
                self.settings_file(environment_settings_file(name)),
            ));

            if name.is_development() {
                self.add_user_secrets(builder, secrets)?;
            }
        }

        builder.add_environment_variables();
        builder.add_command_line(self.args.iter().cloned());
        Ok(builder)
    }

    fn settings_file(&self, path: impl Into<PathBuf>) -> JsonFileSource {
        let source = JsonFileSource::new(path)
            .optional(true)
            .reload_on_change(self.reload_on_change);
        match &self.file_provider {
            Some(provider) => source.with_provider(Arc::clone(provider)),
            None => source,
        }
    }

    fn add_user_secrets(
        &self,
        builder: &mut ConfigurationBuilder,
        secrets: &dyn SecretsStore,
    ) -> Result<(), ConfigurationError> {
        let secrets_id = self.secrets_id.as_deref();
        match secrets.locate(secrets_id)? {
            SecretsLookup::Available(path) => {
                let id = secrets_id.map(str::trim).unwrap_or_default();
                builder.add_user_secrets(
                    UserSecretsSource::new(id, path)
                        .optional(true)
                        .reload_on_change(self.reload_on_change),
                );
            }
            skipped => {
                debug!(
                    reason = skipped.skip_reason().unwrap_or_default(),
                    "Skipping user secrets"
                );
            }
        }
        Ok(())
    }
}

impl ConfigurationBuilder {
    /// Add the default sources: settings files from the builder's provider,
    /// user secrets in `Development`, environment variables and `args`.
    ///
    /// Reads the environment name from the process environment and user
    /// secrets from [`LocalSecretsStore::from_env`].
    pub fn add_default<S: AsRef<str>>(
        &mut self,
        secrets_id: Option<&str>,
        args: &[S],
        reload_on_change: bool,
    ) -> Result<&mut Self, ConfigurationError> {
        let layers = DefaultLayers {
            args: args.iter().map(|a| a.as_ref().to_string()).collect(),
            file_provider: None,
            reload_on_change,
            secrets_id: secrets_id.map(str::to_string),
        };
        layers.apply(self, &ProcessEnvironment, &LocalSecretsStore::from_env())
    }

    /// Like [`add_default`](Self::add_default), reading the settings files
    /// through `files`.
    pub fn add_default_with_files<S: AsRef<str>>(
        &mut self,
        secrets_id: Option<&str>,
        files: Arc<dyn FileProvider>,
        args: &[S],
        reload_on_change: bool,
    ) -> Result<&mut Self, ConfigurationError> {
        let layers = DefaultLayers {
            args: args.iter().map(|a| a.as_ref().to_string()).collect(),
            file_provider: Some(files),
            reload_on_change,
            secrets_id: secrets_id.map(str::to_string),
        };
        layers.apply(self, &ProcessEnvironment, &LocalSecretsStore::from_env())
    }
}
