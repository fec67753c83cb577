//! CLI route: run context and command dispatch.

use crate::cli::output::{
    format_sources_json, format_sources_text, format_value_json, format_value_text,
};
use crate::cli::parse::{Cli, Commands};
use crate::config::{Configuration, ConfigurationBuilder};
use crate::error::ConfigurationError;
use serde_json::Value;
use std::sync::mpsc;
use tracing::info;

/// Runtime context for CLI execution: the composed configuration.
pub struct RunContext {
    configuration: Configuration,
}

impl RunContext {
    /// Compose the default sources rooted at `--dir` and build them.
    pub fn new(cli: &Cli) -> Result<Self, ConfigurationError> {
        let mut builder = ConfigurationBuilder::new();
        builder.set_base_path(&cli.dir).add_default(
            cli.secrets_id.as_deref(),
            cli.command.forwarded_args(),
            !cli.no_reload,
        )?;
        let configuration = builder.build()?;
        info!(
            sources = configuration.sources().len(),
            watching = configuration.is_watching(),
            "Configuration composed"
        );
        Ok(Self { configuration })
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Run a one-shot command and return its output.
    pub fn execute(&self, command: &Commands) -> Result<String, ConfigurationError> {
        match command {
            Commands::Show { key, format, .. } => self.render(key.as_deref(), format),
            Commands::Sources { format, .. } => {
                let sources = self.configuration.sources();
                match format.as_str() {
                    "json" => Ok(format_sources_json(sources)),
                    _ => Ok(format_sources_text(sources)),
                }
            }
            Commands::Watch { key, .. } => self.render(key.as_deref(), "text"),
        }
    }

    /// Emit the rendered configuration now and after every reload. Blocks
    /// until the process is interrupted.
    pub fn watch<F>(&self, key: Option<&str>, mut emit: F) -> Result<(), ConfigurationError>
    where
        F: FnMut(&str),
    {
        if !self.configuration.is_watching() {
            return Err(ConfigurationError::Watch(
                "nothing to watch: reload is disabled or no settings directory exists".to_string(),
            ));
        }

        let (tx, rx) = mpsc::channel();
        self.configuration.on_reload(move |_| {
            let _ = tx.send(());
        });

        emit(&self.render(key, "text")?);
        for () in rx {
            match self.render(key, "text") {
                Ok(output) => emit(&output),
                Err(e) => emit(&format!("error: {}", e)),
            }
        }
        Ok(())
    }

    /// Whole configuration, or the value at `key`.
    fn render(&self, key: Option<&str>, format: &str) -> Result<String, ConfigurationError> {
        let value: Value = match key {
            Some(key) => self.configuration.get(key)?,
            None => self.configuration.try_deserialize()?,
        };
        Ok(match format {
            "json" => format_value_json(&value),
            _ => format_value_text(key, &value),
        })
    }
}
