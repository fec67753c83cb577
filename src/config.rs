//! Configuration System
//!
//! Sources are collected in order on a [`ConfigurationBuilder`] and merged by
//! the `config` crate when built; later sources override earlier ones. The
//! [`compose`] module wires the default layering of settings files, user
//! secrets, environment variables and command-line arguments.

mod builder;
pub mod compose;
mod root;
mod settings;
pub mod sources;

pub use builder::ConfigurationBuilder;
pub use compose::{environment_settings_file, DefaultLayers, BASE_SETTINGS_FILE};
pub use root::{Configuration, RELOAD_DELAY};
pub use settings::Settings;
pub use sources::{
    normalize_key, CommandLineSource, ConfigSource, EnvironmentVariablesSource, JsonFileSource,
    SwitchMappings, UserSecretsSource, KEY_DELIMITER,
};
