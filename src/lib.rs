//! appsettings: default configuration layering
//!
//! Registers, in precedence order, `appsettings.json`, `appsettings.{env}.json`,
//! development user secrets, environment variables and command-line arguments
//! on a [`ConfigurationBuilder`](crate::config::ConfigurationBuilder), then merges them with the `config`
//! crate and keeps the result current as settings files change.
//!
//! ```no_run
//! use appsettings::config::ConfigurationBuilder;
//!
//! let args: Vec<String> = std::env::args().skip(1).collect();
//! let mut builder = ConfigurationBuilder::new();
//! builder.add_default(Some("my-app"), &args, true)?;
//! let configuration = builder.build()?;
//! let port: u16 = configuration.get("server:port")?;
//! # Ok::<(), appsettings::error::ConfigurationError>(())
//! ```

pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod file_provider;
pub mod logging;
pub mod secrets;
