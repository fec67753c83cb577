//! User secrets store
//!
//! User secrets are developer-local settings kept outside the source tree, one
//! `secrets.json` per secrets id. The composer asks the store where the secrets
//! for an id live before registering them; the lookup answers with a
//! [`SecretsLookup`] instead of failing when secrets are simply not set up.

use crate::error::ConfigurationError;
use std::path::{Path, PathBuf};

/// Overrides the platform location of the secrets root.
pub const USER_SECRETS_DIR_ENV: &str = "USER_SECRETS_DIR";

/// File name of the secrets file inside an id directory.
pub const SECRETS_FILE_NAME: &str = "secrets.json";

/// Outcome of looking up the secrets file for an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretsLookup {
    /// Secrets for the id live at this path (the file itself may not exist yet).
    Available(PathBuf),
    /// No secrets id was configured.
    NotConfigured,
    /// The store root cannot be located on this machine.
    StoreUnavailable,
    /// The platform has no user secrets store.
    Unsupported,
}

impl SecretsLookup {
    /// Short reason for a lookup that yields no secrets.
    pub fn skip_reason(&self) -> Option<&'static str> {
        match self {
            SecretsLookup::Available(_) => None,
            SecretsLookup::NotConfigured => Some("no secrets id configured"),
            SecretsLookup::StoreUnavailable => Some("secrets store location unavailable"),
            SecretsLookup::Unsupported => Some("user secrets unsupported on this platform"),
        }
    }
}

/// Locates the secrets file for a secrets id.
pub trait SecretsStore {
    /// Find where the secrets for `secrets_id` live.
    ///
    /// Return `Err` only for genuine misconfiguration; the benign "not set up"
    /// cases are expressed through [`SecretsLookup`].
    fn locate(&self, secrets_id: Option<&str>) -> Result<SecretsLookup, ConfigurationError>;
}

/// Secrets stored as `<root>/<id>/secrets.json` on the local machine.
#[derive(Debug, Clone, Default)]
pub struct LocalSecretsStore {
    root: Option<PathBuf>,
}

impl LocalSecretsStore {
    /// Store rooted at an explicit directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Store rooted at `$USER_SECRETS_DIR`, else `<config dir>/user-secrets`.
    pub fn from_env() -> Self {
        let root = std::env::var(USER_SECRETS_DIR_ENV)
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .or_else(default_secrets_root);
        Self { root }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }
}

fn default_secrets_root() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.config_dir().join("user-secrets"))
}

impl SecretsStore for LocalSecretsStore {
    fn locate(&self, secrets_id: Option<&str>) -> Result<SecretsLookup, ConfigurationError> {
        if cfg!(target_family = "wasm") {
            return Ok(SecretsLookup::Unsupported);
        }

        let id = match secrets_id.map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => return Ok(SecretsLookup::NotConfigured),
        };
        validate_secrets_id(id)?;

        match &self.root {
            Some(root) => Ok(SecretsLookup::Available(
                root.join(id).join(SECRETS_FILE_NAME),
            )),
            None => Ok(SecretsLookup::StoreUnavailable),
        }
    }
}

/// Secrets ids become directory names, so they must be a single safe segment.
fn validate_secrets_id(id: &str) -> Result<(), ConfigurationError> {
    let valid_chars = id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if !valid_chars || id == "." || id == ".." {
        return Err(ConfigurationError::InvalidSecretsId(id.to_string()));
    }
    Ok(())
}
