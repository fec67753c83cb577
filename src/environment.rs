//! Environment name resolution
//!
//! The environment name selects the environment-specific settings file and
//! decides whether user secrets are consulted. It is read through the
//! [`EnvironmentNameResolver`] capability so callers and tests can substitute a
//! deterministic source for the real process environment.

use std::collections::HashMap;
use std::fmt;

/// Environment variable read first when resolving the environment name.
pub const GENERIC_HOST_ENVIRONMENT: &str = "DOTNET_ENVIRONMENT";

/// Environment variable read when the generic host variable is unset or blank.
pub const WEB_HOST_ENVIRONMENT: &str = "ASPNETCORE_ENVIRONMENT";

/// Reads named variables from some environment.
pub trait EnvironmentNameResolver {
    /// Return the raw value of `name`, or `None` when it is not set.
    fn variable(&self, name: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl EnvironmentNameResolver for ProcessEnvironment {
    fn variable(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// A fixed set of variables.
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    vars: HashMap<String, String>,
}

impl StaticEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a variable.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvironmentNameResolver for StaticEnvironment {
    fn variable(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// A trimmed, non-empty environment name such as `Development` or `Production`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnvironmentName(String);

impl EnvironmentName {
    pub const DEVELOPMENT: &'static str = "Development";
    pub const STAGING: &'static str = "Staging";
    pub const PRODUCTION: &'static str = "Production";

    /// Trim `raw` and wrap it; blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against another environment name.
    pub fn is(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }

    pub fn is_development(&self) -> bool {
        self.is(Self::DEVELOPMENT)
    }

    pub fn is_staging(&self) -> bool {
        self.is(Self::STAGING)
    }

    pub fn is_production(&self) -> bool {
        self.is(Self::PRODUCTION)
    }
}

impl fmt::Display for EnvironmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EnvironmentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Resolve the effective environment name.
///
/// [`GENERIC_HOST_ENVIRONMENT`] wins over [`WEB_HOST_ENVIRONMENT`]. A variable
/// that is unset or blank after trimming is skipped, so a blank generic host
/// value falls through to the web host value.
pub fn resolve_environment_name(env: &dyn EnvironmentNameResolver) -> Option<EnvironmentName> {
    [GENERIC_HOST_ENVIRONMENT, WEB_HOST_ENVIRONMENT]
        .iter()
        .filter_map(|name| env.variable(name))
        .find_map(|raw| EnvironmentName::parse(&raw))
}
