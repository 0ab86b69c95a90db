use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use serde::Deserialize;
use thiserror::Error;

use crate::credentials::AppCredentials;
use crate::date::DateFormat;

/// Prefix of the environment variables read by [`ApiClientConfig::load`].
pub const ENV_PREFIX: &str = "IDENTITY_API_";

/// Relative path of the account recovery REST API.
pub const RECOVERY_API_RELATIVE_PATH: &str = "/api/identity/recovery/v0.9";

/// Location of the identity server REST APIs. The scheme is always HTTPS.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceEndpoint {
    pub host: String,
    pub port: u16,
    pub relative_path: String,
}

impl ServiceEndpoint {
    #[must_use]
    pub fn base_path(&self) -> String {
        format!("https://{}:{}{}", self.host, self.port, self.relative_path)
    }
}

impl Default for ServiceEndpoint {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: 9443,
            relative_path: RECOVERY_API_RELATIVE_PATH.to_owned(),
        }
    }
}

/// JSON (de)serialization behavior.
///
/// Unknown fields are always tolerated on read, instants serialize as
/// strings and enums by name; those follow from the serde derives of the
/// payload types.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JsonSettings {
    /// Drop `null` object members from request bodies.
    pub omit_null_fields: bool,
}

impl Default for JsonSettings {
    fn default() -> Self {
        Self {
            omit_null_fields: true,
        }
    }
}

/// Everything an [`ApiClient`](crate::ApiClient) needs to build requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiClientConfig {
    /// Prefix of every request URL.
    pub base_path: String,
    /// Headers sent on every request unless the call overrides them.
    pub default_headers: BTreeMap<String, String>,
    /// Connect timeout in milliseconds, `0` disables it.
    pub connect_timeout_ms: u64,
    /// Log request and response summaries.
    pub debugging: bool,
    /// Format of instants in query parameters and form fields.
    pub date_format: DateFormat,
    pub json: JsonSettings,
    pub credentials: AppCredentials,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self::for_endpoint(&ServiceEndpoint::default())
    }
}

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid client configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

impl ApiClientConfig {
    #[must_use]
    pub fn for_endpoint(endpoint: &ServiceEndpoint) -> Self {
        Self {
            base_path: endpoint.base_path(),
            default_headers: BTreeMap::new(),
            connect_timeout_ms: 0,
            debugging: false,
            date_format: DateFormat::default(),
            json: JsonSettings::default(),
            credentials: AppCredentials::default(),
        }
    }

    /// Connect timeout, or `None` when disabled.
    #[must_use]
    pub fn connect_timeout(&self) -> Option<Duration> {
        (self.connect_timeout_ms > 0).then(|| Duration::from_millis(self.connect_timeout_ms))
    }

    /// Load configuration from an optional YAML file, then `IDENTITY_API_*`
    /// environment variables. Nested keys use `__`, e.g.
    /// `IDENTITY_API_CREDENTIALS__APP_NAME`.
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` when a source cannot be read or a value
    /// has the wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// Environment-only variant of [`ApiClientConfig::load`].
    ///
    /// # Errors
    /// See [`ApiClientConfig::load`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }
}
