//! Client configuration.
//!
//! Values are provided by the application; [`ClientConfig::from_env`] reads the
//! `BURGER_*` environment variables and falls back to the defaults below.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://norma.nomoreparties.space/api";

/// Default lifetime of the access credential (matches the service's token lifetime)
pub const DEFAULT_ACCESS_TOKEN_TTL: Duration = Duration::from_secs(1200);

/// Default location of the durable refresh credential
pub const DEFAULT_REFRESH_TOKEN_PATH: &str = ".stellar-burgers/refresh-token";

/// Environment variable overriding [`ClientConfig::base_url`]
pub const ENV_BASE_URL: &str = "BURGER_API_URL";
/// Environment variable overriding [`ClientConfig::access_token_ttl`], in seconds
pub const ENV_ACCESS_TTL_SECS: &str = "BURGER_ACCESS_TTL_SECS";
/// Environment variable overriding [`ClientConfig::refresh_token_path`]
pub const ENV_REFRESH_TOKEN_PATH: &str = "BURGER_REFRESH_TOKEN_PATH";
/// Environment variable setting [`ClientConfig::request_timeout`], in seconds
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "BURGER_REQUEST_TIMEOUT_SECS";

/// Invalid configuration value
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set to something that could not be parsed
    #[error("Invalid value for {key}: {value:?}")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Rejected value
        value: String,
    },
}

/// Configuration of the HTTP client and credential persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, without trailing slash
    ///
    /// Default: `https://norma.nomoreparties.space/api`
    pub base_url: String,

    /// How long the access credential is kept after it was issued
    ///
    /// Default: 20 minutes
    pub access_token_ttl: Duration,

    /// File holding the refresh credential
    ///
    /// Default: `.stellar-burgers/refresh-token`
    pub refresh_token_path: PathBuf,

    /// Transport timeout for a single request
    ///
    /// Default: none; timeouts are left to the transport.
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Create configuration for the given API root
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Set the access credential lifetime.
    #[must_use]
    pub const fn with_access_token_ttl(mut self, ttl: Duration) -> Self {
        self.access_token_ttl = ttl;
        self
    }

    /// Set the refresh credential file.
    #[must_use]
    pub fn with_refresh_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.refresh_token_path = path.into();
        self
    }

    /// Set the transport timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Read configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a numeric variable does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = lookup(ENV_BASE_URL).map_or_else(Self::default, Self::new);

        if let Some(secs) = seconds(&lookup, ENV_ACCESS_TTL_SECS)? {
            config = config.with_access_token_ttl(secs);
        }
        if let Some(path) = lookup(ENV_REFRESH_TOKEN_PATH) {
            config = config.with_refresh_token_path(path);
        }
        if let Some(secs) = seconds(&lookup, ENV_REQUEST_TIMEOUT_SECS)? {
            config = config.with_request_timeout(secs);
        }

        Ok(config)
    }
}

fn seconds<F>(lookup: &F, key: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::Invalid { key, value })
        })
        .transpose()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token_ttl: DEFAULT_ACCESS_TOKEN_TTL,
            refresh_token_path: PathBuf::from(DEFAULT_REFRESH_TOKEN_PATH),
            request_timeout: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn reads_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "http://localhost:8080/api/"),
            (ENV_ACCESS_TTL_SECS, "60"),
            (ENV_REFRESH_TOKEN_PATH, "/tmp/token"),
            (ENV_REQUEST_TIMEOUT_SECS, "5"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:8080/api");
        assert_eq!(config.access_token_ttl, Duration::from_secs(60));
        assert_eq!(config.refresh_token_path, PathBuf::from("/tmp/token"));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn rejects_non_numeric_durations() {
        let error = ClientConfig::from_lookup(lookup(&[(ENV_ACCESS_TTL_SECS, "soon")])).unwrap_err();
        assert_eq!(
            error,
            ConfigError::Invalid {
                key: ENV_ACCESS_TTL_SECS,
                value: "soon".to_string()
            }
        );
    }
}
