//! Configuration for a FreeCode session.
//!
//! Settings are read from `freecode.json`. Every key is optional; a missing
//! file yields the defaults.

use std::path::Path;
use std::time::Duration;

use freecode_client::ClientOptions;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

/// The default config file name.
pub const CONFIG_FILE_NAME: &str = "freecode.json";

/// Default base URL of the execution backend.
fn default_api_base() -> String {
    "http://localhost:5000/api".to_string()
}

/// Default timeout in seconds for a whole request. Generation is slow.
const fn default_request_timeout() -> u64 {
    120
}

/// Default timeout in seconds for establishing a connection.
const fn default_connect_timeout() -> u64 {
    10
}

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base URL under which the backend's endpoints live.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Timeout for a whole request, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Timeout for establishing a connection, in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            request_timeout_seconds: default_request_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

impl Config {
    /// Loads configuration from the current working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is unreadable, is not valid
    /// JSON, or holds invalid values.
    pub fn load() -> Result<Self, ConfigError> {
        let current_dir = std::env::current_dir().map_err(|e| {
            ConfigError::parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_dir(&current_dir)
    }

    /// Loads `freecode.json` from `dir`.
    ///
    /// # Errors
    ///
    /// See [`Config::load_from_file`].
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        Self::load_from_file(&dir.join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from `path`, falling back to defaults if the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the file cannot be read or is not
    /// valid JSON, and [`ConfigError::Validation`] for invalid values.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(ConfigError::parse(path, format!("failed to read file: {e}")));
            }
        };

        let config: Self =
            serde_json::from_str(&contents).map_err(|e| ConfigError::parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// - `apiBase` must be an absolute `http` or `https` URL
    /// - both timeouts must be greater than 0
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] on the first failing check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let api_base = self.api_base.trim();
        if api_base.is_empty() {
            return Err(ConfigError::validation(
                "apiBase must not be empty",
                "Set apiBase to the backend URL, e.g. http://localhost:5000/api",
            ));
        }

        match Url::parse(api_base) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::validation(
                    format!("apiBase uses unsupported scheme '{}'", url.scheme()),
                    "Use an http:// or https:// URL for apiBase",
                ));
            }
            Err(e) => {
                return Err(ConfigError::validation(
                    format!("apiBase '{api_base}' is not a valid URL: {e}"),
                    "Use an absolute URL for apiBase, e.g. http://localhost:5000/api",
                ));
            }
        }

        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::validation(
                "requestTimeoutSeconds must be greater than 0",
                "Set requestTimeoutSeconds to at least 1 in your freecode.json",
            ));
        }

        if self.connect_timeout_seconds == 0 {
            return Err(ConfigError::validation(
                "connectTimeoutSeconds must be greater than 0",
                "Set connectTimeoutSeconds to at least 1 in your freecode.json",
            ));
        }

        Ok(())
    }

    /// Options for an HTTP execution client built from this configuration.
    #[must_use]
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions::new(self.api_base.trim())
            .with_request_timeout(Duration::from_secs(self.request_timeout_seconds))
            .with_connect_timeout(Duration::from_secs(self.connect_timeout_seconds))
    }
}
