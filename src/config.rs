//! Configuration management for oms-auth.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::client::{ApiConfig, DEFAULT_BASE_URL, DEFAULT_DEVICE_TOKEN};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote API configuration.
    pub api: ApiSection,
    /// Session persistence configuration.
    pub storage: StorageSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Remote API configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    /// Base URL of the authentication API.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Device token sent with login and signup.
    pub device_token: String,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            device_token: DEFAULT_DEVICE_TOKEN.to_string(),
        }
    }
}

/// Session persistence section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Directory for the session slot. Unset means the platform default.
    pub dir: Option<PathBuf>,
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// `$XDG_STATE_HOME/oms-auth`, then `$HOME/.local/state/oms-auth`, then
/// `.oms-auth` in the working directory.
pub fn default_state_dir() -> PathBuf {
    let non_empty = |key: &str| std::env::var_os(key).filter(|v| !v.is_empty());

    if let Some(state) = non_empty("XDG_STATE_HOME") {
        return PathBuf::from(state).join("oms-auth");
    }
    if let Some(home) = non_empty("HOME").or_else(|| non_empty("USERPROFILE")) {
        return PathBuf::from(home).join(".local/state/oms-auth");
    }
    PathBuf::from(".oms-auth")
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("OMS_AUTH_API_URL") {
            if !url.is_empty() {
                self.api.base_url = url;
            }
        }

        if let Some(dir) = std::env::var_os("OMS_AUTH_STATE_DIR") {
            if !dir.is_empty() {
                self.storage.dir = Some(PathBuf::from(dir));
            }
        }

        if let Ok(token) = std::env::var("OMS_AUTH_DEVICE_TOKEN") {
            if !token.is_empty() {
                self.api.device_token = token;
            }
        }

        if let Ok(level) = std::env::var("OMS_AUTH_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(ref url) = args.api_url {
            self.api.base_url = url.clone();
        }

        if let Some(ref dir) = args.state_dir {
            self.storage.dir = Some(dir.clone());
        }

        if let Some(ref token) = args.device_token {
            self.api.device_token = token.clone();
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.apply_env();
        config.apply_args(args);
        config.validate()?;

        Ok(config)
    }

    /// Reject values no client could work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.api.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::InvalidUrl(url.clone()));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }

    /// Convert to the API client configuration.
    pub fn to_api_config(&self) -> ApiConfig {
        ApiConfig::new(self.api.base_url.clone())
            .with_timeout(Duration::from_secs(self.api.timeout_secs))
    }

    /// Directory holding the persisted session.
    pub fn state_dir(&self) -> PathBuf {
        self.storage.dir.clone().unwrap_or_else(default_state_dir)
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// API base URL is not http(s).
    InvalidUrl(String),
    /// Request timeout of zero.
    InvalidTimeout,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidUrl(url) => write!(f, "invalid API base URL: {}", url),
            Self::InvalidTimeout => write!(f, "request timeout must be at least one second"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://oms.wilerhub.com/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.api.device_token, "1234");
        assert!(config.storage.dir.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "api": {
                "base_url": "http://localhost:8080/api",
                "timeout_secs": 5,
                "device_token": "dev-1"
            },
            "storage": {
                "dir": "/var/lib/oms-auth"
            },
            "logging": {
                "level": "debug"
            }
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080/api");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.api.device_token, "dev-1");
        assert_eq!(config.state_dir(), PathBuf::from("/var/lib/oms-auth"));
        assert_eq!(config.log_filter(), "debug");
    }

    #[test]
    fn test_config_partial_json() {
        let json = r#"{ "api": { "timeout_secs": 10 } }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.api.base_url, "https://oms.wilerhub.com/api"); // Default
        assert_eq!(config.api.timeout_secs, 10);
    }

    #[test]
    fn test_config_bad_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ api: ").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        let args = Args {
            api_url: Some("http://127.0.0.1:3000".to_string()),
            state_dir: Some(PathBuf::from("/tmp/oms")),
            device_token: Some("tok".to_string()),
            log_level: Some("trace".to_string()),
            ..Args::default()
        };

        config.apply_args(&args);

        assert_eq!(config.api.base_url, "http://127.0.0.1:3000");
        assert_eq!(config.state_dir(), PathBuf::from("/tmp/oms"));
        assert_eq!(config.api.device_token, "tok");
        assert_eq!(config.log_filter(), "trace");
    }

    #[test]
    fn test_apply_args_keeps_unset_fields() {
        let mut config = Config::default();
        config.api.base_url = "http://from-file".to_string();

        config.apply_args(&Args::default());
        assert_eq!(config.api.base_url, "http://from-file");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.api.base_url = "oms.wilerhub.com".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));

        let mut config = Config::default();
        config.api.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTimeout)));
    }

    #[test]
    fn test_to_api_config() {
        let mut config = Config::default();
        config.api.timeout_secs = 7;

        let api = config.to_api_config();
        assert_eq!(api.base_url, "https://oms.wilerhub.com/api");
        assert_eq!(api.timeout, Duration::from_secs(7));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"base_url\""));
        assert!(json.contains("\"device_token\""));
    }
}
