//! Runtime configuration.
//!
//! Every field has a default, so an empty YAML file (or no file at all)
//! gives a working setup pointed at a local report service.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use finbot_core::DEFAULT_REPORT_TYPE;

/// Errors loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub primary: PrimaryConfig,
    pub secondary: SecondaryConfig,
    pub store: StoreConfig,
    pub server: ServerConfig,
    /// Where exported documents are written by the CLI
    pub reports_dir: PathBuf,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            primary: PrimaryConfig::default(),
            secondary: SecondaryConfig::default(),
            store: StoreConfig::default(),
            server: ServerConfig::default(),
            reports_dir: PathBuf::from("reports"),
        }
    }
}

/// The dedicated report-generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimaryConfig {
    pub url: String,
    #[serde(with = "humantime_duration")]
    pub timeout: Duration,
    pub report_type: String,
}

impl Default for PrimaryConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8002/generate-report".to_string(),
            timeout: Duration::from_secs(90),
            report_type: DEFAULT_REPORT_TYPE.to_string(),
        }
    }
}

/// The hosted OpenAI-compatible chat backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecondaryConfig {
    pub url: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    #[serde(with = "humantime_duration")]
    pub timeout: Duration,
    pub report_max_tokens: u32,
    pub report_temperature: f32,
    pub chat_max_tokens: u32,
    pub chat_temperature: f32,
}

impl Default for SecondaryConfig {
    fn default() -> Self {
        Self {
            url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "llama3-8b-8192".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            timeout: Duration::from_secs(30),
            report_max_tokens: 1500,
            report_temperature: 0.3,
            chat_max_tokens: 256,
            chat_temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("financebot.db"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Parse from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load and validate a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the chain cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("primary.url", &self.primary.url)?;
        check_url("secondary.url", &self.secondary.url)?;

        if self.primary.timeout.is_zero() {
            return Err(ConfigError::Invalid("primary.timeout must be above zero".into()));
        }
        if self.secondary.timeout.is_zero() {
            return Err(ConfigError::Invalid("secondary.timeout must be above zero".into()));
        }
        if self.secondary.model.trim().is_empty() {
            return Err(ConfigError::Invalid("secondary.model must not be empty".into()));
        }

        if self.secondary.timeout >= self.primary.timeout {
            tracing::warn!(
                primary = ?self.primary.timeout,
                secondary = ?self.secondary.timeout,
                "Secondary timeout is not shorter than primary; fallback will be slow"
            );
        }

        Ok(())
    }
}

fn check_url(field: &str, url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{} must be an http(s) URL, got '{}'",
            field, url
        )))
    }
}

/// Durations written as "90s", "1m 30s".
mod humantime_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.primary.timeout, Duration::from_secs(90));
        assert_eq!(config.secondary.timeout, Duration::from_secs(30));
        assert_eq!(config.secondary.api_key_env, "GROQ_API_KEY");
        assert_eq!(config.primary.report_type, "comprehensive_financial_analysis");
        assert_eq!(config.reports_dir, PathBuf::from("reports"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
primary:
  url: http://reports.internal:9000/generate-report
  timeout: 2m
secondary:
  timeout: 15s
store:
  path: /tmp/sessions.db
"#;
        let config = RuntimeConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.primary.timeout, Duration::from_secs(120));
        assert_eq!(config.secondary.timeout, Duration::from_secs(15));
        assert_eq!(config.secondary.model, "llama3-8b-8192");
        assert_eq!(config.store.path, PathBuf::from("/tmp/sessions.db"));
        assert_eq!(config.server.bind, "127.0.0.1:8000");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(RuntimeConfig::from_yaml("").unwrap(), RuntimeConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = RuntimeConfig::default();
        config.primary.url = "ftp://example.com".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = RuntimeConfig::default();
        config.secondary.timeout = Duration::ZERO;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_bad_duration_is_yaml_error() {
        let yaml = "primary:\n  timeout: soon\n";
        assert!(matches!(RuntimeConfig::from_yaml(yaml), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = RuntimeConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("timeout: 1m 30s"));
        assert_eq!(RuntimeConfig::from_yaml(&yaml).unwrap(), config);
    }
}
