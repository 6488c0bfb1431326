//! Client configuration with YAML support

use std::fmt;
use std::path::Path;
use std::time::Duration;

use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use url::Url;

/// Production API host
pub const DEFAULT_BASE_URL: &str = "https://public-api.energy-tracker.best-ios-apps.de";

/// Energy Tracker client configuration
///
/// Can be loaded from YAML or JSON, or constructed programmatically:
///
/// ```yaml
/// access_token: "your-personal-access-token"
/// base_url: "https://public-api.energy-tracker.best-ios-apps.de"  # optional
/// timeout_ms: 10000  # optional
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Personal access token, sent as `Authorization: Bearer <token>`
    pub access_token: String,

    /// Base URL of the API (default: production API)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds (default: 10s)
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    10_000 // 10 seconds
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("access_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl ClientConfig {
    /// Configuration with the default base URL and timeout
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: default_base_url(),
            timeout_ms: default_timeout(),
        }
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Serialize configuration to YAML
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Create a builder for programmatic configuration
    pub fn builder(access_token: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder::new(access_token)
    }

    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Base URL with surrounding whitespace and trailing slashes removed
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }

    /// Check the configuration and resolve it into transport settings
    pub fn validate(&self) -> Result<TransportSettings, ConfigError> {
        if self.access_token.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "access token must not be empty".to_string(),
            ));
        }

        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", self.access_token))
            .map_err(|_| {
                ConfigError::Invalid("access token contains invalid header characters".to_string())
            })?;
        authorization.set_sensitive(true);

        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "timeout must be a positive duration".to_string(),
            ));
        }

        let raw = self.normalized_base_url();
        let base_url = Url::parse(raw)
            .map_err(|e| ConfigError::Invalid(format!("invalid base URL '{}': {}", raw, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(ConfigError::Invalid(format!(
                "base URL must be an http(s) URL: '{}'",
                raw
            )));
        }

        Ok(TransportSettings {
            base_url: raw.to_string(),
            authorization,
            timeout: self.timeout(),
        })
    }
}

/// Validated connection settings shared by a client and its transport
#[derive(Debug, Clone)]
pub struct TransportSettings {
    /// Normalized base URL (no trailing slash)
    pub base_url: String,
    /// Pre-built `Authorization` header value
    pub authorization: HeaderValue,
    pub timeout: Duration,
}

/// Builder for ClientConfig
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder with the given access token
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            config: ClientConfig::new(access_token),
        }
    }

    /// Override the API base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the per-request timeout in milliseconds
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeout_ms = ms;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("test-token");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
access_token: "secret123"
base_url: "https://custom-api.example.com"
timeout_ms: 30000
"#;

        let config = ClientConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.access_token, "secret123");
        assert_eq!(config.base_url, "https://custom-api.example.com");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_yaml_parsing_applies_defaults() {
        let config = ClientConfig::from_yaml("access_token: abc").unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_ms, 10_000);
    }

    #[test]
    fn test_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "access_token: from-file\ntimeout_ms: 2500").unwrap();

        let config = ClientConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.access_token, "from-file");
        assert_eq!(config.timeout_ms, 2500);
    }

    #[test]
    fn test_missing_file() {
        let result = ClientConfig::from_yaml_file("/nonexistent/energy-tracker.yaml");
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_json_parsing() {
        let config = ClientConfig::from_json(r#"{"access_token": "t", "timeout_ms": 500}"#).unwrap();
        assert_eq!(config.timeout(), Duration::from_millis(500));
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::builder("my-token")
            .base_url("https://api.example.com")
            .timeout(Duration::from_secs(30))
            .build();

        assert_eq!(config.access_token, "my-token");
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.timeout_ms, 30_000);
    }

    #[test]
    fn test_base_url_normalization() {
        for raw in [
            "  https://api.example.com  ",
            "https://api.example.com/",
            "  https://api.example.com/  ",
        ] {
            let config = ClientConfig::builder("t").base_url(raw).build();
            assert_eq!(config.normalized_base_url(), "https://api.example.com");
            assert_eq!(
                config.validate().unwrap().base_url,
                "https://api.example.com"
            );
        }
    }

    #[test]
    fn test_validate_builds_bearer_header() {
        let settings = ClientConfig::new("test-token").validate().unwrap();
        assert_eq!(settings.authorization.to_str().unwrap(), "Bearer test-token");
        assert!(settings.authorization.is_sensitive());
        assert_eq!(settings.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ClientConfig::new("").validate().is_err());
        assert!(ClientConfig::new("bad\ntoken").validate().is_err());
        assert!(ClientConfig::builder("t").timeout_ms(0).build().validate().is_err());
        assert!(ClientConfig::builder("t")
            .base_url("not a url")
            .build()
            .validate()
            .is_err());
        assert!(ClientConfig::builder("t")
            .base_url("ftp://example.com")
            .build()
            .validate()
            .is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ClientConfig::new("super-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_to_yaml() {
        let yaml = ClientConfig::new("t").to_yaml().unwrap();
        assert!(yaml.contains("base_url"));
        assert!(yaml.contains(DEFAULT_BASE_URL));
    }
}
