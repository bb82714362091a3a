//! Configuration loading, validation, and management for Copiloto.
//!
//! Loads configuration from `~/.copiloto/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.copiloto/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Hosted model configuration
    #[serde(default)]
    pub model: ModelConfig,

    /// Gateway (HTTP server) configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite path or URL. `sqlite::memory:` gives an ephemeral database.
    #[serde(default = "default_database_url")]
    pub url: String,
}

fn default_database_url() -> String {
    "sqlite://copiloto.db".into()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// API key for the hosted model endpoint. When absent, the canned
    /// responder is wired in instead of the live client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model identifier sent to the endpoint.
    #[serde(default = "default_model_id")]
    pub model_id: String,

    /// Override for the endpoint base URL (testing, proxies).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Maximum tokens per model response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Outbound request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_model_id() -> String {
    "claude-sonnet-4-20250514".into()
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model_id: default_model_id(),
            base_url: None,
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins. Empty means same-origin only.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    5000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing access tokens.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// Access token lifetime in hours.
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: u64,
}

fn default_jwt_secret() -> String {
    // Development default; overridden by COPILOTO_JWT_SECRET in deployment.
    "dev-secret-change-me".into()
}
fn default_token_ttl_hours() -> u64 {
    24
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_hours: default_token_ttl_hours(),
        }
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database", &self.database)
            .field("model", &self.model)
            .field("gateway", &self.gateway)
            .field("auth", &"AuthConfig { jwt_secret: [REDACTED], .. }")
            .finish()
    }
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model_id", &self.model_id)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.copiloto/config.toml).
    ///
    /// Environment overrides (highest priority):
    /// - `COPILOTO_API_KEY` / `ANTHROPIC_API_KEY` — model endpoint key
    /// - `COPILOTO_DATABASE_URL` — database location
    /// - `COPILOTO_JWT_SECRET` — token signing secret
    /// - `COPILOTO_MODEL_ID` — model identifier
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.model.api_key.is_none() {
            config.model.api_key = std::env::var("COPILOTO_API_KEY")
                .ok()
                .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok());
        }

        if let Ok(url) = std::env::var("COPILOTO_DATABASE_URL") {
            config.database.url = url;
        }

        if let Ok(secret) = std::env::var("COPILOTO_JWT_SECRET") {
            config.auth.jwt_secret = secret;
        }

        if let Ok(model_id) = std::env::var("COPILOTO_MODEL_ID") {
            config.model.model_id = model_id;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".copiloto")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.url must not be empty".into(),
            ));
        }

        if self.model.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "model.max_tokens must be greater than 0".into(),
            ));
        }

        if self.auth.token_ttl_hours == 0 {
            return Err(ConfigError::ValidationError(
                "auth.token_ttl_hours must be greater than 0".into(),
            ));
        }

        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "auth.jwt_secret must not be empty".into(),
            ));
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            model: ModelConfig::default(),
            gateway: GatewayConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.gateway.port, 5000);
        assert!(config.model.api_key.is_none());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.database.url, default_database_url());
    }

    #[test]
    fn parses_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [gateway]
            port = 8080

            [model]
            model_id = "claude-haiku-4"
            "#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.model.model_id, "claude-haiku-4");
        // Untouched sections fall back to defaults
        assert_eq!(config.auth.token_ttl_hours, 24);
    }

    #[test]
    fn rejects_zero_max_tokens() {
        let mut config = AppConfig::default();
        config.model.max_tokens = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_jwt_secret() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let mut config = AppConfig::default();
        config.model.api_key = Some("sk-live-very-secret".into());
        let dump = format!("{config:?}");
        assert!(!dump.contains("sk-live-very-secret"));
        assert!(dump.contains("[REDACTED]"));
    }
}
