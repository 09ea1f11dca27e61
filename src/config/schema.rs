//! Configuration schema types
//!
//! This module defines the configuration structure that maps to `iys.toml`.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Largest batch the registry accepts in one consent request
pub const MAX_BATCH_SIZE: usize = 50;

/// Main configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IysConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Consent registry connection and credentials
    pub registry: RegistryConfig,

    /// Batching and event stream settings
    #[serde(default)]
    pub upload: UploadConfig,

    /// Status polling budget
    #[serde(default)]
    pub polling: PollingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl IysConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.registry.validate()?;
        self.upload.validate()?;
        self.polling.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (prepare batches, never call the registry)
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Consent registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base URL of the registry API (scheme and host, optional path prefix)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the OAuth2 token endpoint, relative to `base_url`
    #[serde(default = "default_token_path")]
    pub token_path: String,

    /// Service provider code assigned by the registry
    pub iys_code: String,

    /// Brand code the consents are recorded under
    pub brand_code: String,

    /// Username for the password grant
    #[serde(default)]
    pub username: Option<String>,

    /// Password for the password grant
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub password: Option<SecretString>,

    /// HTTP timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// TLS certificate verification enabled
    ///
    /// Disabling verification exposes the upload to man-in-the-middle attacks
    /// and should only be used against test registries.
    #[serde(default = "default_true")]
    pub tls_verify: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_path: default_token_path(),
            iys_code: String::new(),
            brand_code: String::new(),
            username: None,
            password: None,
            timeout_seconds: default_timeout_seconds(),
            tls_verify: true,
        }
    }
}

impl RegistryConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        let url = Url::parse(&self.base_url)
            .map_err(|e| format!("registry.base_url '{}' is not a valid URL: {e}", self.base_url))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err("registry.base_url must start with http:// or https://".to_string());
        }

        if !self.token_path.starts_with('/') {
            return Err("registry.token_path must start with '/'".to_string());
        }

        if self.iys_code.trim().is_empty() {
            return Err("registry.iys_code cannot be empty".to_string());
        }
        if self.brand_code.trim().is_empty() {
            return Err("registry.brand_code cannot be empty".to_string());
        }

        match &self.username {
            Some(username) if !username.trim().is_empty() => {}
            _ => return Err("registry.username is required".to_string()),
        }
        match &self.password {
            Some(password) if !password.expose_secret().is_empty() => {}
            _ => return Err("registry.password is required".to_string()),
        }

        if self.timeout_seconds == 0 {
            return Err("registry.timeout_seconds must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Base URL without a trailing slash
    fn trimmed_base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Full URL of the token endpoint
    pub fn token_url(&self) -> String {
        format!("{}{}", self.trimmed_base(), self.token_path)
    }

    /// Full URL of the consent request endpoint
    pub fn consent_request_url(&self) -> String {
        format!(
            "{}/sps/{}/brands/{}/consents/request",
            self.trimmed_base(),
            self.iys_code.trim(),
            self.brand_code.trim()
        )
    }

    /// Full URL of the status endpoint for one request
    pub fn status_url(&self, request_id: &str) -> String {
        format!("{}/{}", self.consent_request_url(), request_id)
    }
}

/// What happens to the remaining batches after one batch fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BatchErrorPolicy {
    /// Report the failed batch and carry on with the next one
    #[default]
    Continue,
    /// Stop the run at the first failed batch
    Abort,
}

/// Upload pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Records per consent request (1-50)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Collapse repeated (recipient, consent type) pairs, keeping the last one
    #[serde(default = "default_true")]
    pub deduplicate: bool,

    /// Behaviour after a batch-level registry error
    #[serde(default)]
    pub on_batch_error: BatchErrorPolicy,

    /// Capacity of the event queue between the pipeline and its consumer
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// How long an event may wait for queue space before it is dropped
    #[serde(default = "default_event_send_timeout_ms")]
    pub event_send_timeout_ms: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            deduplicate: true,
            on_batch_error: BatchErrorPolicy::default(),
            event_buffer: default_event_buffer(),
            event_send_timeout_ms: default_event_send_timeout_ms(),
        }
    }
}

impl UploadConfig {
    fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(format!(
                "upload.batch_size must be between 1 and {MAX_BATCH_SIZE}, got {}",
                self.batch_size
            ));
        }
        if self.event_buffer == 0 {
            return Err("upload.event_buffer must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Event send timeout as a Duration
    pub fn event_send_timeout(&self) -> Duration {
        Duration::from_millis(self.event_send_timeout_ms)
    }
}

/// Status polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Status checks per batch before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before each status check, in seconds
    #[serde(default = "default_delay_seconds")]
    pub delay_seconds: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_seconds: default_delay_seconds(),
        }
    }
}

impl PollingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("polling.max_attempts must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write JSON logs to a rolling local file
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for the log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation policy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "https://api.iys.org.tr".to_string()
}

fn default_token_path() -> String {
    "/oauth2/token".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_batch_size() -> usize {
    MAX_BATCH_SIZE
}

fn default_event_buffer() -> usize {
    64
}

fn default_event_send_timeout_ms() -> u64 {
    5000
}

fn default_max_attempts() -> u32 {
    12
}

fn default_delay_seconds() -> u64 {
    5
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn valid_registry() -> RegistryConfig {
        RegistryConfig {
            iys_code: "710271".to_string(),
            brand_code: "710271".to_string(),
            username: Some("user".to_string()),
            password: Some(secret_string("pass".to_string())),
            ..Default::default()
        }
    }

    fn valid_config() -> IysConfig {
        IysConfig {
            application: ApplicationConfig::default(),
            registry: valid_registry(),
            upload: UploadConfig::default(),
            polling: PollingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_defaults() {
        let upload = UploadConfig::default();
        assert_eq!(upload.batch_size, 50);
        assert!(upload.deduplicate);
        assert_eq!(upload.on_batch_error, BatchErrorPolicy::Continue);

        let polling = PollingConfig::default();
        assert_eq!(polling.max_attempts, 12);
        assert_eq!(polling.delay_seconds, 5);
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_batch_size_bounds() {
        let mut config = valid_config();
        config.upload.batch_size = 0;
        assert!(config.validate().is_err());

        config.upload.batch_size = 51;
        let err = config.validate().unwrap_err();
        assert!(err.contains("batch_size"));

        config.upload.batch_size = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_poll_attempts_rejected() {
        let mut config = valid_config();
        config.polling.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let mut config = valid_config();
        config.registry.password = None;
        assert!(config.validate().unwrap_err().contains("password"));

        let mut config = valid_config();
        config.registry.username = Some("  ".to_string());
        assert!(config.validate().unwrap_err().contains("username"));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let mut config = valid_config();
        config.registry.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.registry.base_url = "ftp://api.iys.org.tr".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = valid_config();
        config.application.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_registry_urls() {
        let mut registry = valid_registry();
        registry.base_url = "https://api.iys.org.tr/".to_string();

        assert_eq!(registry.token_url(), "https://api.iys.org.tr/oauth2/token");
        assert_eq!(
            registry.consent_request_url(),
            "https://api.iys.org.tr/sps/710271/brands/710271/consents/request"
        );
        assert_eq!(
            registry.status_url("abc-123"),
            "https://api.iys.org.tr/sps/710271/brands/710271/consents/request/abc-123"
        );
    }

    #[test]
    fn test_batch_error_policy_parsing() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: BatchErrorPolicy,
        }

        let w: Wrapper = toml::from_str("policy = \"abort\"").unwrap();
        assert_eq!(w.policy, BatchErrorPolicy::Abort);
        let w: Wrapper = toml::from_str("policy = \"continue\"").unwrap();
        assert_eq!(w.policy, BatchErrorPolicy::Continue);
        assert!(toml::from_str::<Wrapper>("policy = \"retry\"").is_err());
    }

    #[test]
    fn test_logging_rotation_validated() {
        let mut config = valid_config();
        config.logging.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());
    }
}
