//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{BatchErrorPolicy, IysConfig};
use super::secret::secret_string;
use crate::domain::errors::IysError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into IysConfig
/// 4. Applies environment variable overrides (IYS_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use iys_bulk::config::loader::load_config;
///
/// let config = load_config("iys.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<IysConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(IysError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        IysError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let mut config = parse_config(&contents)?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        IysError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    tracing::debug!(path = %path.display(), "Configuration loaded");

    Ok(config)
}

/// Substitutes `${VAR}` placeholders and parses the TOML text, without validating
pub fn parse_config(contents: &str) -> Result<IysConfig> {
    let contents = substitute_env_vars(contents)?;
    toml::from_str(&contents)
        .map_err(|e| IysError::Configuration(format!("Failed to parse TOML: {e}")))
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("placeholder pattern is valid")
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied verbatim.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = placeholder_regex();
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(IysError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the IYS_* prefix
///
/// Variables follow the pattern IYS_<SECTION>_<KEY>, e.g.
/// IYS_REGISTRY_BASE_URL or IYS_POLLING_MAX_ATTEMPTS. The plain
/// IYS_USERNAME / IYS_PASSWORD pair is honoured for the credentials too;
/// the sectioned names win when both are set.
fn apply_env_overrides(config: &mut IysConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("IYS_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("IYS_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Registry overrides
    if let Ok(val) = std::env::var("IYS_REGISTRY_BASE_URL") {
        config.registry.base_url = val;
    }
    if let Ok(val) = std::env::var("IYS_REGISTRY_IYS_CODE") {
        config.registry.iys_code = val;
    }
    if let Ok(val) = std::env::var("IYS_REGISTRY_BRAND_CODE") {
        config.registry.brand_code = val;
    }
    if let Ok(val) =
        std::env::var("IYS_REGISTRY_USERNAME").or_else(|_| std::env::var("IYS_USERNAME"))
    {
        config.registry.username = Some(val);
    }
    if let Ok(val) =
        std::env::var("IYS_REGISTRY_PASSWORD").or_else(|_| std::env::var("IYS_PASSWORD"))
    {
        config.registry.password = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("IYS_REGISTRY_TLS_VERIFY") {
        config.registry.tls_verify = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("IYS_REGISTRY_TIMEOUT_SECONDS") {
        if let Ok(secs) = val.parse() {
            config.registry.timeout_seconds = secs;
        }
    }

    // Upload overrides
    if let Ok(val) = std::env::var("IYS_UPLOAD_BATCH_SIZE") {
        if let Ok(size) = val.parse() {
            config.upload.batch_size = size;
        }
    }
    if let Ok(val) = std::env::var("IYS_UPLOAD_DEDUPLICATE") {
        config.upload.deduplicate = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("IYS_UPLOAD_ON_BATCH_ERROR") {
        match val.to_lowercase().as_str() {
            "continue" => config.upload.on_batch_error = BatchErrorPolicy::Continue,
            "abort" => config.upload.on_batch_error = BatchErrorPolicy::Abort,
            other => tracing::warn!(value = %other, "Ignoring unknown IYS_UPLOAD_ON_BATCH_ERROR"),
        }
    }

    // Polling overrides
    if let Ok(val) = std::env::var("IYS_POLLING_MAX_ATTEMPTS") {
        if let Ok(attempts) = val.parse() {
            config.polling.max_attempts = attempts;
        }
    }
    if let Ok(val) = std::env::var("IYS_POLLING_DELAY_SECONDS") {
        if let Ok(delay) = val.parse() {
            config.polling.delay_seconds = delay;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("IYS_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("IYS_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
