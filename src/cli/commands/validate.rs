//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the configuration file.

use crate::cli::{EXIT_CONFIG, EXIT_OK};
use crate::config::{load_config, IysConfig};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates every section before returning
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        for line in summary_lines(&config) {
            println!("  {line}");
        }
        println!();

        Ok(EXIT_OK)
    }
}

/// Human-readable configuration summary with the password masked
fn summary_lines(config: &IysConfig) -> Vec<String> {
    let password = if config.registry.password.is_some() {
        "********"
    } else {
        "(not set)"
    };

    vec![
        format!("Log Level: {}", config.application.log_level),
        format!("Dry Run: {}", config.application.dry_run),
        format!("Registry: {}", config.registry.base_url),
        format!("Token URL: {}", config.registry.token_url()),
        format!("Consent URL: {}", config.registry.consent_request_url()),
        format!(
            "Username: {}",
            config.registry.username.as_deref().unwrap_or("(not set)")
        ),
        format!("Password: {password}"),
        format!("TLS Verify: {}", config.registry.tls_verify),
        format!("Batch Size: {}", config.upload.batch_size),
        format!("Deduplicate: {}", config.upload.deduplicate),
        format!("On Batch Error: {:?}", config.upload.on_batch_error),
        format!(
            "Polling: {} attempts every {}s",
            config.polling.max_attempts, config.polling.delay_seconds
        ),
        format!("File Logging: {}", config.logging.local_enabled),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    #[test]
    fn test_summary_masks_password() {
        let config = parse_config(
            r#"
[registry]
iys_code = "710271"
brand_code = "710271"
username = "uploader"
password = "hunter2"
"#,
        )
        .unwrap();

        let lines = summary_lines(&config);
        assert!(lines.iter().any(|l| l == "Password: ********"));
        assert!(lines.iter().all(|l| !l.contains("hunter2")));
        assert!(lines.iter().any(|l| l == "Username: uploader"));
    }

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let code = ValidateArgs {}.execute("does-not-exist.toml").await.unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }
}
