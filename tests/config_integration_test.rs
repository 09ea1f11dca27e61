//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables hold ENV_MUTEX to avoid
//! interference between tests.

use iys_bulk::config::{load_config, BatchErrorPolicy};
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    for name in [
        "IYS_APPLICATION_LOG_LEVEL",
        "IYS_APPLICATION_DRY_RUN",
        "IYS_REGISTRY_BASE_URL",
        "IYS_REGISTRY_USERNAME",
        "IYS_REGISTRY_PASSWORD",
        "IYS_USERNAME",
        "IYS_PASSWORD",
        "IYS_UPLOAD_BATCH_SIZE",
        "IYS_UPLOAD_ON_BATCH_ERROR",
        "IYS_POLLING_MAX_ATTEMPTS",
        "TEST_IYS_PASSWORD",
    ] {
        std::env::remove_var(name);
    }
}

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const MINIMAL: &str = r#"
[registry]
iys_code = "710271"
brand_code = "710271"
username = "uploader"
password = "secret"
"#;

#[test]
fn test_load_complete_config() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[application]
log_level = "debug"
dry_run = true

[registry]
base_url = "https://api.test.iys.org.tr"
token_path = "/oauth2/token"
iys_code = "123456"
brand_code = "654321"
username = "uploader"
password = "secret"
timeout_seconds = 30
tls_verify = false

[upload]
batch_size = 25
deduplicate = false
on_batch_error = "abort"
event_buffer = 16
event_send_timeout_ms = 250

[polling]
max_attempts = 3
delay_seconds = 1

[logging]
local_enabled = true
local_path = "/tmp/iys-logs"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "debug");
    assert!(config.application.dry_run);
    assert_eq!(config.registry.base_url, "https://api.test.iys.org.tr");
    assert_eq!(
        config.registry.token_url(),
        "https://api.test.iys.org.tr/oauth2/token"
    );
    assert_eq!(
        config.registry.consent_request_url(),
        "https://api.test.iys.org.tr/sps/123456/brands/654321/consents/request"
    );
    assert_eq!(config.registry.timeout_seconds, 30);
    assert!(!config.registry.tls_verify);
    assert_eq!(config.upload.batch_size, 25);
    assert!(!config.upload.deduplicate);
    assert_eq!(config.upload.on_batch_error, BatchErrorPolicy::Abort);
    assert_eq!(config.polling.max_attempts, 3);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_load_minimal_config_uses_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(MINIMAL);
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.registry.base_url, "https://api.iys.org.tr");
    assert_eq!(config.upload.batch_size, 50);
    assert!(config.upload.deduplicate);
    assert_eq!(config.upload.on_batch_error, BatchErrorPolicy::Continue);
    assert_eq!(config.polling.max_attempts, 12);
    assert_eq!(config.polling.delay_seconds, 5);
    assert!(!config.logging.local_enabled);
}

#[test]
fn test_env_var_substitution_for_password() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_IYS_PASSWORD", "from-env");

    let file = write_config(
        r#"
[registry]
iys_code = "710271"
brand_code = "710271"
username = "uploader"
password = "${TEST_IYS_PASSWORD}"
"#,
    );
    let result = load_config(file.path());
    cleanup_env_vars();

    let config = result.unwrap();
    let password = config.registry.password.unwrap();
    assert_eq!(password.expose_secret().as_ref(), "from-env");
}

#[test]
fn test_missing_env_var_is_reported() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[registry]
iys_code = "710271"
brand_code = "710271"
username = "uploader"
password = "${TEST_IYS_PASSWORD}"
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_IYS_PASSWORD"));
}

#[test]
fn test_env_overrides() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("IYS_UPLOAD_BATCH_SIZE", "10");
    std::env::set_var("IYS_UPLOAD_ON_BATCH_ERROR", "abort");
    std::env::set_var("IYS_POLLING_MAX_ATTEMPTS", "4");
    std::env::set_var("IYS_USERNAME", "env-user");

    let file = write_config(MINIMAL);
    let result = load_config(file.path());
    cleanup_env_vars();

    let config = result.unwrap();
    assert_eq!(config.upload.batch_size, 10);
    assert_eq!(config.upload.on_batch_error, BatchErrorPolicy::Abort);
    assert_eq!(config.polling.max_attempts, 4);
    assert_eq!(config.registry.username.as_deref(), Some("env-user"));
}

#[test]
fn test_batch_size_over_limit_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(&format!("{MINIMAL}\n[upload]\nbatch_size = 51\n"));
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("batch_size"));
}

#[test]
fn test_missing_credentials_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[registry]
iys_code = "710271"
brand_code = "710271"
"#,
    );
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("username"));
}

#[test]
fn test_invalid_base_url_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(&MINIMAL.replace(
        "[registry]",
        "[registry]\nbase_url = \"ftp://api.iys.org.tr\"",
    ));
    assert!(load_config(file.path()).is_err());
}

#[test]
fn test_missing_file() {
    let err = load_config("/nonexistent/iys.toml").unwrap_err();
    assert!(err.to_string().contains("not found"));
}
