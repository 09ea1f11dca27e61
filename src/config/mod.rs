//! Configuration management.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Configuration files support:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `IYS_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use iys_bulk::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("iys.toml")?;
//!
//! println!("Registry: {}", config.registry.base_url);
//! println!("Batch size: {}", config.upload.batch_size);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level, dry run
//! - [`RegistryConfig`] - Registry endpoints and credentials
//! - [`UploadConfig`] - Batch size, deduplication, batch error policy, event queue
//! - [`PollingConfig`] - Status check attempts and delay
//! - [`LoggingConfig`] - Local log file settings
//!
//! # Example Configuration
//!
//! ```toml
//! [registry]
//! base_url = "https://api.iys.org.tr"
//! iys_code = "710271"
//! brand_code = "710271"
//! username = "${IYS_USERNAME}"
//! password = "${IYS_PASSWORD}"
//!
//! [upload]
//! batch_size = 50
//! on_batch_error = "continue"
//!
//! [polling]
//! max_attempts = 12
//! delay_seconds = 5
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, BatchErrorPolicy, IysConfig, LoggingConfig, PollingConfig, RegistryConfig,
    UploadConfig, MAX_BATCH_SIZE,
};
pub use secret::{secret_string, SecretString, SecretValue};
