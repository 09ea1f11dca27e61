//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Configurable log levels
//! - Human-readable console output on stderr
//! - JSON-formatted local log files with rotation
//!
//! # Example
//!
//! ```no_run
//! use iys_bulk::logging::init_logging;
//! use iys_bulk::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use iys_bulk::log_error_with_context;
/// use iys_bulk::domain::IysError;
///
/// let error = IysError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
