//! CLI interface and argument parsing
//!
//! This module provides the command-line interface using clap.

pub mod commands;

use crate::domain::{IysError, RegistryError};
use clap::{Parser, Subcommand};

/// Exit code: run completed without failures
pub const EXIT_OK: i32 = 0;
/// Exit code: run completed with rejected records or failed batches
pub const EXIT_FAILURES: i32 = 1;
/// Exit code: bad configuration or invalid input
pub const EXIT_CONFIG: i32 = 2;
/// Exit code: registry unreachable or credentials rejected
pub const EXIT_CONNECTION: i32 = 4;
/// Exit code: anything else
pub const EXIT_FATAL: i32 = 5;
/// Exit code: stopped by a shutdown signal
pub const EXIT_INTERRUPTED: i32 = 130;

/// IYS Bulk - consent registry uploader
#[derive(Parser, Debug)]
#[command(name = "iys-bulk")]
#[command(version, about, long_about = None)]
#[command(author = "IYS Bulk Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "iys.toml", env = "IYS_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "IYS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Also write JSON logs to this directory
    #[arg(long, env = "IYS_LOG_DIR")]
    pub log_dir: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload consents from a CSV file to the registry
    Upload(commands::upload::UploadArgs),

    /// Show the registry status of a submitted request
    Status(commands::status::StatusArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

/// Process exit code for an error that ended a command
pub fn exit_code_for(error: &IysError) -> i32 {
    match error {
        IysError::Configuration(_) | IysError::Validation(_) => EXIT_CONFIG,
        IysError::Registry(RegistryError::AuthenticationFailed(_))
        | IysError::Registry(RegistryError::ConnectionFailed(_)) => EXIT_CONNECTION,
        IysError::Registry(_) => EXIT_FAILURES,
        IysError::Serialization(_) | IysError::Io(_) | IysError::Other(_) => EXIT_FATAL,
    }
}
