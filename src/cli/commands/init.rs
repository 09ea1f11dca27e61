//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::cli::{EXIT_CONFIG, EXIT_FATAL, EXIT_OK};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "iys.toml")]
    pub output: String,

    /// Include every optional setting with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing IYS Bulk configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your IYS and brand codes", self.output);
                println!("  2. Create a .env file with your credentials:");
                println!("     - Set IYS_USERNAME and IYS_PASSWORD");
                println!("  3. Validate configuration: iys-bulk validate-config");
                println!("  4. Preview an upload: iys-bulk upload --file consents.csv --dry-run");
                println!();
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# IYS Bulk Configuration File
# Bulk consent uploader for the IYS registry

[registry]
base_url = "https://api.iys.org.tr"
iys_code = "710271"
brand_code = "710271"

# Credentials come from the environment (or a .env file)
username = "${IYS_USERNAME}"
password = "${IYS_PASSWORD}"

[upload]
batch_size = 50
on_batch_error = "continue"
"#
        .to_string()
    }

    /// Generate configuration with all options documented
    fn generate_config_with_examples() -> String {
        r#"# IYS Bulk Configuration File
# Bulk consent uploader for the IYS registry
#
# Any value can reference an environment variable as ${VAR_NAME}.
# IYS_<SECTION>_<KEY> environment variables override values from this file.

[application]
# Log level: trace | debug | info | warn | error
log_level = "info"
# Prepare batches without contacting the registry
dry_run = false

[registry]
base_url = "https://api.iys.org.tr"
# OAuth2 password grant endpoint, relative to base_url
token_path = "/oauth2/token"
iys_code = "710271"
brand_code = "710271"
username = "${IYS_USERNAME}"
password = "${IYS_PASSWORD}"
# HTTP request timeout
timeout_seconds = 60
# Only disable against test environments
tls_verify = true

[upload]
# Records per consent request (1-50)
batch_size = 50
# Keep only the last consent per recipient and consent type
deduplicate = true
# continue | abort
on_batch_error = "continue"
# Progress event queue
event_buffer = 64
event_send_timeout_ms = 5000

[polling]
# Status checks per request; each waits delay_seconds first
max_attempts = 12
delay_seconds = 5

[logging]
# JSON log file with rotation
local_enabled = false
local_path = "./logs"
# daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}
