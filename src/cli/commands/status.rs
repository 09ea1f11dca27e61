//! Status command implementation
//!
//! This module implements the `status` command for looking up a request
//! submitted earlier, for example after an interrupted or timed-out run.

use crate::adapters::iys::{describe_error, IysClient, RegistryClient, StatusResponse};
use crate::cli::{exit_code_for, EXIT_CONFIG, EXIT_OK};
use crate::config::load_config;
use crate::core::upload::poll::{is_in_progress, response_in_progress};
use crate::domain::RequestId;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Request id returned when the batch was submitted
    pub request_id: String,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(request_id = %self.request_id, "Checking request status");

        let request_id = match RequestId::new(self.request_id.as_str()) {
            Ok(id) => id,
            Err(e) => {
                println!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {}", e);
                return Ok(EXIT_CONFIG);
            }
        };

        let client = match IysClient::new(config.registry) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to create registry client");
                println!("   Error: {}", e);
                return Ok(exit_code_for(&e));
            }
        };

        let response = match client.fetch_status(&request_id).await {
            Ok(r) => r,
            Err(e) => {
                println!("❌ Failed to fetch status of {request_id}");
                println!("   Error: {}", e);
                return Ok(exit_code_for(&e));
            }
        };

        println!("📊 Request {request_id}");
        println!();
        for line in describe_response(&response) {
            println!("  {line}");
        }
        println!();

        if response_in_progress(&response) {
            println!("⏳ Still processing");
        } else {
            println!("✅ Processing finished");
        }

        Ok(EXIT_OK)
    }
}

/// One line per status entry
fn describe_response(response: &StatusResponse) -> Vec<String> {
    match response {
        StatusResponse::Items(items) => items
            .iter()
            .enumerate()
            .map(|(position, item)| {
                let index = item.index.unwrap_or(position);
                let marker = if is_in_progress(&item.status) { " ⏳" } else { "" };
                match item.error_detail() {
                    Some(detail) => format!("index {index}: {}{marker} ({detail})", item.status),
                    None => format!("index {index}: {}{marker}", item.status),
                }
            })
            .collect(),
        StatusResponse::Summary(summary) => {
            let mut lines = vec![
                format!("Status: {}", summary.status.as_deref().unwrap_or("unknown")),
                format!("Completed: {}", summary.completed_count.unwrap_or(0)),
                format!(
                    "Failed: {}",
                    summary
                        .failed_count
                        .unwrap_or(summary.sub_request_errors.len())
                ),
            ];
            lines.extend(
                summary
                    .sub_request_errors
                    .iter()
                    .filter_map(describe_error)
                    .map(|detail| format!("- {detail}")),
            );
            lines
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_describe_item_list() {
        let response: StatusResponse = serde_json::from_value(json!([
            {"index": 0, "status": "COMPLETED"},
            {"index": 1, "status": "FAILED", "error": {"message": "bad number"}},
            {"status": "ENQUEUE"}
        ]))
        .unwrap();

        assert_eq!(
            describe_response(&response),
            vec![
                "index 0: COMPLETED".to_string(),
                "index 1: FAILED (bad number)".to_string(),
                "index 2: ENQUEUE ⏳".to_string(),
            ]
        );
    }

    #[test]
    fn test_describe_summary_object() {
        let response: StatusResponse = serde_json::from_value(json!({
            "status": "COMPLETED",
            "completedCount": 2,
            "subRequestErrors": [{"message": "invalid"}]
        }))
        .unwrap();

        let lines = describe_response(&response);
        assert_eq!(lines[0], "Status: COMPLETED");
        assert_eq!(lines[2], "Failed: 1");
        assert_eq!(lines[3], "- invalid");
    }

    #[tokio::test]
    async fn test_missing_config_is_config_error() {
        let args = StatusArgs {
            request_id: "req-1".to_string(),
        };
        let code = args.execute("does-not-exist.toml").await.unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }
}
