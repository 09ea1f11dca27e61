//! Upload command implementation
//!
//! This module implements the `upload` command for submitting consents from
//! a CSV file to the IYS registry.

use crate::adapters::iys::ConsentPayload;
use crate::cli::{
    exit_code_for, EXIT_CONFIG, EXIT_FAILURES, EXIT_INTERRUPTED, EXIT_OK,
};
use crate::config::{load_config, IysConfig};
use crate::core::ingest::RawTable;
use crate::core::upload::{EventKind, PreparedUpload, UploadCoordinator, UploadEvent, UploadSummary};
use clap::Args;
use std::path::PathBuf;
use tokio::sync::watch;

/// Payloads shown by a dry run
const DRY_RUN_PREVIEW: usize = 3;

/// Failed records listed in the final summary
const FAILURES_SHOWN: usize = 10;

/// Arguments for the upload command
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// CSV file with ALICI, ONAY(1)-RET(0), IZIN TARIHI, IZIN TURU and IZIN KAYNAGI columns
    #[arg(short, long, value_name = "CSV")]
    pub file: PathBuf,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Prepare and show the batches without contacting the registry
    #[arg(long)]
    pub dry_run: bool,

    /// Override records per request (1-50)
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,
}

impl UploadArgs {
    /// Execute the upload command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(file = %self.file.display(), "Starting upload command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        if let Some(batch_size) = self.batch_size {
            tracing::info!(batch_size, "Overriding batch size from CLI");
            config.upload.batch_size = batch_size;
        }

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(EXIT_CONFIG);
        }

        let table = match RawTable::from_path(&self.file) {
            Ok(t) => t,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read input file");
                eprintln!("Failed to read {}: {e}", self.file.display());
                return Ok(EXIT_CONFIG);
            }
        };

        let coordinator = match UploadCoordinator::from_config(&config, shutdown_signal) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create upload coordinator");
                eprintln!("Failed to initialize upload: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        if config.application.dry_run {
            return Ok(Self::dry_run(&coordinator, &table));
        }

        if !self.yes && !self.confirm(&config, &table)? {
            println!("Upload cancelled.");
            return Ok(EXIT_OK);
        }

        println!("🚀 Starting upload...");
        println!();

        let (mut events, handle) = coordinator.start(table);
        while let Some(event) = events.recv().await {
            render_event(&event);
        }

        let summary = match handle.await? {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Upload aborted");
                eprintln!();
                eprintln!("❌ Upload aborted: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        print_summary(&summary);

        let exit_code = if summary.interrupted {
            println!("⚠️  Upload interrupted. Batches already submitted stay with the registry;");
            println!("   check them with `iys-bulk status <REQUEST_ID>`.");
            tracing::info!("Upload interrupted");
            EXIT_INTERRUPTED
        } else if summary.is_successful() {
            println!("✅ Upload completed successfully!");
            EXIT_OK
        } else {
            println!("⚠️  Upload completed with failures");
            EXIT_FAILURES
        };

        Ok(exit_code)
    }

    fn confirm(&self, config: &IysConfig, table: &RawTable) -> anyhow::Result<bool> {
        use std::io::{self, Write};

        println!("Upload Configuration:");
        println!("  File: {}", self.file.display());
        println!("  Rows: {}", table.data_row_count());
        println!("  Registry: {}", config.registry.base_url);
        println!("  IYS code: {}", config.registry.iys_code);
        println!("  Brand code: {}", config.registry.brand_code);
        println!("  Batch size: {}", config.upload.batch_size);
        println!();
        print!("Proceed with upload? [y/N]: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        Ok(input.trim().eq_ignore_ascii_case("y"))
    }

    fn dry_run(coordinator: &UploadCoordinator, table: &RawTable) -> i32 {
        tracing::info!("Dry run mode enabled - nothing will be sent");
        println!("🔍 DRY RUN MODE - Nothing will be sent to the registry");
        println!();

        let prepared = match coordinator.prepare(table) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("❌ {e}");
                return exit_code_for(&e);
            }
        };

        print_plan(&prepared);

        let mut summary = prepared.summary();
        summary.dry_run = true;
        summary.log_summary();

        EXIT_OK
    }
}

fn render_event(event: &UploadEvent) {
    let icon = match event.kind {
        EventKind::Info => "ℹ️ ",
        EventKind::Success => "✅",
        EventKind::Warning => "⚠️ ",
        EventKind::Error => "❌",
        EventKind::Complete => "🏁",
    };
    println!("{icon} [{:>3.0}%] {}", event.progress * 100.0, event.message);
}

fn print_plan(prepared: &PreparedUpload) {
    println!("📋 Upload Plan:");
    println!("  Rows: {}", prepared.total_rows);
    println!("  Dropped rows: {}", prepared.dropped.len());
    for dropped in &prepared.dropped {
        println!("    - row {}: {}", dropped.row, dropped.reason);
    }
    println!("  Duplicates removed: {}", prepared.duplicates_removed);
    println!("  Records: {}", prepared.record_count());
    println!("  Batches: {}", prepared.batch_count());
    for batch in &prepared.batches {
        println!("    - batch {}: {} records", batch.number, batch.len());
    }
    println!();

    let preview: Vec<ConsentPayload<'_>> = prepared
        .batches
        .iter()
        .flat_map(|batch| batch.records.iter())
        .take(DRY_RUN_PREVIEW)
        .map(ConsentPayload::from)
        .collect();

    if !preview.is_empty() {
        println!("First payloads:");
        match serde_json::to_string_pretty(&preview) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::warn!(error = %e, "Failed to render payload preview"),
        }
        println!();
    }
}

fn print_summary(summary: &UploadSummary) {
    println!();
    println!("📊 Upload Summary:");
    println!("  Rows: {}", summary.total_rows);
    println!("  Dropped rows: {}", summary.dropped_rows);
    println!("  Duplicates removed: {}", summary.duplicates_removed);
    println!("  Records: {}", summary.records_prepared);
    println!(
        "  Batches: {} planned, {} completed, {} failed, {} timed out",
        summary.batches_planned,
        summary.batches_completed,
        summary.batches_failed,
        summary.batches_timed_out
    );
    println!("  Accepted: {}", summary.success_count);
    println!("  Rejected: {}", summary.failure_count);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    let failures: Vec<_> = summary.outcomes.iter().filter(|o| o.is_failure()).collect();
    if !failures.is_empty() {
        println!("⚠️  Rejected records:");
        for outcome in failures.iter().take(FAILURES_SHOWN) {
            println!("  - {outcome}");
        }
        if failures.len() > FAILURES_SHOWN {
            println!("  ... and {} more", failures.len() - FAILURES_SHOWN);
        }
        println!();
    }

    if !summary.errors.is_empty() {
        println!("⚠️  Batch errors:");
        for error in &summary.errors {
            println!("  - batch {} ({:?}): {}", error.batch, error.kind, error.message);
            if let Some(request_id) = &error.request_id {
                println!("    Request id: {request_id}");
            }
        }
        println!();
    }
}
