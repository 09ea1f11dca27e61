//! Core business logic.
//!
//! # Modules
//!
//! - [`ingest`] - Raw table reading and row normalization
//! - [`upload`] - Deduplication, batching, submission, polling and reconciliation
//! - [`clock`] - Injectable time source for status polling
//!
//! # Upload Workflow
//!
//! 1. **Read**: Load the CSV table, every cell as text
//! 2. **Normalize**: Canonical phone numbers, registry vocabulary, timestamps
//! 3. **Deduplicate**: Last consent per (recipient, consent type) wins
//! 4. **Batch**: At most 50 records per consent request
//! 5. **Submit**: One request per batch, strictly in sequence
//! 6. **Poll**: Wait until no consent of the request is still queued
//! 7. **Reconcile**: Map each status back to its record and report
//!
//! # Example
//!
//! ```rust,no_run
//! use iys_bulk::config::load_config;
//! use iys_bulk::core::ingest::RawTable;
//! use iys_bulk::core::upload::UploadCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("iys.toml")?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let coordinator = UploadCoordinator::from_config(&config, shutdown_rx)?;
//! let table = RawTable::from_path("consents.csv")?;
//!
//! let (mut events, handle) = coordinator.start(table);
//! while let Some(event) = events.recv().await {
//!     println!("{event}");
//! }
//! let summary = handle.await??;
//! println!("Accepted: {}", summary.success_count);
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod ingest;
pub mod upload;
