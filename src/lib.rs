// IYS Bulk - Consent registry uploader
// Copyright (c) 2025 IYS Bulk Contributors
// Licensed under the MIT License

//! # IYS Bulk - Consent registry uploader
//!
//! IYS Bulk submits commercial-message consents (who agreed to, or withdrew
//! from, receiving SMS, calls or e-mail) from a CSV file to the Turkish IYS
//! consent registry.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Reading** the consent table with every cell kept as text
//! - **Normalizing** phone numbers, approval flags and timestamps
//! - **Deduplicating** repeated consents, last one wins
//! - **Uploading** in batches of at most 50, one request at a time
//! - **Polling** each request until the registry has processed it
//! - **Reconciling** per-consent results and reporting progress as events
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (ingest, upload pipeline)
//! - [`adapters`] - Registry integration
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use iys_bulk::config::load_config;
//! use iys_bulk::core::ingest::RawTable;
//! use iys_bulk::core::upload::UploadCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("iys.toml")?;
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//!     let coordinator = UploadCoordinator::from_config(&config, shutdown_rx)?;
//!     let table = RawTable::from_path("consents.csv")?;
//!
//!     let (mut events, handle) = coordinator.start(table);
//!     while let Some(event) = events.recv().await {
//!         println!("{event}");
//!     }
//!
//!     let summary = handle.await??;
//!     println!("Accepted {}, rejected {}", summary.success_count, summary.failure_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library code returns [`domain::IysError`]. Registry problems are
//! [`domain::RegistryError`]s; only an authentication failure ends the whole
//! run, every other registry error ends just the batch that raised it.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
