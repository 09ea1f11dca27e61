//! Upload orchestration
//!
//! This module provides the upload pipeline, including:
//! - Deduplication and batching of normalized records
//! - Submission, status polling and reconciliation per batch
//! - Progress events and the run summary

pub mod batch;
pub mod coordinator;
pub mod dedup;
pub mod events;
pub mod poll;
pub mod reconcile;
pub mod summary;

pub use batch::{into_batches, Batch};
pub use coordinator::{PreparedUpload, UploadCoordinator, UploadSettings};
pub use dedup::{deduplicate, DedupOutcome};
pub use events::{channel, EventEmitter, EventKind, EventStream, UploadEvent};
pub use poll::{PollPhase, PollPolicy, PollState, StatusPoller};
pub use reconcile::{reconcile, BatchReconciliation, Outcome, RecordResult};
pub use summary::{BatchError, BatchErrorKind, UploadSummary};
