//! Upload summary and reporting
//!
//! This module defines structures for tracking and reporting upload results.

use super::reconcile::Outcome;
use crate::domain::{IysError, RegistryError};
use std::time::Duration;

/// Summary of an upload run
#[derive(Debug, Clone, Default)]
pub struct UploadSummary {
    /// Non-blank data rows read from the input
    pub total_rows: usize,

    /// Rows left out for an empty recipient or consent type
    pub dropped_rows: usize,

    /// Records collapsed by deduplication
    pub duplicates_removed: usize,

    /// Records left to submit after deduplication
    pub records_prepared: usize,

    /// Batches planned for the run
    pub batches_planned: usize,

    /// Batches whose status was reconciled
    pub batches_completed: usize,

    /// Batches that failed on submission, status fetch or response shape
    pub batches_failed: usize,

    /// Batches still processing when polling gave up
    pub batches_timed_out: usize,

    /// Records the registry accepted
    pub success_count: usize,

    /// Records the registry rejected
    pub failure_count: usize,

    /// Every per-record outcome, in batch order
    pub outcomes: Vec<Outcome>,

    /// Batch-level errors
    pub errors: Vec<BatchError>,

    /// Stopped early by a shutdown signal or a departed consumer
    pub interrupted: bool,

    /// Prepared only, nothing sent
    pub dry_run: bool,

    pub duration: Duration,
}

impl UploadSummary {
    /// Create a new empty upload summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Record a batch-level error
    pub fn add_error(&mut self, error: BatchError) {
        match error.kind {
            BatchErrorKind::Timeout => self.batches_timed_out += 1,
            _ => self.batches_failed += 1,
        }
        self.errors.push(error);
    }

    /// Everything submitted was accepted and the run was not cut short
    pub fn is_successful(&self) -> bool {
        self.failure_count == 0 && self.errors.is_empty() && !self.interrupted
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            total_rows = self.total_rows,
            dropped_rows = self.dropped_rows,
            duplicates_removed = self.duplicates_removed,
            records = self.records_prepared,
            batches = self.batches_planned,
            batches_completed = self.batches_completed,
            succeeded = self.success_count,
            failed = self.failure_count,
            interrupted = self.interrupted,
            dry_run = self.dry_run,
            duration_secs = self.duration.as_secs(),
            "Upload finished"
        );

        if !self.errors.is_empty() {
            tracing::warn!(
                error_count = self.errors.len(),
                "Upload finished with batch errors"
            );
            for error in &self.errors {
                tracing::warn!(
                    batch = error.batch,
                    kind = ?error.kind,
                    request_id = error.request_id.as_deref().unwrap_or("-"),
                    message = %error.message,
                    "Batch error"
                );
            }
        }
    }
}

/// What went wrong with a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchErrorKind {
    /// Registry rejected the request (non-2xx)
    Api,
    /// Registry could not be reached
    Connection,
    /// Registry answered with something unusable
    UnexpectedResponse,
    /// Request still processing after the last status check
    Timeout,
    /// Anything else
    Unknown,
}

/// Batch-level error with context
#[derive(Debug, Clone)]
pub struct BatchError {
    /// 1-based batch number
    pub batch: usize,

    pub kind: BatchErrorKind,

    /// Request id, when the batch was accepted before failing
    pub request_id: Option<String>,

    pub message: String,

    /// Raw registry body, when there was one
    pub registry_body: Option<String>,
}

impl BatchError {
    /// Build a batch error from the error that ended the batch
    pub fn from_error(batch: usize, request_id: Option<String>, error: &IysError) -> Self {
        let kind = match error {
            IysError::Registry(RegistryError::Api { .. }) => BatchErrorKind::Api,
            IysError::Registry(RegistryError::ConnectionFailed(_)) => BatchErrorKind::Connection,
            IysError::Registry(RegistryError::UnexpectedResponse(_)) => {
                BatchErrorKind::UnexpectedResponse
            }
            IysError::Registry(RegistryError::PollTimeout { .. }) => BatchErrorKind::Timeout,
            _ => BatchErrorKind::Unknown,
        };
        let registry_body = match error {
            IysError::Registry(registry) => registry.registry_body().map(str::to_string),
            _ => None,
        };

        Self {
            batch,
            kind,
            request_id,
            message: error.to_string(),
            registry_body,
        }
    }
}
