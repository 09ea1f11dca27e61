//! Upload coordinator - main orchestrator for the upload process
//!
//! Runs the pipeline for one input table: normalize, deduplicate, batch,
//! then submit, poll and reconcile each batch in turn while reporting
//! progress on the event stream.

use super::batch::{into_batches, Batch};
use super::dedup::deduplicate;
use super::events::{channel, EventEmitter, EventStream};
use super::poll::{PollPolicy, StatusPoller};
use super::reconcile::{reconcile, BatchReconciliation};
use super::summary::{BatchError, UploadSummary};
use crate::adapters::iys::{IysClient, RegistryClient};
use crate::config::{BatchErrorPolicy, IysConfig, PollingConfig, MAX_BATCH_SIZE};
use crate::core::clock::{Clock, TokioClock};
use crate::core::ingest::{normalize_all, DroppedRow, RawTable};
use crate::domain::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Knobs for one upload run
#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub batch_size: usize,
    pub deduplicate: bool,
    pub on_batch_error: BatchErrorPolicy,
    pub poll: PollPolicy,
    pub event_buffer: usize,
    pub event_send_timeout: Duration,
}

impl UploadSettings {
    /// Settings from a loaded configuration
    pub fn from_config(config: &IysConfig) -> Self {
        Self {
            batch_size: config.upload.batch_size,
            deduplicate: config.upload.deduplicate,
            on_batch_error: config.upload.on_batch_error,
            poll: PollPolicy::from(&config.polling),
            event_buffer: config.upload.event_buffer,
            event_send_timeout: config.upload.event_send_timeout(),
        }
    }
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            batch_size: MAX_BATCH_SIZE,
            deduplicate: true,
            on_batch_error: BatchErrorPolicy::default(),
            poll: PollPolicy::from(&PollingConfig::default()),
            event_buffer: 64,
            event_send_timeout: Duration::from_secs(5),
        }
    }
}

/// Result of preparing an input table, before anything is sent
#[derive(Debug, Clone, Default)]
pub struct PreparedUpload {
    /// Non-blank data rows in the input table
    pub total_rows: usize,

    /// Rows left out during normalization
    pub dropped: Vec<DroppedRow>,

    /// Records collapsed by deduplication
    pub duplicates_removed: usize,

    /// Batches in submission order
    pub batches: Vec<Batch>,
}

impl PreparedUpload {
    /// Records left to submit
    pub fn record_count(&self) -> usize {
        self.batches.iter().map(Batch::len).sum()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// Summary of a run that stops after preparation
    pub fn summary(&self) -> UploadSummary {
        UploadSummary {
            total_rows: self.total_rows,
            dropped_rows: self.dropped.len(),
            duplicates_removed: self.duplicates_removed,
            records_prepared: self.record_count(),
            batches_planned: self.batch_count(),
            ..UploadSummary::default()
        }
    }
}

/// Upload coordinator
pub struct UploadCoordinator {
    client: Arc<dyn RegistryClient>,
    clock: Arc<dyn Clock>,
    settings: UploadSettings,
    shutdown: watch::Receiver<bool>,
}

impl UploadCoordinator {
    /// Create a coordinator over an existing client and clock
    pub fn new(
        client: Arc<dyn RegistryClient>,
        clock: Arc<dyn Clock>,
        settings: UploadSettings,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            client,
            clock,
            settings,
            shutdown,
        }
    }

    /// Create a coordinator talking to the configured registry
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn from_config(config: &IysConfig, shutdown: watch::Receiver<bool>) -> Result<Self> {
        let client = IysClient::new(config.registry.clone())?;
        Ok(Self::new(
            Arc::new(client),
            Arc::new(TokioClock),
            UploadSettings::from_config(config),
            shutdown,
        ))
    }

    pub fn settings(&self) -> &UploadSettings {
        &self.settings
    }

    /// Normalize, deduplicate and batch the table without any network call
    ///
    /// # Errors
    ///
    /// Returns a validation error for missing columns or a malformed
    /// timestamp, and a configuration error for a bad batch size.
    pub fn prepare(&self, table: &RawTable) -> Result<PreparedUpload> {
        let raws = table.records()?;
        let normalized = normalize_all(&raws)?;

        let (records, duplicates_removed) = if self.settings.deduplicate {
            let outcome = deduplicate(normalized.records);
            (outcome.records, outcome.discarded)
        } else {
            (normalized.records, 0)
        };

        let batches = into_batches(records, self.settings.batch_size)?;

        Ok(PreparedUpload {
            total_rows: table.data_row_count(),
            dropped: normalized.dropped,
            duplicates_removed,
            batches,
        })
    }

    /// Run the whole pipeline, reporting progress on `events`
    ///
    /// Batch errors are reported and, under the `continue` policy, the run
    /// moves on to the next batch.
    ///
    /// # Errors
    ///
    /// Returns the error that aborted the run: invalid input, failed
    /// authentication, or any batch error under the `abort` policy. A
    /// terminal `error` event is emitted first.
    pub async fn run(&self, table: &RawTable, events: &EventEmitter) -> Result<UploadSummary> {
        let start_time = Instant::now();

        tracing::info!(
            registry = %self.client.base_url(),
            rows = table.data_row_count(),
            batch_size = self.settings.batch_size,
            "Starting upload"
        );
        events
            .info(format!("Loaded {} rows", table.data_row_count()), 0.0)
            .await;

        let prepared = match self.prepare(table) {
            Ok(prepared) => prepared,
            Err(e) => {
                events.error(e.to_string(), 0.0).await;
                return Err(e);
            }
        };

        let mut summary = prepared.summary();
        let total = prepared.batch_count();

        if !prepared.dropped.is_empty() {
            let rows: Vec<String> = prepared.dropped.iter().map(|d| d.row.to_string()).collect();
            events
                .warning(
                    format!(
                        "Dropped {} rows with an empty recipient or consent type (rows {})",
                        prepared.dropped.len(),
                        rows.join(", ")
                    ),
                    0.0,
                )
                .await;
        }
        if prepared.duplicates_removed > 0 {
            events
                .warning(
                    format!(
                        "Removed {} duplicate records (same recipient and consent type)",
                        prepared.duplicates_removed
                    ),
                    0.0,
                )
                .await;
        }

        events
            .info(
                format!(
                    "Prepared {} records in {} batches",
                    prepared.record_count(),
                    total
                ),
                0.0,
            )
            .await;

        if total == 0 {
            events.complete("No records to upload.").await;
            let summary = summary.with_duration(start_time.elapsed());
            summary.log_summary();
            return Ok(summary);
        }

        for mut batch in prepared.batches {
            let number = batch.number;
            let done = number as f64 / total as f64;

            let shutdown_requested = *self.shutdown.borrow();
            if shutdown_requested || events.is_detached() {
                tracing::warn!(
                    next_batch = number,
                    detached = events.is_detached(),
                    "Stopping before next batch"
                );
                summary.interrupted = true;
                events
                    .warning(
                        "Upload interrupted",
                        (number - 1) as f64 / total as f64,
                    )
                    .await;
                break;
            }

            match self.process_batch(&mut batch, total, events).await {
                Ok(reconciliation) => {
                    let succeeded = reconciliation.success_count;
                    let failed = reconciliation.failure_count;

                    events
                        .success(
                            format!(
                                "Batch {number}/{total}: processing complete. Success: {succeeded}, Failed: {failed}"
                            ),
                            done,
                        )
                        .await;

                    if failed > 0 {
                        let failures: Vec<String> =
                            reconciliation.failures().map(ToString::to_string).collect();
                        let message = if failures.is_empty() {
                            format!(
                                "Batch {number}/{total}: {failed} records rejected without per-record details"
                            )
                        } else {
                            format!(
                                "Batch {number}/{total}: failed records: {}",
                                failures.join("; ")
                            )
                        };
                        events.warning(message, done).await;
                    }

                    summary.batches_completed += 1;
                    summary.success_count += succeeded;
                    summary.failure_count += failed;
                    summary.outcomes.extend(reconciliation.outcomes);
                }
                Err(e) => {
                    let message = format!("Batch {number}/{total}: {e}");

                    if e.is_run_fatal() || self.settings.on_batch_error == BatchErrorPolicy::Abort
                    {
                        events
                            .error(format!("{message}. Upload aborted."), done)
                            .await;
                        return Err(e);
                    }

                    events.error(message, done).await;
                    summary.add_error(BatchError::from_error(
                        number,
                        batch.request_id().map(ToString::to_string),
                        &e,
                    ));
                }
            }
        }

        if !summary.interrupted {
            events.complete("All batches processed.").await;
        }

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    /// Submit, poll and reconcile one batch
    async fn process_batch(
        &self,
        batch: &mut Batch,
        total: usize,
        events: &EventEmitter,
    ) -> Result<BatchReconciliation> {
        let number = batch.number;

        let request_id = self.client.submit(&batch.records).await?;
        batch.mark_submitted(request_id.clone())?;

        events
            .info(
                format!(
                    "Batch {number}/{total}: submitted {} records, request id {request_id}",
                    batch.len()
                ),
                (number as f64 - 0.5) / total as f64,
            )
            .await;

        let poller = StatusPoller::new(
            self.client.as_ref(),
            self.clock.as_ref(),
            self.settings.poll,
        );
        let response = poller.poll(&request_id).await?;

        Ok(reconcile(batch, &response))
    }

    /// Spawn the run and return the consumer side of its event stream
    ///
    /// The stream ends when the run finishes; the join handle yields the
    /// run's result.
    pub fn start(self, table: RawTable) -> (EventStream, JoinHandle<Result<UploadSummary>>) {
        let (emitter, stream) = channel(
            self.settings.event_buffer,
            self.settings.event_send_timeout,
        );

        let handle = tokio::spawn(async move { self.run(&table, &emitter).await });

        (stream, handle)
    }
}
