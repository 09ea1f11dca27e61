//! Upload progress events
//!
//! The pipeline reports progress through a bounded channel. The producer
//! side never blocks for longer than its send timeout, and notices when the
//! consumer has gone away.

use futures::Stream;
use serde::Serialize;
use std::fmt;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::SendTimeoutError};

/// Kind of progress event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Info,
    Success,
    Warning,
    Error,
    Complete,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventKind::Info => "info",
            EventKind::Success => "success",
            EventKind::Warning => "warning",
            EventKind::Error => "error",
            EventKind::Complete => "complete",
        };
        f.write_str(label)
    }
}

/// One progress event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadEvent {
    pub kind: EventKind,
    pub message: String,
    /// Fraction of the run done, in `[0, 1]`
    pub progress: f64,
}

impl UploadEvent {
    /// Create an event; progress is clamped to `[0, 1]`
    pub fn new(kind: EventKind, message: impl Into<String>, progress: f64) -> Self {
        let progress = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            kind,
            message: message.into(),
            progress,
        }
    }
}

impl fmt::Display for UploadEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:>3.0}%] {}: {}",
            self.progress * 100.0,
            self.kind,
            self.message
        )
    }
}

/// Create a fresh emitter/stream pair for one run
pub fn channel(capacity: usize, send_timeout: Duration) -> (EventEmitter, EventStream) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        EventEmitter {
            tx,
            send_timeout,
            detached: AtomicBool::new(false),
        },
        EventStream { rx },
    )
}

/// Producer side of the event channel
#[derive(Debug)]
pub struct EventEmitter {
    tx: mpsc::Sender<UploadEvent>,
    send_timeout: Duration,
    detached: AtomicBool,
}

impl EventEmitter {
    /// Whether the consumer has dropped its stream
    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Relaxed) || self.tx.is_closed()
    }

    /// Log and queue an event
    ///
    /// Waits at most the send timeout for queue space; an event that does
    /// not fit in time is dropped.
    pub async fn emit(&self, event: UploadEvent) {
        match event.kind {
            EventKind::Warning => {
                tracing::warn!(progress = event.progress, "{}", event.message)
            }
            EventKind::Error => {
                tracing::error!(progress = event.progress, "{}", event.message)
            }
            _ => tracing::info!(
                kind = %event.kind,
                progress = event.progress,
                "{}",
                event.message
            ),
        }

        if self.detached.load(Ordering::Relaxed) {
            return;
        }

        match self.tx.send_timeout(event, self.send_timeout).await {
            Ok(()) => {}
            Err(SendTimeoutError::Timeout(event)) => {
                tracing::warn!(
                    timeout_ms = self.send_timeout.as_millis() as u64,
                    message = %event.message,
                    "Event consumer too slow, event dropped"
                );
            }
            Err(SendTimeoutError::Closed(_)) => {
                tracing::warn!("Event consumer went away");
                self.detached.store(true, Ordering::Relaxed);
            }
        }
    }

    pub async fn info(&self, message: impl Into<String>, progress: f64) {
        self.emit(UploadEvent::new(EventKind::Info, message, progress))
            .await
    }

    pub async fn success(&self, message: impl Into<String>, progress: f64) {
        self.emit(UploadEvent::new(EventKind::Success, message, progress))
            .await
    }

    pub async fn warning(&self, message: impl Into<String>, progress: f64) {
        self.emit(UploadEvent::new(EventKind::Warning, message, progress))
            .await
    }

    pub async fn error(&self, message: impl Into<String>, progress: f64) {
        self.emit(UploadEvent::new(EventKind::Error, message, progress))
            .await
    }

    pub async fn complete(&self, message: impl Into<String>) {
        self.emit(UploadEvent::new(EventKind::Complete, message, 1.0))
            .await
    }
}

/// Consumer side of the event channel
///
/// Ends once the run has finished and every queued event was read.
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::Receiver<UploadEvent>,
}

impl EventStream {
    /// Next event, or `None` when the run is over
    pub async fn recv(&mut self) -> Option<UploadEvent> {
        self.rx.recv().await
    }
}

impl Stream for EventStream {
    type Item = UploadEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
