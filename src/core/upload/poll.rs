//! Status polling for a submitted request
//!
//! A request moves `Submitted -> Polling -> {Complete | TimedOut}`. Each
//! attempt waits the configured delay and then fetches the status. The
//! first response with no item in progress is final.

use crate::adapters::iys::{RegistryClient, StatusResponse};
use crate::config::PollingConfig;
use crate::core::clock::Clock;
use crate::domain::{RegistryError, RequestId, Result};
use std::time::Duration;

/// Registry statuses meaning "not finished yet"
pub const IN_PROGRESS_STATUSES: [&str; 3] = ["PENDING", "ENQUEUE", "IN_PROGRESS"];

/// Whether a registry status means processing has not finished
pub fn is_in_progress(status: &str) -> bool {
    let status = status.trim();
    IN_PROGRESS_STATUSES
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(status))
}

/// Whether any part of a status response is still being processed
pub fn response_in_progress(response: &StatusResponse) -> bool {
    match response {
        StatusResponse::Items(items) => items.iter().any(|item| is_in_progress(&item.status)),
        StatusResponse::Summary(summary) => summary
            .status
            .as_deref()
            .map(is_in_progress)
            .unwrap_or(false),
    }
}

/// Lifecycle of one request's polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    Submitted,
    Polling,
    Complete,
    TimedOut,
}

/// Progress of polling for one request
#[derive(Debug, Clone)]
pub struct PollState {
    /// Attempts made so far
    pub attempt: u32,
    /// Most recent response
    pub last_observed: Option<StatusResponse>,
    pub phase: PollPhase,
}

impl PollState {
    pub fn new() -> Self {
        Self {
            attempt: 0,
            last_observed: None,
            phase: PollPhase::Submitted,
        }
    }

    /// Complete or timed out
    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, PollPhase::Complete | PollPhase::TimedOut)
    }

    /// Fold one status response into the state
    pub fn observe(&mut self, response: StatusResponse, max_attempts: u32) {
        self.attempt += 1;
        self.phase = if !response_in_progress(&response) {
            PollPhase::Complete
        } else if self.attempt >= max_attempts {
            PollPhase::TimedOut
        } else {
            PollPhase::Polling
        };
        self.last_observed = Some(response);
    }
}

impl Default for PollState {
    fn default() -> Self {
        Self::new()
    }
}

/// Attempt budget and spacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl From<&PollingConfig> for PollPolicy {
    fn from(config: &PollingConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            delay: Duration::from_secs(config.delay_seconds),
        }
    }
}

/// Polls a request until it completes or the budget runs out
pub struct StatusPoller<'a> {
    client: &'a dyn RegistryClient,
    clock: &'a dyn Clock,
    policy: PollPolicy,
}

impl<'a> StatusPoller<'a> {
    pub fn new(client: &'a dyn RegistryClient, clock: &'a dyn Clock, policy: PollPolicy) -> Self {
        Self {
            client,
            clock,
            policy,
        }
    }

    /// Poll until the request is complete
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::PollTimeout` when every attempt still shows
    /// items in progress, or the fetch error that ended polling.
    pub async fn poll(&self, request_id: &RequestId) -> Result<StatusResponse> {
        let mut state = PollState::new();

        while !state.is_terminal() && state.attempt < self.policy.max_attempts {
            self.clock.sleep(self.policy.delay).await;

            let response = self.client.fetch_status(request_id).await?;
            state.observe(response, self.policy.max_attempts);

            tracing::debug!(
                request_id = %request_id,
                attempt = state.attempt,
                phase = ?state.phase,
                "Polled request status"
            );
        }

        match (state.phase, state.last_observed) {
            (PollPhase::Complete, Some(response)) => Ok(response),
            _ => {
                tracing::warn!(
                    request_id = %request_id,
                    attempts = state.attempt,
                    "Request still processing after last status check"
                );
                Err(RegistryError::PollTimeout {
                    request_id: request_id.to_string(),
                    attempts: state.attempt,
                }
                .into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::iys::{RequestSummary, SubRequestStatus};
    use crate::domain::{ConsentRecord, IysError};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use test_case::test_case;

    struct ScriptedStatus {
        responses: Mutex<Vec<Result<StatusResponse>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedStatus {
        fn new(mut responses: Vec<Result<StatusResponse>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl RegistryClient for ScriptedStatus {
        async fn authenticate(&self) -> Result<()> {
            Ok(())
        }

        async fn submit(&self, _records: &[ConsentRecord]) -> Result<RequestId> {
            Ok(RequestId::new("req").unwrap())
        }

        async fn fetch_status(&self, _request_id: &RequestId) -> Result<StatusResponse> {
            *self.calls.lock().unwrap() += 1;
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(items(&["ENQUEUE"])))
        }

        fn base_url(&self) -> &str {
            "http://registry.test"
        }
    }

    #[derive(Default)]
    struct RecordingClock {
        delays: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Clock for RecordingClock {
        async fn sleep(&self, duration: Duration) {
            self.delays.lock().unwrap().push(duration);
        }
    }

    fn items(statuses: &[&str]) -> StatusResponse {
        StatusResponse::Items(
            statuses
                .iter()
                .enumerate()
                .map(|(i, status)| SubRequestStatus {
                    index: Some(i),
                    status: status.to_string(),
                    error: None,
                })
                .collect(),
        )
    }

    fn policy() -> PollPolicy {
        PollPolicy {
            max_attempts: 12,
            delay: Duration::from_secs(5),
        }
    }

    #[test_case("ENQUEUE", true ; "enqueue")]
    #[test_case("pending", true ; "lower case pending")]
    #[test_case("In_Progress", true ; "mixed case")]
    #[test_case("COMPLETED", false ; "completed")]
    #[test_case("FAILED", false ; "failed")]
    #[test_case("", false ; "empty")]
    fn test_is_in_progress(status: &str, expected: bool) {
        assert_eq!(is_in_progress(status), expected);
    }

    #[test]
    fn test_summary_object_progress_follows_its_status() {
        let mut summary = RequestSummary {
            status: Some("IN_PROGRESS".to_string()),
            completed_count: None,
            failed_count: None,
            sub_request_errors: Vec::new(),
        };
        assert!(response_in_progress(&StatusResponse::Summary(summary.clone())));

        summary.status = None;
        assert!(!response_in_progress(&StatusResponse::Summary(summary)));
    }

    #[test]
    fn test_state_transitions() {
        let mut state = PollState::new();
        assert_eq!(state.phase, PollPhase::Submitted);

        state.observe(items(&["ENQUEUE", "COMPLETED"]), 3);
        assert_eq!(state.phase, PollPhase::Polling);
        assert!(!state.is_terminal());

        state.observe(items(&["COMPLETED", "FAILED"]), 3);
        assert_eq!(state.phase, PollPhase::Complete);
        assert_eq!(state.attempt, 2);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_state_times_out_on_budget() {
        let mut state = PollState::new();
        state.observe(items(&["ENQUEUE"]), 2);
        state.observe(items(&["ENQUEUE"]), 2);
        assert_eq!(state.phase, PollPhase::TimedOut);
    }

    #[tokio::test]
    async fn test_poll_returns_first_complete_response() {
        let client = ScriptedStatus::new(vec![
            Ok(items(&["ENQUEUE", "ENQUEUE"])),
            Ok(items(&["COMPLETED", "ENQUEUE"])),
            Ok(items(&["COMPLETED", "FAILED"])),
        ]);
        let clock = RecordingClock::default();
        let poller = StatusPoller::new(&client, &clock, policy());

        let response = poller.poll(&RequestId::new("req").unwrap()).await.unwrap();

        assert_eq!(response, items(&["COMPLETED", "FAILED"]));
        assert_eq!(client.calls(), 3);
        assert_eq!(
            *clock.delays.lock().unwrap(),
            vec![Duration::from_secs(5); 3]
        );
    }

    #[tokio::test]
    async fn test_poll_all_enqueue_times_out() {
        let client = ScriptedStatus::new(Vec::new());
        let clock = RecordingClock::default();
        let poller = StatusPoller::new(&client, &clock, policy());

        let err = poller.poll(&RequestId::new("req-7").unwrap()).await.unwrap_err();

        match err {
            IysError::Registry(RegistryError::PollTimeout {
                request_id,
                attempts,
            }) => {
                assert_eq!(request_id, "req-7");
                assert_eq!(attempts, 12);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert_eq!(client.calls(), 12);
        assert_eq!(clock.delays.lock().unwrap().len(), 12);
    }

    #[tokio::test]
    async fn test_poll_fetch_error_ends_polling() {
        let client = ScriptedStatus::new(vec![
            Ok(items(&["ENQUEUE"])),
            Err(RegistryError::Api {
                status: 500,
                body: "boom".to_string(),
            }
            .into()),
        ]);
        let clock = RecordingClock::default();
        let poller = StatusPoller::new(&client, &clock, policy());

        let err = poller.poll(&RequestId::new("req").unwrap()).await.unwrap_err();
        assert!(matches!(
            err,
            IysError::Registry(RegistryError::Api { status: 500, .. })
        ));
        assert_eq!(client.calls(), 2);
    }
}
