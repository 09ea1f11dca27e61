//! Reconciliation of a final status response against its batch
//!
//! Maps every status entry back to the record it describes and tallies
//! successes and failures.

use super::batch::Batch;
use crate::adapters::iys::{describe_error, StatusResponse, SubRequestStatus};
use crate::domain::Recipient;
use serde_json::Value;
use std::fmt;

/// Registry statuses meaning the consent was accepted
pub const SUCCESS_STATUSES: [&str; 2] = ["SUCCESS", "COMPLETED"];

fn is_success(status: &str) -> bool {
    let status = status.trim();
    SUCCESS_STATUSES
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(status))
}

/// Final state of one submitted record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordResult {
    Succeeded,
    Failed { reason: String },
}

/// Outcome of one record, as reported by the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Index within the submitted batch, as the registry reports it
    pub batch_index: usize,

    /// Index in the deduplicated record list, when the batch index is in range
    pub record_index: Option<usize>,

    /// Source row, when the index maps to a submitted record
    pub row: Option<usize>,

    /// Recipient, when the index maps to a submitted record
    pub recipient: Option<Recipient>,

    pub result: RecordResult,
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.result, RecordResult::Failed { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "index {}", self.batch_index)?;
        match (self.row, &self.recipient) {
            (Some(row), Some(recipient)) => write!(f, " (row {row}, {recipient})")?,
            (Some(row), None) => write!(f, " (row {row})")?,
            _ => {}
        }
        if let RecordResult::Failed { reason } = &self.result {
            write!(f, ": {reason}")?;
        }
        Ok(())
    }
}

/// Per-record outcomes and tallies for one batch
#[derive(Debug, Clone, Default)]
pub struct BatchReconciliation {
    pub outcomes: Vec<Outcome>,
    pub success_count: usize,
    pub failure_count: usize,
}

impl BatchReconciliation {
    /// Outcomes of the records the registry rejected
    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|outcome| outcome.is_failure())
    }
}

/// Reconcile a final status response with the batch it belongs to
pub fn reconcile(batch: &Batch, response: &StatusResponse) -> BatchReconciliation {
    match response {
        StatusResponse::Items(items) => reconcile_items(batch, items),
        StatusResponse::Summary(summary) => {
            let outcomes: Vec<Outcome> = summary
                .sub_request_errors
                .iter()
                .enumerate()
                .map(|(position, error)| {
                    let batch_index = error
                        .get("index")
                        .and_then(Value::as_u64)
                        .map(|i| usize::try_from(i).unwrap_or(usize::MAX))
                        .unwrap_or(position);
                    let reason = error
                        .get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .or_else(|| describe_error(error))
                        .unwrap_or_else(|| "rejected by registry".to_string());
                    outcome(batch, batch_index, RecordResult::Failed { reason })
                })
                .collect();

            BatchReconciliation {
                success_count: summary.completed_count.unwrap_or(0),
                failure_count: summary.failed_count.unwrap_or(outcomes.len()),
                outcomes,
            }
        }
    }
}

fn reconcile_items(batch: &Batch, items: &[SubRequestStatus]) -> BatchReconciliation {
    let mut reconciliation = BatchReconciliation::default();

    for (position, item) in items.iter().enumerate() {
        let batch_index = item.index.unwrap_or(position);
        let result = if is_success(&item.status) {
            reconciliation.success_count += 1;
            RecordResult::Succeeded
        } else {
            reconciliation.failure_count += 1;
            RecordResult::Failed {
                reason: item
                    .error_detail()
                    .unwrap_or_else(|| format!("status {}", item.status.trim())),
            }
        };
        reconciliation
            .outcomes
            .push(outcome(batch, batch_index, result));
    }

    reconciliation
}

fn outcome(batch: &Batch, batch_index: usize, result: RecordResult) -> Outcome {
    let record = batch.records.get(batch_index);
    Outcome {
        batch_index,
        record_index: record.and_then(|_| batch.offset.checked_add(batch_index)),
        row: record.map(|r| r.row),
        recipient: record.map(|r| r.recipient.clone()),
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::iys::RequestSummary;
    use crate::domain::{ApprovalStatus, ConsentRecord, RecipientType};
    use chrono::NaiveDate;
    use serde_json::json;

    fn batch(offset: usize, recipients: &[&str]) -> Batch {
        let records = recipients
            .iter()
            .enumerate()
            .map(|(i, recipient)| ConsentRecord {
                row: offset + i + 1,
                recipient: Recipient::normalize(recipient).unwrap(),
                consent_type: "MESAJ".to_string(),
                source: "HS_WEB".to_string(),
                approval_status: ApprovalStatus::Granted,
                consent_date: NaiveDate::from_ymd_opt(2025, 6, 20)
                    .unwrap()
                    .and_hms_opt(14, 0, 0)
                    .unwrap(),
                recipient_type: RecipientType::Individual,
            })
            .collect();
        Batch::new(1, offset, records)
    }

    #[test]
    fn test_reconcile_item_list() {
        let response: StatusResponse = serde_json::from_value(json!([
            {"index": 0, "status": "COMPLETED"},
            {"index": 1, "status": "FAILED", "error": {"message": "bad number"}}
        ]))
        .unwrap();
        let batch = batch(0, &["5459419845", "5467338892"]);

        let reconciliation = reconcile(&batch, &response);

        assert_eq!(reconciliation.success_count, 1);
        assert_eq!(reconciliation.failure_count, 1);
        let failures: Vec<&Outcome> = reconciliation.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].batch_index, 1);
        assert_eq!(failures[0].row, Some(2));
        assert_eq!(
            failures[0].to_string(),
            "index 1 (row 2, +905467338892): bad number"
        );
    }

    #[test]
    fn test_counts_match_items_returned() {
        let response: StatusResponse = serde_json::from_value(json!([
            {"status": "success"},
            {"status": "REJECTED"},
            {"status": "Completed"},
            {"status": "FAILED", "error": "duplicate"}
        ]))
        .unwrap();
        let batch = batch(0, &["5459419845", "5467338892", "5551112233", "5554445566"]);

        let reconciliation = reconcile(&batch, &response);

        assert_eq!(
            reconciliation.success_count + reconciliation.failure_count,
            response.item_count()
        );
        assert_eq!(reconciliation.success_count, 2);
        let reasons: Vec<String> = reconciliation.failures().map(|o| o.to_string()).collect();
        assert_eq!(reasons[0], "index 1 (row 2, +905467338892): status REJECTED");
        assert_eq!(reasons[1], "index 3 (row 4, +905554445566): duplicate");
    }

    #[test]
    fn test_record_index_includes_batch_offset() {
        let response: StatusResponse =
            serde_json::from_value(json!([{"index": 0, "status": "FAILED"}])).unwrap();
        let batch = batch(50, &["5459419845"]);

        let reconciliation = reconcile(&batch, &response);
        assert_eq!(reconciliation.outcomes[0].record_index, Some(50));
        assert_eq!(reconciliation.outcomes[0].row, Some(51));
    }

    #[test]
    fn test_out_of_range_index_has_no_record() {
        let response: StatusResponse =
            serde_json::from_value(json!([{"index": 9, "status": "FAILED"}])).unwrap();
        let batch = batch(0, &["5459419845"]);

        let reconciliation = reconcile(&batch, &response);
        assert!(reconciliation.outcomes[0].recipient.is_none());
        assert!(reconciliation.outcomes[0].record_index.is_none());
        assert_eq!(reconciliation.outcomes[0].to_string(), "index 9: status FAILED");
    }

    #[test]
    fn test_huge_index_in_later_batch() {
        let response: StatusResponse = serde_json::from_value(json!([
            {"index": u64::MAX, "status": "FAILED"}
        ]))
        .unwrap();
        let batch = batch(50, &["5459419845"]);

        let reconciliation = reconcile(&batch, &response);

        assert_eq!(reconciliation.failure_count, 1);
        let outcome = &reconciliation.outcomes[0];
        assert!(outcome.record_index.is_none());
        assert!(outcome.row.is_none());
        assert!(outcome.to_string().ends_with(": status FAILED"));
    }

    #[test]
    fn test_huge_index_in_summary_errors() {
        let response = StatusResponse::Summary(RequestSummary {
            status: Some("COMPLETED".to_string()),
            completed_count: Some(0),
            failed_count: Some(1),
            sub_request_errors: vec![json!({"index": u64::MAX, "message": "invalid"})],
        });
        let batch = batch(50, &["5459419845"]);

        let reconciliation = reconcile(&batch, &response);

        assert!(reconciliation.outcomes[0].record_index.is_none());
        assert!(reconciliation.outcomes[0].recipient.is_none());
    }

    #[test]
    fn test_failed_count_without_error_list() {
        let response = StatusResponse::Summary(RequestSummary {
            status: Some("COMPLETED".to_string()),
            completed_count: Some(0),
            failed_count: Some(2),
            sub_request_errors: Vec::new(),
        });
        let batch = batch(0, &["5459419845", "5467338892"]);

        let reconciliation = reconcile(&batch, &response);

        assert_eq!(reconciliation.failure_count, 2);
        assert_eq!(reconciliation.failures().count(), 0);
    }

    #[test]
    fn test_reconcile_summary_object() {
        let response = StatusResponse::Summary(RequestSummary {
            status: Some("COMPLETED".to_string()),
            completed_count: Some(1),
            failed_count: None,
            sub_request_errors: vec![json!({"index": 1, "code": "H174", "message": "invalid"})],
        });
        let batch = batch(0, &["5459419845", "5467338892"]);

        let reconciliation = reconcile(&batch, &response);

        assert_eq!(reconciliation.success_count, 1);
        assert_eq!(reconciliation.failure_count, 1);
        assert_eq!(
            reconciliation.outcomes[0].to_string(),
            "index 1 (row 2, +905467338892): invalid"
        );
    }
}
