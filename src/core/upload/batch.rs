//! Batching of prepared records
//!
//! Each batch becomes one consent request. A batch records the request id
//! the registry assigned to it, exactly once.

use crate::config::MAX_BATCH_SIZE;
use crate::domain::{ConsentRecord, IysError, RequestId, Result};

/// A contiguous slice of the prepared records, submitted as one request
#[derive(Debug, Clone)]
pub struct Batch {
    /// 1-based batch number
    pub number: usize,

    /// Position of the first record in the prepared list
    pub offset: usize,

    /// Records in submission order
    pub records: Vec<ConsentRecord>,

    request_id: Option<RequestId>,
}

impl Batch {
    /// Create an unsubmitted batch
    pub fn new(number: usize, offset: usize, records: Vec<ConsentRecord>) -> Self {
        Self {
            number,
            offset,
            records,
            request_id: None,
        }
    }

    /// Number of records in the batch
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Request id assigned by the registry, once submitted
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Record the request id returned for this batch
    ///
    /// # Errors
    ///
    /// A batch is submitted once; assigning a second id is an error.
    pub fn mark_submitted(&mut self, request_id: RequestId) -> Result<()> {
        if let Some(existing) = &self.request_id {
            return Err(IysError::Other(format!(
                "Batch {} already submitted as request {existing}",
                self.number
            )));
        }
        self.request_id = Some(request_id);
        Ok(())
    }
}

/// Validates a batch size against the registry limit
///
/// # Errors
///
/// Returns a configuration error outside `1..=MAX_BATCH_SIZE`.
pub fn check_batch_size(batch_size: usize) -> Result<()> {
    if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
        return Err(IysError::Configuration(format!(
            "batch_size must be between 1 and {MAX_BATCH_SIZE}, got {batch_size}"
        )));
    }
    Ok(())
}

/// Splits records into consecutive batches of at most `batch_size`
///
/// Every batch is full except possibly the last. No records yields no
/// batches.
///
/// # Errors
///
/// Returns a configuration error for an out-of-range batch size.
pub fn into_batches(records: Vec<ConsentRecord>, batch_size: usize) -> Result<Vec<Batch>> {
    check_batch_size(batch_size)?;

    let mut batches = Vec::with_capacity(records.len().div_ceil(batch_size));
    let mut records = records.into_iter().peekable();
    let mut offset = 0;

    while records.peek().is_some() {
        let chunk: Vec<ConsentRecord> = records.by_ref().take(batch_size).collect();
        let len = chunk.len();
        batches.push(Batch::new(batches.len() + 1, offset, chunk));
        offset += len;
    }

    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApprovalStatus, Recipient, RecipientType};
    use chrono::NaiveDate;
    use test_case::test_case;

    fn records(count: usize) -> Vec<ConsentRecord> {
        (0..count)
            .map(|i| ConsentRecord {
                row: i + 1,
                recipient: Recipient::normalize(&format!("54594{:05}", i)).unwrap(),
                consent_type: "MESAJ".to_string(),
                source: "HS_WEB".to_string(),
                approval_status: ApprovalStatus::Granted,
                consent_date: NaiveDate::from_ymd_opt(2025, 6, 20)
                    .unwrap()
                    .and_hms_opt(14, 0, 0)
                    .unwrap(),
                recipient_type: RecipientType::Individual,
            })
            .collect()
    }

    #[test_case(0, 50, &[] ; "no records")]
    #[test_case(1, 50, &[1] ; "single record")]
    #[test_case(50, 50, &[50] ; "exactly one batch")]
    #[test_case(51, 50, &[50, 1] ; "one over")]
    #[test_case(120, 50, &[50, 50, 20] ; "several")]
    #[test_case(5, 2, &[2, 2, 1] ; "small batch size")]
    fn test_into_batches_sizes(count: usize, batch_size: usize, expected: &[usize]) {
        let batches = into_batches(records(count), batch_size).unwrap();
        let sizes: Vec<usize> = batches.iter().map(Batch::len).collect();
        assert_eq!(sizes, expected);
    }

    #[test]
    fn test_batches_preserve_order_and_offsets() {
        let batches = into_batches(records(5), 2).unwrap();

        assert_eq!(batches[0].number, 1);
        assert_eq!(batches[2].number, 3);
        assert_eq!(batches[1].offset, 2);
        assert_eq!(batches[2].offset, 4);
        assert_eq!(batches[1].records[0].row, 3);
        assert_eq!(batches[2].records[0].row, 5);
    }

    #[test_case(0 ; "zero")]
    #[test_case(51 ; "over limit")]
    fn test_invalid_batch_size(batch_size: usize) {
        let err = into_batches(records(3), batch_size).unwrap_err();
        assert!(matches!(err, IysError::Configuration(_)));
    }

    #[test]
    fn test_request_id_assigned_once() {
        let mut batch = Batch::new(1, 0, records(1));
        assert!(batch.request_id().is_none());

        batch.mark_submitted(RequestId::new("req-1").unwrap()).unwrap();
        assert_eq!(batch.request_id().unwrap().as_str(), "req-1");

        assert!(batch.mark_submitted(RequestId::new("req-2").unwrap()).is_err());
        assert_eq!(batch.request_id().unwrap().as_str(), "req-1");
    }
}
