//! Per-recipient delivery tracking
//!
//! Fan-out failures never abort the originating send; each outcome lands
//! here and is queryable afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Outcome of one delivery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Delivered,
    Failed,
}

/// One recipient's delivery outcome for one message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub message_id: String,
    pub recipient: String,
    pub status: DeliveryStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    pub timestamp: DateTime<Utc>,
}

impl DeliveryRecord {
    pub fn delivered(message_id: impl Into<String>, recipient: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            recipient: recipient.into(),
            status: DeliveryStatus::Delivered,
            reason: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failed(
        message_id: impl Into<String>,
        recipient: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            recipient: recipient.into(),
            status: DeliveryStatus::Failed,
            reason: Some(reason.into()),
            timestamp: Utc::now(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == DeliveryStatus::Failed
    }
}

/// Bounded, queryable log of delivery outcomes
#[derive(Clone)]
pub struct DeliveryLog {
    records: Arc<Mutex<VecDeque<DeliveryRecord>>>,
    cap: usize,
}

impl DeliveryLog {
    pub fn new(cap: usize) -> Self {
        Self {
            records: Arc::new(Mutex::new(VecDeque::new())),
            cap: cap.max(1),
        }
    }

    pub fn record(&self, record: DeliveryRecord) {
        let mut records = self.records.lock().expect("delivery log poisoned");
        if records.len() == self.cap {
            records.pop_front();
        }
        records.push_back(record);
    }

    /// All records, oldest first
    pub fn all(&self) -> Vec<DeliveryRecord> {
        self.records
            .lock()
            .expect("delivery log poisoned")
            .iter()
            .cloned()
            .collect()
    }

    /// Outcomes for one message, in fan-out order
    pub fn for_message(&self, message_id: &str) -> Vec<DeliveryRecord> {
        self.records
            .lock()
            .expect("delivery log poisoned")
            .iter()
            .filter(|r| r.message_id == message_id)
            .cloned()
            .collect()
    }

    /// Failed deliveries only
    pub fn failures(&self) -> Vec<DeliveryRecord> {
        self.records
            .lock()
            .expect("delivery log poisoned")
            .iter()
            .filter(|r| r.is_failure())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("delivery log poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_query() {
        let log = DeliveryLog::new(16);
        log.record(DeliveryRecord::delivered("m-1", "infra"));
        log.record(DeliveryRecord::failed("m-1", "ghost", "unknown agent"));
        log.record(DeliveryRecord::delivered("m-2", "quality"));

        assert_eq!(log.len(), 3);
        assert_eq!(log.for_message("m-1").len(), 2);

        let failures = log.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].recipient, "ghost");
        assert_eq!(failures[0].reason.as_deref(), Some("unknown agent"));
    }

    #[test]
    fn test_cap_drops_oldest() {
        let log = DeliveryLog::new(2);
        log.record(DeliveryRecord::delivered("m-1", "a"));
        log.record(DeliveryRecord::delivered("m-2", "b"));
        log.record(DeliveryRecord::delivered("m-3", "c"));

        assert_eq!(log.len(), 2);
        assert!(log.for_message("m-1").is_empty());
        assert_eq!(log.for_message("m-3").len(), 1);
    }
}
