use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::State;
use crate::transport::WireBody;

/// Everything the controller tracks about one delivery. Owned by the state
/// machine as its context, so the record lives exactly as long as the machine.
#[derive(Debug)]
pub struct DeliveryRecord<P> {
    pub id: String,
    pub payload: P,
    pub body: WireBody,
    pub endpoint: Option<String>,
    /// Incremented on every exit from `Pending`, i.e. once per attempt.
    pub retry_count: u32,
    /// Attempt posted by the `Pending` entry hook, waiting for the driver.
    scheduled: Option<u32>,
    pub history: Vec<State>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl<P> DeliveryRecord<P> {
    pub fn new(payload: P, body: WireBody) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            payload,
            body,
            endpoint: None,
            retry_count: 0,
            scheduled: None,
            history: vec![State::Accepted],
            last_error: None,
            created_at: Utc::now(),
        }
    }

    /// Post an attempt at the current retry counter.
    pub(crate) fn schedule_attempt(&mut self) {
        self.scheduled = Some(self.retry_count);
    }

    pub(crate) fn take_scheduled(&mut self) -> Option<u32> {
        self.scheduled.take()
    }

    pub fn has_scheduled_attempt(&self) -> bool {
        self.scheduled.is_some()
    }
}

/// Structured record produced once a delivery reaches a terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub delivery_id: String,
    pub endpoint: String,
    pub final_state: State,
    /// Transport invocations made.
    pub attempts: u32,
    /// Attempts beyond the first one.
    pub retries: u32,
    pub max_retries: u32,
    pub state_transitions: Vec<State>,
    pub last_error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl DeliveryReport {
    pub fn from_record<P>(record: &DeliveryRecord<P>, final_state: State, max_retries: u32) -> Self {
        let now = Utc::now();
        let duration = now - record.created_at;

        Self {
            delivery_id: record.id.clone(),
            endpoint: record.endpoint.clone().unwrap_or_default(),
            final_state,
            attempts: record.retry_count,
            retries: record.retry_count.saturating_sub(1),
            max_retries,
            state_transitions: record.history.clone(),
            last_error: record.last_error.clone(),
            started_at: record.created_at,
            completed_at: now,
            duration_ms: duration.num_milliseconds(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.final_state == State::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record() -> DeliveryRecord<&'static str> {
        DeliveryRecord::new("payload", WireBody::json(&"payload").unwrap())
    }

    #[test]
    fn record_creation_defaults() {
        let record = make_record();
        assert_eq!(record.retry_count, 0);
        assert_eq!(record.history, vec![State::Accepted]);
        assert!(record.endpoint.is_none());
        assert!(record.last_error.is_none());
        assert!(!record.has_scheduled_attempt());
    }

    #[test]
    fn scheduled_attempt_is_taken_once() {
        let mut record = make_record();
        record.retry_count = 3;
        record.schedule_attempt();
        assert!(record.has_scheduled_attempt());
        assert_eq!(record.take_scheduled(), Some(3));
        assert_eq!(record.take_scheduled(), None);
    }

    #[test]
    fn report_from_record() {
        let mut record = make_record();
        record.endpoint = Some("http://localhost/in".into());
        record.retry_count = 3;
        record.history.extend([State::Pending, State::Pending, State::Pending, State::Failed]);
        record.last_error = Some("connection reset".into());

        let report = DeliveryReport::from_record(&record, State::Failed, 5);
        assert_eq!(report.delivery_id, record.id);
        assert_eq!(report.endpoint, "http://localhost/in");
        assert_eq!(report.attempts, 3);
        assert_eq!(report.retries, 2);
        assert_eq!(report.max_retries, 5);
        assert_eq!(report.state_transitions.len(), 5);
        assert!(!report.succeeded());
    }

    #[test]
    fn report_serialization_roundtrip() {
        let report = DeliveryReport::from_record(&make_record(), State::Completed, 5);
        let json = serde_json::to_string(&report).unwrap();
        let parsed: DeliveryReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.delivery_id, report.delivery_id);
        assert_eq!(parsed.final_state, State::Completed);
        assert!(parsed.succeeded());
    }
}
