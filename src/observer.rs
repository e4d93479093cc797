//! Observation sink for delivery lifecycle events.
//!
//! Every hook the controller registers reports through an [`Observer`]. The
//! machine never consumes anything an observer returns, so implementations
//! are free to log, render a progress bar or collect events for tests.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::delivery::State;

/// Which lifecycle hook produced a [`DeliveryEvent::Lifecycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Entering,
    Activating,
    Deactivating,
    Exiting,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Entering => write!(f, "Entering"),
            Phase::Activating => write!(f, "Activating"),
            Phase::Deactivating => write!(f, "Deactivating"),
            Phase::Exiting => write!(f, "Exiting"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryEvent {
    Lifecycle { phase: Phase, state: State },
    /// Waiting before a retried attempt.
    Backoff { retry: u32, delay: Duration },
    /// About to invoke the transport.
    Attempt { retry: u32, endpoint: String },
    /// A transport error caused a `Reject`.
    Rejected { retry: u32, error: String },
    /// The remote service refused the payload with a hard failure status.
    Refused { retry: u32, status: u16 },
    Completed { retries: u32 },
    Failed { retries: u32 },
}

impl fmt::Display for DeliveryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryEvent::Lifecycle { phase, state } => write!(f, "{phase} {state} ..."),
            DeliveryEvent::Backoff { retry, delay } => {
                write!(f, "Delaying delivery for {}ms (retry {retry})", delay.as_millis())
            }
            DeliveryEvent::Attempt { retry, endpoint } => {
                write!(f, "[{retry}] Sending payload to service: {endpoint}")
            }
            DeliveryEvent::Rejected { error, .. } => write!(f, "Delivery error: {error}"),
            DeliveryEvent::Refused { status, .. } => {
                write!(f, "Service refused payload with status {status}")
            }
            DeliveryEvent::Completed { retries } => {
                write!(f, "File sending succeeded with retry count: {retries}")
            }
            DeliveryEvent::Failed { retries } => {
                write!(f, "File sending failed with retry count: {retries}")
            }
        }
    }
}

pub trait Observer: Send + Sync {
    fn on_event(&self, event: &DeliveryEvent);
}

/// Emits every event as a `tracing` event under the `courier` target.
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn on_event(&self, event: &DeliveryEvent) {
        match event {
            DeliveryEvent::Lifecycle { phase, state } => {
                tracing::debug!(target: "courier", %phase, %state, "{event}");
            }
            DeliveryEvent::Backoff { retry, delay } => {
                tracing::info!(target: "courier", retry, delay_ms = delay.as_millis() as u64, "{event}");
            }
            DeliveryEvent::Attempt { retry, endpoint } => {
                tracing::info!(target: "courier", retry, endpoint = %endpoint, "{event}");
            }
            DeliveryEvent::Rejected { retry, .. } => {
                tracing::warn!(target: "courier", retry, "{event}");
            }
            DeliveryEvent::Refused { retry, status } => {
                tracing::error!(target: "courier", retry, status, "{event}");
            }
            DeliveryEvent::Completed { retries } => {
                tracing::info!(target: "courier", retries, "{event}");
            }
            DeliveryEvent::Failed { retries } => {
                tracing::error!(target: "courier", retries, "{event}");
            }
        }
    }
}

/// Fans every event out to a list of observers, in order.
#[derive(Default, Clone)]
pub struct ObserverSet {
    observers: Vec<Arc<dyn Observer>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl Observer for ObserverSet {
    fn on_event(&self, event: &DeliveryEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}
