use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};

use super::client::Transport;
use super::error::TransportError;
use super::types::{TransportOutcome, WireBody};

/// One scripted reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Succeed,
    HardFail(u16),
    Transient(String),
}

impl Step {
    fn outcome(&self) -> TransportOutcome {
        match self {
            Step::Succeed => TransportOutcome::Success,
            Step::HardFail(status) => TransportOutcome::HardFailure { status: *status },
            Step::Transient(reason) => TransportOutcome::Error(TransportError::Simulated(reason.clone())),
        }
    }
}

/// A call observed by [`ScriptedTransport`].
#[derive(Debug, Clone)]
pub struct Call {
    pub endpoint: String,
    pub at: Instant,
    pub bytes: usize,
}

/// Replays a fixed script of outcomes, repeating the last step once the
/// script runs out. Drives the `demo` command and the controller tests.
pub struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    last: Step,
    latency: Duration,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        let steps: VecDeque<Step> = steps.into_iter().collect();
        let last = steps.back().cloned().unwrap_or(Step::Succeed);
        Self {
            steps: Mutex::new(steps),
            last,
            latency: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `failures` transient errors followed by `then`.
    pub fn failing(failures: usize, then: Step) -> Self {
        let mut steps: Vec<Step> = (1..=failures)
            .map(|n| Step::Transient(format!("connection reset (attempt {n})")))
            .collect();
        steps.push(then);
        Self::new(steps)
    }

    /// Simulated network latency added to every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }
}

impl Transport for ScriptedTransport {
    async fn deliver(&self, endpoint: &str, body: &WireBody) -> TransportOutcome {
        self.calls.lock().await.push(Call {
            endpoint: endpoint.to_string(),
            at: Instant::now(),
            bytes: body.len(),
        });

        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }

        let step = self.steps.lock().await.pop_front();
        step.as_ref().unwrap_or(&self.last).outcome()
    }
}
