use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use super::policy::RetryPolicy;
use super::record::{DeliveryRecord, DeliveryReport};
use super::state::{State, Trigger};
use crate::error::CourierError;
use crate::observer::{DeliveryEvent, Observer, Phase};
use crate::state_machine::StateMachine;
use crate::transport::{Transport, TransportError, TransportOutcome, WireBody};

/// The engine configured for deliveries: the record is its context and a
/// rejection carries the transport error.
pub type DeliveryMachine<P> = StateMachine<State, Trigger, DeliveryRecord<P>, TransportError>;

/// Drives one payload through ACCEPTED → PENDING → COMPLETED | FAILED.
///
/// Every fire goes through `&mut self`, so one controller can never be driven
/// by two fire requests at once. The `Pending` entry hook only posts an
/// attempt into the record; [`drive`](Self::drive) picks it up, waits out the
/// backoff, calls the transport and fires the resulting trigger.
pub struct DeliveryController<P, X> {
    machine: DeliveryMachine<P>,
    transport: X,
    policy: RetryPolicy,
    observer: Arc<dyn Observer>,
    state_tx: watch::Sender<State>,
}

impl<P, X> DeliveryController<P, X>
where
    P: Serialize + Send + 'static,
    X: Transport,
{
    /// Serialize `payload` and build a machine sitting in `Accepted`.
    pub fn new(
        payload: P,
        transport: X,
        policy: RetryPolicy,
        observer: Arc<dyn Observer>,
    ) -> Result<Self, CourierError> {
        let body = WireBody::json(&payload)?;
        let machine = build_machine(DeliveryRecord::new(payload, body), policy, &observer);
        let (state_tx, _) = watch::channel(machine.state());

        Ok(Self {
            machine,
            transport,
            policy,
            observer,
            state_tx,
        })
    }

    pub fn state(&self) -> State {
        self.machine.state()
    }

    pub fn record(&self) -> &DeliveryRecord<P> {
        self.machine.context()
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn transport(&self) -> &X {
        &self.transport
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<State> {
        self.state_tx.subscribe()
    }

    /// Record `endpoint` and fire `Send`. Returns as soon as the machine has
    /// entered `Pending`; the delivery itself happens in [`drive`](Self::drive).
    ///
    /// Fails when the delivery is no longer in `Accepted`, leaving both the
    /// state and the previously recorded endpoint untouched.
    pub fn send(&mut self, endpoint: impl Into<String>) -> Result<(), CourierError> {
        let previous = self.machine.context_mut().endpoint.replace(endpoint.into());
        if let Err(err) = self.fire(Trigger::Send) {
            self.machine.context_mut().endpoint = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Perform scheduled attempts until the machine reaches a terminal state.
    pub async fn drive(&mut self) -> Result<DeliveryReport, CourierError> {
        while let Some(retry) = self.machine.context_mut().take_scheduled() {
            let delay = self.policy.delay_for(retry);
            if !delay.is_zero() {
                self.observer.on_event(&DeliveryEvent::Backoff { retry, delay });
                sleep(delay).await;
            }

            let outcome = {
                let record = self.machine.context();
                let endpoint = record
                    .endpoint
                    .as_deref()
                    .ok_or(CourierError::NotStarted(self.machine.state()))?;
                self.observer.on_event(&DeliveryEvent::Attempt {
                    retry,
                    endpoint: endpoint.to_string(),
                });
                self.transport.deliver(endpoint, &record.body).await
            };

            match outcome {
                TransportOutcome::Success => self.fire(Trigger::Complete)?,
                TransportOutcome::HardFailure { status } => {
                    self.observer.on_event(&DeliveryEvent::Refused { retry, status });
                    self.machine.context_mut().last_error =
                        Some(format!("service responded with status {status}"));
                    self.fire(Trigger::Fail)?
                }
                TransportOutcome::Error(error) => self.reject(error)?,
            };
        }

        let state = self.machine.state();
        if !state.is_terminal() {
            return Err(CourierError::NotStarted(state));
        }
        Ok(DeliveryReport::from_record(
            self.machine.context(),
            state,
            self.policy.max_retries,
        ))
    }

    /// [`send`](Self::send) followed by [`drive`](Self::drive).
    pub async fn deliver(&mut self, endpoint: impl Into<String>) -> Result<DeliveryReport, CourierError> {
        self.send(endpoint)?;
        self.drive().await
    }

    /// [`send`](Self::send), then move the controller into its own task running
    /// [`drive`](Self::drive).
    pub fn spawn(mut self, endpoint: impl Into<String>) -> Result<DeliveryHandle, CourierError>
    where
        P: Sync,
        X: 'static,
    {
        self.send(endpoint)?;
        let state = self.subscribe();
        let task = tokio::spawn(async move { self.drive().await });
        Ok(DeliveryHandle { state, task })
    }

    fn fire(&mut self, trigger: Trigger) -> Result<State, CourierError> {
        let state = self.machine.fire(trigger)?;
        self.state_tx.send_replace(state);
        Ok(state)
    }

    fn reject(&mut self, error: TransportError) -> Result<State, CourierError> {
        let state = self.machine.fire_with(Trigger::Reject, error)?;
        self.state_tx.send_replace(state);
        Ok(state)
    }
}

/// A delivery running in its own task.
pub struct DeliveryHandle {
    state: watch::Receiver<State>,
    task: JoinHandle<Result<DeliveryReport, CourierError>>,
}

impl DeliveryHandle {
    pub fn state(&self) -> State {
        *self.state.borrow()
    }

    /// Wait for the next state change. `None` once the delivery task is gone.
    pub async fn changed(&mut self) -> Option<State> {
        self.state.changed().await.ok()?;
        Some(*self.state.borrow_and_update())
    }

    pub async fn wait(self) -> Result<DeliveryReport, CourierError> {
        self.task
            .await
            .map_err(|err| CourierError::Aborted(err.to_string()))?
    }
}

fn announce<P: 'static>(
    observer: &Arc<dyn Observer>,
    phase: Phase,
    state: State,
) -> impl Fn(&mut DeliveryRecord<P>) + Send + Sync + 'static {
    let observer = Arc::clone(observer);
    move |_: &mut DeliveryRecord<P>| observer.on_event(&DeliveryEvent::Lifecycle { phase, state })
}

fn report<P: 'static>(
    observer: &Arc<dyn Observer>,
    state: State,
) -> impl Fn(&mut DeliveryRecord<P>) + Send + Sync + 'static {
    let observer = Arc::clone(observer);
    move |record: &mut DeliveryRecord<P>| {
        let retries = record.retry_count.saturating_sub(1);
        let event = match state {
            State::Completed => DeliveryEvent::Completed { retries },
            _ => DeliveryEvent::Failed { retries },
        };
        observer.on_event(&event);
    }
}

fn record_rejection<P: 'static>(
    observer: &Arc<dyn Observer>,
) -> impl Fn(&mut DeliveryRecord<P>, &TransportError) + Send + Sync + 'static {
    let observer = Arc::clone(observer);
    move |record: &mut DeliveryRecord<P>, error: &TransportError| {
        observer.on_event(&DeliveryEvent::Rejected {
            retry: record.retry_count,
            error: error.to_string(),
        });
        record.last_error = Some(error.to_string());
    }
}

fn build_machine<P: Send + 'static>(
    record: DeliveryRecord<P>,
    policy: RetryPolicy,
    observer: &Arc<dyn Observer>,
) -> DeliveryMachine<P> {
    let mut machine = DeliveryMachine::new(State::Accepted, record);

    // Waits for the signal to send.
    machine
        .configure(State::Accepted)
        .on_entry(announce(observer, Phase::Entering, State::Accepted))
        .on_activate(announce(observer, Phase::Activating, State::Accepted))
        .permit(Trigger::Send, State::Pending)
        .on_deactivate(announce(observer, Phase::Deactivating, State::Accepted))
        .on_exit(announce(observer, Phase::Exiting, State::Accepted));

    // One entry per attempt. The terminal Reject rule is registered before the
    // reentry rule; their guards are complementary.
    machine
        .configure(State::Pending)
        .on_entry(announce(observer, Phase::Entering, State::Pending))
        .on_entry(|record| {
            record.history.push(State::Pending);
            record.schedule_attempt();
        })
        .on_entry_from(Trigger::Reject, record_rejection(observer))
        .on_activate(announce(observer, Phase::Activating, State::Pending))
        .permit(Trigger::Fail, State::Failed)
        .permit(Trigger::Complete, State::Completed)
        .permit_if(Trigger::Reject, State::Failed, move |record| {
            policy.is_exhausted(record.retry_count)
        })
        .permit_reentry_if(Trigger::Reject, move |record| {
            !policy.is_exhausted(record.retry_count)
        })
        .on_deactivate(announce(observer, Phase::Deactivating, State::Pending))
        .on_exit(|record| record.retry_count += 1)
        .on_exit(announce(observer, Phase::Exiting, State::Pending));

    for terminal in [State::Failed, State::Completed] {
        let config = machine.configure(terminal);
        config
            .on_entry(announce(observer, Phase::Entering, terminal))
            .on_entry(move |record| record.history.push(terminal))
            .on_entry(report(observer, terminal))
            .on_activate(announce(observer, Phase::Activating, terminal))
            .on_deactivate(announce(observer, Phase::Deactivating, terminal))
            .on_exit(announce(observer, Phase::Exiting, terminal));
        if terminal == State::Failed {
            config.on_entry_from(Trigger::Reject, record_rejection(observer));
        }
    }

    machine
}
