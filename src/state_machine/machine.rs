use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use super::error::MachineError;
use super::state::{Destination, StateConfig};

/// A synchronous finite-state machine with guarded transitions and
/// per-state lifecycle hooks.
///
/// - `S` — the state type;
/// - `T` — the trigger type;
/// - `C` — the context the machine owns and hands to hooks (`&mut C`) and
///   guards (`&C`);
/// - `A` — the argument type a trigger may carry into trigger-scoped entry hooks.
///
/// A single transition runs, in order:
/// 1. activate hooks of the source, if the machine is not active yet;
/// 2. deactivate hooks of the source;
/// 3. exit hooks of the source;
/// 4. the state update;
/// 5. entry hooks of the destination;
/// 6. trigger-scoped entry hooks of the destination for the firing trigger;
/// 7. activate hooks of the destination.
///
/// Reentrant transitions run the whole sequence with source and destination equal.
pub struct StateMachine<S, T, C, A = ()> {
    state: S,
    active: bool,
    context: C,
    states: HashMap<S, StateConfig<S, T, C, A>>,
}

impl<S, T, C, A> StateMachine<S, T, C, A>
where
    S: Copy + Eq + Hash + Display,
    T: Copy + PartialEq + Display,
{
    /// Create a machine sitting in `initial`, owning `context`.
    pub fn new(initial: S, context: C) -> Self {
        Self {
            state: initial,
            active: false,
            context,
            states: HashMap::new(),
        }
    }

    /// Configuration builder for `state`. Repeated calls extend the same configuration.
    pub fn configure(&mut self, state: S) -> &mut StateConfig<S, T, C, A> {
        self.states.entry(state).or_default()
    }

    pub fn state(&self) -> S {
        self.state
    }

    pub fn is_in_state(&self, state: S) -> bool {
        self.state == state
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    pub fn into_context(self) -> C {
        self.context
    }

    /// Whether `trigger` would currently be accepted (guards included).
    pub fn can_fire(&self, trigger: T) -> bool {
        self.resolve(trigger).is_ok()
    }

    /// Triggers accepted in the current state, in registration order, without duplicates.
    pub fn permitted_triggers(&self) -> Vec<T> {
        let mut triggers = Vec::new();
        if let Some(config) = self.states.get(&self.state) {
            for rule in &config.rules {
                if rule.is_satisfied(&self.context) && !triggers.contains(&rule.trigger) {
                    triggers.push(rule.trigger);
                }
            }
        }
        triggers
    }

    /// Run the activate hooks of the current state. No-op if already active.
    pub fn activate(&mut self) {
        if self.active {
            return;
        }
        self.active = true;
        if let Some(config) = self.states.get(&self.state) {
            for hook in &config.activate {
                hook(&mut self.context);
            }
        }
    }

    /// Run the deactivate hooks of the current state. No-op if not active.
    pub fn deactivate(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(config) = self.states.get(&self.state) {
            for hook in &config.deactivate {
                hook(&mut self.context);
            }
        }
    }

    /// Fire a trigger that carries no argument. Returns the new state.
    pub fn fire(&mut self, trigger: T) -> Result<S, MachineError> {
        self.transition(trigger, None)
    }

    /// Fire a trigger together with the argument handed to trigger-scoped
    /// entry hooks of the destination. Returns the new state.
    pub fn fire_with(&mut self, trigger: T, argument: A) -> Result<S, MachineError> {
        self.transition(trigger, Some(argument))
    }

    fn transition(&mut self, trigger: T, argument: Option<A>) -> Result<S, MachineError> {
        let destination = self.resolve(trigger)?;

        if argument.is_none()
            && self
                .states
                .get(&destination)
                .is_some_and(|config| config.expects_argument(trigger))
        {
            return Err(MachineError::MissingArgument {
                state: destination.to_string(),
                trigger: trigger.to_string(),
            });
        }

        self.activate();
        self.deactivate();

        if let Some(config) = self.states.get(&self.state) {
            for hook in &config.exit {
                hook(&mut self.context);
            }
        }

        self.state = destination;

        if let Some(config) = self.states.get(&destination) {
            for hook in &config.entry {
                hook(&mut self.context);
            }
            if let Some(argument) = &argument {
                for (_, hook) in config.entry_from.iter().filter(|(t, _)| *t == trigger) {
                    hook(&mut self.context, argument);
                }
            }
        }

        self.activate();
        Ok(destination)
    }

    /// Pick the destination for `trigger`: first rule, in registration
    /// order, whose guard holds.
    fn resolve(&self, trigger: T) -> Result<S, MachineError> {
        let mut rules = self
            .states
            .get(&self.state)
            .into_iter()
            .flat_map(|config| config.rules_for(trigger))
            .peekable();

        if rules.peek().is_none() {
            return Err(MachineError::InvalidTrigger {
                state: self.state.to_string(),
                trigger: trigger.to_string(),
            });
        }

        let mut guards = 0;
        for rule in rules {
            if rule.is_satisfied(&self.context) {
                return Ok(match rule.destination {
                    Destination::State(target) => target,
                    Destination::Reentry => self.state,
                });
            }
            guards += 1;
        }

        Err(MachineError::GuardsUnsatisfied {
            state: self.state.to_string(),
            trigger: trigger.to_string(),
            guards,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Light {
        Off,
        On,
        Broken,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Switch {
        Flip,
        Surge,
        Kick,
    }

    impl fmt::Display for Light {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{self:?}")
        }
    }

    impl fmt::Display for Switch {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{self:?}")
        }
    }

    #[derive(Default)]
    struct Log {
        events: Vec<String>,
        flips: u32,
    }

    type Machine = StateMachine<Light, Switch, Log, String>;

    fn record(event: &'static str) -> impl Fn(&mut Log) + Send + Sync + 'static {
        move |log: &mut Log| log.events.push(event.to_string())
    }

    fn traced_machine() -> Machine {
        let mut machine = Machine::new(Light::Off, Log::default());
        machine
            .configure(Light::Off)
            .on_entry(record("enter Off"))
            .on_activate(record("activate Off"))
            .on_deactivate(record("deactivate Off"))
            .on_exit(record("exit Off"))
            .permit(Switch::Flip, Light::On);
        machine
            .configure(Light::On)
            .on_entry(record("enter On"))
            .on_entry_from(Switch::Surge, |log, reason| {
                log.events.push(format!("surge: {reason}"))
            })
            .on_activate(record("activate On"))
            .on_deactivate(record("deactivate On"))
            .on_exit(record("exit On"))
            .on_exit(|log| log.flips += 1)
            .permit(Switch::Flip, Light::Off)
            .permit_if(Switch::Surge, Light::Broken, |log| log.flips >= 2)
            .permit_reentry_if(Switch::Surge, |log| log.flips < 2);
        machine.configure(Light::Broken).on_entry(record("enter Broken"));
        machine
    }

    #[test]
    fn unconditional_transition_runs_hooks_in_order() {
        let mut machine = traced_machine();

        assert_eq!(machine.fire(Switch::Flip), Ok(Light::On));
        assert_eq!(machine.state(), Light::On);
        assert_eq!(
            machine.context().events,
            vec![
                "activate Off",
                "deactivate Off",
                "exit Off",
                "enter On",
                "activate On",
            ]
        );
    }

    #[test]
    fn reentry_runs_full_exit_and_entry_cycle() {
        let mut machine = traced_machine();
        machine.fire(Switch::Flip).unwrap();
        machine.context_mut().events.clear();

        assert_eq!(machine.fire_with(Switch::Surge, "spike".into()), Ok(Light::On));
        assert_eq!(
            machine.context().events,
            vec![
                "deactivate On",
                "exit On",
                "enter On",
                "surge: spike",
                "activate On",
            ]
        );
        assert_eq!(machine.context().flips, 1);
    }

    #[test]
    fn first_satisfied_guard_wins() {
        let mut machine = traced_machine();
        machine.fire(Switch::Flip).unwrap();
        machine.fire_with(Switch::Surge, "one".into()).unwrap();
        machine.fire_with(Switch::Surge, "two".into()).unwrap();
        assert_eq!(machine.state(), Light::On);
        assert_eq!(machine.context().flips, 2);

        // The Broken rule was registered first, so it wins once its guard holds.
        machine.fire_with(Switch::Surge, "three".into()).unwrap();
        assert_eq!(machine.state(), Light::Broken);
        assert_eq!(machine.context().flips, 3);
    }

    #[test]
    fn invalid_trigger_leaves_state_untouched() {
        let mut machine = traced_machine();

        let err = machine.fire(Switch::Kick).unwrap_err();
        assert_eq!(
            err,
            MachineError::InvalidTrigger {
                state: "Off".into(),
                trigger: "Kick".into(),
            }
        );
        assert_eq!(machine.state(), Light::Off);
        assert!(machine.context().events.is_empty());
        assert!(!machine.is_active());
    }

    #[test]
    fn unconfigured_state_rejects_every_trigger() {
        let mut machine = traced_machine();
        machine.fire(Switch::Flip).unwrap();
        machine.context_mut().flips = 5;
        machine.fire_with(Switch::Surge, "final".into()).unwrap();
        assert_eq!(machine.state(), Light::Broken);

        for trigger in [Switch::Flip, Switch::Surge, Switch::Kick] {
            assert!(matches!(
                machine.fire(trigger),
                Err(MachineError::InvalidTrigger { .. })
            ));
        }
        assert_eq!(machine.state(), Light::Broken);
    }

    #[test]
    fn guards_unsatisfied_is_reported_with_guard_count() {
        let mut machine: StateMachine<Light, Switch, u32> = StateMachine::new(Light::Off, 0);
        machine
            .configure(Light::Off)
            .permit_if(Switch::Flip, Light::On, |n| *n > 10)
            .permit_reentry_if(Switch::Flip, |n| *n > 20);

        let err = machine.fire(Switch::Flip).unwrap_err();
        assert_eq!(
            err,
            MachineError::GuardsUnsatisfied {
                state: "Off".into(),
                trigger: "Flip".into(),
                guards: 2,
            }
        );
        assert_eq!(machine.state(), Light::Off);
    }

    #[test]
    fn missing_argument_is_rejected_before_any_hook() {
        let mut machine = traced_machine();
        machine.fire(Switch::Flip).unwrap();
        machine.context_mut().events.clear();

        let err = machine.fire(Switch::Surge).unwrap_err();
        assert_eq!(
            err,
            MachineError::MissingArgument {
                state: "On".into(),
                trigger: "Surge".into(),
            }
        );
        assert!(machine.context().events.is_empty());
        assert_eq!(machine.context().flips, 0);
    }

    #[test]
    fn trigger_scoped_hook_skipped_for_other_triggers() {
        let mut machine = traced_machine();
        machine.fire(Switch::Flip).unwrap();
        machine.fire(Switch::Flip).unwrap();
        machine.fire(Switch::Flip).unwrap();

        assert!(
            !machine
                .context()
                .events
                .iter()
                .any(|event| event.starts_with("surge"))
        );
    }

    #[test]
    fn explicit_activation_is_idempotent() {
        let mut machine = traced_machine();
        machine.activate();
        machine.activate();
        assert!(machine.is_active());
        assert_eq!(machine.context().events, vec!["activate Off"]);

        machine.deactivate();
        machine.deactivate();
        assert!(!machine.is_active());
        assert_eq!(
            machine.context().events,
            vec!["activate Off", "deactivate Off"]
        );
    }

    #[test]
    fn permitted_triggers_respect_guards() {
        let mut machine = traced_machine();
        assert_eq!(machine.permitted_triggers(), vec![Switch::Flip]);
        assert!(machine.can_fire(Switch::Flip));
        assert!(!machine.can_fire(Switch::Surge));

        machine.fire(Switch::Flip).unwrap();
        assert_eq!(machine.permitted_triggers(), vec![Switch::Flip, Switch::Surge]);
        assert!(machine.is_in_state(Light::On));
    }

    #[test]
    fn into_context_returns_owned_context() {
        let mut machine = traced_machine();
        machine.fire(Switch::Flip).unwrap();
        machine.fire(Switch::Flip).unwrap();

        let log = machine.into_context();
        assert_eq!(log.flips, 1);
    }
}
