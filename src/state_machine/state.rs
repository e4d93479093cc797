//! Per-state configuration: lifecycle hooks and permitted transitions.
//!
//! A [`StateConfig`] is obtained from [`StateMachine::configure`] and filled
//! in with a chain of builder calls:
//!
//! ```rust
//! use courier::state_machine::StateMachine;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Door { Open, Closed }
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Action { Push, Pull }
//!
//! impl std::fmt::Display for Door {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{self:?}")
//!     }
//! }
//! impl std::fmt::Display for Action {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{self:?}")
//!     }
//! }
//!
//! let mut machine: StateMachine<Door, Action, u32> = StateMachine::new(Door::Closed, 0);
//! machine
//!     .configure(Door::Closed)
//!     .on_exit(|opened| *opened += 1)
//!     .permit(Action::Pull, Door::Open);
//! machine.configure(Door::Open).permit(Action::Push, Door::Closed);
//!
//! machine.fire(Action::Pull).unwrap();
//! assert_eq!(machine.state(), Door::Open);
//! assert_eq!(*machine.context(), 1);
//! ```
//!
//! [`StateMachine::configure`]: super::StateMachine::configure

/// Hook run with mutable access to the machine's context.
pub type Hook<C> = Box<dyn Fn(&mut C) + Send + Sync>;

/// Hook run with the context and the argument carried by the firing trigger.
pub type ArgumentHook<C, A> = Box<dyn Fn(&mut C, &A) + Send + Sync>;

/// Predicate deciding whether a transition is currently legal.
pub type Guard<C> = Box<dyn Fn(&C) -> bool + Send + Sync>;

/// Where a permitted transition leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Destination<S> {
    State(S),
    /// Back into the source state, running the full exit/entry cycle.
    Reentry,
}

pub(crate) struct Rule<S, T, C> {
    pub(crate) trigger: T,
    pub(crate) destination: Destination<S>,
    pub(crate) guard: Option<Guard<C>>,
}

impl<S, T, C> Rule<S, T, C> {
    pub(crate) fn is_satisfied(&self, context: &C) -> bool {
        self.guard.as_ref().is_none_or(|guard| guard(context))
    }
}

/// Hooks and outgoing transitions registered for a single state.
pub struct StateConfig<S, T, C, A> {
    pub(crate) entry: Vec<Hook<C>>,
    pub(crate) entry_from: Vec<(T, ArgumentHook<C, A>)>,
    pub(crate) activate: Vec<Hook<C>>,
    pub(crate) deactivate: Vec<Hook<C>>,
    pub(crate) exit: Vec<Hook<C>>,
    pub(crate) rules: Vec<Rule<S, T, C>>,
}

impl<S, T, C, A> Default for StateConfig<S, T, C, A> {
    fn default() -> Self {
        Self {
            entry: Vec::new(),
            entry_from: Vec::new(),
            activate: Vec::new(),
            deactivate: Vec::new(),
            exit: Vec::new(),
            rules: Vec::new(),
        }
    }
}

impl<S, T, C, A> StateConfig<S, T, C, A>
where
    T: Copy + PartialEq,
{
    /// Run `hook` every time the state is entered, whatever the trigger.
    pub fn on_entry(&mut self, hook: impl Fn(&mut C) + Send + Sync + 'static) -> &mut Self {
        self.entry.push(Box::new(hook));
        self
    }

    /// Run `hook` with the trigger's argument, only when `trigger` caused the entry.
    ///
    /// Runs after all [`on_entry`](Self::on_entry) hooks. Firing `trigger`
    /// into this state without an argument is rejected with
    /// [`MachineError::MissingArgument`](super::MachineError::MissingArgument).
    pub fn on_entry_from(
        &mut self,
        trigger: T,
        hook: impl Fn(&mut C, &A) + Send + Sync + 'static,
    ) -> &mut Self {
        self.entry_from.push((trigger, Box::new(hook)));
        self
    }

    /// Run `hook` when the machine starts using this state as its current one.
    pub fn on_activate(&mut self, hook: impl Fn(&mut C) + Send + Sync + 'static) -> &mut Self {
        self.activate.push(Box::new(hook));
        self
    }

    /// Run `hook` when the machine is about to move away from this state.
    pub fn on_deactivate(&mut self, hook: impl Fn(&mut C) + Send + Sync + 'static) -> &mut Self {
        self.deactivate.push(Box::new(hook));
        self
    }

    /// Run `hook` every time the state is exited, whatever the trigger.
    pub fn on_exit(&mut self, hook: impl Fn(&mut C) + Send + Sync + 'static) -> &mut Self {
        self.exit.push(Box::new(hook));
        self
    }

    /// Unconditional transition to `target` on `trigger`.
    pub fn permit(&mut self, trigger: T, target: S) -> &mut Self {
        self.rules.push(Rule {
            trigger,
            destination: Destination::State(target),
            guard: None,
        });
        self
    }

    /// Transition to `target` on `trigger`, legal only while `guard` holds.
    ///
    /// Rules sharing a trigger are evaluated in registration order and the
    /// first satisfied one wins.
    pub fn permit_if(
        &mut self,
        trigger: T,
        target: S,
        guard: impl Fn(&C) -> bool + Send + Sync + 'static,
    ) -> &mut Self {
        self.rules.push(Rule {
            trigger,
            destination: Destination::State(target),
            guard: Some(Box::new(guard)),
        });
        self
    }

    /// Transition back into this same state on `trigger`, legal only while
    /// `guard` holds. Exit and entry hooks run as for any other transition.
    pub fn permit_reentry_if(
        &mut self,
        trigger: T,
        guard: impl Fn(&C) -> bool + Send + Sync + 'static,
    ) -> &mut Self {
        self.rules.push(Rule {
            trigger,
            destination: Destination::Reentry,
            guard: Some(Box::new(guard)),
        });
        self
    }

    pub(crate) fn rules_for(&self, trigger: T) -> impl Iterator<Item = &Rule<S, T, C>> {
        self.rules.iter().filter(move |rule| rule.trigger == trigger)
    }

    pub(crate) fn expects_argument(&self, trigger: T) -> bool {
        self.entry_from.iter().any(|(t, _)| *t == trigger)
    }
}
