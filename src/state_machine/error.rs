use thiserror::Error;

/// Reasons a fire request is refused. The machine's state is never changed
/// and no hook runs when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    /// The trigger has no rule at all in the current state.
    #[error("trigger {trigger} is not permitted in state {state}")]
    InvalidTrigger { state: String, trigger: String },

    /// Rules exist for the trigger but none of their guards holds.
    #[error("trigger {trigger} is permitted in state {state} but none of its {guards} guard(s) is satisfied")]
    GuardsUnsatisfied {
        state: String,
        trigger: String,
        guards: usize,
    },

    /// The destination expects an argument for this trigger and none was given.
    #[error("trigger {trigger} requires an argument to enter state {state}")]
    MissingArgument { state: String, trigger: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_trigger_display() {
        let err = MachineError::InvalidTrigger {
            state: "Completed".into(),
            trigger: "Send".into(),
        };
        assert_eq!(
            err.to_string(),
            "trigger Send is not permitted in state Completed"
        );
    }

    #[test]
    fn guards_unsatisfied_display() {
        let err = MachineError::GuardsUnsatisfied {
            state: "Pending".into(),
            trigger: "Reject".into(),
            guards: 2,
        };
        assert_eq!(
            err.to_string(),
            "trigger Reject is permitted in state Pending but none of its 2 guard(s) is satisfied"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MachineError>();
    }
}
