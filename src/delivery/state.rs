use std::fmt;

use serde::{Deserialize, Serialize};

/// The four states of a delivery.
///
/// Each delivery flows through: ACCEPTED → PENDING (→ PENDING ...) → COMPLETED | FAILED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    Accepted,
    Pending,
    Completed,
    Failed,
}

impl State {
    /// `Completed` and `Failed` have no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Completed | State::Failed)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Accepted => write!(f, "ACCEPTED"),
            State::Pending => write!(f, "PENDING"),
            State::Completed => write!(f, "COMPLETED"),
            State::Failed => write!(f, "FAILED"),
        }
    }
}

/// Events that move a delivery between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    /// Start delivering. Only legal from `Accepted`.
    Send,
    /// The remote service accepted the payload.
    Complete,
    /// The remote service refused the payload for good.
    Fail,
    /// The attempt failed in transit; carries the transport error.
    Reject,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Send => write!(f, "SEND"),
            Trigger::Complete => write!(f, "COMPLETE"),
            Trigger::Fail => write!(f, "FAIL"),
            Trigger::Reject => write!(f, "REJECT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!State::Accepted.is_terminal());
        assert!(!State::Pending.is_terminal());
        assert!(State::Completed.is_terminal());
        assert!(State::Failed.is_terminal());
    }

    #[test]
    fn state_display() {
        assert_eq!(State::Accepted.to_string(), "ACCEPTED");
        assert_eq!(State::Pending.to_string(), "PENDING");
        assert_eq!(State::Completed.to_string(), "COMPLETED");
        assert_eq!(State::Failed.to_string(), "FAILED");
    }

    #[test]
    fn trigger_display() {
        assert_eq!(Trigger::Send.to_string(), "SEND");
        assert_eq!(Trigger::Reject.to_string(), "REJECT");
    }
}
