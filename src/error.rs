use thiserror::Error;

use crate::delivery::State;
use crate::state_machine::MachineError;

#[derive(Debug, Error)]
pub enum CourierError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("State machine error: {0}")]
    Machine(#[from] MachineError),

    #[error("Delivery has not been sent yet (state {0})")]
    NotStarted(State),

    #[error("Delivery task aborted: {0}")]
    Aborted(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
