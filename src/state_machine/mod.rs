mod error;
mod machine;
mod state;

pub use error::MachineError;
pub use machine::StateMachine;
pub use state::{ArgumentHook, Guard, Hook, StateConfig};
