pub mod client;
pub mod error;
pub mod scripted;
pub mod types;

pub use client::{HttpTransport, Transport};
pub use error::TransportError;
pub use scripted::{Call, ScriptedTransport, Step};
pub use types::{TransportOutcome, WireBody};
