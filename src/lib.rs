//! State-machine driven delivery of a single payload to a remote service,
//! with bounded linear retry on transport errors.
//!
//! - [`state_machine`] — a generic engine with guarded, optionally reentrant
//!   transitions and ordered lifecycle hooks;
//! - [`delivery`] — the controller wiring the engine to a [`transport`];
//! - [`observer`] — where every lifecycle hook reports.

pub mod cli;
pub mod config;
pub mod delivery;
pub mod error;
pub mod logging;
pub mod observer;
pub mod state_machine;
pub mod transport;
pub mod ui;

pub use error::CourierError;
