mod controller;
mod payload;
mod policy;
mod record;
mod state;

pub use controller::{DeliveryController, DeliveryHandle, DeliveryMachine};
pub use payload::FileInformation;
pub use policy::RetryPolicy;
pub use record::{DeliveryRecord, DeliveryReport};
pub use state::{State, Trigger};
