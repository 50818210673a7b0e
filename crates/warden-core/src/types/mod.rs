//! Shared value types.

pub mod clock;
pub mod credentials;

pub use clock::{Clock, ManualClock, SystemClock};
pub use credentials::{Credentials, PASSWORD_FIELD};
