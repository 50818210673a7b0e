//! Authentication events.
//!
//! Guards, the password broker, the login throttle, and the two-factor
//! challenge publish these on an [`EventBus`] so audit logging and
//! notifications can observe the auth lifecycle without coupling to it.

pub mod auth;
pub mod bus;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use auth::AuthEvent;
pub use bus::EventBus;

/// An auth event with delivery metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The event payload.
    pub payload: AuthEvent,
}

impl DomainEvent {
    /// Wrap a payload.
    pub fn new(payload: AuthEvent) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            payload,
        }
    }
}
