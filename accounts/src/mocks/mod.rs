//! Mock provider implementations for testing.
//!
//! This module provides simple, in-memory implementations of all provider traits
//! for use in unit and integration tests.

pub mod clients;
pub mod clock;
pub mod code_store;
pub mod events;
pub mod identity;
pub mod messaging;

pub use clients::MockClientRegistry;
pub use clock::MockClock;
pub use code_store::MockActionCodeStore;
pub use events::MockEventPublisher;
pub use identity::MockIdentityStore;
pub use messaging::{MockMessageService, SentMessage};
