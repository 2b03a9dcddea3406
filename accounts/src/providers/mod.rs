//! Account workflow providers.
//!
//! This module defines traits for all external dependencies used by the
//! workflows. These traits enable dependency injection and make the
//! workflows testable at memory speed.
//!
//! # Architecture
//!
//! Providers are **interfaces**, not implementations. The workflows depend
//! on these traits, and the application wires in concrete implementations:
//!
//! ```text
//! ┌────────────────────┐      ┌──────────────────────────────────┐
//! │ ActivationWorkflow │─────▶│ ActionCodeStore  (Redis / PG)     │
//! │ ResetWorkflow      │─────▶│ IdentityStore    (PG)             │
//! │                    │─────▶│ MessageService   (SMTP / console) │
//! │                    │─────▶│ ClientRegistry                    │
//! │                    │─────▶│ PasswordPolicy                    │
//! │                    │ - - ▶│ AccountEventPublisher (optional)  │
//! └────────────────────┘      └──────────────────────────────────┘
//! ```
//!
//! - **Testing**: Use mocks (in-memory, deterministic)
//! - **Production**: Use real services (`PostgreSQL`, `Redis`, SMTP)
//! - **Development**: Use console messaging (links in the log)

pub mod clients;
pub mod code_store;
pub mod console_messaging;
pub mod events;
pub mod identity;
pub mod messaging;
pub mod password;
pub mod smtp_messaging;

// Re-export provider traits
pub use clients::ClientRegistry;
pub use code_store::{ActionCode, ActionCodeStore, CodeIntent};
pub use console_messaging::ConsoleMessageService;
pub use events::{AccountEventPublisher, BroadcastEventPublisher};
pub use identity::IdentityStore;
pub use messaging::{MessageCategory, MessageService};
pub use password::{DefaultPasswordPolicy, PasswordPolicy};
pub use smtp_messaging::SmtpMessageService;
