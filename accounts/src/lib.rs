//! # Composable Rust Accounts
//!
//! Single-use, time-bound action codes and the two workflows built on them:
//! email account activation and password reset.
//!
//! ## Features
//!
//! - **Single-use codes**: atomic check-and-delete in every store
//! - **Race-safe provisioning**: duplicate signups resolve through the
//!   identity store's uniqueness constraint
//! - **Safe redirects**: caller-supplied redirect URIs are used only when
//!   they match a client's registered wildcard patterns
//! - **Typed payloads**: versioned, tagged JSON validated at decode time
//! - **Testable**: every collaborator is a trait with an in-memory mock
//!
//! ## Architecture
//!
//! ```text
//! ActivationWorkflow ──┐                  ┌── ActionCodeStore  (Redis / PostgreSQL / mock)
//!                      ├── uses ──────────┼── IdentityStore    (PostgreSQL / mock)
//! ResetWorkflow ───────┘                  │
//!                                         │   activation only:
//!                                         ├── MessageService   (SMTP / console / mock)
//!                                         └── ClientRegistry
//! ```
//!
//! Reset codes are returned to the caller, which owns their delivery.
//!
//! Every operation takes the tenant [`ZoneId`] explicitly.
//!
//! ## Example: Activation
//!
//! ```rust,ignore
//! use composable_rust_accounts::*;
//!
//! let workflow = ActivationWorkflow::new(codes, identities, messages, clients, ActivationConfig::from_env());
//! let zone = ZoneId::uaa();
//!
//! // 1. Signup: account created, code mailed
//! let requested = workflow
//!     .begin_activation(&zone, "user@example.com", "secret", Some("app"), Some("https://app.example.com/cb"))
//!     .await?;
//!
//! // 2. User clicks the link
//! let activated = workflow.complete_activation(&zone, &code_from_link).await?;
//! assert_eq!(activated.redirect, "https://app.example.com/cb");
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod payload;
pub mod providers;
pub mod provisioner;
pub mod redirect;
pub mod state;
pub mod stores;
pub mod utils;
pub mod workflows;

// Mock implementations for testing
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use clock::{Clock, SharedClock, SystemClock};
pub use config::{ActivationConfig, PasswordPolicyConfig, ResetConfig, SmtpConfig};
pub use error::{AccountError, Result};
pub use events::AccountEvent;
pub use payload::{ActivationPayload, CodePayload, ResetPayload};
pub use provisioner::AccountProvisioner;
pub use redirect::RedirectResolver;
pub use state::{Account, NewAccount, RedirectRegistration, UserId, ZoneId};
pub use workflows::{
    AccountActivated, ActivationRequested, ActivationWorkflow, ForgotPasswordInfo, ResetWorkflow,
};
