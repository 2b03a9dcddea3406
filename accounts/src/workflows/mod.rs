//! Action code workflows.
//!
//! Both workflows consume the same collaborators (code store, identity
//! store, message service) and never call each other.

pub mod activation;
pub mod reset;

pub use activation::{AccountActivated, ActivationRequested, ActivationWorkflow};
pub use reset::{ForgotPasswordInfo, ResetWorkflow};
