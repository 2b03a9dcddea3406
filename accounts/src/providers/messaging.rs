//! Outbound message trait.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of message being sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageCategory {
    /// Account activation link.
    CreateAccountConfirmation,

    /// Password reset link.
    PasswordReset,
}

impl MessageCategory {
    /// Stable name for logs and transports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreateAccountConfirmation => "create_account_confirmation",
            Self::PasswordReset => "password_reset",
        }
    }
}

impl fmt::Display for MessageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message delivery service.
///
/// Fire-and-forget from the workflows' point of view: a failed send is
/// logged and never turns into a workflow failure.
pub trait MessageService: Send + Sync {
    /// Send a message.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Messaging` if the transport rejects the message.
    fn send(
        &self,
        to: &str,
        category: MessageCategory,
        subject: &str,
        content: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
