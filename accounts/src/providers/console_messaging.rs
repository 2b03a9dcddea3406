//! Console message service for development and testing.

use crate::error::Result;
use crate::providers::{MessageCategory, MessageService};
use tracing::info;

/// Console message service.
///
/// Logs messages instead of sending them. Useful during development where
/// activation and reset links should be clickable from the server log.
///
/// # Examples
///
/// ```ignore
/// use composable_rust_accounts::providers::ConsoleMessageService;
///
/// let messages = ConsoleMessageService::new();
/// messages.send(
///     "user@example.com",
///     MessageCategory::CreateAccountConfirmation,
///     "Activate your account",
///     "https://login.example.com/verify_user?code=abc",
/// ).await?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct ConsoleMessageService;

impl ConsoleMessageService {
    /// Create a new console message service.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl MessageService for ConsoleMessageService {
    async fn send(
        &self,
        to: &str,
        category: MessageCategory,
        subject: &str,
        content: &str,
    ) -> Result<()> {
        info!(
            to = %to,
            category = %category,
            subject = %subject,
            "📧 Outbound message (development mode)\n{content}"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_console_send_always_succeeds() {
        let messages = ConsoleMessageService::new();
        let result = messages
            .send(
                "user@example.com",
                MessageCategory::PasswordReset,
                "Reset your password",
                "link",
            )
            .await;
        assert!(result.is_ok());
    }
}
