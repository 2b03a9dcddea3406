//! Mock message service for testing.

use crate::error::{AccountError, Result};
use crate::providers::{MessageCategory, MessageService};
use std::sync::{Arc, Mutex};

/// A message captured by [`MockMessageService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Recipient address.
    pub to: String,
    /// Message kind.
    pub category: MessageCategory,
    /// Subject line.
    pub subject: String,
    /// Body.
    pub content: String,
}

/// Mock message service.
///
/// Records every message instead of delivering it. Can be switched to fail.
#[derive(Debug, Clone, Default)]
pub struct MockMessageService {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    should_fail: bool,
}

impl MockMessageService {
    /// Create a new mock message service that succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock message service whose sends always fail.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            should_fail: true,
        }
    }

    /// All messages sent so far (for testing).
    #[must_use]
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    /// Most recent message, if any (for testing).
    #[must_use]
    pub fn last(&self) -> Option<SentMessage> {
        self.sent.lock().ok().and_then(|sent| sent.last().cloned())
    }
}

impl MessageService for MockMessageService {
    async fn send(
        &self,
        to: &str,
        category: MessageCategory,
        subject: &str,
        content: &str,
    ) -> Result<()> {
        if self.should_fail {
            return Err(AccountError::Messaging("mock transport failure".to_string()));
        }

        self.sent
            .lock()
            .map_err(|_| AccountError::Internal("Mutex lock failed".to_string()))?
            .push(SentMessage {
                to: to.to_string(),
                category,
                subject: subject.to_string(),
                content: content.to_string(),
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_messages() {
        let service = MockMessageService::new();
        let result = service
            .send("a@example.com", MessageCategory::PasswordReset, "Reset", "body")
            .await;

        assert!(result.is_ok());
        assert_eq!(service.sent().len(), 1);
        assert_eq!(service.last().map(|m| m.category), Some(MessageCategory::PasswordReset));
    }

    #[tokio::test]
    async fn test_failing_records_nothing() {
        let service = MockMessageService::failing();
        let result = service
            .send("a@example.com", MessageCategory::PasswordReset, "Reset", "body")
            .await;

        assert!(matches!(result, Err(AccountError::Messaging(_))));
        assert!(service.sent().is_empty());
    }
}
