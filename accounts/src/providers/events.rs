//! Account event publisher trait.

use crate::error::{AccountError, Result};
use crate::events::AccountEvent;
use tokio::sync::broadcast;

/// Account event publisher.
///
/// Publishing is best-effort and synchronous; workflows log and drop errors.
pub trait AccountEventPublisher: Send + Sync {
    /// Publish an event.
    ///
    /// # Errors
    ///
    /// Returns error if the event could not be handed off.
    fn publish(&self, event: AccountEvent) -> Result<()>;
}

/// In-process publisher backed by a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastEventPublisher {
    sender: broadcast::Sender<AccountEvent>,
}

impl BroadcastEventPublisher {
    /// Create a publisher buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AccountEvent> {
        self.sender.subscribe()
    }
}

impl AccountEventPublisher for BroadcastEventPublisher {
    fn publish(&self, event: AccountEvent) -> Result<()> {
        let event_type = event.event_type();
        self.sender
            .send(event)
            .map(|receivers| {
                tracing::debug!(event_type, receivers, "Published account event");
            })
            .map_err(|_| AccountError::Internal(format!("no subscribers for {event_type}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{UserId, ZoneId};
    use chrono::Utc;

    #[tokio::test]
    async fn test_broadcast_delivers_to_subscribers() {
        let publisher = BroadcastEventPublisher::new(8);
        let mut rx = publisher.subscribe();

        let event = AccountEvent::PasswordChanged {
            zone: ZoneId::uaa(),
            user_id: UserId::from("u1"),
            timestamp: Utc::now(),
        };
        assert!(publisher.publish(event.clone()).is_ok());
        assert_eq!(rx.recv().await.ok(), Some(event));
    }

    #[test]
    fn test_publish_without_subscribers_fails() {
        let publisher = BroadcastEventPublisher::new(8);
        let event = AccountEvent::AccountVerified {
            zone: ZoneId::uaa(),
            user_id: UserId::from("u1"),
            timestamp: Utc::now(),
        };
        assert!(publisher.publish(event).is_err());
    }
}
