//! Mock event publisher for testing.

use crate::error::{AccountError, Result};
use crate::events::AccountEvent;
use crate::providers::AccountEventPublisher;
use std::sync::{Arc, Mutex};

/// Mock event publisher.
///
/// Records published events in order.
#[derive(Debug, Clone, Default)]
pub struct MockEventPublisher {
    events: Arc<Mutex<Vec<AccountEvent>>>,
}

impl MockEventPublisher {
    /// Create a new recording publisher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events published so far (for testing).
    #[must_use]
    pub fn events(&self) -> Vec<AccountEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl AccountEventPublisher for MockEventPublisher {
    fn publish(&self, event: AccountEvent) -> Result<()> {
        self.events
            .lock()
            .map_err(|_| AccountError::Internal("Mutex lock failed".to_string()))?
            .push(event);
        Ok(())
    }
}
