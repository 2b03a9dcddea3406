//! Mock client registry for testing.

use crate::error::{AccountError, Result};
use crate::providers::ClientRegistry;
use crate::state::{RedirectRegistration, ZoneId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock client registry.
#[derive(Debug, Clone, Default)]
pub struct MockClientRegistry {
    clients: Arc<Mutex<HashMap<(ZoneId, String), RedirectRegistration>>>,
    unavailable: bool,
}

impl MockClientRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry whose lookups always fail with `AccountError::Storage`.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            clients: Arc::default(),
            unavailable: true,
        }
    }

    /// Register a client in `zone` (for testing).
    pub fn register(&self, zone: &ZoneId, registration: RedirectRegistration) {
        if let Ok(mut clients) = self.clients.lock() {
            clients.insert((zone.clone(), registration.client_id.clone()), registration);
        }
    }
}

impl ClientRegistry for MockClientRegistry {
    async fn lookup(&self, zone: &ZoneId, client_id: &str) -> Result<Option<RedirectRegistration>> {
        if self.unavailable {
            return Err(AccountError::Storage("client registry unavailable".to_string()));
        }

        let clients = self
            .clients
            .lock()
            .map_err(|_| AccountError::Internal("Mutex lock failed".to_string()))?;
        Ok(clients.get(&(zone.clone(), client_id.to_string())).cloned())
    }
}
