//! Client registry trait.

use crate::error::Result;
use crate::state::{RedirectRegistration, ZoneId};

/// Client registry.
///
/// Read-only view of registered clients' redirect configuration.
pub trait ClientRegistry: Send + Sync {
    /// Look up a client's redirect registration.
    ///
    /// # Returns
    ///
    /// `Ok(None)` if the client is unknown in this zone.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Storage` if the registry is unavailable.
    fn lookup(
        &self,
        zone: &ZoneId,
        client_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<RedirectRegistration>>> + Send;
}
