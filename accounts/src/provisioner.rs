//! Race-safe account provisioning.
//!
//! Concurrent duplicate signups are resolved by the identity store's
//! uniqueness constraint, not by locks: every loser of the race sees
//! [`AccountError::AlreadyExists`] and decides what to do with it.

use crate::constants::origins;
use crate::error::{AccountError, Result};
use crate::providers::IdentityStore;
use crate::state::{Account, NewAccount, UserId, ZoneId};

/// Creates accounts or returns existing ones.
#[derive(Debug, Clone)]
pub struct AccountProvisioner<I> {
    identities: I,
}

impl<I: IdentityStore> AccountProvisioner<I> {
    /// Create a provisioner over an identity store.
    #[must_use]
    pub const fn new(identities: I) -> Self {
        Self { identities }
    }

    /// The underlying identity store.
    #[must_use]
    pub const fn identities(&self) -> &I {
        &self.identities
    }

    /// Create an unverified account, or return the existing one for the
    /// `unknown` origin.
    ///
    /// For `origin == "unknown"` an exact single match on (username, origin)
    /// is returned without creating anything. Otherwise creation is attempted
    /// with `email = username`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The account already exists → `AccountError::AlreadyExists`
    /// - The store is unavailable → `AccountError::Storage`
    /// - Creation failed for another reason → `AccountError::Provisioning`
    pub async fn create_or_get(
        &self,
        zone: &ZoneId,
        username: &str,
        password: &str,
        origin: &str,
    ) -> Result<Account> {
        if origin == origins::UNKNOWN {
            let existing = self
                .identities
                .find_by_username_and_origin(zone, username, origin)
                .await?;
            if let [account] = existing.as_slice() {
                tracing::debug!(zone = %zone, user_id = %account.id, "Reusing account for unknown origin");
                return Ok(account.clone());
            }
        }

        let new_account = NewAccount::self_service(username, password, origin);
        match self.identities.create_user(zone, &new_account).await {
            Ok(account) => {
                tracing::info!(zone = %zone, user_id = %account.id, origin = %origin, "Account created");
                Ok(account)
            }
            Err(e @ (AccountError::AlreadyExists { .. } | AccountError::Storage(_))) => Err(e),
            Err(e) => {
                tracing::error!(zone = %zone, origin = %origin, error = %e, "Account creation failed");
                Err(AccountError::Provisioning(format!("couldn't create user: {e}")))
            }
        }
    }

    /// Find accounts by username and origin.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Storage` if the store is unavailable.
    pub async fn find(&self, zone: &ZoneId, username: &str, origin: &str) -> Result<Vec<Account>> {
        self.identities
            .find_by_username_and_origin(zone, username, origin)
            .await
    }

    /// Check a candidate against the account's current password.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::AccountNotFound` or `AccountError::Storage`.
    pub async fn password_matches(&self, zone: &ZoneId, id: &UserId, candidate: &str) -> Result<bool> {
        self.identities.password_matches(zone, id, candidate).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::MockIdentityStore;

    #[tokio::test]
    async fn test_creates_unverified_account() {
        let provisioner = AccountProvisioner::new(MockIdentityStore::new());
        let zone = ZoneId::uaa();

        let account = provisioner
            .create_or_get(&zone, "a@example.com", "secret", origins::UAA)
            .await
            .unwrap();

        assert_eq!(account.email, "a@example.com");
        assert_eq!(account.origin, "uaa");
        assert!(!account.verified);
    }

    #[tokio::test]
    async fn test_duplicate_surfaces_already_exists() {
        let provisioner = AccountProvisioner::new(MockIdentityStore::new());
        let zone = ZoneId::uaa();

        provisioner
            .create_or_get(&zone, "a@example.com", "secret", origins::UAA)
            .await
            .unwrap();
        let again = provisioner
            .create_or_get(&zone, "a@example.com", "secret", origins::UAA)
            .await;

        assert!(matches!(again, Err(AccountError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_unknown_origin_is_idempotent() {
        let store = MockIdentityStore::new();
        let provisioner = AccountProvisioner::new(store.clone());
        let zone = ZoneId::uaa();

        let first = provisioner
            .create_or_get(&zone, "ext@example.com", "", origins::UNKNOWN)
            .await
            .unwrap();
        let second = provisioner
            .create_or_get(&zone, "ext@example.com", "", origins::UNKNOWN)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn test_failure_classification() {
        let store = MockIdentityStore::new();
        let provisioner = AccountProvisioner::new(store.clone());
        let zone = ZoneId::uaa();

        store.fail_creates_with(Some(AccountError::Storage("down".to_string())));
        let transient = provisioner.create_or_get(&zone, "a@example.com", "x", origins::UAA).await;
        assert!(matches!(transient, Err(AccountError::Storage(_))));

        store.fail_creates_with(Some(AccountError::Internal("boom".to_string())));
        let other = provisioner.create_or_get(&zone, "a@example.com", "x", origins::UAA).await;
        assert!(
            matches!(other, Err(AccountError::Provisioning(ref msg)) if msg.starts_with("couldn't create user"))
        );
    }
}
