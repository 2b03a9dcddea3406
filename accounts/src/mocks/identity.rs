//! Mock identity store for testing.

use crate::clock::{Clock, SharedClock, system_clock};
use crate::error::{AccountError, Result};
use crate::providers::IdentityStore;
use crate::state::{Account, NewAccount, UserId, ZoneId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct StoredAccount {
    account: Account,
    password: String,
}

/// Mock identity store.
///
/// In-memory user directory that enforces `(zone, username, origin)`
/// uniqueness and version-checked updates. Passwords are kept in plaintext.
#[derive(Clone)]
pub struct MockIdentityStore {
    accounts: Arc<Mutex<HashMap<UserId, StoredAccount>>>,
    clock: SharedClock,
    create_failure: Arc<Mutex<Option<AccountError>>>,
}

impl MockIdentityStore {
    /// Create a new empty mock identity store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(system_clock())
    }

    /// Create a new empty mock identity store stamping times from `clock`.
    #[must_use]
    pub fn with_clock(clock: SharedClock) -> Self {
        Self {
            accounts: Arc::new(Mutex::new(HashMap::new())),
            clock,
            create_failure: Arc::new(Mutex::new(None)),
        }
    }

    /// Make subsequent `create_user` calls fail with `error` (for testing).
    pub fn fail_creates_with(&self, error: Option<AccountError>) {
        if let Ok(mut failure) = self.create_failure.lock() {
            *failure = error;
        }
    }

    /// Insert an account directly (for testing).
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Internal` if the lock is poisoned.
    pub fn insert(&self, account: Account, password: &str) -> Result<()> {
        self.lock()?.insert(
            account.id.clone(),
            StoredAccount {
                account,
                password: password.to_string(),
            },
        );
        Ok(())
    }

    /// Current password of an account (for testing).
    #[must_use]
    pub fn password_of(&self, id: &UserId) -> Option<String> {
        self.accounts
            .lock()
            .ok()
            .and_then(|accounts| accounts.get(id).map(|s| s.password.clone()))
    }

    /// Number of stored accounts (for testing).
    #[must_use]
    pub fn count(&self) -> usize {
        self.accounts.lock().map_or(0, |accounts| accounts.len())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<UserId, StoredAccount>>> {
        self.accounts
            .lock()
            .map_err(|_| AccountError::Internal("Mutex lock failed".to_string()))
    }

    /// Apply a version-checked mutation.
    fn update<F>(&self, zone: &ZoneId, id: &UserId, version: u64, mutate: F) -> Result<Account>
    where
        F: FnOnce(&mut StoredAccount),
    {
        let now = self.clock.now();
        let mut accounts = self.lock()?;

        let stored = accounts
            .get_mut(id)
            .filter(|s| &s.account.zone == zone)
            .ok_or(AccountError::AccountNotFound)?;

        if stored.account.version != version {
            return Err(AccountError::VersionConflict {
                user_id: id.clone(),
                expected: version,
            });
        }

        mutate(stored);
        stored.account.version += 1;
        stored.account.updated_at = now;
        Ok(stored.account.clone())
    }
}

impl Default for MockIdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityStore for MockIdentityStore {
    async fn find_by_username_and_origin(
        &self,
        zone: &ZoneId,
        username: &str,
        origin: &str,
    ) -> Result<Vec<Account>> {
        let accounts = self.lock()?;
        Ok(accounts
            .values()
            .map(|s| &s.account)
            .filter(|a| {
                &a.zone == zone && a.origin == origin && a.username.eq_ignore_ascii_case(username)
            })
            .cloned()
            .collect())
    }

    async fn find_by_username(&self, zone: &ZoneId, username: &str) -> Result<Vec<Account>> {
        let accounts = self.lock()?;
        Ok(accounts
            .values()
            .map(|s| &s.account)
            .filter(|a| &a.zone == zone && a.username.eq_ignore_ascii_case(username))
            .cloned()
            .collect())
    }

    async fn create_user(&self, zone: &ZoneId, account: &NewAccount) -> Result<Account> {
        if let Some(error) = self
            .create_failure
            .lock()
            .map_err(|_| AccountError::Internal("Mutex lock failed".to_string()))?
            .clone()
        {
            return Err(error);
        }

        let now = self.clock.now();
        let mut accounts = self.lock()?;

        // Uniqueness check and insert under one lock.
        let duplicate = accounts.values().any(|s| {
            s.account.zone == *zone
                && s.account.origin == account.origin
                && s.account.username.eq_ignore_ascii_case(&account.username)
        });
        if duplicate {
            return Err(AccountError::AlreadyExists {
                username: account.username.clone(),
                origin: account.origin.clone(),
            });
        }

        let created = Account {
            id: UserId::new(),
            zone: zone.clone(),
            username: account.username.clone(),
            email: account.email.clone(),
            origin: account.origin.clone(),
            verified: false,
            version: 0,
            created_at: now,
            updated_at: now,
            password_changed_at: None,
        };
        accounts.insert(
            created.id.clone(),
            StoredAccount {
                account: created.clone(),
                password: account.password.clone(),
            },
        );
        Ok(created)
    }

    async fn retrieve(&self, zone: &ZoneId, id: &UserId) -> Result<Account> {
        self.lock()?
            .get(id)
            .filter(|s| &s.account.zone == zone)
            .map(|s| s.account.clone())
            .ok_or(AccountError::AccountNotFound)
    }

    async fn verify(&self, zone: &ZoneId, id: &UserId, version: u64) -> Result<Account> {
        self.update(zone, id, version, |stored| stored.account.verified = true)
    }

    async fn password_matches(&self, zone: &ZoneId, id: &UserId, candidate: &str) -> Result<bool> {
        self.lock()?
            .get(id)
            .filter(|s| &s.account.zone == zone)
            .map(|s| constant_time_eq::constant_time_eq(s.password.as_bytes(), candidate.as_bytes()))
            .ok_or(AccountError::AccountNotFound)
    }

    async fn change_password(
        &self,
        zone: &ZoneId,
        id: &UserId,
        version: u64,
        new_password: &str,
    ) -> Result<Account> {
        let now = self.clock.now();
        self.update(zone, id, version, |stored| {
            stored.password = new_password.to_string();
            stored.account.password_changed_at = Some(now);
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_account(username: &str, origin: &str) -> NewAccount {
        NewAccount::self_service(username, "secret", origin)
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = MockIdentityStore::new();
        let zone = ZoneId::uaa();

        let created = store.create_user(&zone, &new_account("User@Example.com", "uaa")).await.unwrap();
        assert!(!created.verified);
        assert_eq!(created.version, 0);

        let found = store
            .find_by_username_and_origin(&zone, "user@example.com", "uaa")
            .await
            .unwrap();
        assert_eq!(found, vec![created]);

        let other_zone = store
            .find_by_username_and_origin(&ZoneId::from("z2"), "user@example.com", "uaa")
            .await
            .unwrap();
        assert!(other_zone.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_username_and_origin_rejected() {
        let store = MockIdentityStore::new();
        let zone = ZoneId::uaa();

        store.create_user(&zone, &new_account("a@example.com", "uaa")).await.unwrap();
        let duplicate = store.create_user(&zone, &new_account("A@EXAMPLE.COM", "uaa")).await;
        assert!(matches!(duplicate, Err(AccountError::AlreadyExists { .. })));

        // Same username under another origin is a different account.
        assert!(store.create_user(&zone, &new_account("a@example.com", "ldap")).await.is_ok());
        assert_eq!(store.find_by_username(&zone, "a@example.com").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_version_checked_updates() {
        let store = MockIdentityStore::new();
        let zone = ZoneId::uaa();
        let created = store.create_user(&zone, &new_account("a@example.com", "uaa")).await.unwrap();

        let verified = store.verify(&zone, &created.id, 0).await.unwrap();
        assert!(verified.verified);
        assert_eq!(verified.version, 1);

        let stale = store.change_password(&zone, &created.id, 0, "new").await;
        assert!(matches!(stale, Err(AccountError::VersionConflict { expected: 0, .. })));
        assert_eq!(store.password_of(&created.id).as_deref(), Some("secret"));

        let changed = store.change_password(&zone, &created.id, 1, "new").await.unwrap();
        assert_eq!(changed.version, 2);
        assert!(changed.password_changed_at.is_some());
        assert!(store.password_matches(&zone, &created.id, "new").await.unwrap());
        assert!(!store.password_matches(&zone, &created.id, "secret").await.unwrap());
    }

    #[tokio::test]
    async fn test_injected_create_failure() {
        let store = MockIdentityStore::new();
        store.fail_creates_with(Some(AccountError::Storage("down".to_string())));

        let result = store.create_user(&ZoneId::uaa(), &new_account("a@example.com", "uaa")).await;
        assert_eq!(result, Err(AccountError::Storage("down".to_string())));
        assert_eq!(store.count(), 0);
    }
}
