//! Identity store trait.

use crate::error::Result;
use crate::state::{Account, NewAccount, UserId, ZoneId};

/// Identity store.
///
/// This trait abstracts over the user directory. Usernames compare
/// case-insensitively; `(zone, username, origin)` is unique.
pub trait IdentityStore: Send + Sync {
    /// Find accounts by username and origin.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Storage` if the query fails.
    fn find_by_username_and_origin(
        &self,
        zone: &ZoneId,
        username: &str,
        origin: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Account>>> + Send;

    /// Find accounts by username across all origins.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Storage` if the query fails.
    fn find_by_username(
        &self,
        zone: &ZoneId,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Account>>> + Send;

    /// Create an unverified account.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Username already exists for this origin → `AccountError::AlreadyExists`
    /// - Database query fails → `AccountError::Storage`
    fn create_user(
        &self,
        zone: &ZoneId,
        account: &NewAccount,
    ) -> impl std::future::Future<Output = Result<Account>> + Send;

    /// Get an account by id.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Account not found → `AccountError::AccountNotFound`
    /// - Database query fails → `AccountError::Storage`
    fn retrieve(
        &self,
        zone: &ZoneId,
        id: &UserId,
    ) -> impl std::future::Future<Output = Result<Account>> + Send;

    /// Mark an account verified if its version still matches.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Account not found → `AccountError::AccountNotFound`
    /// - Stored version differs → `AccountError::VersionConflict`
    /// - Database query fails → `AccountError::Storage`
    fn verify(
        &self,
        zone: &ZoneId,
        id: &UserId,
        version: u64,
    ) -> impl std::future::Future<Output = Result<Account>> + Send;

    /// Check whether `candidate` is the account's current password.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Account not found → `AccountError::AccountNotFound`
    /// - Database query fails → `AccountError::Storage`
    fn password_matches(
        &self,
        zone: &ZoneId,
        id: &UserId,
        candidate: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// Replace the account's password if its version still matches.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Account not found → `AccountError::AccountNotFound`
    /// - Stored version differs → `AccountError::VersionConflict`
    /// - Database query fails → `AccountError::Storage`
    fn change_password(
        &self,
        zone: &ZoneId,
        id: &UserId,
        version: u64,
        new_password: &str,
    ) -> impl std::future::Future<Output = Result<Account>> + Send;
}
