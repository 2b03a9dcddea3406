//! Action code store trait.
//!
//! This module defines the trait for issuing and consuming opaque,
//! expiring, single-use codes bound to a serialized payload.

use crate::error::{AccountError, Result};
use crate::state::ZoneId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subject/scope pair a code is indexed under for
/// [`ActionCodeStore::retrieve_latest`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeIntent {
    /// Who the code was issued for (an email address).
    pub subject: String,

    /// What the code is for (a client id, or a fixed scope name).
    pub scope: String,
}

impl CodeIntent {
    /// Create a new intent.
    #[must_use]
    pub fn new(subject: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            scope: scope.into(),
        }
    }
}

/// One issued, consumable secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCode {
    /// Opaque random identifier, generated by the store.
    pub code: String,

    /// Zone the code was issued in.
    pub zone: ZoneId,

    /// The code is unusable at or after this instant.
    pub expires_at: DateTime<Utc>,

    /// Serialized payload, interpreted only by the issuing workflow.
    pub payload: Vec<u8>,

    /// Lookup key for the latest-code index.
    pub intent: Option<CodeIntent>,

    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl ActionCode {
    /// Whether the code is dead at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Reject issuing requests that can only come from a programming error.
///
/// # Errors
///
/// Returns [`AccountError::Internal`] for an empty payload or an expiry that
/// is not in the future.
pub fn check_issue_request(payload: &[u8], expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
    if payload.is_empty() {
        return Err(AccountError::Internal("action code payload is empty".to_string()));
    }
    if expires_at <= now {
        return Err(AccountError::Internal(format!(
            "action code expiry {expires_at} is not in the future"
        )));
    }
    Ok(())
}

/// Generate a code value.
///
/// 256 bits of randomness encoded as base64url (43 characters).
#[must_use]
pub fn generate_code_value() -> String {
    use base64::Engine;
    use rand::RngCore;

    let mut random_bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut random_bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(random_bytes)
}

/// Action code store.
///
/// # Security Requirements
///
/// 1. **Atomicity**: `retrieve()` must check and delete in one step; under N
///    concurrent calls for the same code exactly one succeeds
/// 2. **Single-use**: once retrieved, a code can never be returned again
/// 3. **Expiration**: expired codes are never returned
/// 4. **No oracle**: "unknown", "expired" and "already used" all yield `None`
pub trait ActionCodeStore: Send + Sync {
    /// Issue a new code.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The payload is empty or `expires_at` is not in the future → `AccountError::Internal`
    /// - Storage operation fails → `AccountError::Storage`
    fn generate(
        &self,
        zone: &ZoneId,
        payload: Vec<u8>,
        expires_at: DateTime<Utc>,
        intent: Option<CodeIntent>,
    ) -> impl std::future::Future<Output = Result<ActionCode>> + Send;

    /// Consume a code atomically.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ActionCode))`: code was valid and has been consumed
    /// - `Ok(None)`: code unknown, expired, or already consumed
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Storage` if the store is unavailable.
    fn retrieve(
        &self,
        zone: &ZoneId,
        code: &str,
    ) -> impl std::future::Future<Output = Result<Option<ActionCode>>> + Send;

    /// Find the most recently issued, still-valid code for a subject/scope
    /// pair without consuming it.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Storage` if the store is unavailable.
    fn retrieve_latest(
        &self,
        zone: &ZoneId,
        subject: &str,
        scope: &str,
    ) -> impl std::future::Future<Output = Result<Option<ActionCode>>> + Send;

    /// Remove expired codes.
    ///
    /// # Returns
    ///
    /// Number of codes removed.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Storage` if the store is unavailable.
    fn remove_expired(&self) -> impl std::future::Future<Output = Result<usize>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_code_value_shape() {
        let code = generate_code_value();
        assert_eq!(code.len(), 43);
        assert_ne!(code, generate_code_value());
    }

    #[test]
    fn test_issue_request_checks() {
        let now = Utc::now();
        assert!(check_issue_request(b"{}", now + Duration::minutes(1), now).is_ok());
        assert!(check_issue_request(b"", now + Duration::minutes(1), now).is_err());
        assert!(check_issue_request(b"{}", now, now).is_err());
    }
}
