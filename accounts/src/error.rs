//! Error types for account activation and password reset.

use crate::state::UserId;
use thiserror::Error;

/// Result type alias for account operations.
pub type Result<T> = std::result::Result<T, AccountError>;

/// Error taxonomy for the action-code workflows.
///
/// Expected outcomes (conflicts, missing accounts, rejected codes) are
/// ordinary variants so callers must branch on them explicitly.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    // ═══════════════════════════════════════════════════════════
    // Validation Errors
    // ═══════════════════════════════════════════════════════════

    /// Password rejected by the password policy.
    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    /// New password is identical to the current one.
    #[error("Your new password cannot be the same as the old password.")]
    PasswordReuse,

    /// Email address is not well formed.
    #[error("Invalid email address")]
    InvalidEmail,

    // ═══════════════════════════════════════════════════════════
    // Conflicts
    // ═══════════════════════════════════════════════════════════

    /// An account with this username and origin already exists.
    #[error("Account already exists: {username} ({origin})")]
    AlreadyExists {
        /// Username that collided
        username: String,
        /// Origin the collision happened in
        origin: String,
    },

    /// Activation attempted on an account that is already verified.
    #[error("User already active.")]
    AlreadyVerified {
        /// The verified account
        user_id: UserId,
    },

    /// Password reset requested for an account whose password is managed
    /// by another origin.
    #[error("Password for user {user_id} is not managed by this server")]
    ResetConflict {
        /// The account found under another origin
        user_id: UserId,
    },

    // ═══════════════════════════════════════════════════════════
    // Not Found
    // ═══════════════════════════════════════════════════════════

    /// No matching account.
    #[error("Account not found")]
    AccountNotFound,

    /// Action code is unknown, expired, or already used.
    ///
    /// The three cases are deliberately indistinguishable.
    #[error("Invalid or expired code")]
    InvalidCode,

    /// Code payload could not be decoded into a known schema.
    #[error("Malformed code payload: {0}")]
    MalformedPayload(String),

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Backing store is unavailable. Retryable by the caller.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Optimistic concurrency check failed on an update that should not race.
    #[error("Version conflict for user {user_id} (expected version {expected})")]
    VersionConflict {
        /// Account being updated
        user_id: UserId,
        /// Version the caller read
        expected: u64,
    },

    /// Account creation failed for a reason other than a duplicate.
    #[error("Provisioning failed: {0}")]
    Provisioning(String),

    /// Message delivery failed.
    #[error("Failed to send message: {0}")]
    Messaging(String),

    /// Internal error (should not be exposed to users).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AccountError {
    /// Returns `true` if this error is due to invalid user input.
    ///
    /// # Examples
    ///
    /// ```
    /// # use composable_rust_accounts::AccountError;
    /// assert!(AccountError::PasswordReuse.is_user_error());
    /// assert!(!AccountError::Storage("down".into()).is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPassword(_)
                | Self::PasswordReuse
                | Self::InvalidEmail
                | Self::InvalidCode
                | Self::AccountNotFound
        )
    }

    /// Returns `true` if the caller may retry the operation.
    ///
    /// Only transient storage failures qualify; a version conflict would
    /// repeat on retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Returns `true` for conflict conditions.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::AlreadyExists { .. } | Self::AlreadyVerified { .. } | Self::ResetConflict { .. }
        )
    }
}
