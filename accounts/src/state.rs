//! Account state types.
//!
//! All types are `Clone` and serializable so they can cross store and
//! workflow boundaries unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for a user account.
///
/// Opaque to this crate. Stores assign UUID v4 strings, but identifiers
/// coming from other directories are accepted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Generate a new random `UserId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity zone (tenant) an operation runs in.
///
/// Passed explicitly to every operation; there is no ambient zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(pub String);

impl ZoneId {
    /// The default zone.
    #[must_use]
    pub fn uaa() -> Self {
        Self(crate::constants::DEFAULT_ZONE.to_string())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ZoneId {
    fn default() -> Self {
        Self::uaa()
    }
}

impl From<&str> for ZoneId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Accounts
// ═══════════════════════════════════════════════════════════════════════

/// A provisioned identity.
///
/// `version` increments on every mutation and is compared on update
/// (optimistic concurrency).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable identifier, immutable after creation.
    pub id: UserId,

    /// Zone the account lives in.
    pub zone: ZoneId,

    /// Login name (an email address for self-registered accounts).
    pub username: String,

    /// Primary email address.
    pub email: String,

    /// Authentication source tag.
    pub origin: String,

    /// Email verified flag. Flips to `true` once and never reverts.
    pub verified: bool,

    /// Optimistic-concurrency counter.
    pub version: u64,

    /// Account created timestamp.
    pub created_at: DateTime<Utc>,

    /// Last updated timestamp.
    pub updated_at: DateTime<Utc>,

    /// Last password change, if any.
    pub password_changed_at: Option<DateTime<Utc>>,
}

/// Data needed to create an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Login name.
    pub username: String,

    /// Primary email address.
    pub email: String,

    /// Authentication source tag.
    pub origin: String,

    /// Initial password (plaintext; stores hash it).
    pub password: String,
}

impl NewAccount {
    /// Describe an unverified self-service account whose email is its username.
    #[must_use]
    pub fn self_service(username: &str, password: &str, origin: &str) -> Self {
        Self {
            username: username.to_string(),
            email: username.to_string(),
            origin: origin.to_string(),
            password: password.to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Client Registrations
// ═══════════════════════════════════════════════════════════════════════

/// Redirect targets a client is allowed to use.
///
/// Owned by the client registry; read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RedirectRegistration {
    /// Client identifier.
    pub client_id: String,

    /// Registered redirect URI patterns (may contain `*` and `**`).
    pub redirect_patterns: Vec<String>,

    /// Fallback redirect after signup.
    pub default_redirect: Option<String>,
}

impl RedirectRegistration {
    /// Create a registration with no patterns and no default.
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_patterns: Vec::new(),
            default_redirect: None,
        }
    }

    /// Add a redirect pattern.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.redirect_patterns.push(pattern.into());
        self
    }

    /// Set the default redirect.
    #[must_use]
    pub fn with_default_redirect(mut self, redirect: impl Into<String>) -> Self {
        self.default_redirect = Some(redirect.into());
        self
    }
}
