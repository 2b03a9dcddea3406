//! Account domain events.
//!
//! Emitted best-effort to interested collaborators (audit, notification).
//! Control flow never depends on delivery.

use crate::state::{UserId, ZoneId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account lifecycle events.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccountEvent {
    /// A password reset code was issued.
    ResetPasswordRequested {
        /// Zone the request ran in
        zone: ZoneId,
        /// Email the reset was requested for
        subject: String,
        /// Issued code, for the delivering collaborator
        code: String,
        /// When the request happened
        timestamp: DateTime<Utc>,
    },

    /// An account completed activation.
    AccountVerified {
        /// Zone the account lives in
        zone: ZoneId,
        /// Verified account
        user_id: UserId,
        /// When the account was verified
        timestamp: DateTime<Utc>,
    },

    /// A password was changed through a reset code.
    PasswordChanged {
        /// Zone the account lives in
        zone: ZoneId,
        /// Account whose password changed
        user_id: UserId,
        /// When the change happened
        timestamp: DateTime<Utc>,
    },
}

impl AccountEvent {
    /// Event type name for logs and routing.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::ResetPasswordRequested { .. } => "ResetPasswordRequested.v1",
            Self::AccountVerified { .. } => "AccountVerified.v1",
            Self::PasswordChanged { .. } => "PasswordChanged.v1",
        }
    }

    /// Zone the event belongs to.
    #[must_use]
    pub const fn zone(&self) -> &ZoneId {
        match self {
            Self::ResetPasswordRequested { zone, .. }
            | Self::AccountVerified { zone, .. }
            | Self::PasswordChanged { zone, .. } => zone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_types() {
        let event = AccountEvent::AccountVerified {
            zone: ZoneId::uaa(),
            user_id: UserId::from("u1"),
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type(), "AccountVerified.v1");
        assert_eq!(event.zone(), &ZoneId::uaa());
    }
}
