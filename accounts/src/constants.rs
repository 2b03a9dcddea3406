//! Account workflow constants.

use chrono::Duration;

/// Identifier of the default identity zone.
pub const DEFAULT_ZONE: &str = "uaa";

/// Authentication origin tags.
pub mod origins {
    /// Accounts whose credentials are managed by this server.
    pub const UAA: &str = "uaa";

    /// Accounts provisioned from an external assertion whose source is unknown.
    pub const UNKNOWN: &str = "unknown";

    /// Accounts backed by an LDAP directory.
    pub const LDAP: &str = "ldap";
}

/// Scope used to index password reset codes for a subject.
pub const RESET_PASSWORD_SCOPE: &str = "reset_password";

/// Lifetime of an account activation code.
#[must_use]
pub const fn activation_code_ttl() -> Duration {
    Duration::hours(1)
}

/// Lifetime of a password reset code.
#[must_use]
pub const fn password_reset_ttl() -> Duration {
    Duration::minutes(30)
}

/// Redirect used when nothing safer is known.
pub const DEFAULT_REDIRECT: &str = "home";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_lifetimes() {
        assert_eq!(activation_code_ttl(), Duration::minutes(60));
        assert_eq!(password_reset_ttl(), Duration::minutes(30));
    }
}
