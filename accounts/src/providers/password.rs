//! Password policy trait and the default rule-based policy.

use crate::config::PasswordPolicyConfig;
use crate::error::{AccountError, Result};

/// Password policy.
pub trait PasswordPolicy: Send + Sync {
    /// Validate a candidate password.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidPassword` describing every violated rule.
    fn validate(&self, password: &str) -> Result<()>;
}

/// Rule-based policy driven by [`PasswordPolicyConfig`].
#[derive(Debug, Clone, Default)]
pub struct DefaultPasswordPolicy {
    config: PasswordPolicyConfig,
}

impl DefaultPasswordPolicy {
    /// Create a policy from configuration.
    #[must_use]
    pub const fn new(config: PasswordPolicyConfig) -> Self {
        Self { config }
    }
}

impl PasswordPolicy for DefaultPasswordPolicy {
    fn validate(&self, password: &str) -> Result<()> {
        let config = &self.config;
        let length = password.chars().count();
        let mut violations = Vec::new();

        if length < config.min_length {
            violations.push(format!(
                "Password must be at least {} characters in length.",
                config.min_length
            ));
        }
        if length > config.max_length {
            violations.push(format!(
                "Password must be no more than {} characters in length.",
                config.max_length
            ));
        }

        let count = |pred: fn(&char) -> bool| password.chars().filter(pred).count();

        if count(char::is_ascii_uppercase) < config.require_upper_case {
            violations.push(format!(
                "Password must contain at least {} uppercase characters.",
                config.require_upper_case
            ));
        }
        if count(char::is_ascii_lowercase) < config.require_lower_case {
            violations.push(format!(
                "Password must contain at least {} lowercase characters.",
                config.require_lower_case
            ));
        }
        if count(char::is_ascii_digit) < config.require_digit {
            violations.push(format!(
                "Password must contain at least {} numeric characters.",
                config.require_digit
            ));
        }
        if count(|c| !c.is_alphanumeric() && !c.is_whitespace()) < config.require_special {
            violations.push(format!(
                "Password must contain at least {} special characters.",
                config.require_special
            ));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(AccountError::InvalidPassword(violations.join(" ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_accepts_any_non_empty_password() {
        let policy = DefaultPasswordPolicy::default();
        assert!(policy.validate("x").is_ok());
        assert!(policy.validate("").is_err());
    }

    #[test]
    fn test_max_length() {
        let policy = DefaultPasswordPolicy::default();
        assert!(policy.validate(&"a".repeat(255)).is_ok());
        assert!(policy.validate(&"a".repeat(256)).is_err());
    }

    #[test]
    fn test_character_classes() {
        let policy = DefaultPasswordPolicy::new(
            PasswordPolicyConfig::default()
                .with_min_length(8)
                .with_required_classes(1, 1, 1, 1),
        );

        assert!(policy.validate("Passw0rd!").is_ok());

        let result = policy.validate("password");
        assert!(matches!(result, Err(AccountError::InvalidPassword(_))));

        let message = result.err().map(|e| e.to_string()).unwrap_or_default();
        assert!(message.contains("uppercase"));
        assert!(message.contains("numeric"));
        assert!(message.contains("special"));
        assert!(!message.contains("lowercase"));
    }
}
