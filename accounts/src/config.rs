//! Account workflow configuration.
//!
//! Configuration values are provided by the application. Every struct has a
//! `Default`, builder-style `with_*` setters, and a `from_env()` constructor
//! reading `ACCOUNTS_*` variables on top of the defaults.

use crate::constants::DEFAULT_REDIRECT;

fn env_or(name: &str, default: String) -> String {
    std::env::var(name).ok().filter(|v| !v.is_empty()).unwrap_or(default)
}

fn env_parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Account activation configuration.
#[derive(Debug, Clone)]
pub struct ActivationConfig {
    /// Base URL of the identity server.
    ///
    /// Activation links are formatted as: `{base_url}/verify_user?code={code}`
    pub base_url: String,

    /// Service name shown in the activation message.
    pub service_name: String,

    /// Subject line of the activation message.
    pub subject: String,

    /// Global safe redirect used when a client supplies nothing usable.
    ///
    /// Default: `home`
    pub default_redirect: String,
}

impl ActivationConfig {
    /// Create new activation configuration.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the identity server (e.g., "https://login.example.com")
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            ..Self::default()
        }
    }

    /// Read configuration from `ACCOUNTS_BASE_URL`, `ACCOUNTS_SERVICE_NAME`,
    /// `ACCOUNTS_ACTIVATION_SUBJECT` and `ACCOUNTS_DEFAULT_REDIRECT`.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env_or("ACCOUNTS_BASE_URL", defaults.base_url),
            service_name: env_or("ACCOUNTS_SERVICE_NAME", defaults.service_name),
            subject: env_or("ACCOUNTS_ACTIVATION_SUBJECT", defaults.subject),
            default_redirect: env_or("ACCOUNTS_DEFAULT_REDIRECT", defaults.default_redirect),
        }
    }

    /// Set the service name.
    #[must_use]
    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = service_name.into();
        self
    }

    /// Set the message subject.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Set the global default redirect.
    #[must_use]
    pub fn with_default_redirect(mut self, redirect: impl Into<String>) -> Self {
        self.default_redirect = redirect.into();
        self
    }

    /// Activation link for a code.
    #[must_use]
    pub fn verify_link(&self, code: &str) -> String {
        format!(
            "{}/verify_user?code={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(code)
        )
    }
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/uaa".to_string(),
            service_name: "Cloud Foundry".to_string(),
            subject: "Activate your account".to_string(),
            default_redirect: DEFAULT_REDIRECT.to_string(),
        }
    }
}

/// Password reset configuration.
#[derive(Debug, Clone)]
pub struct ResetConfig {
    /// Base URL of the identity server.
    ///
    /// Reset links are formatted as: `{base_url}/reset_password?code={code}`
    pub base_url: String,
}

impl ResetConfig {
    /// Create new reset configuration.
    #[must_use]
    pub const fn new(base_url: String) -> Self {
        Self { base_url }
    }

    /// Read configuration from `ACCOUNTS_BASE_URL`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            base_url: env_or("ACCOUNTS_BASE_URL", Self::default().base_url),
        }
    }

    /// Reset link for a code.
    #[must_use]
    pub fn reset_link(&self, code: &str) -> String {
        format!(
            "{}/reset_password?code={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(code)
        )
    }
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/uaa".to_string(),
        }
    }
}

/// Password policy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicyConfig {
    /// Minimum length in characters. Default: 1
    pub min_length: usize,

    /// Maximum length in characters. Default: 255
    pub max_length: usize,

    /// Minimum number of uppercase characters. Default: 0
    pub require_upper_case: usize,

    /// Minimum number of lowercase characters. Default: 0
    pub require_lower_case: usize,

    /// Minimum number of digits. Default: 0
    pub require_digit: usize,

    /// Minimum number of special characters. Default: 0
    pub require_special: usize,
}

impl PasswordPolicyConfig {
    /// Read configuration from `ACCOUNTS_PASSWORD_MIN_LENGTH`,
    /// `ACCOUNTS_PASSWORD_MAX_LENGTH`, `ACCOUNTS_PASSWORD_REQUIRE_UPPER`,
    /// `ACCOUNTS_PASSWORD_REQUIRE_LOWER`, `ACCOUNTS_PASSWORD_REQUIRE_DIGIT`
    /// and `ACCOUNTS_PASSWORD_REQUIRE_SPECIAL`.
    #[must_use]
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            min_length: env_parse_or("ACCOUNTS_PASSWORD_MIN_LENGTH", d.min_length),
            max_length: env_parse_or("ACCOUNTS_PASSWORD_MAX_LENGTH", d.max_length),
            require_upper_case: env_parse_or("ACCOUNTS_PASSWORD_REQUIRE_UPPER", d.require_upper_case),
            require_lower_case: env_parse_or("ACCOUNTS_PASSWORD_REQUIRE_LOWER", d.require_lower_case),
            require_digit: env_parse_or("ACCOUNTS_PASSWORD_REQUIRE_DIGIT", d.require_digit),
            require_special: env_parse_or("ACCOUNTS_PASSWORD_REQUIRE_SPECIAL", d.require_special),
        }
    }

    /// Set minimum length.
    #[must_use]
    pub const fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    /// Set maximum length.
    #[must_use]
    pub const fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Set required counts of uppercase, lowercase, digit and special characters.
    #[must_use]
    pub const fn with_required_classes(
        mut self,
        upper: usize,
        lower: usize,
        digit: usize,
        special: usize,
    ) -> Self {
        self.require_upper_case = upper;
        self.require_lower_case = lower;
        self.require_digit = digit;
        self.require_special = special;
        self
    }
}

impl Default for PasswordPolicyConfig {
    fn default() -> Self {
        Self {
            min_length: 1,
            max_length: 255,
            require_upper_case: 0,
            require_lower_case: 0,
            require_digit: 0,
            require_special: 0,
        }
    }
}

/// SMTP transport configuration.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP server address (e.g., "smtp.example.com").
    pub server: String,

    /// SMTP server port. Default: 587
    pub port: u16,

    /// SMTP authentication username.
    pub username: String,

    /// SMTP authentication password.
    pub password: String,

    /// Sender email address.
    pub from_email: String,

    /// Sender display name.
    pub from_name: String,
}

impl SmtpConfig {
    /// Read configuration from `ACCOUNTS_SMTP_SERVER`, `ACCOUNTS_SMTP_PORT`,
    /// `ACCOUNTS_SMTP_USERNAME`, `ACCOUNTS_SMTP_PASSWORD`,
    /// `ACCOUNTS_SMTP_FROM_EMAIL` and `ACCOUNTS_SMTP_FROM_NAME`.
    #[must_use]
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            server: env_or("ACCOUNTS_SMTP_SERVER", d.server),
            port: env_parse_or("ACCOUNTS_SMTP_PORT", d.port),
            username: env_or("ACCOUNTS_SMTP_USERNAME", d.username),
            password: env_or("ACCOUNTS_SMTP_PASSWORD", d.password),
            from_email: env_or("ACCOUNTS_SMTP_FROM_EMAIL", d.from_email),
            from_name: env_or("ACCOUNTS_SMTP_FROM_NAME", d.from_name),
        }
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            server: "localhost".to_string(),
            port: 587,
            username: String::new(),
            password: String::new(),
            from_email: "no-reply@example.com".to_string(),
            from_name: "Cloud Foundry".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_config_builder() {
        let config = ActivationConfig::new("https://login.example.com/".to_string())
            .with_service_name("Example")
            .with_subject("Activate your Example account")
            .with_default_redirect("https://example.com");

        assert_eq!(config.base_url, "https://login.example.com/");
        assert_eq!(config.service_name, "Example");
        assert_eq!(config.subject, "Activate your Example account");
        assert_eq!(config.default_redirect, "https://example.com");
    }

    #[test]
    fn test_links_encode_code() {
        let activation = ActivationConfig::new("https://login.example.com/".to_string());
        assert_eq!(
            activation.verify_link("a+b/c"),
            "https://login.example.com/verify_user?code=a%2Bb%2Fc"
        );

        let reset = ResetConfig::new("https://login.example.com".to_string());
        assert_eq!(
            reset.reset_link("abc"),
            "https://login.example.com/reset_password?code=abc"
        );
    }

    #[test]
    fn test_default_configs() {
        let activation = ActivationConfig::default();
        assert_eq!(activation.default_redirect, "home");
        assert_eq!(activation.subject, "Activate your account");

        let policy = PasswordPolicyConfig::default();
        assert_eq!(policy.min_length, 1);
        assert_eq!(policy.max_length, 255);

        let smtp = SmtpConfig::default();
        assert_eq!(smtp.port, 587);
    }
}
