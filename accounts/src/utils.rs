//! Utility functions for the account workflows.

/// Validate email address format.
///
/// Basic structural validation, not full RFC 5322:
/// - Length between 3 and 255 characters
/// - Exactly one `@` with non-empty local and domain parts
/// - Domain made of at least two non-empty dot-separated labels
/// - Local part made of RFC 5322 `atext` characters and non-leading,
///   non-trailing, non-repeated dots
///
/// # Examples
///
/// ```
/// use composable_rust_accounts::utils::is_valid_email;
///
/// assert!(is_valid_email("user@example.com"));
/// assert!(is_valid_email("user+tag@subdomain.example.com"));
/// assert!(is_valid_email("o'brien@example.com"));
/// assert!(!is_valid_email("invalid"));
/// assert!(!is_valid_email("user@"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if !(3..=255).contains(&email.len()) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    let local_ok = local.split('.').all(|atom| !atom.is_empty() && atom.chars().all(is_atext));

    let labels: Vec<&str> = domain.split('.').collect();
    let domain_ok = labels.len() >= 2
        && labels
            .iter()
            .all(|label| !label.is_empty() && label.chars().all(|c| c.is_alphanumeric() || c == '-'));

    local_ok && domain_ok
}

/// Characters allowed unquoted in the local part of an address.
const fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+' | '-' | '/' | '=' | '?' | '^' | '_' | '`'
                | '{' | '|' | '}' | '~'
        )
}

/// Redact an email address for logs, keeping the first character of the
/// local part and the domain.
///
/// # Examples
///
/// ```
/// use composable_rust_accounts::utils::mask_email;
///
/// assert_eq!(mask_email("alice@example.com"), "a***@example.com");
/// assert_eq!(mask_email("nonsense"), "***");
/// ```
#[must_use]
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first: String = local.chars().take(1).collect();
            format!("{first}***@{domain}")
        }
        _ => "***".to_string(),
    }
}
