//! Redirect target resolution.
//!
//! A caller-supplied `redirect_uri` is never trusted on its own. It is used
//! only when it fully matches one of the client's registered patterns;
//! otherwise the client's default redirect, or the global default, is used.
//!
//! # Pattern syntax
//!
//! - `*` matches any run of characters inside one URI component. It never
//!   crosses `/`, `?`, `#` or `\`.
//! - `**` matches any run of characters, separators included.
//! - Everything else matches literally.
//!
//! ```text
//! https://*.example.com/cb     matches  https://app.example.com/cb
//!                              rejects  https://evil.com/.example.com/cb
//! https://app.example.com/**   matches  https://app.example.com/a/b?c=d
//! ```

use crate::state::RedirectRegistration;
use regex::Regex;

/// Character class a single `*` expands to.
const COMPONENT_WILDCARD: &str = r"[^/?#\\]*";

/// Compile a registered redirect pattern into an anchored matcher.
///
/// # Errors
///
/// Returns the regex error if the compiled expression is rejected (for
/// example, when it exceeds the size limit).
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    let mut expression = String::with_capacity(pattern.len() * 2 + 2);
    expression.push('^');

    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '*' {
            expression.push_str(&regex::escape(&literal));
            literal.clear();
            if chars.peek() == Some(&'*') {
                while chars.peek() == Some(&'*') {
                    chars.next();
                }
                expression.push_str(".*");
            } else {
                expression.push_str(COMPONENT_WILDCARD);
            }
        } else {
            literal.push(c);
        }
    }
    expression.push_str(&regex::escape(&literal));
    expression.push('$');

    Regex::new(&expression)
}

/// Whether `candidate` fully matches any of `patterns`.
///
/// Patterns that fail to compile never match.
#[must_use]
pub fn matches_any(patterns: &[String], candidate: &str) -> bool {
    patterns.iter().any(|pattern| match compile_pattern(pattern) {
        Ok(matcher) => matcher.is_match(candidate),
        Err(e) => {
            tracing::warn!(pattern = %pattern, error = %e, "Skipping uncompilable redirect pattern");
            false
        }
    })
}

/// Resolves the post-activation redirect.
#[derive(Debug, Clone)]
pub struct RedirectResolver {
    /// Global safe default.
    fallback: String,
}

impl RedirectResolver {
    /// Create a resolver with a global safe default.
    #[must_use]
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            fallback: fallback.into(),
        }
    }

    /// The global safe default.
    #[must_use]
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Resolve `candidate` against a client's registration.
    ///
    /// - No registration (unknown client): global default
    /// - Candidate matches a registered pattern: the candidate
    /// - Otherwise: client default, then global default
    ///
    /// An empty candidate means "no preference".
    #[must_use]
    pub fn resolve(&self, candidate: &str, registration: Option<&RedirectRegistration>) -> String {
        let Some(registration) = registration else {
            return self.fallback.clone();
        };

        if !candidate.is_empty() && matches_any(&registration.redirect_patterns, candidate) {
            return candidate.to_string();
        }

        if !candidate.is_empty() {
            tracing::warn!(
                client_id = %registration.client_id,
                redirect_uri = %candidate,
                "Redirect URI does not match any registered pattern"
            );
        }

        registration
            .default_redirect
            .as_deref()
            .filter(|redirect| !redirect.is_empty())
            .unwrap_or(&self.fallback)
            .to_string()
    }
}

impl Default for RedirectResolver {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_REDIRECT)
    }
}
