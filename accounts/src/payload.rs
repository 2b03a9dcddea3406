//! Typed action code payloads.
//!
//! The code store treats payloads as bytes. Workflows encode them as tagged
//! JSON where the tag carries both kind and schema version:
//!
//! ```text
//! {"kind":"activation.v1","user_id":"…","client_id":"…","redirect_uri":"…"}
//! {"kind":"password_reset.v1","user_id":"…"}
//! ```
//!
//! Decoding validates required fields so a bad payload fails here with
//! [`AccountError::MalformedPayload`] instead of further downstream.

use crate::error::{AccountError, Result};
use crate::state::UserId;
use serde::{Deserialize, Serialize};

/// Payload of an account activation code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationPayload {
    /// Account being activated.
    pub user_id: UserId,

    /// Client that initiated the signup, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Redirect the client asked for. Unvalidated until redemption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
}

/// Payload of a password reset code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetPayload {
    /// Account whose password may be reset.
    pub user_id: UserId,
}

/// All payload schemas an action code can carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CodePayload {
    /// Account activation, schema version 1.
    #[serde(rename = "activation.v1")]
    Activation(ActivationPayload),

    /// Password reset, schema version 1.
    #[serde(rename = "password_reset.v1")]
    PasswordReset(ResetPayload),
}

impl CodePayload {
    /// Serialize for storage.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Internal` if serialization fails, which can only
    /// happen through a programming error.
    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| AccountError::Internal(format!("failed to encode code payload: {e}")))
    }

    /// Deserialize and validate a stored payload.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::MalformedPayload` for unknown kinds, missing
    /// fields, or an empty user id.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let payload: Self = serde_json::from_slice(bytes)
            .map_err(|e| AccountError::MalformedPayload(e.to_string()))?;

        if payload.user_id().as_str().trim().is_empty() {
            return Err(AccountError::MalformedPayload("user_id is empty".to_string()));
        }

        Ok(payload)
    }

    /// Account the payload refers to.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        match self {
            Self::Activation(p) => &p.user_id,
            Self::PasswordReset(p) => &p.user_id,
        }
    }

    /// Schema tag, for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Activation(_) => "activation.v1",
            Self::PasswordReset(_) => "password_reset.v1",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_wire_format() {
        let payload = CodePayload::Activation(ActivationPayload {
            user_id: UserId::from("u1"),
            client_id: Some("c1".to_string()),
            redirect_uri: Some("https://app.example.com/cb".to_string()),
        });
        let json: serde_json::Value =
            serde_json::from_slice(&payload.encode().unwrap_or_default()).unwrap_or_default();

        assert_eq!(json["kind"], "activation.v1");
        assert_eq!(json["user_id"], "u1");
        assert_eq!(json["client_id"], "c1");
        assert_eq!(json["redirect_uri"], "https://app.example.com/cb");
    }

    #[test]
    fn test_decode_optional_fields() {
        let decoded = CodePayload::decode(br#"{"kind":"activation.v1","user_id":"u1"}"#);
        assert_eq!(
            decoded,
            Ok(CodePayload::Activation(ActivationPayload {
                user_id: UserId::from("u1"),
                client_id: None,
                redirect_uri: None,
            }))
        );
    }

    #[test]
    fn test_decode_reset() {
        let decoded = CodePayload::decode(br#"{"kind":"password_reset.v1","user_id":"u9"}"#);
        assert!(matches!(decoded, Ok(CodePayload::PasswordReset(ref p)) if p.user_id.as_str() == "u9"));
    }

    #[test]
    fn test_decode_rejects_unknown_kind() {
        let decoded = CodePayload::decode(br#"{"kind":"activation.v2","user_id":"u1"}"#);
        assert!(matches!(decoded, Err(AccountError::MalformedPayload(_))));
    }

    #[test]
    fn test_decode_rejects_untyped_map() {
        let decoded = CodePayload::decode(br#"{"user_id":"u1","client_id":"c1"}"#);
        assert!(matches!(decoded, Err(AccountError::MalformedPayload(_))));
    }

    #[test]
    fn test_decode_rejects_missing_or_empty_user() {
        assert!(matches!(
            CodePayload::decode(br#"{"kind":"password_reset.v1"}"#),
            Err(AccountError::MalformedPayload(_))
        ));
        assert!(matches!(
            CodePayload::decode(br#"{"kind":"password_reset.v1","user_id":" "}"#),
            Err(AccountError::MalformedPayload(_))
        ));
        assert!(matches!(
            CodePayload::decode(b"user-id-001"),
            Err(AccountError::MalformedPayload(_))
        ));
    }
}
