//! Password reset.
//!
//! `forgot_password` issues a 30-minute reset code for a primary-origin
//! account and hands it back to the caller, which owns delivery.
//! `reset_password` checks the new password against policy before the code
//! is touched, so a rejected password leaves the code redeemable.

use crate::clock::{Clock, SharedClock, system_clock};
use crate::config::ResetConfig;
use crate::constants::{RESET_PASSWORD_SCOPE, origins, password_reset_ttl};
use crate::error::{AccountError, Result};
use crate::events::AccountEvent;
use crate::payload::{CodePayload, ResetPayload};
use crate::provisioner::AccountProvisioner;
use crate::providers::{
    AccountEventPublisher, ActionCode, ActionCodeStore, CodeIntent, DefaultPasswordPolicy,
    IdentityStore, PasswordPolicy,
};
use crate::state::{Account, UserId, ZoneId};
use crate::utils::mask_email;
use std::sync::Arc;

/// Outcome of a forgot-password request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgotPasswordInfo {
    /// Account the code was issued for.
    pub user_id: UserId,

    /// The issued reset code.
    pub code: ActionCode,
}

/// Password reset workflow.
#[derive(Clone)]
pub struct ResetWorkflow<S, I> {
    codes: S,
    provisioner: AccountProvisioner<I>,
    policy: Arc<dyn PasswordPolicy>,
    config: ResetConfig,
    clock: SharedClock,
    events: Option<Arc<dyn AccountEventPublisher>>,
}

impl<S, I> ResetWorkflow<S, I>
where
    S: ActionCodeStore,
    I: IdentityStore,
{
    /// Create a workflow with the default password policy and the wall clock.
    #[must_use]
    pub fn new(codes: S, identities: I, config: ResetConfig) -> Self {
        Self {
            codes,
            provisioner: AccountProvisioner::new(identities),
            policy: Arc::new(DefaultPasswordPolicy::default()),
            config,
            clock: system_clock(),
            events: None,
        }
    }

    /// Use a custom password policy.
    #[must_use]
    pub fn with_password_policy(mut self, policy: Arc<dyn PasswordPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Publish account events through `publisher`.
    #[must_use]
    pub fn with_event_publisher(mut self, publisher: Arc<dyn AccountEventPublisher>) -> Self {
        self.events = Some(publisher);
        self
    }

    /// Use `clock` for code expiry and event timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    /// Link the user follows to redeem `info`.
    ///
    /// For callers that render and deliver the reset message themselves.
    #[must_use]
    pub fn reset_link(&self, info: &ForgotPasswordInfo) -> String {
        self.config.reset_link(&info.code.code)
    }

    /// Issue a reset code for the primary-origin account named `email`.
    ///
    /// Nothing is sent; the caller decides how the code reaches the user.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The account exists only under another origin → `AccountError::ResetConflict`
    /// - No account exists → `AccountError::AccountNotFound`
    /// - A store is unavailable → `AccountError::Storage`
    pub async fn forgot_password(&self, zone: &ZoneId, email: &str) -> Result<ForgotPasswordInfo> {
        let matches = self.provisioner.find(zone, email, origins::UAA).await?;

        let Some(account) = matches.into_iter().next() else {
            let elsewhere = self
                .provisioner
                .identities()
                .find_by_username(zone, email)
                .await?;
            return Err(match elsewhere.into_iter().next() {
                Some(other) => {
                    tracing::info!(
                        zone = %zone,
                        user_id = %other.id,
                        origin = %other.origin,
                        "Password reset requested for externally managed account"
                    );
                    AccountError::ResetConflict { user_id: other.id }
                }
                None => {
                    tracing::info!(zone = %zone, email = %mask_email(email), "Password reset requested for unknown account");
                    AccountError::AccountNotFound
                }
            });
        };

        let payload = CodePayload::PasswordReset(ResetPayload {
            user_id: account.id.clone(),
        })
        .encode()?;

        let now = self.clock.now();
        let code = self
            .codes
            .generate(
                zone,
                payload,
                now + password_reset_ttl(),
                Some(CodeIntent::new(email, RESET_PASSWORD_SCOPE)),
            )
            .await?;

        self.publish(AccountEvent::ResetPasswordRequested {
            zone: zone.clone(),
            subject: email.to_string(),
            code: code.code.clone(),
            timestamp: now,
        });

        tracing::info!(zone = %zone, user_id = %account.id, "Password reset code issued");

        Ok(ForgotPasswordInfo {
            user_id: account.id,
            code,
        })
    }

    /// Redeem a reset code and set a new password.
    ///
    /// The policy check runs first and does not consume the code.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The password violates policy → `AccountError::InvalidPassword`
    /// - The code is unknown, expired, used, or not a reset code → `AccountError::InvalidCode`
    /// - The payload is garbage → `AccountError::MalformedPayload`
    /// - The account no longer exists → `AccountError::AccountNotFound`
    /// - The password equals the current one → `AccountError::PasswordReuse`
    /// - The account changed concurrently → `AccountError::VersionConflict`
    /// - A store is unavailable → `AccountError::Storage`
    pub async fn reset_password(&self, zone: &ZoneId, code: &str, new_password: &str) -> Result<Account> {
        self.policy.validate(new_password)?;

        let Some(action_code) = self.codes.retrieve(zone, code).await? else {
            tracing::warn!(zone = %zone, "Rejected password reset code");
            return Err(AccountError::InvalidCode);
        };

        let payload = match CodePayload::decode(&action_code.payload)? {
            CodePayload::PasswordReset(payload) => payload,
            other => {
                tracing::warn!(zone = %zone, kind = other.kind(), "Non-reset code presented for password reset");
                return Err(AccountError::InvalidCode);
            }
        };

        let identities = self.provisioner.identities();
        let account = identities.retrieve(zone, &payload.user_id).await?;

        if self
            .provisioner
            .password_matches(zone, &account.id, new_password)
            .await?
        {
            return Err(AccountError::PasswordReuse);
        }

        let updated = identities
            .change_password(zone, &account.id, account.version, new_password)
            .await?;

        tracing::info!(zone = %zone, user_id = %updated.id, "Password reset completed");

        self.publish(AccountEvent::PasswordChanged {
            zone: zone.clone(),
            user_id: updated.id.clone(),
            timestamp: self.clock.now(),
        });

        Ok(updated)
    }

    fn publish(&self, event: AccountEvent) {
        if let Some(events) = &self.events {
            if let Err(e) = events.publish(event) {
                tracing::warn!(error = %e, "Failed to publish account event");
            }
        }
    }
}
