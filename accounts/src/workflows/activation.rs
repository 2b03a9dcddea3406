//! Email account activation.
//!
//! Per (zone, username, origin) an account moves through:
//!
//! ```text
//! NoAccount ──begin──▶ Unverified ──complete──▶ Verified
//!                        │    ▲
//!                        └────┘ begin (duplicate) / resend: fresh code
//! ```
//!
//! `Verified` is terminal: beginning, resending or completing again is
//! rejected with [`AccountError::AlreadyVerified`].

use crate::clock::{Clock, SharedClock, system_clock};
use crate::config::ActivationConfig;
use crate::constants::{activation_code_ttl, origins};
use crate::error::{AccountError, Result};
use crate::events::AccountEvent;
use crate::payload::{ActivationPayload, CodePayload};
use crate::provisioner::AccountProvisioner;
use crate::providers::{
    AccountEventPublisher, ActionCodeStore, ClientRegistry, CodeIntent, DefaultPasswordPolicy,
    IdentityStore, MessageCategory, MessageService, PasswordPolicy,
};
use crate::redirect::RedirectResolver;
use crate::state::{Account, UserId, ZoneId};
use crate::utils::{is_valid_email, mask_email};
use std::sync::Arc;

/// Outcome of starting (or restarting) an activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationRequested {
    /// Account awaiting activation.
    pub user_id: UserId,

    /// `true` when the account already existed and a fresh code was issued.
    pub resent: bool,

    /// Whether the message service accepted the activation message.
    ///
    /// A delivery failure is logged and never fails the request.
    pub message_delivered: bool,
}

/// Outcome of redeeming an activation code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountActivated {
    /// Activated account.
    pub user_id: UserId,

    /// Account username.
    pub username: String,

    /// Account email.
    pub email: String,

    /// Where the user agent should go next.
    pub redirect: String,
}

/// Activation workflow.
///
/// Generic over its collaborators so tests run against the in-memory mocks
/// and production wires the Redis/PostgreSQL stores.
#[derive(Clone)]
pub struct ActivationWorkflow<S, I, M, R> {
    codes: S,
    provisioner: AccountProvisioner<I>,
    messages: M,
    clients: R,
    policy: Arc<dyn PasswordPolicy>,
    resolver: RedirectResolver,
    config: ActivationConfig,
    clock: SharedClock,
    events: Option<Arc<dyn AccountEventPublisher>>,
}

impl<S, I, M, R> ActivationWorkflow<S, I, M, R>
where
    S: ActionCodeStore,
    I: IdentityStore,
    M: MessageService,
    R: ClientRegistry,
{
    /// Create a workflow with the default password policy and the wall clock.
    #[must_use]
    pub fn new(codes: S, identities: I, messages: M, clients: R, config: ActivationConfig) -> Self {
        Self {
            codes,
            provisioner: AccountProvisioner::new(identities),
            messages,
            clients,
            policy: Arc::new(DefaultPasswordPolicy::default()),
            resolver: RedirectResolver::new(config.default_redirect.clone()),
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

    /// Start activation for a self-registered account.
    ///
    /// Creates an unverified account (or finds the existing unverified one),
    /// issues a one-hour activation code, and sends the activation link.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The email is malformed → `AccountError::InvalidEmail`
    /// - The password violates policy → `AccountError::InvalidPassword`
    /// - The account is already verified → `AccountError::AlreadyVerified`
    /// - The account vanished after a duplicate signup → `AccountError::AccountNotFound`
    /// - A store is unavailable → `AccountError::Storage`
    /// - Account creation failed → `AccountError::Provisioning`
    pub async fn begin_activation(
        &self,
        zone: &ZoneId,
        email: &str,
        password: &str,
        client_id: Option<&str>,
        redirect_uri: Option<&str>,
    ) -> Result<ActivationRequested> {
        if !is_valid_email(email) {
            return Err(AccountError::InvalidEmail);
        }
        self.policy.validate(password)?;

        match self
            .provisioner
            .create_or_get(zone, email, password, origins::UAA)
            .await
        {
            Ok(account) => {
                self.issue_and_send(zone, &account, client_id, redirect_uri, false)
                    .await
            }
            Err(AccountError::AlreadyExists { .. }) => {
                let account = self.find_primary(zone, email).await?;
                if account.verified {
                    tracing::info!(zone = %zone, user_id = %account.id, "Activation requested for active account");
                    return Err(AccountError::AlreadyVerified {
                        user_id: account.id,
                    });
                }
                self.issue_and_send(zone, &account, client_id, redirect_uri, true)
                    .await
            }
            Err(e) => Err(e),
        }
    }

    /// Redeem an activation code and mark the account verified.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The code is unknown, expired, used, or not an activation code → `AccountError::InvalidCode`
    /// - The payload is garbage → `AccountError::MalformedPayload`
    /// - The account no longer exists → `AccountError::AccountNotFound`
    /// - The account is already verified → `AccountError::AlreadyVerified`
    /// - The account changed concurrently → `AccountError::VersionConflict`
    /// - A store is unavailable → `AccountError::Storage`
    pub async fn complete_activation(&self, zone: &ZoneId, code: &str) -> Result<AccountActivated> {
        let Some(action_code) = self.codes.retrieve(zone, code).await? else {
            tracing::warn!(zone = %zone, "Rejected activation code");
            return Err(AccountError::InvalidCode);
        };

        let payload = match CodePayload::decode(&action_code.payload)? {
            CodePayload::Activation(payload) => payload,
            other => {
                tracing::warn!(zone = %zone, kind = other.kind(), "Non-activation code presented for activation");
                return Err(AccountError::InvalidCode);
            }
        };

        let identities = self.provisioner.identities();
        let account = identities.retrieve(zone, &payload.user_id).await?;
        if account.verified {
            return Err(AccountError::AlreadyVerified {
                user_id: account.id,
            });
        }

        let account = identities.verify(zone, &account.id, account.version).await?;

        let redirect = self
            .resolve_redirect(
                zone,
                payload.client_id.as_deref(),
                payload.redirect_uri.as_deref().unwrap_or_default(),
            )
            .await;

        tracing::info!(zone = %zone, user_id = %account.id, redirect = %redirect, "Account activated");

        self.publish(AccountEvent::AccountVerified {
            zone: zone.clone(),
            user_id: account.id.clone(),
            timestamp: self.clock.now(),
        });

        Ok(AccountActivated {
            user_id: account.id,
            username: account.username,
            email: account.email,
            redirect,
        })
    }

    /// Issue and send a fresh activation code for an unverified account.
    ///
    /// The redirect requested at signup is recovered from the latest code
    /// issued for (email, client) when one is still live.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No primary-origin account exists → `AccountError::AccountNotFound`
    /// - The account is already verified → `AccountError::AlreadyVerified`
    /// - A store is unavailable → `AccountError::Storage`
    pub async fn resend_verification_code(
        &self,
        zone: &ZoneId,
        email: &str,
        client_id: Option<&str>,
    ) -> Result<ActivationRequested> {
        let account = self.find_primary(zone, email).await?;
        if account.verified {
            return Err(AccountError::AlreadyVerified {
                user_id: account.id,
            });
        }

        let previous_redirect = self
            .codes
            .retrieve_latest(zone, &account.email, client_id.unwrap_or_default())
            .await?
            .and_then(|latest| match CodePayload::decode(&latest.payload) {
                Ok(CodePayload::Activation(payload)) => payload.redirect_uri,
                _ => None,
            });

        self.issue_and_send(zone, &account, client_id, previous_redirect.as_deref(), true)
            .await
    }

    /// The single primary-origin account for `email`.
    async fn find_primary(&self, zone: &ZoneId, email: &str) -> Result<Account> {
        let mut matches = self.provisioner.find(zone, email, origins::UAA).await?;
        if matches.len() > 1 {
            tracing::warn!(
                zone = %zone,
                email = %mask_email(email),
                count = matches.len(),
                "Multiple primary accounts match; using the first"
            );
        }
        if matches.is_empty() {
            return Err(AccountError::AccountNotFound);
        }
        Ok(matches.swap_remove(0))
    }

    async fn issue_and_send(
        &self,
        zone: &ZoneId,
        account: &Account,
        client_id: Option<&str>,
        redirect_uri: Option<&str>,
        resent: bool,
    ) -> Result<ActivationRequested> {
        let payload = CodePayload::Activation(ActivationPayload {
            user_id: account.id.clone(),
            client_id: client_id.map(str::to_string),
            redirect_uri: redirect_uri.map(str::to_string),
        })
        .encode()?;

        let expires_at = self.clock.now() + activation_code_ttl();
        let intent = CodeIntent::new(account.email.clone(), client_id.unwrap_or_default());

        let code = self
            .codes
            .generate(zone, payload, expires_at, Some(intent))
            .await
            .inspect_err(|e| {
                tracing::error!(zone = %zone, user_id = %account.id, error = %e, "Failed to issue activation code");
            })?;

        let body = format!(
            "Welcome to {}!\n\nTo activate your account, open this link:\n\n{}\n\nThe link expires in one hour.\n",
            self.config.service_name,
            self.config.verify_link(&code.code)
        );

        let message_delivered = match self
            .messages
            .send(
                &account.email,
                MessageCategory::CreateAccountConfirmation,
                &self.config.subject,
                &body,
            )
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(zone = %zone, user_id = %account.id, error = %e, "Activation message not delivered");
                false
            }
        };

        tracing::info!(zone = %zone, user_id = %account.id, resent, "Activation code issued");

        Ok(ActivationRequested {
            user_id: account.id.clone(),
            resent,
            message_delivered,
        })
    }

    async fn resolve_redirect(&self, zone: &ZoneId, client_id: Option<&str>, candidate: &str) -> String {
        let Some(client_id) = client_id.filter(|id| !id.is_empty()) else {
            return self.resolver.fallback().to_string();
        };

        match self.clients.lookup(zone, client_id).await {
            Ok(registration) => self.resolver.resolve(candidate, registration.as_ref()),
            Err(e) => {
                tracing::warn!(zone = %zone, client_id = %client_id, error = %e, "Client lookup failed; using default redirect");
                self.resolver.fallback().to_string()
            }
        }
    }

    fn publish(&self, event: AccountEvent) {
        if let Some(events) = &self.events {
            if let Err(e) = events.publish(event) {
                tracing::warn!(error = %e, "Failed to publish account event");
            }
        }
    }
}
