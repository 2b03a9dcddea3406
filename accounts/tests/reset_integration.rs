//! Password reset workflow integration tests.

#![allow(clippy::unwrap_used)]

use chrono::Duration;
use composable_rust_accounts::{
    AccountError, AccountEvent, CodePayload, NewAccount, PasswordPolicyConfig, ResetConfig,
    ResetPayload, ResetWorkflow, ZoneId,
    constants::{RESET_PASSWORD_SCOPE, origins, password_reset_ttl},
    mocks::{MockActionCodeStore, MockClock, MockEventPublisher, MockIdentityStore},
    providers::{ActionCodeStore, CodeIntent, DefaultPasswordPolicy, IdentityStore},
    state::Account,
};
use std::sync::Arc;

struct Harness {
    workflow: ResetWorkflow<MockActionCodeStore, MockIdentityStore>,
    codes: MockActionCodeStore,
    identities: MockIdentityStore,
    events: MockEventPublisher,
    clock: MockClock,
    zone: ZoneId,
}

fn harness() -> Harness {
    let clock = MockClock::default();
    let codes = MockActionCodeStore::with_clock(Arc::new(clock.clone()));
    let identities = MockIdentityStore::with_clock(Arc::new(clock.clone()));
    let events = MockEventPublisher::new();

    let workflow = ResetWorkflow::new(
        codes.clone(),
        identities.clone(),
        ResetConfig::new("https://login.example.com".to_string()),
    )
    .with_clock(Arc::new(clock.clone()))
    .with_event_publisher(Arc::new(events.clone()))
    .with_password_policy(Arc::new(DefaultPasswordPolicy::new(
        PasswordPolicyConfig::default().with_min_length(8),
    )));

    Harness {
        workflow,
        codes,
        identities,
        events,
        clock,
        zone: ZoneId::uaa(),
    }
}

async fn seed(h: &Harness, username: &str, password: &str, origin: &str) -> Account {
    h.identities
        .create_user(&h.zone, &NewAccount::self_service(username, password, origin))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_forgot_password_issues_code_and_event() {
    let h = harness();
    let account = seed(&h, "user@example.com", "old-password", origins::UAA).await;

    let info = h
        .workflow
        .forgot_password(&h.zone, "user@example.com")
        .await
        .unwrap();

    assert_eq!(info.user_id, account.id);
    assert_eq!(info.code.expires_at, h.clock_now() + password_reset_ttl());
    assert_eq!(
        CodePayload::decode(&info.code.payload).unwrap(),
        CodePayload::PasswordReset(ResetPayload {
            user_id: account.id.clone()
        })
    );

    assert!(matches!(
        h.events.events().as_slice(),
        [AccountEvent::ResetPasswordRequested { subject, code, .. }]
            if subject == "user@example.com" && *code == info.code.code
    ));

    let latest = h
        .codes
        .retrieve_latest(&h.zone, "user@example.com", RESET_PASSWORD_SCOPE)
        .await
        .unwrap();
    assert_eq!(latest.map(|c| c.code), Some(info.code.code));
}

#[tokio::test]
async fn test_forgot_password_unknown_user() {
    let h = harness();

    let result = h.workflow.forgot_password(&h.zone, "nobody@example.com").await;

    assert_eq!(result, Err(AccountError::AccountNotFound));
    assert!(h.codes.is_empty());
    assert!(h.events.events().is_empty());
}

#[tokio::test]
async fn test_forgot_password_for_external_account_is_conflict() {
    let h = harness();
    let external = seed(&h, "ext@example.com", "whatever", origins::LDAP).await;

    let result = h.workflow.forgot_password(&h.zone, "ext@example.com").await;

    assert_eq!(
        result,
        Err(AccountError::ResetConflict {
            user_id: external.id
        })
    );
    assert!(h.codes.is_empty());
}

#[tokio::test]
async fn test_reset_password_changes_password() {
    let h = harness();
    let account = seed(&h, "user@example.com", "old-password", origins::UAA).await;
    let info = h.workflow.forgot_password(&h.zone, "user@example.com").await.unwrap();

    let updated = h
        .workflow
        .reset_password(&h.zone, &info.code.code, "new-password")
        .await
        .unwrap();

    assert_eq!(updated.id, account.id);
    assert_eq!(updated.version, account.version + 1);
    assert!(updated.password_changed_at.is_some());
    assert_eq!(h.identities.password_of(&account.id).as_deref(), Some("new-password"));
    assert!(matches!(
        h.events.events().last(),
        Some(AccountEvent::PasswordChanged { user_id, .. }) if *user_id == account.id
    ));

    let replay = h
        .workflow
        .reset_password(&h.zone, &info.code.code, "another-password")
        .await;
    assert_eq!(replay, Err(AccountError::InvalidCode));
}

#[tokio::test]
async fn test_reset_rejects_password_reuse() {
    let h = harness();
    let account = seed(&h, "user@example.com", "old-password", origins::UAA).await;
    let info = h.workflow.forgot_password(&h.zone, "user@example.com").await.unwrap();

    let result = h
        .workflow
        .reset_password(&h.zone, &info.code.code, "old-password")
        .await;

    assert_eq!(result, Err(AccountError::PasswordReuse));
    assert_eq!(
        result.err().map(|e| e.to_string()).as_deref(),
        Some("Your new password cannot be the same as the old password.")
    );
    assert_eq!(h.identities.password_of(&account.id).as_deref(), Some("old-password"));
}

#[tokio::test]
async fn test_reset_enforces_policy_without_burning_code() {
    let h = harness();
    let account = seed(&h, "user@example.com", "old-password", origins::UAA).await;
    let info = h.workflow.forgot_password(&h.zone, "user@example.com").await.unwrap();

    let result = h.workflow.reset_password(&h.zone, &info.code.code, "short").await;
    assert!(matches!(result, Err(AccountError::InvalidPassword(_))));
    assert_eq!(h.codes.len(), 1);

    let updated = h
        .workflow
        .reset_password(&h.zone, &info.code.code, "long-enough")
        .await
        .unwrap();
    assert_eq!(updated.id, account.id);
    assert_eq!(h.identities.password_of(&account.id).as_deref(), Some("long-enough"));
}

#[tokio::test]
async fn test_reset_rejects_unknown_and_expired_codes() {
    let h = harness();
    seed(&h, "user@example.com", "old-password", origins::UAA).await;

    let unknown = h.workflow.reset_password(&h.zone, "nope", "new-password").await;
    assert_eq!(unknown, Err(AccountError::InvalidCode));

    let info = h.workflow.forgot_password(&h.zone, "user@example.com").await.unwrap();
    h.clock.advance(Duration::minutes(30));
    let expired = h
        .workflow
        .reset_password(&h.zone, &info.code.code, "new-password")
        .await;
    assert_eq!(expired, Err(AccountError::InvalidCode));
}

#[tokio::test]
async fn test_reset_rejects_activation_code() {
    let h = harness();
    let account = seed(&h, "user@example.com", "old-password", origins::UAA).await;

    let activation = CodePayload::Activation(composable_rust_accounts::ActivationPayload {
        user_id: account.id.clone(),
        client_id: None,
        redirect_uri: None,
    });
    let code = h
        .codes
        .generate(
            &h.zone,
            activation.encode().unwrap(),
            h.clock_now() + Duration::hours(1),
            Some(CodeIntent::new("user@example.com", "")),
        )
        .await
        .unwrap();

    let result = h.workflow.reset_password(&h.zone, &code.code, "new-password").await;
    assert_eq!(result, Err(AccountError::InvalidCode));
    assert_eq!(h.identities.password_of(&account.id).as_deref(), Some("old-password"));
}

impl Harness {
    fn clock_now(&self) -> chrono::DateTime<chrono::Utc> {
        use composable_rust_accounts::Clock;
        self.clock.now()
    }
}
