//! Security-focused integration tests.
//!
//! These verify the properties the action code protocol depends on:
//!
//! - Atomic, single-use consumption under concurrency
//! - No oracle between unknown, expired and used codes
//! - Zone isolation
//! - Rejection of payloads that do not decode into a known schema

#![allow(clippy::unwrap_used)]

use chrono::{Duration, Utc};
use composable_rust_accounts::{
    AccountError, ActivationConfig, ActivationWorkflow, ZoneId,
    mocks::{
        MockActionCodeStore, MockClientRegistry, MockClock, MockIdentityStore, MockMessageService,
    },
    providers::{ActionCode, ActionCodeStore},
};
use std::sync::Arc;

fn workflow(
    codes: &MockActionCodeStore,
) -> ActivationWorkflow<MockActionCodeStore, MockIdentityStore, MockMessageService, MockClientRegistry>
{
    ActivationWorkflow::new(
        codes.clone(),
        MockIdentityStore::new(),
        MockMessageService::new(),
        MockClientRegistry::new(),
        ActivationConfig::default(),
    )
}

/// Exactly one of N concurrent consumers gets the code.
#[tokio::test]
async fn test_concurrent_retrieve_has_single_winner() {
    let store = MockActionCodeStore::new();
    let zone = ZoneId::uaa();
    let code = store
        .generate(&zone, b"payload".to_vec(), Utc::now() + Duration::minutes(10), None)
        .await
        .unwrap();

    let mut handles = vec![];
    for _ in 0..20 {
        let store = store.clone();
        let zone = zone.clone();
        let value = code.code.clone();
        handles.push(tokio::spawn(async move { store.retrieve(&zone, &value).await }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().is_some() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1, "exactly one consumer may win");
}

/// Concurrent activations with the same code verify the account once.
#[tokio::test]
async fn test_concurrent_activation_single_winner() {
    let codes = MockActionCodeStore::new();
    let workflow = workflow(&codes);
    let zone = ZoneId::uaa();

    workflow
        .begin_activation(&zone, "race@example.com", "secret", None, None)
        .await
        .unwrap();
    let code = codes.get_all().remove(0).code;

    let mut handles = vec![];
    for _ in 0..10 {
        let workflow = workflow.clone();
        let zone = zone.clone();
        let code = code.clone();
        handles.push(tokio::spawn(async move {
            workflow.complete_activation(&zone, &code).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) => assert_eq!(e, AccountError::InvalidCode),
        }
    }
    assert_eq!(successes, 1);
}

/// Unknown, expired and already-used codes are indistinguishable.
#[tokio::test]
async fn test_rejections_are_indistinguishable() {
    let clock = MockClock::default();
    let codes = MockActionCodeStore::with_clock(Arc::new(clock.clone()));
    let workflow = workflow(&codes).with_clock(Arc::new(clock.clone()));
    let zone = ZoneId::uaa();

    workflow
        .begin_activation(&zone, "used@example.com", "secret", None, None)
        .await
        .unwrap();
    let used = codes.get_all().remove(0).code;
    workflow.complete_activation(&zone, &used).await.unwrap();

    workflow
        .begin_activation(&zone, "late@example.com", "secret", None, None)
        .await
        .unwrap();
    let expired = codes.get_all().remove(0).code;
    clock.advance(Duration::hours(2));

    let unknown = workflow.complete_activation(&zone, "never-issued").await;
    let replayed = workflow.complete_activation(&zone, &used).await;
    let late = workflow.complete_activation(&zone, &expired).await;

    assert_eq!(unknown, Err(AccountError::InvalidCode));
    assert_eq!(replayed, Err(AccountError::InvalidCode));
    assert_eq!(late, Err(AccountError::InvalidCode));
}

/// A code issued in one zone never resolves in another.
#[tokio::test]
async fn test_codes_are_zone_scoped() {
    let codes = MockActionCodeStore::new();
    let workflow = workflow(&codes);
    let home = ZoneId::from("tenant-a");
    let other = ZoneId::from("tenant-b");

    workflow
        .begin_activation(&home, "user@example.com", "secret", None, None)
        .await
        .unwrap();
    let code = codes.get_all().remove(0).code;

    let cross = workflow.complete_activation(&other, &code).await;
    assert_eq!(cross, Err(AccountError::InvalidCode));

    // The failed cross-zone attempt did not burn the code.
    assert!(workflow.complete_activation(&home, &code).await.is_ok());
}

/// Untyped or garbage payloads are reported as malformed, not trusted.
#[tokio::test]
async fn test_malformed_payload_is_rejected() {
    let codes = MockActionCodeStore::new();
    let workflow = workflow(&codes);
    let zone = ZoneId::uaa();

    for (value, payload) in [
        ("legacy", br#"{"user_id":"u1","client_id":"c1"}"#.to_vec()),
        ("garbage", b"user-id-001".to_vec()),
        ("empty-user", br#"{"kind":"activation.v1","user_id":""}"#.to_vec()),
    ] {
        codes
            .insert(ActionCode {
                code: value.to_string(),
                zone: zone.clone(),
                expires_at: Utc::now() + Duration::hours(1),
                payload,
                intent: None,
                created_at: Utc::now(),
            })
            .unwrap();

        let result = workflow.complete_activation(&zone, value).await;
        assert!(
            matches!(result, Err(AccountError::MalformedPayload(_))),
            "{value}: {result:?}"
        );
    }
}

/// A well-formed reset code cannot activate an account.
#[tokio::test]
async fn test_reset_code_cannot_activate() {
    let codes = MockActionCodeStore::new();
    let workflow = workflow(&codes);
    let zone = ZoneId::uaa();

    codes
        .insert(ActionCode {
            code: "reset-code".to_string(),
            zone: zone.clone(),
            expires_at: Utc::now() + Duration::hours(1),
            payload: br#"{"kind":"password_reset.v1","user_id":"u1"}"#.to_vec(),
            intent: None,
            created_at: Utc::now(),
        })
        .unwrap();

    let result = workflow.complete_activation(&zone, "reset-code").await;
    assert_eq!(result, Err(AccountError::InvalidCode));
}
