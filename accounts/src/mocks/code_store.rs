//! Mock action code store for testing.

use crate::clock::{Clock, SharedClock, system_clock};
use crate::error::{AccountError, Result};
use crate::providers::code_store::{check_issue_request, generate_code_value};
use crate::providers::{ActionCode, ActionCodeStore, CodeIntent};
use crate::state::ZoneId;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type CodeKey = (ZoneId, String);

/// Codes plus a monotonic issue counter.
///
/// The counter orders codes issued within the same clock tick, which is the
/// norm under a frozen `MockClock`.
#[derive(Default)]
struct Codes {
    entries: HashMap<CodeKey, (u64, ActionCode)>,
    issued: u64,
}

impl Codes {
    fn put(&mut self, code: ActionCode) {
        self.issued += 1;
        self.entries
            .insert((code.zone.clone(), code.code.clone()), (self.issued, code));
    }
}

/// Mock action code store.
///
/// In-memory store with atomic single-use semantics. Expiry is evaluated
/// against an injected clock so tests can move time instead of sleeping.
#[derive(Clone)]
pub struct MockActionCodeStore {
    codes: Arc<Mutex<Codes>>,
    clock: SharedClock,
    fail_generate: Arc<Mutex<bool>>,
}

impl MockActionCodeStore {
    /// Create a new mock store using the wall clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(system_clock())
    }

    /// Create a new mock store using `clock` for expiry checks.
    #[must_use]
    pub fn with_clock(clock: SharedClock) -> Self {
        Self {
            codes: Arc::default(),
            clock,
            fail_generate: Arc::new(Mutex::new(false)),
        }
    }

    /// Make subsequent `generate` calls fail with `AccountError::Storage`.
    pub fn set_fail_generate(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_generate.lock() {
            *flag = fail;
        }
    }

    /// Number of stored codes, expired ones included (for testing).
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.lock().map_or(0, |codes| codes.entries.len())
    }

    /// Whether the store holds no codes (for testing).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All stored codes, oldest first (for testing).
    #[must_use]
    pub fn get_all(&self) -> Vec<ActionCode> {
        let Ok(codes) = self.codes.lock() else {
            return Vec::new();
        };
        let mut all: Vec<_> = codes.entries.values().cloned().collect();
        all.sort_by_key(|(seq, _)| *seq);
        all.into_iter().map(|(_, code)| code).collect()
    }

    /// Store a code verbatim, bypassing issue checks (for testing).
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Internal` if the lock is poisoned.
    pub fn insert(&self, code: ActionCode) -> Result<()> {
        self.lock()?.put(code);
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Codes>> {
        self.codes
            .lock()
            .map_err(|_| AccountError::Internal("Mutex lock failed".to_string()))
    }
}

impl Default for MockActionCodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionCodeStore for MockActionCodeStore {
    async fn generate(
        &self,
        zone: &ZoneId,
        payload: Vec<u8>,
        expires_at: DateTime<Utc>,
        intent: Option<CodeIntent>,
    ) -> Result<ActionCode> {
        let now = self.clock.now();
        check_issue_request(&payload, expires_at, now)?;

        if self.fail_generate.lock().map(|flag| *flag).unwrap_or(false) {
            return Err(AccountError::Storage("code store unavailable".to_string()));
        }

        let code = ActionCode {
            code: generate_code_value(),
            zone: zone.clone(),
            expires_at,
            payload,
            intent,
            created_at: now,
        };

        self.lock()?.put(code.clone());
        Ok(code)
    }

    async fn retrieve(&self, zone: &ZoneId, code: &str) -> Result<Option<ActionCode>> {
        let now = self.clock.now();
        let mut codes = self.lock()?;

        // Check-and-delete under the lock; expired codes are dropped too.
        let Some((_, stored)) = codes.entries.remove(&(zone.clone(), code.to_string())) else {
            return Ok(None);
        };

        if stored.is_expired_at(now) {
            return Ok(None);
        }

        Ok(Some(stored))
    }

    async fn retrieve_latest(
        &self,
        zone: &ZoneId,
        subject: &str,
        scope: &str,
    ) -> Result<Option<ActionCode>> {
        let now = self.clock.now();
        let codes = self.lock()?;

        Ok(codes
            .entries
            .values()
            .filter(|(_, c)| &c.zone == zone && !c.is_expired_at(now))
            .filter(|(_, c)| {
                c.intent
                    .as_ref()
                    .is_some_and(|i| i.subject == subject && i.scope == scope)
            })
            .max_by_key(|(seq, c)| (c.created_at, *seq))
            .map(|(_, c)| c.clone()))
    }

    async fn remove_expired(&self) -> Result<usize> {
        let now = self.clock.now();
        let mut codes = self.lock()?;

        let before = codes.entries.len();
        codes.entries.retain(|_, (_, c)| !c.is_expired_at(now));
        Ok(before - codes.entries.len())
    }
}
