//! Redis-based action code store.
//!
//! # Architecture
//!
//! Codes are stored in Redis with:
//! - **Code key**: `accounts:code:{zone}:{code}` → JSON-serialized [`ActionCode`]
//! - **Intent index**: `accounts:code:intent:{zone}:{subject}:{scope}` → sorted set
//!   of code values scored by `created_at` (microseconds)
//! - **TTL**: the code key expires at the code's `expires_at`; the index
//!   expires with the most recently issued code
//! - **Atomic consumption**: `GETDEL` on the code key
//!
//! Under N concurrent `retrieve` calls for the same code, exactly one
//! `GETDEL` sees the value. Index members whose code key is gone are skipped
//! by `retrieve_latest` and pruned, so a consumed newest code falls back to
//! the next newest one that is still valid.
//!
//! # Example
//!
//! ```no_run
//! use composable_rust_accounts::stores::RedisActionCodeStore;
//! use composable_rust_accounts::providers::ActionCodeStore;
//! use composable_rust_accounts::state::ZoneId;
//! use chrono::{Duration, Utc};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RedisActionCodeStore::new("redis://127.0.0.1:6379").await?;
//! let zone = ZoneId::uaa();
//!
//! let code = store
//!     .generate(&zone, br#"{"kind":"password_reset.v1","user_id":"u1"}"#.to_vec(), Utc::now() + Duration::minutes(30), None)
//!     .await?;
//!
//! // Single use
//! assert!(store.retrieve(&zone, &code.code).await?.is_some());
//! assert!(store.retrieve(&zone, &code.code).await?.is_none());
//! # Ok(())
//! # }
//! ```

use crate::clock::{Clock, SharedClock, system_clock};
use crate::error::{AccountError, Result};
use crate::providers::code_store::{check_issue_request, generate_code_value};
use crate::providers::{ActionCode, ActionCodeStore, CodeIntent};
use crate::state::ZoneId;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

/// `Redis`-based action code store with atomic consumption.
///
/// This type is `Clone`; clones share the same `ConnectionManager`.
#[derive(Clone)]
pub struct RedisActionCodeStore {
    /// Connection manager for connection pooling.
    conn_manager: ConnectionManager,

    /// Time source for the expiry double-check.
    clock: SharedClock,
}

impl RedisActionCodeStore {
    /// Create a new `Redis` action code store.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - `Redis` connection URL (e.g., "<redis://127.0.0.1:6379>")
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Storage` if the URL is malformed or the
    /// connection fails.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| AccountError::Storage(format!("Failed to create Redis client: {e}")))?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            AccountError::Storage(format!("Failed to create Redis connection manager: {e}"))
        })?;

        tracing::info!("RedisActionCodeStore initialized successfully");

        Ok(Self {
            conn_manager,
            clock: system_clock(),
        })
    }

    /// Use `clock` for the expiry double-check.
    #[must_use]
    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    /// Key holding a code record.
    fn code_key(zone: &ZoneId, code: &str) -> String {
        format!("accounts:code:{zone}:{code}")
    }

    /// Sorted set of code values issued for an intent.
    fn intent_key(zone: &ZoneId, intent: &CodeIntent) -> String {
        format!("accounts:code:intent:{zone}:{}:{}", intent.subject, intent.scope)
    }

    /// Seconds until `expires_at`, never less than one.
    fn ttl_seconds(&self, expires_at: DateTime<Utc>) -> u64 {
        let ttl = expires_at.signed_duration_since(self.clock.now()).num_seconds();
        u64::try_from(ttl).unwrap_or(0).max(1)
    }

    fn decode(bytes: &[u8]) -> Result<ActionCode> {
        serde_json::from_slice(bytes)
            .map_err(|e| AccountError::Storage(format!("Corrupt action code record: {e}")))
    }
}

impl ActionCodeStore for RedisActionCodeStore {
    async fn generate(
        &self,
        zone: &ZoneId,
        payload: Vec<u8>,
        expires_at: DateTime<Utc>,
        intent: Option<CodeIntent>,
    ) -> Result<ActionCode> {
        let now = self.clock.now();
        check_issue_request(&payload, expires_at, now)?;

        let code = ActionCode {
            code: generate_code_value(),
            zone: zone.clone(),
            expires_at,
            payload,
            intent,
            created_at: now,
        };

        let record = serde_json::to_vec(&code)
            .map_err(|e| AccountError::Internal(format!("Failed to encode action code: {e}")))?;
        let ttl_seconds = self.ttl_seconds(expires_at);

        // Record and index entry land together.
        let mut pipe = redis::pipe();
        pipe.atomic()
            .set_ex(Self::code_key(zone, &code.code), record, ttl_seconds)
            .ignore();
        if let Some(intent) = &code.intent {
            let index = Self::intent_key(zone, intent);
            pipe.zadd(&index, &code.code, code.created_at.timestamp_micros())
                .ignore()
                .expire(&index, i64::try_from(ttl_seconds).unwrap_or(i64::MAX))
                .ignore();
        }

        let mut conn = self.conn_manager.clone();
        let _: () = pipe
            .query_async(&mut conn)
            .await
            .map_err(|e| AccountError::Storage(format!("Failed to store action code: {e}")))?;

        tracing::debug!(zone = %zone, ttl_seconds, expires_at = %expires_at, "Stored action code in Redis");

        Ok(code)
    }

    async fn retrieve(&self, zone: &ZoneId, code: &str) -> Result<Option<ActionCode>> {
        let mut conn = self.conn_manager.clone();

        let bytes: Option<Vec<u8>> = conn
            .get_del(Self::code_key(zone, code))
            .await
            .map_err(|e| AccountError::Storage(format!("Failed to consume action code: {e}")))?;

        let Some(bytes) = bytes else {
            tracing::debug!(zone = %zone, "Action code not found (consumed, expired, or invalid)");
            return Ok(None);
        };

        let stored = Self::decode(&bytes)?;

        // TTL normally removes expired codes; clock skew can leave a window.
        if stored.is_expired_at(self.clock.now()) {
            tracing::warn!(zone = %zone, expires_at = %stored.expires_at, "Expired action code outlived its TTL");
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
        let mut conn = self.conn_manager.clone();
        let index = Self::intent_key(zone, &CodeIntent::new(subject, scope));

        // Newest first.
        let candidates: Vec<String> = conn
            .zrevrange(&index, 0, -1)
            .await
            .map_err(|e| AccountError::Storage(format!("Failed to read code index: {e}")))?;

        let now = self.clock.now();
        let mut stale = Vec::new();
        let mut found = None;

        for candidate in candidates {
            let bytes: Option<Vec<u8>> = conn
                .get(Self::code_key(zone, &candidate))
                .await
                .map_err(|e| AccountError::Storage(format!("Failed to read action code: {e}")))?;

            match bytes.map(|bytes| Self::decode(&bytes)).transpose()? {
                Some(code) if !code.is_expired_at(now) => {
                    found = Some(code);
                    break;
                }
                _ => stale.push(candidate),
            }
        }

        if !stale.is_empty() {
            let pruned: redis::RedisResult<usize> = conn.zrem(&index, &stale).await;
            if let Err(e) = pruned {
                tracing::debug!(zone = %zone, error = %e, "Failed to prune code index");
            }
        }

        Ok(found)
    }

    async fn remove_expired(&self) -> Result<usize> {
        // Redis expires keys on its own.
        Ok(0)
    }
}
