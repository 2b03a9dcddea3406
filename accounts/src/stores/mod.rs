//! Storage implementations for the account workflows.
//!
//! - **Action code store** (Redis) - Ephemeral codes with TTL and `GETDEL` consumption
//! - **Action code store** (PostgreSQL) - Durable codes with `DELETE ... RETURNING` consumption
//! - **Identity store** (PostgreSQL) - Accounts with Argon2id password hashes

pub mod code_redis;
#[cfg(feature = "postgres")]
pub mod postgres;

// Re-exports
pub use code_redis::RedisActionCodeStore;
#[cfg(feature = "postgres")]
pub use postgres::{PostgresActionCodeStore, PostgresIdentityStore};
