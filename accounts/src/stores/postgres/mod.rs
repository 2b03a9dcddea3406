//! PostgreSQL storage implementations.
//!
//! - Identity store (accounts, Argon2id password hashes)
//! - Action code store (`DELETE ... RETURNING` consumption)
//!
//! Both share the schema in `migrations/`; run [`migrate`] once at startup.

pub mod codes;
pub mod identity;

pub use codes::PostgresActionCodeStore;
pub use identity::PostgresIdentityStore;

use crate::error::{AccountError, Result};
use sqlx::PgPool;

/// Run database migrations.
///
/// # Errors
///
/// Returns `AccountError::Storage` if migrations fail.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AccountError::Storage(format!("Migration failed: {e}")))
}

/// Map a query failure to a storage error.
pub(crate) fn storage_error(context: &str, e: &sqlx::Error) -> AccountError {
    AccountError::Storage(format!("{context}: {e}"))
}
