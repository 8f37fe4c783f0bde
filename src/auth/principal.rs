//! Principal lookup.
//!
//! Principals are provisioned elsewhere; this service only reads them.

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use async_trait::async_trait;
use sqlx::Row;
use tracing::warn;

use super::error::AuthError;
use crate::db::LazyPool;

pub type PrincipalId = i64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: PrincipalId,
    pub email: String,
    pub password_hash: String,
}

/// Read-only access to the principal store
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// Find a principal by login email
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, AuthError>;

    /// Does `id` still name an existing principal?
    async fn exists(&self, id: PrincipalId) -> Result<bool, AuthError>;
}

/// Check `password` against an argon2 PHC string.
///
/// An unparsable hash never verifies.
pub fn verify_password(password_hash: &str, password: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Stored password hash is not a valid PHC string: {}", e);
            false
        }
    }
}

/// Resolve login credentials to a principal
pub async fn authenticate(
    store: &dyn PrincipalStore,
    email: &str,
    password: &str,
) -> Result<Principal, AuthError> {
    let principal = store
        .find_by_email(email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(&principal.password_hash, password) {
        return Err(AuthError::InvalidCredentials);
    }
    Ok(principal)
}

/// `users` table in the analytics database
pub struct PgPrincipalStore {
    pool: Arc<LazyPool>,
}

impl PgPrincipalStore {
    pub fn new(pool: Arc<LazyPool>) -> Self {
        Self { pool }
    }
}

fn store_error(e: sqlx::Error) -> AuthError {
    AuthError::StoreUnavailable(e.to_string())
}

#[async_trait]
impl PrincipalStore for PgPrincipalStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, AuthError> {
        let pool = self.pool.get().map_err(store_error)?;
        let row = sqlx::query("SELECT id, email, password_hash FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await
            .map_err(store_error)?;

        row.map(|r| -> Result<Principal, sqlx::Error> {
            Ok(Principal {
                id: r.try_get("id")?,
                email: r.try_get("email")?,
                password_hash: r.try_get("password_hash")?,
            })
        })
        .transpose()
        .map_err(store_error)
    }

    async fn exists(&self, id: PrincipalId) -> Result<bool, AuthError> {
        let pool = self.pool.get().map_err(store_error)?;
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(store_error)
    }
}


#[cfg(test)]
pub use mock::MemoryPrincipalStore;
