/// Persistent store boundary
///
/// The authentication core only talks to storage through these traits.
/// Each method is a single logical operation; callers never span a
/// transaction across more than one of them.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DatabaseError;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// A user identity paired with its salted password hash
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Credential {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A persisted refresh token
///
/// `token_hash` is the SHA-256 digest of the opaque value handed to the
/// client and is the record's key.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub token_hash: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Expired once `now` is strictly past `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_credential_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Credential>, DatabaseError>;

    async fn find_credential_by_id(&self, id: Uuid) -> Result<Option<Credential>, DatabaseError>;

    /// Fails with `UniqueConstraintViolation` when the email is taken
    async fn create_credential(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<Credential, DatabaseError>;

    /// Fails with `NotFound` for an unknown id
    async fn update_credential(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<Credential, DatabaseError>;
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Fails with `UniqueConstraintViolation` when the key already exists;
    /// an existing record is never overwritten.
    async fn create_refresh_token(
        &self,
        token_hash: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError>;

    async fn find_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, DatabaseError>;

    /// Sets `revoked_at` unless already set; fails with `NotFound` for an
    /// unknown key.
    async fn set_refresh_token_revoked(
        &self,
        token_hash: &str,
        when: DateTime<Utc>,
    ) -> Result<(), DatabaseError>;
}

/// Everything the session layer needs from storage, plus bulk reset
#[async_trait]
pub trait AuthStore: CredentialStore + RefreshTokenStore {
    /// Delete every credential and refresh record
    async fn reset(&self) -> Result<(), DatabaseError>;
}
