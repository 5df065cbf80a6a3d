use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AuthStore, Credential, CredentialStore, RefreshTokenRecord, RefreshTokenStore};
use crate::error::DatabaseError;

/// In-memory store for tests and local runs
///
/// Mirrors the Postgres constraints: unique emails, unique refresh keys,
/// and a cascade from credentials to their refresh records on reset.
#[derive(Default)]
pub struct InMemoryStore {
    credentials: RwLock<HashMap<Uuid, Credential>>,
    refresh_tokens: RwLock<HashMap<String, RefreshTokenRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryStore {
    async fn find_credential_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Credential>, DatabaseError> {
        let credentials = self.credentials.read().await;
        Ok(credentials.values().find(|c| c.email == email).cloned())
    }

    async fn find_credential_by_id(&self, id: Uuid) -> Result<Option<Credential>, DatabaseError> {
        let credentials = self.credentials.read().await;
        Ok(credentials.get(&id).cloned())
    }

    async fn create_credential(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<Credential, DatabaseError> {
        let mut credentials = self.credentials.write().await;
        if credentials.contains_key(&id) || credentials.values().any(|c| c.email == email) {
            return Err(DatabaseError::UniqueConstraintViolation(
                "users_email_key".to_string(),
            ));
        }

        let now = Utc::now();
        let credential = Credential {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        credentials.insert(id, credential.clone());
        Ok(credential)
    }

    async fn update_credential(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<Credential, DatabaseError> {
        let mut credentials = self.credentials.write().await;
        if credentials.values().any(|c| c.email == email && c.id != id) {
            return Err(DatabaseError::UniqueConstraintViolation(
                "users_email_key".to_string(),
            ));
        }

        let credential = credentials
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound("user".to_string()))?;
        credential.email = email.to_string();
        credential.password_hash = password_hash.to_string();
        credential.updated_at = Utc::now();
        Ok(credential.clone())
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryStore {
    async fn create_refresh_token(
        &self,
        token_hash: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let mut tokens = self.refresh_tokens.write().await;
        if tokens.contains_key(token_hash) {
            return Err(DatabaseError::UniqueConstraintViolation(
                "refresh_tokens_pkey".to_string(),
            ));
        }

        tokens.insert(
            token_hash.to_string(),
            RefreshTokenRecord {
                token_hash: token_hash.to_string(),
                user_id,
                created_at: Utc::now(),
                expires_at,
                revoked_at: None,
            },
        );
        Ok(())
    }

    async fn find_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, DatabaseError> {
        let tokens = self.refresh_tokens.read().await;
        Ok(tokens.get(token_hash).cloned())
    }

    async fn set_refresh_token_revoked(
        &self,
        token_hash: &str,
        when: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let mut tokens = self.refresh_tokens.write().await;
        let record = tokens
            .get_mut(token_hash)
            .ok_or_else(|| DatabaseError::NotFound("refresh token".to_string()))?;
        record.revoked_at.get_or_insert(when);
        Ok(())
    }
}

#[async_trait]
impl AuthStore for InMemoryStore {
    async fn reset(&self) -> Result<(), DatabaseError> {
        // Same lock order as everywhere else: credentials, then tokens.
        let mut credentials = self.credentials.write().await;
        let mut tokens = self.refresh_tokens.write().await;
        credentials.clear();
        tokens.clear();
        Ok(())
    }
}
