/// Refresh Token Management
///
/// Refresh tokens are:
/// - Cryptographically secure random 64-character alphanumeric strings
/// - Hashed with SHA-256 before storage (never store plaintext)
/// - Read-only on refresh: the same token stays usable until it expires or
///   is revoked
/// - Revoked at most once; a revoked record never becomes active again

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{AppError, AuthError, DatabaseError};
use crate::store::RefreshTokenStore;

const REFRESH_TOKEN_LENGTH: usize = 64;

/// Generate a new cryptographically secure refresh token
///
/// The token is returned in plaintext (this is what the client stores).
/// The server stores only the SHA-256 hash.
pub fn generate_refresh_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Hash a refresh token using SHA-256
pub(crate) fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Mint and persist a refresh token for `user_id`, valid for `ttl`
///
/// # Errors
/// A key collision is a fatal generation error; the existing record is
/// left untouched. Other store failures propagate as database errors.
pub async fn issue_refresh_token<S>(
    store: &S,
    user_id: Uuid,
    ttl: Duration,
) -> Result<String, AppError>
where
    S: RefreshTokenStore + ?Sized,
{
    let token = generate_refresh_token();
    let expires_at = Utc::now() + ttl;

    match store
        .create_refresh_token(&hash_token(&token), user_id, expires_at)
        .await
    {
        Ok(()) => Ok(token),
        Err(DatabaseError::UniqueConstraintViolation(_)) => {
            tracing::error!(user_id = %user_id, "Refresh token collision");
            Err(AppError::Internal(
                "Refresh token generation collided with an existing token".to_string(),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

/// Validate a refresh token
///
/// Checks, in order:
/// 1. Token exists in the store
/// 2. Token has not been revoked
/// 3. Token has not expired
///
/// The record is not modified.
///
/// # Returns
/// User ID associated with the token if valid
pub async fn validate_refresh_token<S>(store: &S, token: &str) -> Result<Uuid, AppError>
where
    S: RefreshTokenStore + ?Sized,
{
    validate_refresh_token_at(store, token, Utc::now()).await
}

pub(crate) async fn validate_refresh_token_at<S>(
    store: &S,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Uuid, AppError>
where
    S: RefreshTokenStore + ?Sized,
{
    let record = store
        .find_refresh_token(&hash_token(token))
        .await?
        .ok_or_else(|| {
            tracing::debug!("Refresh token not found");
            AuthError::NotFound
        })?;

    if record.is_revoked() {
        tracing::warn!(user_id = %record.user_id, "Attempt to use revoked refresh token");
        return Err(AuthError::Revoked.into());
    }

    if record.is_expired_at(now) {
        tracing::info!(user_id = %record.user_id, "Refresh token expired");
        return Err(AuthError::Expired.into());
    }

    Ok(record.user_id)
}

/// Revoke a single refresh token
///
/// Revoking an already-revoked token keeps its original revocation time.
///
/// # Errors
/// `NotFound` if no record matches the token
pub async fn revoke_refresh_token<S>(store: &S, token: &str) -> Result<(), AppError>
where
    S: RefreshTokenStore + ?Sized,
{
    match store
        .set_refresh_token_revoked(&hash_token(token), Utc::now())
        .await
    {
        Ok(()) => Ok(()),
        Err(DatabaseError::NotFound(_)) => Err(AuthError::NotFound.into()),
        Err(e) => Err(e.into()),
    }
}
