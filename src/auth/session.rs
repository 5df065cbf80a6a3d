/// Session flows
///
/// Login, request authentication, refresh and revoke, composed from the
/// password, access-token, refresh-token and bearer modules. Every flow
/// touches the store at most once per logical step and holds no state of
/// its own between calls.

use actix_web::http::header::HeaderMap;
use actix_web::web;
use uuid::Uuid;

use crate::auth::bearer::extract_bearer;
use crate::auth::jwt::{issue_access_token, verify_access_token};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::refresh_token::{issue_refresh_token, revoke_refresh_token, validate_refresh_token};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, DatabaseError};
use crate::store::{Credential, CredentialStore, RefreshTokenStore};

/// Runs bcrypt on the blocking thread pool.
async fn hash_off_worker(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = web::block(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("password hashing task failed: {}", e)))??;
    Ok(hashed)
}

async fn verify_off_worker(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let matches = web::block(move || verify_password(&password, &password_hash))
        .await
        .map_err(|e| AppError::Internal(format!("password verification task failed: {}", e)))??;
    Ok(matches)
}

/// Tokens handed out by a successful login
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub user_id: Uuid,
    pub access_token: String,
    pub refresh_token: String,
}

/// Authenticate with email and password and open a session
///
/// # Errors
/// `InvalidCredentials` for an unknown email or a wrong password alike
pub async fn login<S>(
    store: &S,
    config: &JwtSettings,
    email: &str,
    password: &str,
) -> Result<SessionTokens, AppError>
where
    S: CredentialStore + RefreshTokenStore + ?Sized,
{
    let credential = match store.find_credential_by_email(email).await? {
        Some(credential) => credential,
        None => {
            tracing::debug!("Login for unknown email");
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    if !verify_off_worker(password, &credential.password_hash).await? {
        tracing::debug!(user_id = %credential.id, "Login with wrong password");
        return Err(AuthError::InvalidCredentials.into());
    }

    let access_token = issue_access_token(
        credential.id,
        config.secret_bytes(),
        &config.issuer,
        config.access_token_ttl(),
    )?;
    let refresh_token =
        issue_refresh_token(store, credential.id, config.refresh_token_ttl()).await?;

    tracing::info!(user_id = %credential.id, "Session opened");

    Ok(SessionTokens {
        user_id: credential.id,
        access_token,
        refresh_token,
    })
}

/// Resolve the subject of a protected request from its access token
///
/// Callers treat every error as "unauthorized"; the specific kind only
/// matters for logging.
pub fn authenticate_request(headers: &HeaderMap, config: &JwtSettings) -> Result<Uuid, AuthError> {
    let token = extract_bearer(headers).map_err(|e| {
        tracing::debug!(reason = %e, "No usable bearer token");
        e
    })?;

    verify_access_token(token, config.secret_bytes(), &config.issuer)
}

/// Mint a fresh access token from the bearer refresh token
///
/// The refresh record is only read, so concurrent refreshes with the same
/// token each succeed independently.
pub async fn refresh<S>(
    store: &S,
    config: &JwtSettings,
    headers: &HeaderMap,
) -> Result<String, AppError>
where
    S: RefreshTokenStore + ?Sized,
{
    let token = extract_bearer(headers)?;
    let user_id = validate_refresh_token(store, token).await?;

    let access_token = issue_access_token(
        user_id,
        config.secret_bytes(),
        &config.issuer,
        config.access_token_ttl(),
    )?;

    tracing::info!(user_id = %user_id, "Access token refreshed");
    Ok(access_token)
}

/// Revoke the bearer refresh token
///
/// Access tokens already minted from it stay valid until their own expiry.
///
/// # Errors
/// `NotFound` for a token the store has never seen
pub async fn revoke<S>(store: &S, headers: &HeaderMap) -> Result<(), AppError>
where
    S: RefreshTokenStore + ?Sized,
{
    let token = extract_bearer(headers)?;
    revoke_refresh_token(store, token).await?;

    tracing::info!("Refresh token revoked");
    Ok(())
}

/// Create a credential for a new account
///
/// Email and password are expected to be validated already.
pub async fn register<S>(store: &S, email: &str, password: &str) -> Result<Credential, AppError>
where
    S: CredentialStore + ?Sized,
{
    let password_hash = hash_off_worker(password).await?;
    let credential = store
        .create_credential(Uuid::new_v4(), email, &password_hash)
        .await?;

    tracing::info!(user_id = %credential.id, "Account created");
    Ok(credential)
}

/// Replace the email and password of an existing account
pub async fn update_credentials<S>(
    store: &S,
    user_id: Uuid,
    email: &str,
    password: &str,
) -> Result<Credential, AppError>
where
    S: CredentialStore + ?Sized,
{
    let password_hash = hash_off_worker(password).await?;
    let credential = store
        .update_credential(user_id, email, &password_hash)
        .await?;

    tracing::info!(user_id = %user_id, "Credentials updated");
    Ok(credential)
}

/// Look up the account behind an authenticated subject
pub async fn current_user<S>(store: &S, user_id: Uuid) -> Result<Credential, AppError>
where
    S: CredentialStore + ?Sized,
{
    store
        .find_credential_by_id(user_id)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("user".to_string()).into())
}
