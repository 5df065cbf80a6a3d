/// Authentication Routes
///
/// Handles account registration, login, access-token refresh and
/// refresh-token revocation. Bodies are decoded and validated here; the
/// session flows only ever see typed values.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::configuration::JwtSettings;
use crate::error::AppError;
use crate::routes::users::UserResponse;
use crate::store::AuthStore;
use crate::validators::{is_valid_email, is_valid_password};

/// Registration / login request
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Login response with access and refresh tokens
#[derive(Serialize)]
pub struct AuthResponse {
    pub user_id: String,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Refresh response with a new access token only
#[derive(Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// POST /api/users
///
/// Register a new account with email and password.
///
/// # Errors
/// - 400: invalid email, or an empty or over-long password
/// - 409: email already registered
/// - 500: password hashing failed
pub async fn register(
    form: web::Json<CredentialsRequest>,
    store: web::Data<dyn AuthStore>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;
    is_valid_password(&form.password)?;

    let credential = auth::register(store.get_ref(), &email, &form.password).await?;

    Ok(HttpResponse::Created().json(UserResponse::from(&credential)))
}

/// POST /api/login
///
/// Authenticate with email and password.
///
/// # Errors
/// - 401: unknown email or wrong password (same response for both)
/// - 500: internal server error
pub async fn login(
    form: web::Json<CredentialsRequest>,
    store: web::Data<dyn AuthStore>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let tokens = auth::login(
        store.get_ref(),
        jwt_config.get_ref(),
        form.email.trim(),
        &form.password,
    )
    .await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        user_id: tokens.user_id.to_string(),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: jwt_config.access_token_expiry,
    }))
}

/// POST /api/refresh
///
/// Exchange the refresh token in `Authorization: Bearer` for a new access
/// token. The refresh token itself is not rotated.
///
/// # Errors
/// - 401: missing, unknown, expired or revoked refresh token
pub async fn refresh(
    req: HttpRequest,
    store: web::Data<dyn AuthStore>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let access_token = auth::refresh(store.get_ref(), jwt_config.get_ref(), req.headers()).await?;

    Ok(HttpResponse::Ok().json(AccessTokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: jwt_config.access_token_expiry,
    }))
}

/// POST /api/revoke
///
/// Revoke the refresh token in `Authorization: Bearer`.
///
/// # Errors
/// - 401: missing header or a token the server never issued
pub async fn revoke(
    req: HttpRequest,
    store: web::Data<dyn AuthStore>,
) -> Result<HttpResponse, AppError> {
    auth::revoke(store.get_ref(), req.headers()).await?;

    Ok(HttpResponse::NoContent().finish())
}
