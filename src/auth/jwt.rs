/// Access Token Issuance and Verification
///
/// Access tokens are HS256-signed JWTs. Verification is purely
/// computational: signature, issuer and expiry are re-checked from the
/// token itself with no store lookup.

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::error::{AppError, AuthError};

/// Issue a signed access token for `user_id`, valid for `ttl` from now
///
/// # Errors
/// Returns an internal error if the claims cannot be serialized or signed
pub fn issue_access_token(
    user_id: Uuid,
    secret: &[u8],
    issuer: &str,
    ttl: Duration,
) -> Result<String, AppError> {
    let claims = Claims::new(user_id, issuer, ttl);

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Verify an access token and return its subject
///
/// No leeway is applied: a token is expired as soon as the current second
/// is past its `exp`.
///
/// # Errors
/// - `BadSignature` if the MAC, algorithm or issuer does not match
/// - `Expired` if the token is past its expiry
/// - `Malformed` if the token cannot be decoded
pub fn verify_access_token(token: &str, secret: &[u8], issuer: &str) -> Result<Uuid, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_issuer(&[issuer]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
        .map_err(|e| {
            let kind = classify(e.kind());
            tracing::debug!(error = %e, reason = %kind, "Access token rejected");
            kind
        })?;

    data.claims.user_id()
}

fn classify(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm | ErrorKind::InvalidIssuer => {
            AuthError::BadSignature
        }
        ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::Malformed,
    }
}
