/// Account routes for the authenticated user
///
/// Mounted behind `JwtMiddleware`, which supplies the subject.

use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::auth;
use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::routes::auth::CredentialsRequest;
use crate::store::{AuthStore, Credential};
use crate::validators::{is_valid_email, is_valid_password};

/// Public view of an account; never includes the password hash
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Credential> for UserResponse {
    fn from(credential: &Credential) -> Self {
        Self {
            id: credential.id.to_string(),
            email: credential.email.clone(),
            created_at: credential.created_at.to_rfc3339(),
            updated_at: credential.updated_at.to_rfc3339(),
        }
    }
}

/// GET /api/me
pub async fn get_current_user(
    user: web::ReqData<AuthenticatedUser>,
    store: web::Data<dyn AuthStore>,
) -> Result<HttpResponse, AppError> {
    let credential = auth::current_user(store.get_ref(), user.user_id).await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(&credential)))
}

/// PUT /api/users
///
/// Replace the authenticated user's email and password.
///
/// # Errors
/// - 400: invalid email, or an empty or over-long password
/// - 409: email belongs to another account
pub async fn update_current_user(
    user: web::ReqData<AuthenticatedUser>,
    form: web::Json<CredentialsRequest>,
    store: web::Data<dyn AuthStore>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;
    is_valid_password(&form.password)?;

    let credential =
        auth::update_credentials(store.get_ref(), user.user_id, &email, &form.password).await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(&credential)))
}
