use actix_web::{web, HttpResponse};

use crate::configuration::ApplicationSettings;
use crate::error::AppError;
use crate::store::AuthStore;

/// POST /admin/reset
///
/// Deletes every account and refresh token. Only available on the `dev`
/// platform.
pub async fn reset(
    store: web::Data<dyn AuthStore>,
    app_config: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, AppError> {
    if !app_config.is_dev() {
        tracing::warn!(platform = %app_config.platform, "Reset attempted outside dev");
        return Ok(HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Reset is only allowed on the dev platform",
            "code": "FORBIDDEN"
        })));
    }

    store.reset().await?;
    tracing::info!("All accounts and refresh tokens deleted");

    Ok(HttpResponse::Ok().body("Accounts and refresh tokens have been reset"))
}
