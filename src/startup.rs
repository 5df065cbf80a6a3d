use actix_web::dev::Server;
use actix_web::{guard, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::configuration::{ApplicationSettings, JwtSettings};
use crate::logger::LoggerMiddleware;
use crate::middleware::JwtMiddleware;
use crate::routes::{
    get_current_user, health_check, login, refresh, register, reset, revoke, update_current_user,
};
use crate::store::AuthStore;

pub fn run(
    listener: TcpListener,
    store: Arc<dyn AuthStore>,
    jwt_config: JwtSettings,
    app_config: ApplicationSettings,
) -> Result<Server, std::io::Error> {
    let store = web::Data::from(store);
    let jwt_config_data = web::Data::new(jwt_config.clone());
    let app_config = web::Data::new(app_config);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(LoggerMiddleware)

            // Shared, immutable after startup
            .app_data(store.clone())
            .app_data(jwt_config_data.clone())
            .app_data(app_config.clone())

            // Public routes
            .route("/api/healthz", web::get().to(health_check))
            .route("/api/users", web::post().to(register))
            .route("/api/login", web::post().to(login))
            .route("/api/refresh", web::post().to(refresh))
            .route("/api/revoke", web::post().to(revoke))
            .route("/admin/reset", web::post().to(reset))

            // Protected routes (require a valid access token)
            .service(
                web::resource("/api/users")
                    .guard(guard::Put())
                    .wrap(JwtMiddleware::new(jwt_config.clone()))
                    .route(web::put().to(update_current_user)),
            )
            .service(
                web::resource("/api/me")
                    .wrap(JwtMiddleware::new(jwt_config.clone()))
                    .route(web::get().to(get_current_user)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
