use actix_web::middleware::DefaultHeaders;
use actix_web::web;

use crate::web::handlers;

fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Methods", "GET, POST, OPTIONS"))
        .add(("Access-Control-Allow-Headers", "Content-Type"))
}

// Both handlers accept any method; the webhook sorts methods out itself.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::resource("/webhook")
                    .to(handlers::webhook)
                    .wrap(cors_headers()),
            )
            .service(
                web::resource("/webhook/health")
                    .to(handlers::webhook)
                    .wrap(cors_headers()),
            )
            .route("/health", web::route().to(handlers::liveness)),
    )
    .route("/health", web::route().to(handlers::liveness));
}
