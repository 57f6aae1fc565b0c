//! # at-api
//!
//! The web routing and orchestration layer for the Atelier portfolio.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod multipart;

use actix_web::web;

pub use handlers::AppState;

/// Mounts the public portfolio pages and the admin surface.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("")
            // Featured sections
            .route("/", web::get().to(handlers::home))
            // Full catalog with the ?category= filter
            .route("/portfolio", web::get().to(handlers::portfolio))
            // Admin form and table, ?edit={id} loads a record into the form
            .route("/admin", web::get().to(handlers::admin))
            .route("/admin/items", web::post().to(handlers::submit_item))
            .route("/admin/items/{id}/delete", web::get().to(handlers::confirm_delete))
            .route("/admin/items/{id}/delete", web::post().to(handlers::delete_item)),
    );
}
