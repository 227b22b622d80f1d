//! # imager-api
//!
//! The read-only HTTP layer for Imager.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod resources;

use actix_web::web;

pub use error::ApiError;
pub use handlers::AppState;

/// Configures the routes for the gallery.
///
/// Mounted under an empty scope so the binary can nest it elsewhere.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("")
            .route("/", web::get().to(handlers::index))
            .route("/photos/", web::get().to(handlers::photo_gallery))
            // Registered before /photos/{id}/ so "tagged" is never read as an id
            .route("/photos/tagged/{tag}/", web::get().to(handlers::tagged_photos))
            .route("/photos/{id}/", web::get().to(handlers::photo_detail))
            .route("/albums/", web::get().to(handlers::album_gallery))
            .route("/albums/{id}/", web::get().to(handlers::album_detail))
            .route("/profile/{username}/", web::get().to(handlers::profile_detail))
            .route("/library/", web::get().to(handlers::library))
            .route("/api/photos/", web::get().to(handlers::api_photos))
            .route("/api/albums/", web::get().to(handlers::api_albums)),
    );
}
