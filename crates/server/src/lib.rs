//! HTTP API for CanvasDeck.
//!
//! Handlers are stateless per request; workers share only the immutable
//! [`AppState`].

pub mod config;
pub mod errors;
pub mod handlers;

use actix_web::web;
use deck_core::ImageUrlBuilder;
use deck_generate::GeminiClient;

use crate::errors::ApiError;

/// Shared by all workers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub client: GeminiClient,
    /// Image URL settings applied to exports that do not pin a seed.
    pub images: ImageUrlBuilder,
}

/// Register the API routes and the JSON error handler.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(4 * 1024 * 1024)
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/api")
            .route("/generate-deck", web::post().to(handlers::generate_deck))
            .route("/export", web::post().to(handlers::export))
            .route("/themes", web::get().to(handlers::themes)),
    );
}
