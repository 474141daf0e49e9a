use actix_web::{middleware, web, App, HttpServer};
use deck_core::ImageUrlBuilder;
use deck_generate::{GeminiClient, GenerationConfig};
use deck_server::config::ServerConfig;
use deck_server::{configure, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to load .env: {e}");
        }
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
    let generation = GenerationConfig::from_env();
    if !generation.has_api_key() {
        log::warn!("GEMINI_API_KEY is not set; /api/generate-deck will fail");
    }

    let state = web::Data::new(AppState {
        client: GeminiClient::new(generation),
        images: ImageUrlBuilder::new().with_seed_policy(config.seed_policy),
    });

    log::info!("Starting server at http://{}", config.bind);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(&config.bind)?
    .run()
    .await
}
