//! JSON-over-HTTP surface for the prompt and image pipeline.

pub mod error;
pub mod handlers;

use crate::{config::Config, providers::RoomFlipClient};
use actix_web::{http::StatusCode, middleware, web, App, HttpServer};
use error::ApiError;

pub struct AppState {
    pub client: RoomFlipClient,
}

/// Registers the routes and a JSON extractor sized for embedded images.
pub fn configure(cfg: &mut web::ServiceConfig, body_limit: usize) {
    let json_config = web::JsonConfig::default()
        .limit(body_limit)
        .error_handler(|err, _req| {
            ApiError::new(StatusCode::BAD_REQUEST, "Invalid request body", err.to_string()).into()
        });

    cfg.app_data(json_config)
        .route("/", web::get().to(handlers::health))
        .service(
            web::scope("/api")
                .route("/generate_claude_prompt", web::post().to(handlers::generate_claude_prompt))
                .route("/generate_imagen_image", web::post().to(handlers::generate_imagen_image))
                .route("/transform", web::post().to(handlers::transform)),
        );
}

pub async fn run(config: Config) -> std::io::Result<()> {
    let state = web::Data::new(AppState {
        client: RoomFlipClient::new(&config),
    });
    let body_limit = config.body_limit_bytes();

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::new("%r -> %s in %Dms"))
            .app_data(state.clone())
            .configure(|cfg| configure(cfg, body_limit))
    })
    .bind((config.host.as_str(), config.port_or_default()))?
    .run()
    .await
}
