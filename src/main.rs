use roomflip::{logger, Config};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init()?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ {}", e);
            return Err(e.into());
        }
    };

    if config.anthropic.api_key.is_none() {
        log::warn!("⚠️  ANTHROPIC_API_KEY is not set; prompt synthesis requests will fail");
    }
    if config.google.api_key.is_none() {
        log::warn!("⚠️  GOOGLE_API_KEY is not set; image generation requests will fail");
    }

    logger::log_startup_info(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        &config.host,
        config.port_or_default(),
    );
    logger::log_config_info(&config);

    roomflip::server::run(config).await?;
    Ok(())
}
