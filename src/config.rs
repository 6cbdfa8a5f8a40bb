use crate::error::{Result, RoomFlipError};
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_GOOGLE_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_IMAGEN_MODEL: &str = "imagen-4.0-generate-001";
pub const DEFAULT_GEMINI_IMAGE_MODEL: &str = "gemini-2.5-flash-image-preview";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageProvider {
    /// Text-to-image `:predict`; never sees the source images.
    Imagen,
    /// Multi-part `:generateContent` with inline source images.
    Gemini,
}

impl FromStr for ImageProvider {
    type Err = RoomFlipError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "imagen" => Ok(ImageProvider::Imagen),
            "gemini" | "nano-banana" => Ok(ImageProvider::Gemini),
            other => Err(RoomFlipError::ConfigError(format!(
                "unknown IMAGE_PROVIDER '{}', expected 'imagen' or 'gemini'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub api_key: Option<String>,
    pub imagen_model: String,
    pub gemini_model: String,
    pub base_url: String,
    pub aspect_ratio: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: Option<u16>,
    pub body_limit_mb: usize,
    pub request_timeout_secs: u64,
    pub image_provider: ImageProvider,
    pub anthropic: AnthropicConfig,
    pub google: GoogleConfig,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        AnthropicConfig {
            api_key: None,
            model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            max_tokens: 1024,
            base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
        }
    }
}

impl AnthropicConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        AnthropicConfig {
            api_key: non_empty_env("ANTHROPIC_API_KEY"),
            model: non_empty_env("ANTHROPIC_MODEL").unwrap_or(defaults.model),
            max_tokens: parsed_env("ANTHROPIC_MAX_TOKENS").unwrap_or(defaults.max_tokens),
            base_url: non_empty_env("ANTHROPIC_BASE_URL").unwrap_or(defaults.base_url),
        }
    }

    pub fn with_credentials(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>, max_tokens: u32) -> Self {
        self.model = model.into();
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        GoogleConfig {
            api_key: None,
            imagen_model: DEFAULT_IMAGEN_MODEL.to_string(),
            gemini_model: DEFAULT_GEMINI_IMAGE_MODEL.to_string(),
            base_url: DEFAULT_GOOGLE_BASE_URL.to_string(),
            aspect_ratio: "1:1".to_string(),
        }
    }
}

impl GoogleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        GoogleConfig {
            api_key: non_empty_env("GOOGLE_API_KEY").or_else(|| non_empty_env("GEMINI_API_KEY")),
            imagen_model: non_empty_env("IMAGEN_MODEL").unwrap_or(defaults.imagen_model),
            gemini_model: non_empty_env("GEMINI_IMAGE_MODEL").unwrap_or(defaults.gemini_model),
            base_url: non_empty_env("GOOGLE_BASE_URL").unwrap_or(defaults.base_url),
            aspect_ratio: non_empty_env("IMAGEN_ASPECT_RATIO").unwrap_or(defaults.aspect_ratio),
        }
    }

    pub fn with_credentials(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: impl Into<String>) -> Self {
        self.aspect_ratio = aspect_ratio.into();
        self
    }

    /// `{base}/models/{model}:{method}`
    pub fn model_url(&self, model: &str, method: &str) -> String {
        let model = model.trim();
        let path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };
        format!("{}/{}:{}", self.base_url.trim_end_matches('/'), path, method)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "0.0.0.0".to_string(),
            port: None,
            body_limit_mb: 50,
            request_timeout_secs: 120,
            image_provider: ImageProvider::Imagen,
            anthropic: AnthropicConfig::default(),
            google: GoogleConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let image_provider = match non_empty_env("IMAGE_PROVIDER") {
            Some(value) => value.parse()?,
            None => defaults.image_provider,
        };

        Ok(Config {
            host: non_empty_env("HOST").unwrap_or(defaults.host),
            port: parsed_env("PORT"),
            body_limit_mb: parsed_env("BODY_LIMIT_MB").unwrap_or(defaults.body_limit_mb),
            request_timeout_secs: parsed_env("REQUEST_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout_secs),
            image_provider,
            anthropic: AnthropicConfig::from_env(),
            google: GoogleConfig::from_env(),
        })
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    pub fn with_image_provider(mut self, provider: ImageProvider) -> Self {
        self.image_provider = provider;
        self
    }

    pub fn with_anthropic(mut self, config: AnthropicConfig) -> Self {
        self.anthropic = config;
        self
    }

    pub fn with_google(mut self, config: GoogleConfig) -> Self {
        self.google = config;
        self
    }

    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(3000)
    }

    pub fn body_limit_bytes(&self) -> usize {
        self.body_limit_mb * 1024 * 1024
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parsed_env<T: FromStr>(key: &str) -> Option<T> {
    non_empty_env(key).and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let config = Config::new()
            .with_port(8080)
            .with_timeout(5)
            .with_image_provider(ImageProvider::Gemini)
            .with_anthropic(AnthropicConfig::new().with_credentials("sk-test"));

        assert_eq!(config.port_or_default(), 8080);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.image_provider, ImageProvider::Gemini);
        assert_eq!(config.anthropic.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.body_limit_bytes(), 50 * 1024 * 1024);
    }

    #[test]
    fn test_provider_urls() {
        let anthropic = AnthropicConfig::new().with_base_url("http://localhost:9000/");
        assert_eq!(anthropic.messages_url(), "http://localhost:9000/v1/messages");

        let google = GoogleConfig::new();
        assert_eq!(
            google.model_url("imagen-4.0-generate-001", "predict"),
            "https://generativelanguage.googleapis.com/v1beta/models/imagen-4.0-generate-001:predict"
        );
        assert_eq!(
            google.model_url("models/gemini-2.5-flash-image-preview", "generateContent"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-image-preview:generateContent"
        );
    }

    #[test]
    fn test_image_provider_parse() {
        assert_eq!("Imagen".parse::<ImageProvider>().unwrap(), ImageProvider::Imagen);
        assert_eq!("nano-banana".parse::<ImageProvider>().unwrap(), ImageProvider::Gemini);
        assert!(matches!(
            "dall-e".parse::<ImageProvider>(),
            Err(RoomFlipError::ConfigError(_))
        ));
    }
}
