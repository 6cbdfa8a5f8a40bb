use super::{
    adapters::{GeminiAdapter, ImageProviderAdapter, ImagenAdapter},
    transport::{send_with_timeout, HttpTransport, OutboundRequest},
};
use crate::{
    codec::EncodedImage,
    config::{GoogleConfig, ImageProvider},
    error::{Result, RoomFlipError},
    models::{SynthesizedPrompt, TransformResult},
};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Duration;

/// Renders a prompt (plus source images where the provider takes them) into
/// one transformed image.
#[derive(Clone)]
pub struct ImageSynthesisClient {
    transport: Arc<dyn HttpTransport>,
    adapter: Arc<dyn ImageProviderAdapter>,
    config: GoogleConfig,
    timeout: Duration,
    api_key: Arc<OnceCell<String>>,
}

impl ImageSynthesisClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        adapter: Arc<dyn ImageProviderAdapter>,
        config: GoogleConfig,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            adapter,
            config,
            timeout,
            api_key: Arc::new(OnceCell::new()),
        }
    }

    /// Picks the adapter for `provider` using the models named in `config`.
    pub fn for_provider(
        transport: Arc<dyn HttpTransport>,
        provider: ImageProvider,
        config: GoogleConfig,
        timeout: Duration,
    ) -> Self {
        let adapter: Arc<dyn ImageProviderAdapter> = match provider {
            ImageProvider::Imagen => Arc::new(ImagenAdapter::new(config.imagen_model.clone())),
            ImageProvider::Gemini => Arc::new(GeminiAdapter::new(config.gemini_model.clone())),
        };
        Self::new(transport, adapter, config, timeout)
    }

    pub fn model(&self) -> &str {
        self.adapter.model_id()
    }

    pub fn accepts_images(&self) -> bool {
        self.adapter.accepts_images()
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .get_or_try_init(|| {
                self.config
                    .api_key
                    .clone()
                    .filter(|key| !key.trim().is_empty())
                    .ok_or_else(|| RoomFlipError::ConfigError("GOOGLE_API_KEY is not set".into()))
            })
            .map(String::as_str)
    }

    pub async fn generate(
        &self,
        prompt: &SynthesizedPrompt,
        images: &[EncodedImage],
    ) -> Result<TransformResult> {
        let api_key = self.api_key()?.to_string();
        let body = self
            .adapter
            .build_payload(prompt.as_str(), images, &self.config)?;

        log::info!(
            "Generating image with model {} ({} source image(s))",
            self.adapter.model_id(),
            if self.adapter.accepts_images() { images.len() } else { 0 }
        );

        let outbound = OutboundRequest::new(self.adapter.endpoint(&self.config), body)
            .header("x-goog-api-key", api_key);
        let raw = send_with_timeout(self.transport.as_ref(), outbound, self.timeout).await?;

        self.adapter.normalize(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::transport::mock::MockTransport;
    use serde_json::json;

    fn client(transport: Arc<MockTransport>, provider: ImageProvider, key: Option<&str>) -> ImageSynthesisClient {
        let mut config = GoogleConfig::new();
        config.api_key = key.map(String::from);
        ImageSynthesisClient::for_provider(transport, provider, config, Duration::from_secs(5))
    }

    fn room() -> EncodedImage {
        EncodedImage::decode("data:image/jpeg;base64,/9j/4AAQSkZJRg==").unwrap()
    }

    #[tokio::test]
    async fn test_imagen_generate_normalizes_prediction() {
        let transport = Arc::new(MockTransport::new().with_response(json!({
            "predictions": [{"bytesBase64Encoded": "iVBORw0KGgo=", "mimeType": "image/png"}]
        })));
        let prompt = SynthesizedPrompt::new("Replace the floor tiles.").unwrap();
        let result = client(transport.clone(), ImageProvider::Imagen, Some("g-key"))
            .generate(&prompt, &[room()])
            .await
            .unwrap();

        assert_eq!(result.image_data_uri.as_deref(), Some("data:image/png;base64,iVBORw0KGgo="));
        assert_eq!(result.model_id, "imagen-4.0-generate-001");

        let sent = transport.requests();
        assert!(sent[0].url.ends_with("models/imagen-4.0-generate-001:predict"));
        assert!(sent[0]
            .headers
            .contains(&("x-goog-api-key".to_string(), "g-key".to_string())));
        assert_eq!(sent[0].body["instances"][0]["prompt"], "Replace the floor tiles.");
    }

    #[tokio::test]
    async fn test_gemini_zero_candidates() {
        let transport = Arc::new(MockTransport::new().with_response(json!({"candidates": []})));
        let prompt = SynthesizedPrompt::new("Replace the floor tiles.").unwrap();
        let err = client(transport, ImageProvider::Gemini, Some("g-key"))
            .generate(&prompt, &[room(), room()])
            .await
            .unwrap_err();
        assert!(matches!(err, RoomFlipError::NoCandidatesReturned(_)));
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let transport = Arc::new(MockTransport::new());
        let prompt = SynthesizedPrompt::new("x").unwrap();
        let err = client(transport.clone(), ImageProvider::Gemini, Some("  "))
            .generate(&prompt, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, RoomFlipError::ConfigError(_)));
        assert_eq!(transport.call_count(), 0);
    }
}
