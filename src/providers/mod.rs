pub mod adapters;
pub mod image_client;
pub mod prompt_client;
pub mod transport;

use crate::{
    config::Config,
    error::RoomFlipError,
    models::{PromptRequest, SynthesizedPrompt, TransformResult},
};
use std::sync::Arc;

pub use adapters::{GeminiAdapter, ImageProviderAdapter, ImagenAdapter};
pub use image_client::ImageSynthesisClient;
pub use prompt_client::PromptSynthesisClient;
pub use transport::{HttpTransport, OutboundRequest, ReqwestTransport};

#[derive(Debug, Clone)]
pub struct TransformOutcome {
    pub prompt: SynthesizedPrompt,
    pub result: TransformResult,
}

/// Pipeline stage a transform failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Prompt,
    Image,
}

#[derive(Debug, thiserror::Error)]
#[error("{stage:?} stage failed: {error}")]
pub struct TransformError {
    pub stage: Stage,
    #[source]
    pub error: RoomFlipError,
}

impl TransformError {
    fn at(stage: Stage) -> impl FnOnce(RoomFlipError) -> Self {
        move |error| Self { stage, error }
    }
}

#[derive(Clone)]
pub struct RoomFlipClient {
    prompt_client: PromptSynthesisClient,
    image_client: ImageSynthesisClient,
}

impl RoomFlipClient {
    /// Builds both clients over a shared `reqwest` transport. Credentials are
    /// checked on first use, not here.
    pub fn new(config: &Config) -> Self {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(config: &Config, transport: Arc<dyn HttpTransport>) -> Self {
        let timeout = config.request_timeout();
        Self {
            prompt_client: PromptSynthesisClient::new(
                transport.clone(),
                config.anthropic.clone(),
                timeout,
            ),
            image_client: ImageSynthesisClient::for_provider(
                transport,
                config.image_provider,
                config.google.clone(),
                timeout,
            ),
        }
    }

    pub fn prompt(&self) -> &PromptSynthesisClient {
        &self.prompt_client
    }

    pub fn image(&self) -> &ImageSynthesisClient {
        &self.image_client
    }

    /// Synthesizes a prompt, then renders it. The second call depends on the
    /// first, so they run strictly in sequence.
    pub async fn transform(
        &self,
        request: &PromptRequest,
    ) -> std::result::Result<TransformOutcome, TransformError> {
        let prompt = self
            .prompt_client
            .synthesize(request)
            .await
            .map_err(TransformError::at(Stage::Prompt))?;
        let images = request.consumer_images();
        let result = self
            .image_client
            .generate(&prompt, &images)
            .await
            .map_err(TransformError::at(Stage::Image))?;
        Ok(TransformOutcome { prompt, result })
    }
}
