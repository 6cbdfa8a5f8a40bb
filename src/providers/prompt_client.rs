use super::transport::{send_with_timeout, HttpTransport, OutboundRequest};
use crate::{
    codec::EncodedImage,
    config::AnthropicConfig,
    error::{Result, RoomFlipError},
    models::{
        ContentBlock, ImageSource, Message, MessagesRequest, MessagesResponse, PromptRequest,
        SynthesizedPrompt,
    },
    prompts,
};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Turns a room image, a reference image and a strategy into an editing
/// prompt by asking a vision-capable chat model.
#[derive(Clone)]
pub struct PromptSynthesisClient {
    transport: Arc<dyn HttpTransport>,
    config: AnthropicConfig,
    timeout: Duration,
    api_key: Arc<OnceCell<String>>,
}

impl PromptSynthesisClient {
    pub fn new(transport: Arc<dyn HttpTransport>, config: AnthropicConfig, timeout: Duration) -> Self {
        Self {
            transport,
            config,
            timeout,
            api_key: Arc::new(OnceCell::new()),
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .get_or_try_init(|| {
                self.config
                    .api_key
                    .clone()
                    .filter(|key| !key.trim().is_empty())
                    .ok_or_else(|| RoomFlipError::ConfigError("ANTHROPIC_API_KEY is not set".into()))
            })
            .map(String::as_str)
    }

    pub async fn synthesize(&self, request: &PromptRequest) -> Result<SynthesizedPrompt> {
        let instruction = prompts::build_instruction(
            request.strategy,
            Some(&request.room_image),
            Some(&request.reference_image),
            &request.aux_params,
        )?;
        let api_key = self.api_key()?.to_string();

        let payload = MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            messages: vec![Message {
                role: "user".to_string(),
                content: vec![
                    image_block(&request.room_image)?,
                    image_block(&request.reference_image)?,
                    ContentBlock::Text { text: instruction },
                ],
            }],
        };
        let body = serde_json::to_value(&payload)
            .map_err(|e| RoomFlipError::SerializationError(e.to_string()))?;

        log::info!(
            "Synthesizing prompt with model {} (strategy {})",
            self.config.model,
            request.strategy
        );

        let outbound = OutboundRequest::new(self.config.messages_url(), body)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION);
        let raw = send_with_timeout(self.transport.as_ref(), outbound, self.timeout).await?;

        let response: MessagesResponse = serde_json::from_value(raw).map_err(|e| {
            RoomFlipError::UpstreamUnavailable(format!("unexpected messages response: {}", e))
        })?;
        let text = response.first_text().ok_or_else(|| {
            RoomFlipError::EmptyResponse(format!(
                "model returned no text segment (stop reason: {})",
                response.stop_reason.as_deref().unwrap_or("unknown")
            ))
        })?;

        log::debug!("Synthesized prompt: {}", text);
        SynthesizedPrompt::new(text)
    }
}

fn image_block(image: &EncodedImage) -> Result<ContentBlock> {
    let canonical = image.reencode()?;
    Ok(ContentBlock::Image {
        source: ImageSource {
            source_type: "base64".to_string(),
            media_type: canonical.mime_type().to_string(),
            data: canonical.base64_payload().to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuxParams;
    use crate::providers::transport::mock::MockTransport;
    use serde_json::json;

    const JPEG: &str = "data:image/jpeg;base64,/9j/4AAQSkZJRg";
    const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

    fn client(transport: Arc<MockTransport>, key: Option<&str>) -> PromptSynthesisClient {
        let mut config = AnthropicConfig::new();
        config.api_key = key.map(String::from);
        PromptSynthesisClient::new(transport, config, Duration::from_secs(5))
    }

    fn request(slug: &str) -> PromptRequest {
        PromptRequest::from_data_uris(Some(JPEG), Some(PNG), slug.parse().unwrap(), AuxParams::default())
            .unwrap()
    }

    #[tokio::test]
    async fn test_synthesize_sends_two_images_and_one_text_block() {
        let transport = Arc::new(MockTransport::new().with_response(json!({
            "content": [{"type": "text", "text": "Replace the marked wall with marble."}],
            "stop_reason": "end_turn"
        })));
        let prompt = client(transport.clone(), Some("sk-test"))
            .synthesize(&request("single-image-overlay"))
            .await
            .unwrap();
        assert_eq!(prompt.as_str(), "Replace the marked wall with marble.");

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, "https://api.anthropic.com/v1/messages");
        assert!(sent[0]
            .headers
            .contains(&("x-api-key".to_string(), "sk-test".to_string())));

        let content = sent[0].body["messages"][0]["content"].as_array().unwrap();
        assert_eq!(content.len(), 3);
        assert_eq!(content[0]["type"], "image");
        assert_eq!(content[0]["source"]["media_type"], "image/jpeg");
        // Re-encoded with canonical padding.
        assert_eq!(content[0]["source"]["data"], "/9j/4AAQSkZJRg==");
        assert_eq!(content[1]["source"]["media_type"], "image/png");
        assert_eq!(content[2]["type"], "text");
        assert!(content[2]["text"]
            .as_str()
            .unwrap()
            .ends_with(prompts::BOUNDARY_CLAUSE));
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_network() {
        let transport = Arc::new(MockTransport::new());
        let err = client(transport.clone(), None)
            .synthesize(&request("dual-image-whole-room"))
            .await
            .unwrap_err();
        assert!(matches!(err, RoomFlipError::ConfigError(_)));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_parameters_fail_before_network() {
        let transport = Arc::new(MockTransport::new());
        let err = client(transport.clone(), Some("sk-test"))
            .synthesize(&request("dual-image-overlay-tiled"))
            .await
            .unwrap_err();
        assert!(matches!(err, RoomFlipError::InvalidParameter(_)));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_no_text_segment_is_empty_response() {
        let transport = Arc::new(MockTransport::new().with_response(json!({
            "content": [{"type": "tool_use", "id": "x"}],
            "stop_reason": "max_tokens"
        })));
        let err = client(transport, Some("sk-test"))
            .synthesize(&request("dual-image-point-markers"))
            .await
            .unwrap_err();
        assert!(matches!(err, RoomFlipError::EmptyResponse(_)));
    }

    #[tokio::test]
    async fn test_transport_failure_is_upstream_unavailable() {
        let transport = Arc::new(
            MockTransport::new().with_error(RoomFlipError::UpstreamUnavailable("invalid x-api-key".into())),
        );
        let err = client(transport.clone(), Some("sk-test"))
            .synthesize(&request("dual-image-point-markers"))
            .await
            .unwrap_err();
        assert!(matches!(err, RoomFlipError::UpstreamUnavailable(_)));
        assert_eq!(transport.call_count(), 1);
    }
}
