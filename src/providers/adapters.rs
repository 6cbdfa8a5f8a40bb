//! Per-provider request building and response normalization.

use crate::{
    codec::EncodedImage,
    config::GoogleConfig,
    error::{Result, RoomFlipError},
    models::{
        Content, GenerateContentRequest, GenerateContentResponse, ImagenInstance,
        ImagenParameters, ImagenPredictRequest, ImagenPredictResponse, InlineData, Part,
        TransformResult,
    },
};
use serde_json::Value;

const DEFAULT_OUTPUT_MIME: &str = "image/png";

pub trait ImageProviderAdapter: Send + Sync {
    fn model_id(&self) -> &str;

    /// Whether the provider can take source images at all.
    fn accepts_images(&self) -> bool;

    fn endpoint(&self, config: &GoogleConfig) -> String;

    fn build_payload(&self, prompt: &str, images: &[EncodedImage], config: &GoogleConfig) -> Result<Value>;

    fn normalize(&self, raw: Value) -> Result<TransformResult>;
}

/// Text-to-image generation returning a list of generated images.
pub struct ImagenAdapter {
    model: String,
}

impl ImagenAdapter {
    pub fn new(model: impl Into<String>) -> Self {
        Self { model: model.into() }
    }
}

impl ImageProviderAdapter for ImagenAdapter {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn accepts_images(&self) -> bool {
        false
    }

    fn endpoint(&self, config: &GoogleConfig) -> String {
        config.model_url(&self.model, "predict")
    }

    fn build_payload(&self, prompt: &str, images: &[EncodedImage], config: &GoogleConfig) -> Result<Value> {
        if !images.is_empty() {
            log::debug!(
                "{} is text-to-image only; {} source image(s) not sent",
                self.model,
                images.len()
            );
        }
        let request = ImagenPredictRequest {
            instances: vec![ImagenInstance {
                prompt: prompt.to_string(),
            }],
            parameters: ImagenParameters {
                sample_count: 1,
                aspect_ratio: config.aspect_ratio.clone(),
            },
        };
        serde_json::to_value(request).map_err(|e| RoomFlipError::SerializationError(e.to_string()))
    }

    fn normalize(&self, raw: Value) -> Result<TransformResult> {
        let response: ImagenPredictResponse = serde_json::from_value(raw).map_err(|e| {
            RoomFlipError::UpstreamUnavailable(format!("unexpected predict response: {}", e))
        })?;
        if response.predictions.is_empty() {
            return Err(RoomFlipError::NoCandidatesReturned(format!(
                "{} returned zero generated images",
                self.model
            )));
        }

        for prediction in &response.predictions {
            if let Some(reason) = &prediction.rai_filtered_reason {
                log::warn!("{} filtered an image: {}", self.model, reason);
            }
            if let Some(data) = prediction.bytes_base64_encoded.as_deref().filter(|d| !d.is_empty()) {
                let mime = prediction.mime_type.as_deref().unwrap_or(DEFAULT_OUTPUT_MIME);
                match canonical_data_uri(mime, data) {
                    Ok(uri) => {
                        return Ok(TransformResult {
                            image_data_uri: Some(uri),
                            model_id: self.model.clone(),
                        })
                    }
                    Err(e) => log::warn!("{} returned an unusable image: {}", self.model, e),
                }
            }
        }

        Err(RoomFlipError::NoImageInResponse(format!(
            "none of the {} generated image(s) carried image bytes",
            response.predictions.len()
        )))
    }
}

/// Multi-part generation: text plus inline images in, candidates with inline
/// image data and diagnostic text out.
pub struct GeminiAdapter {
    model: String,
}

impl GeminiAdapter {
    pub fn new(model: impl Into<String>) -> Self {
        Self { model: model.into() }
    }
}

impl ImageProviderAdapter for GeminiAdapter {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn accepts_images(&self) -> bool {
        true
    }

    fn endpoint(&self, config: &GoogleConfig) -> String {
        config.model_url(&self.model, "generateContent")
    }

    fn build_payload(&self, prompt: &str, images: &[EncodedImage], _config: &GoogleConfig) -> Result<Value> {
        let mut parts = vec![Part {
            text: Some(prompt.to_string()),
            inline_data: None,
        }];
        for image in images {
            let canonical = image.reencode()?;
            parts.push(Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: canonical.mime_type().to_string(),
                    data: canonical.base64_payload().to_string(),
                }),
            });
        }
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
        };
        serde_json::to_value(request).map_err(|e| RoomFlipError::SerializationError(e.to_string()))
    }

    fn normalize(&self, raw: Value) -> Result<TransformResult> {
        let response: GenerateContentResponse = serde_json::from_value(raw).map_err(|e| {
            RoomFlipError::UpstreamUnavailable(format!("unexpected generateContent response: {}", e))
        })?;
        if response.candidates.is_empty() {
            return Err(RoomFlipError::NoCandidatesReturned(format!(
                "{} returned zero candidates",
                self.model
            )));
        }

        let mut image = None;
        for candidate in &response.candidates {
            let parts = candidate.content.as_ref().map(|c| c.parts.as_slice()).unwrap_or(&[]);
            for part in parts {
                if let Some(text) = part.text.as_deref() {
                    log::info!("{} diagnostic: {}", self.model, text);
                }
                if image.is_none() {
                    if let Some(inline) = part.inline_data.as_ref().filter(|d| !d.data.is_empty()) {
                        match canonical_data_uri(&inline.mime_type, &inline.data) {
                            Ok(uri) => image = Some(uri),
                            Err(e) => log::warn!("{} returned an unusable image part: {}", self.model, e),
                        }
                    }
                }
            }
            if image.is_none() {
                if let Some(reason) = &candidate.finish_reason {
                    log::warn!("{} candidate finished without an image: {}", self.model, reason);
                }
            }
        }

        match image {
            Some(uri) => Ok(TransformResult {
                image_data_uri: Some(uri),
                model_id: self.model.clone(),
            }),
            None => Err(RoomFlipError::NoImageInResponse(format!(
                "no part of the {} candidate(s) contained inline image data",
                response.candidates.len()
            ))),
        }
    }
}

fn canonical_data_uri(mime_type: &str, data: &str) -> Result<String> {
    EncodedImage::from_base64(mime_type, data)
        .and_then(|image| image.reencode())
        .map(|image| image.to_data_uri())
        .map_err(|e| RoomFlipError::NoImageInResponse(format!("provider image was unusable: {}", e)))
}
