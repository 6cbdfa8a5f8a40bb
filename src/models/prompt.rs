use crate::{
    codec::EncodedImage,
    error::{Result, RoomFlipError},
    prompts::StrategyId,
};
use serde::{Deserialize, Serialize};

/// Size of one tile/plank/panel as laid, in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileDimensions {
    pub width: f64,
    pub height: f64,
}

/// Floor footprint of the room, in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomDimensions {
    pub width: f64,
    pub depth: f64,
}

/// A marker position normalized to the room image, origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuxParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_dimensions: Option<TileDimensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_dimensions: Option<RoomDimensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markers: Option<Vec<MarkerPoint>>,
}

impl AuxParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tile_dimensions(mut self, width: f64, height: f64) -> Self {
        self.tile_dimensions = Some(TileDimensions { width, height });
        self
    }

    pub fn with_room_dimensions(mut self, width: f64, depth: f64) -> Self {
        self.room_dimensions = Some(RoomDimensions { width, depth });
        self
    }

    pub fn with_markers(mut self, markers: Vec<MarkerPoint>) -> Self {
        self.markers = Some(markers);
        self
    }
}

#[derive(Debug, Clone)]
pub struct PromptRequest {
    pub room_image: EncodedImage,
    pub reference_image: EncodedImage,
    pub strategy: StrategyId,
    pub aux_params: AuxParams,
}

impl PromptRequest {
    pub fn new(
        room_image: EncodedImage,
        reference_image: EncodedImage,
        strategy: StrategyId,
    ) -> Self {
        Self {
            room_image,
            reference_image,
            strategy,
            aux_params: AuxParams::default(),
        }
    }

    /// Builds a request from client data URIs, validating both images.
    pub fn from_data_uris(
        room_image: Option<&str>,
        reference_image: Option<&str>,
        strategy: StrategyId,
        aux_params: AuxParams,
    ) -> Result<Self> {
        let room = room_image
            .filter(|uri| !uri.trim().is_empty())
            .ok_or_else(|| RoomFlipError::MissingRequiredInput("room image is required".into()))?;
        let reference = reference_image
            .filter(|uri| !uri.trim().is_empty())
            .ok_or_else(|| {
                RoomFlipError::MissingRequiredInput("reference image is required".into())
            })?;

        Ok(Self {
            room_image: EncodedImage::decode(room)?,
            reference_image: EncodedImage::decode(reference)?,
            strategy,
            aux_params,
        })
    }

    pub fn with_aux_params(mut self, aux_params: AuxParams) -> Self {
        self.aux_params = aux_params;
        self
    }

    /// Images the image-generation model receives, in positional order.
    pub fn consumer_images(&self) -> Vec<EncodedImage> {
        if self.strategy.visibility().sends_reference() {
            vec![self.room_image.clone(), self.reference_image.clone()]
        } else {
            vec![self.room_image.clone()]
        }
    }
}

/// Final text handed to the image-generation model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SynthesizedPrompt(String);

impl SynthesizedPrompt {
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(RoomFlipError::MissingRequiredInput("prompt must not be empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

    #[test]
    fn test_aux_params_deserialize_camel_case() {
        let aux: AuxParams = serde_json::from_str(
            r#"{"tileDimensions":{"width":90,"height":35},"roomDimensions":{"width":300,"depth":250},"markers":[{"x":0.5,"y":0.1}]}"#,
        )
        .unwrap();
        assert_eq!(aux.tile_dimensions, Some(TileDimensions { width: 90.0, height: 35.0 }));
        assert_eq!(aux.room_dimensions, Some(RoomDimensions { width: 300.0, depth: 250.0 }));
        assert_eq!(aux.markers.unwrap().len(), 1);
    }

    #[test]
    fn test_missing_reference_is_missing_required_input() {
        let err = PromptRequest::from_data_uris(
            Some(PNG),
            None,
            StrategyId::default(),
            AuxParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RoomFlipError::MissingRequiredInput(_)));
    }

    #[test]
    fn test_consumer_images_follow_visibility() {
        let single: StrategyId = "single-image-overlay".parse().unwrap();
        let dual: StrategyId = "dual-image-overlay".parse().unwrap();
        let request =
            PromptRequest::from_data_uris(Some(PNG), Some(PNG), single, AuxParams::default())
                .unwrap();
        assert_eq!(request.consumer_images().len(), 1);

        let request = PromptRequest { strategy: dual, ..request };
        assert_eq!(request.consumer_images().len(), 2);
    }

    #[test]
    fn test_synthesized_prompt_rejects_blank() {
        assert!(SynthesizedPrompt::new("   \n").is_err());
        assert_eq!(SynthesizedPrompt::new(" tile it ").unwrap().as_str(), "tile it");
    }
}
