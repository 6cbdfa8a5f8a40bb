//! Prompt-construction strategies.
//!
//! Every strategy is a point in three independent axes (visibility, marking
//! convention, tiling mode) and renders through the same template, so each
//! axis contributes its section exactly once.

pub mod markers;
pub mod scale;
pub mod strategy;
pub mod template;

use crate::{
    codec::EncodedImage,
    error::{Result, RoomFlipError},
    models::AuxParams,
};

pub use markers::{resolve_surfaces, Surface};
pub use scale::ScaleBand;
pub use strategy::{MarkingConvention, StrategyId, TilingMode, Visibility};
pub use template::{PromptTemplate, TileLayout, BOUNDARY_CLAUSE};

/// Builds the instruction text for `strategy`.
///
/// Pure: identical inputs always produce identical text. Fails with
/// `MissingRequiredInput` when an image is absent and with
/// `InvalidParameter` when the axis combination needs parameters that are
/// missing or malformed.
pub fn build_instruction(
    strategy: StrategyId,
    room_image: Option<&EncodedImage>,
    reference_image: Option<&EncodedImage>,
    aux: &AuxParams,
) -> Result<String> {
    if room_image.is_none() {
        return Err(RoomFlipError::MissingRequiredInput(
            "room image is required".into(),
        ));
    }
    if reference_image.is_none() {
        return Err(RoomFlipError::MissingRequiredInput(
            "reference image is required".into(),
        ));
    }

    let tiles = match (strategy.tiling(), aux.tile_dimensions.as_ref()) {
        (TilingMode::Anisotropic, None) => {
            return Err(RoomFlipError::InvalidParameter(format!(
                "strategy '{}' requires tileDimensions",
                strategy
            )))
        }
        (_, Some(tile)) => {
            ensure_positive("tileDimensions.width", tile.width)?;
            ensure_positive("tileDimensions.height", tile.height)?;
            if strategy.tiling() == TilingMode::Anisotropic && tile.width == tile.height {
                return Err(RoomFlipError::InvalidParameter(format!(
                    "strategy '{}' needs rectangular units, got {} x {}",
                    strategy, tile.width, tile.height
                )));
            }
            Some(TileLayout::from_dimensions(tile))
        }
        (TilingMode::Isotropic, None) => None,
    };

    if let Some(room) = &aux.room_dimensions {
        ensure_positive("roomDimensions.width", room.width)?;
        ensure_positive("roomDimensions.depth", room.depth)?;
    }

    let pinned_surfaces = match (strategy.marking(), aux.markers.as_deref()) {
        (MarkingConvention::PointMarkers, Some(markers)) if !markers.is_empty() => {
            Some(resolve_surfaces(markers)?)
        }
        (_, Some(_)) => {
            log::debug!("Ignoring marker coordinates for strategy {}", strategy);
            None
        }
        _ => None,
    };

    let template = PromptTemplate {
        strategy,
        tiles,
        room: aux.room_dimensions,
        pinned_surfaces,
    };
    Ok(template.render())
}

fn ensure_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(RoomFlipError::InvalidParameter(format!(
            "{} must be a positive number of centimetres, got {}",
            name, value
        )))
    }
}
