use crate::error::RoomFlipError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which images the image-generation model will receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Only the room image; the material must be described in words.
    SingleImage,
    /// Room image first, reference image second.
    DualImage,
}

impl Visibility {
    pub fn slug(&self) -> &'static str {
        match self {
            Visibility::SingleImage => "single-image",
            Visibility::DualImage => "dual-image",
        }
    }

    pub fn sends_reference(&self) -> bool {
        matches!(self, Visibility::DualImage)
    }
}

/// How the client marked the surfaces to transform on the room image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkingConvention {
    /// Semi-transparent color block with boundary lines.
    Overlay,
    /// Discrete colored dots, one or more per target surface.
    PointMarkers,
    /// No marks; every finishable surface is replaced.
    Unmarked,
}

impl MarkingConvention {
    pub fn slug(&self) -> &'static str {
        match self {
            MarkingConvention::Overlay => "overlay",
            MarkingConvention::PointMarkers => "point-markers",
            MarkingConvention::Unmarked => "whole-room",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TilingMode {
    /// Square units; no orientation guidance.
    Isotropic,
    /// Rectangular units; orientation and scale are spelled out.
    Anisotropic,
}

/// Closed set of prompt-construction variants, one per axis combination.
///
/// Serialized as `{visibility}-{marking}` with a `-tiled` suffix for the
/// anisotropic tiling mode, e.g. `single-image-point-markers-tiled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StrategyId {
    visibility: Visibility,
    marking: MarkingConvention,
    tiling: TilingMode,
}

const VISIBILITIES: [Visibility; 2] = [Visibility::SingleImage, Visibility::DualImage];
const MARKINGS: [MarkingConvention; 3] = [
    MarkingConvention::Overlay,
    MarkingConvention::PointMarkers,
    MarkingConvention::Unmarked,
];
const TILINGS: [TilingMode; 2] = [TilingMode::Isotropic, TilingMode::Anisotropic];

impl StrategyId {
    pub const fn new(visibility: Visibility, marking: MarkingConvention, tiling: TilingMode) -> Self {
        Self {
            visibility,
            marking,
            tiling,
        }
    }

    pub fn all() -> Vec<StrategyId> {
        let mut ids = Vec::with_capacity(VISIBILITIES.len() * MARKINGS.len() * TILINGS.len());
        for visibility in VISIBILITIES {
            for marking in MARKINGS {
                for tiling in TILINGS {
                    ids.push(StrategyId::new(visibility, marking, tiling));
                }
            }
        }
        ids
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn marking(&self) -> MarkingConvention {
        self.marking
    }

    pub fn tiling(&self) -> TilingMode {
        self.tiling
    }

    pub fn slug(&self) -> String {
        let base = format!("{}-{}", self.visibility.slug(), self.marking.slug());
        match self.tiling {
            TilingMode::Isotropic => base,
            TilingMode::Anisotropic => format!("{}-tiled", base),
        }
    }
}

impl Default for StrategyId {
    fn default() -> Self {
        StrategyId::new(
            Visibility::DualImage,
            MarkingConvention::Unmarked,
            TilingMode::Isotropic,
        )
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.slug())
    }
}

impl FromStr for StrategyId {
    type Err = RoomFlipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        StrategyId::all()
            .into_iter()
            .find(|id| id.slug() == wanted)
            .ok_or_else(|| RoomFlipError::InvalidParameter(format!("unknown strategy '{}'", s)))
    }
}

impl TryFrom<String> for StrategyId {
    type Error = RoomFlipError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StrategyId> for String {
    fn from(id: StrategyId) -> Self {
        id.slug()
    }
}
