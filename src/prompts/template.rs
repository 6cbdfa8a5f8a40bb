use super::{
    markers::Surface,
    scale::{format_cm, ScaleBand},
    strategy::{MarkingConvention, StrategyId, TilingMode, Visibility},
};
use crate::models::{RoomDimensions, TileDimensions};

pub const BOUNDARY_CLAUSE: &str =
    "Do not extend image boundaries. Same frame size. In-place editing only.";

/// Rectangular unit resolved into its long and short sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileLayout {
    pub short: f64,
    pub long: f64,
    pub long_is_horizontal: bool,
}

impl TileLayout {
    pub fn from_dimensions(tile: &TileDimensions) -> Self {
        Self {
            short: tile.width.min(tile.height),
            long: tile.width.max(tile.height),
            long_is_horizontal: tile.width > tile.height,
        }
    }
}

/// One instruction text, assembled section by section from the strategy axes.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub strategy: StrategyId,
    pub tiles: Option<TileLayout>,
    pub room: Option<RoomDimensions>,
    pub pinned_surfaces: Option<Vec<Surface>>,
}

impl PromptTemplate {
    pub fn render(&self) -> String {
        let mut sections = vec![self.intro(), self.visibility_section(), self.marking_section()];
        if let Some(room) = &self.room {
            sections.push(room_section(room));
        }
        if self.strategy.tiling() == TilingMode::Anisotropic {
            if let Some(tiles) = &self.tiles {
                sections.push(tiling_section(tiles, self.room.as_ref()));
            }
        }
        sections.push(output_section());
        sections.push(boundary_suffix());
        sections.join("\n\n")
    }

    fn intro(&self) -> String {
        let marks = match self.strategy.marking() {
            MarkingConvention::Overlay => {
                "A semi-transparent colored overlay with boundary lines marks the surface(s) to change."
            }
            MarkingConvention::PointMarkers => {
                "Small colored dot markers mark the surface(s) to change."
            }
            MarkingConvention::Unmarked => {
                "It carries no markings; every wall and floor surface is a target."
            }
        };
        format!(
            "You are writing the prompt for an image-editing model that will transform a room photo for an interior design visualization.\n\n\
             INPUT:\n\
             - Image 1: the room to edit. {}\n\
             - Image 2: the texture/material reference showing the desired surface finish.",
            marks
        )
    }

    fn visibility_section(&self) -> String {
        match self.strategy.visibility() {
            Visibility::DualImage => "WHAT THE IMAGE MODEL SEES:\n\
                The image model receives both images in this order: the room first, the reference second.\n\
                - Refer to them by position: \"the first image\" is the room to edit, \"the second image\" is the material reference.\n\
                - The image model blends multiple inputs by default. Include strong anti-blending language: \"Do NOT merge or blend these images into one scene. Do NOT combine them. Use the second image only as a material sample.\"\n\
                - Still name the material briefly (for example \"white Calacatta marble with soft gray veining, polished finish\") so the intent survives if the reference is misread."
                .to_string(),
            Visibility::SingleImage => "WHAT THE IMAGE MODEL SEES:\n\
                The image model receives ONLY the room image. It never sees the reference.\n\
                - Never mention \"the second image\", \"the reference image\" or \"Image 2\" in your prompt.\n\
                - Describe the reference material exhaustively in words so it can be reproduced from text alone:\n  \
                * base color and secondary colors, with specific shade names\n  \
                * pattern type (veining, wood grain, terrazzo chips, solid, geometric) and its direction\n  \
                * surface finish (polished, honed, matte, satin, textured) and how it reflects light\n  \
                * unit shape, joint layout (stack bond, running bond, herringbone) and grout color and width\n  \
                * variation between units (tone shifts, natural irregularities)"
                .to_string(),
        }
    }

    fn marking_section(&self) -> String {
        match self.strategy.marking() {
            MarkingConvention::Overlay => "TARGET SURFACES (overlay):\n\
                - Identify exactly the region covered by the semi-transparent colored overlay and enclosed by its boundary lines.\n\
                - The new material goes only inside that region, following the real surface underneath, never the flat shape of the overlay.\n\
                - Everything outside the boundary stays untouched.\n\
                - Your prompt must tell the image model to remove the overlay color and the boundary lines completely from the result."
                .to_string(),
            MarkingConvention::PointMarkers => {
                let mut section = String::from(
                    "TARGET SURFACES (point markers):\n\
                     Locate the markers before writing the prompt, then follow these steps exactly:\n\
                     (a) Enumerate every colored dot marker in the room image. Do not skip small or partly hidden ones.\n\
                     (b) Classify each marker by position: upper third of the image = ceiling, lower third = floor, left third = left wall, right third = right wall, centre = back wall. A marker in a corner belongs to the band it sits deeper inside; when equally deep in both, it belongs to the ceiling or floor.\n\
                     (c) Deduplicate: several markers on the same surface count as that surface once.\n\
                     (d) Name in your prompt ONLY the surfaces carrying at least one marker. Never add an unmarked surface and never leave out a marked one.\n\
                     Your prompt must tell the image model to remove every marker dot from the result.",
                );
                if let Some(surfaces) = &self.pinned_surfaces {
                    let names: Vec<&str> = surfaces.iter().map(Surface::label).collect();
                    section.push_str(&format!(
                        "\nMarkers were pre-located on these surfaces; treat this list as authoritative: {}.",
                        names.join(", ")
                    ));
                }
                section
            }
            MarkingConvention::Unmarked => "TARGET SURFACES (whole room):\n\
                - Replace the finish of every visible wall and floor surface with the reference material.\n\
                - Fixtures, furniture, doors, windows and fittings are not surfaces and must not change."
                .to_string(),
        }
    }
}

fn room_section(room: &RoomDimensions) -> String {
    format!(
        "ROOM SIZE:\nThe floor measures {} cm wide by {} cm deep. Keep the material scale plausible for a room of that size.",
        format_cm(room.width),
        format_cm(room.depth)
    )
}

fn tiling_section(tiles: &TileLayout, room: Option<&RoomDimensions>) -> String {
    let short = format_cm(tiles.short);
    let long = format_cm(tiles.long);
    let (long_dir, short_dir) = if tiles.long_is_horizontal {
        ("horizontally, parallel to the floor line", "vertically")
    } else {
        ("vertically, from floor towards ceiling", "horizontally")
    };
    let long_band = ScaleBand::for_size_cm(tiles.long).descriptor();
    let short_band = ScaleBand::for_size_cm(tiles.short).descriptor();

    let mut section = format!(
        "UNIT SIZE AND ORIENTATION (rectangular units, exactly {short} cm x {long} cm):\n\
         Each unit of the material is a rectangle, not a square. Your prompt must carry all of the following, each stated explicitly:\n\
         - Long axis: the {long} cm side runs {long_dir} on walls and along the room's width on the floor.\n\
         - Short axis: the {short} cm side runs {short_dir} on walls and along the room's depth on the floor.\n\
         - Scale: along the long axis the pattern is {long_band}; along the short axis it is {short_band}.\n\
         - Perspective: rows of units converge toward the vanishing point; units further from the camera look smaller and more foreshortened but keep their {short} x {long} proportions.\n\
         - Never rotate units by 90 degrees, never render them as squares and never mix orientations."
    );
    if let Some(room) = room {
        let across = (room.width / tiles.long).ceil() as i64;
        let deep = (room.depth / tiles.short).ceil() as i64;
        section.push_str(&format!(
            "\n- Count: roughly {} units span the room width and {} units span its depth.",
            across, deep
        ));
    }
    section.push_str(&format!(
        "\nREMINDER: every unit is exactly {short} cm on the short side and {long} cm on the long side. Repeat these exact dimensions in your prompt."
    ));
    section
}

fn output_section() -> String {
    "YOUR PROMPT MUST ALSO:\n\
     - Follow the structure: [action verb] + [specific target] + [detailed material description] + [preservation instructions] + [quality requirements].\n\
     - Preserve everything that is not a target surface: exact layout, fixtures, furniture, lighting, shadows, reflections and camera angle.\n\
     - Ask for photorealistic quality with lighting consistent with the original photo.\n\
     Return ONLY the prompt text, nothing else."
        .to_string()
}

fn boundary_suffix() -> String {
    format!(
        "BOUNDARY CONSTRAINTS (end your prompt with this exact sentence):\n{}",
        BOUNDARY_CLAUSE
    )
}
