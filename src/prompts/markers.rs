//! Surface classification for point markers.
//!
//! The room image is split into thirds. The upper third is the ceiling, the
//! lower third the floor, the left and right thirds the matching walls and
//! the centre cell the back wall. A marker in a corner cell belongs to both a
//! horizontal and a vertical band; it goes to the band it sits deeper inside,
//! and to the ceiling/floor band when the depths are equal.

use crate::{
    error::{Result, RoomFlipError},
    models::MarkerPoint,
};
use std::collections::BTreeSet;
use std::fmt;

const THIRD: f64 = 1.0 / 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Surface {
    Ceiling,
    LeftWall,
    BackWall,
    RightWall,
    Floor,
}

impl Surface {
    pub fn label(&self) -> &'static str {
        match self {
            Surface::Ceiling => "ceiling",
            Surface::LeftWall => "left wall",
            Surface::BackWall => "back wall",
            Surface::RightWall => "right wall",
            Surface::Floor => "floor",
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn classify(marker: &MarkerPoint) -> Result<Surface> {
    let MarkerPoint { x, y } = *marker;
    if !(0.0..=1.0).contains(&x) || !(0.0..=1.0).contains(&y) {
        return Err(RoomFlipError::InvalidParameter(format!(
            "marker ({}, {}) lies outside the normalized image bounds",
            x, y
        )));
    }

    // Depth into a band, positive when inside it. Bands are half-open so a
    // marker exactly on a third line belongs to the middle cell.
    let vertical = if y < THIRD {
        Some((Surface::Ceiling, THIRD - y))
    } else if y > 1.0 - THIRD {
        Some((Surface::Floor, y - (1.0 - THIRD)))
    } else {
        None
    };
    let horizontal = if x < THIRD {
        Some((Surface::LeftWall, THIRD - x))
    } else if x > 1.0 - THIRD {
        Some((Surface::RightWall, x - (1.0 - THIRD)))
    } else {
        None
    };

    let surface = match (vertical, horizontal) {
        (Some((v, depth_v)), Some((h, depth_h))) => {
            if depth_h > depth_v {
                h
            } else {
                v
            }
        }
        (Some((v, _)), None) => v,
        (None, Some((h, _))) => h,
        (None, None) => Surface::BackWall,
    };
    Ok(surface)
}

/// Classifies every marker and returns each marked surface once, in a
/// fixed top-to-bottom, left-to-right order.
pub fn resolve_surfaces(markers: &[MarkerPoint]) -> Result<Vec<Surface>> {
    let mut surfaces = BTreeSet::new();
    for marker in markers {
        surfaces.insert(classify(marker)?);
    }
    Ok(surfaces.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f64, y: f64) -> MarkerPoint {
        MarkerPoint { x, y }
    }

    #[test]
    fn test_band_classification() {
        assert_eq!(classify(&at(0.5, 0.1)).unwrap(), Surface::Ceiling);
        assert_eq!(classify(&at(0.5, 0.9)).unwrap(), Surface::Floor);
        assert_eq!(classify(&at(0.1, 0.5)).unwrap(), Surface::LeftWall);
        assert_eq!(classify(&at(0.9, 0.5)).unwrap(), Surface::RightWall);
        assert_eq!(classify(&at(0.5, 0.5)).unwrap(), Surface::BackWall);
    }

    #[test]
    fn test_corner_tie_break() {
        // Deeper into the left band than the ceiling band.
        assert_eq!(classify(&at(0.05, 0.3)).unwrap(), Surface::LeftWall);
        // Deeper into the ceiling band.
        assert_eq!(classify(&at(0.3, 0.05)).unwrap(), Surface::Ceiling);
        // Equal depth goes to ceiling/floor.
        assert_eq!(classify(&at(0.9, 0.9)).unwrap(), Surface::Floor);
    }

    #[test]
    fn test_resolve_deduplicates_without_false_positives() {
        let markers = [at(0.4, 0.1), at(0.6, 0.2), at(0.95, 0.5)];
        let surfaces = resolve_surfaces(&markers).unwrap();
        assert_eq!(surfaces, vec![Surface::Ceiling, Surface::RightWall]);
        assert!(!surfaces.contains(&Surface::Floor));
        assert!(!surfaces.contains(&Surface::LeftWall));
    }

    #[test]
    fn test_out_of_bounds_marker_is_rejected() {
        let err = resolve_surfaces(&[at(1.2, 0.5)]).unwrap_err();
        assert!(matches!(err, RoomFlipError::InvalidParameter(_)));
    }
}
