//! Placement of capture-progress bars on the base canvas.
//!
//! Each faction's bar is anchored to its own territory edge and grows toward
//! the centre of the map by one sector per captured strongpoint line.

use crate::catalog::MapOrientation;
use crate::models::Faction;

/// Edge length of every base map image, in pixels.
pub const CANVAS_SIZE: u32 = 1920;
/// Bar growth per captured point.
pub const UNIT_SIZE: u32 = 384;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Pinned to (0, 0).
    Near,
    /// Pinned to the far end of the axis the bar grows along.
    Far,
}

/// Home edge of each faction, as `(axis, allies)`.
fn anchors(orientation: MapOrientation) -> (Anchor, Anchor) {
    match orientation {
        MapOrientation::TopToBottom => (Anchor::Far, Anchor::Near),
        MapOrientation::BottomToTop => (Anchor::Near, Anchor::Far),
        MapOrientation::LeftToRight => (Anchor::Far, Anchor::Near),
        MapOrientation::RightToLeft => (Anchor::Near, Anchor::Far),
    }
}

pub fn anchor(orientation: MapOrientation, faction: Faction) -> Anchor {
    let (axis, allies) = anchors(orientation);
    match faction {
        Faction::Axis => axis,
        Faction::Allies => allies,
    }
}

/// Bar dimensions as `(width, height)`.
pub fn overlay_size(orientation: MapOrientation, caps: u32) -> (u32, u32) {
    let long = UNIT_SIZE.saturating_mul(caps).min(CANVAS_SIZE);
    if orientation.is_vertical() {
        (CANVAS_SIZE, long)
    } else {
        (long, CANVAS_SIZE)
    }
}

/// Bar top-left corner as `(left, top)`.
pub fn overlay_position(orientation: MapOrientation, caps: u32, faction: Faction) -> (u32, u32) {
    match anchor(orientation, faction) {
        Anchor::Near => (0, 0),
        Anchor::Far => {
            let (width, height) = overlay_size(orientation, caps);
            if orientation.is_vertical() {
                (0, CANVAS_SIZE - height)
            } else {
                (CANVAS_SIZE - width, 0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use MapOrientation::*;

    #[test]
    fn anchor_table_is_exact() {
        let expected = [
            (TopToBottom, Faction::Axis, Anchor::Far),
            (TopToBottom, Faction::Allies, Anchor::Near),
            (BottomToTop, Faction::Axis, Anchor::Near),
            (BottomToTop, Faction::Allies, Anchor::Far),
            (LeftToRight, Faction::Axis, Anchor::Far),
            (LeftToRight, Faction::Allies, Anchor::Near),
            (RightToLeft, Faction::Axis, Anchor::Near),
            (RightToLeft, Faction::Allies, Anchor::Far),
        ];
        for (orientation, faction, want) in expected {
            assert_eq!(anchor(orientation, faction), want, "{:?} / {:?}", orientation, faction);
        }
    }

    #[test]
    fn top_to_bottom_positions() {
        assert_eq!(overlay_position(TopToBottom, 2, Faction::Axis), (0, 1152));
        assert_eq!(overlay_position(TopToBottom, 2, Faction::Allies), (0, 0));
    }

    #[test]
    fn bottom_to_top_positions() {
        assert_eq!(overlay_position(BottomToTop, 3, Faction::Axis), (0, 0));
        assert_eq!(overlay_position(BottomToTop, 2, Faction::Allies), (0, 1152));
    }

    #[test]
    fn left_to_right_positions() {
        assert_eq!(overlay_position(LeftToRight, 1, Faction::Axis), (1536, 0));
        assert_eq!(overlay_position(LeftToRight, 4, Faction::Allies), (0, 0));
    }

    #[test]
    fn right_to_left_positions() {
        assert_eq!(overlay_position(RightToLeft, 4, Faction::Axis), (0, 0));
        assert_eq!(overlay_position(RightToLeft, 1, Faction::Allies), (1536, 0));
    }

    #[test]
    fn size_scales_with_caps() {
        for caps in 1..=5 {
            let long = 384 * caps;
            assert_eq!(overlay_size(TopToBottom, caps), (1920, long));
            assert_eq!(overlay_size(BottomToTop, caps), (1920, long));
            assert_eq!(overlay_size(LeftToRight, caps), (long, 1920));
            assert_eq!(overlay_size(RightToLeft, caps), (long, 1920));
        }
    }

    #[test]
    fn full_capture_covers_canvas_from_either_edge() {
        for orientation in MapOrientation::ALL {
            assert_eq!(overlay_size(orientation, 5), (1920, 1920));
            assert_eq!(overlay_position(orientation, 5, Faction::Axis), (0, 0));
            assert_eq!(overlay_position(orientation, 5, Faction::Allies), (0, 0));
        }
    }

    #[test]
    fn far_bar_ends_at_canvas_edge() {
        for orientation in MapOrientation::ALL {
            for faction in [Faction::Axis, Faction::Allies] {
                for caps in 1..=5 {
                    let (w, h) = overlay_size(orientation, caps);
                    let (left, top) = overlay_position(orientation, caps, faction);
                    match anchor(orientation, faction) {
                        Anchor::Near => assert_eq!((left, top), (0, 0)),
                        Anchor::Far => assert_eq!((left + w, top + h), (CANVAS_SIZE, CANVAS_SIZE)),
                    }
                }
            }
        }
    }

    #[test]
    fn oversized_caps_are_capped() {
        assert_eq!(overlay_size(LeftToRight, 9), (1920, 1920));
        assert_eq!(overlay_position(LeftToRight, 9, Faction::Axis), (0, 0));
    }
}
