// THEORY:
// The `HorizonSelector` decides which of the detected segments, if any, is the
// horizon. Two policies exist and they are deliberately kept apart: they encode
// different assumptions about the scene and produce materially different frames for
// the same input.
//
// - `NearHorizontalFirst` trusts the detector's order. The first segment whose
//   vertical extent is under `NEAR_HORIZONTAL_MAX_DY` pixels wins. When nothing
//   qualifies it assumes a level horizon through the frame center: a synthetic,
//   full-width segment at `height / 2`. The estimate is still valid.
// - `LongestHorizontalExtent` scans every candidate and keeps the one spanning the
//   most columns, the first one on ties. It never invents a horizon: no candidates
//   means no estimate.

use crate::core_modules::frame::LineSegment;
use serde::{Deserialize, Serialize};

/// Segments with `|y2 - y1|` below this count as near-horizontal.
pub const NEAR_HORIZONTAL_MAX_DY: u32 = 10;

/// The horizon-selection heuristic to apply to each frame's candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Policy A: first near-horizontal segment in detector order, level fallback.
    NearHorizontalFirst,
    /// Policy B: segment with the largest `|x2 - x1|`, no fallback.
    LongestHorizontalExtent,
}

impl SelectionPolicy {
    /// Pick the horizon segment for a `width` x `height` frame, or `None`.
    pub fn select(&self, segments: &[LineSegment], width: u32, height: u32) -> Option<LineSegment> {
        match self {
            SelectionPolicy::NearHorizontalFirst => {
                near_horizontal_first(segments).or_else(|| level_fallback(width, height))
            }
            SelectionPolicy::LongestHorizontalExtent => longest_horizontal_extent(segments),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SelectionPolicy::NearHorizontalFirst => "near_horizontal_first",
            SelectionPolicy::LongestHorizontalExtent => "longest_horizontal_extent",
        }
    }
}

/// First segment, in order, with `|y2 - y1| < NEAR_HORIZONTAL_MAX_DY`.
pub fn near_horizontal_first(segments: &[LineSegment]) -> Option<LineSegment> {
    segments
        .iter()
        .find(|s| s.vertical_extent() < NEAR_HORIZONTAL_MAX_DY)
        .copied()
}

/// Segment maximizing `|x2 - x1|`; the earliest one wins ties.
pub fn longest_horizontal_extent(segments: &[LineSegment]) -> Option<LineSegment> {
    let mut best: Option<LineSegment> = None;
    for segment in segments {
        match best {
            Some(current) if segment.horizontal_extent() <= current.horizontal_extent() => {}
            _ => best = Some(*segment),
        }
    }
    best
}

fn level_fallback(width: u32, height: u32) -> Option<LineSegment> {
    if width == 0 || height == 0 {
        return None;
    }
    Some(LineSegment::full_width((height / 2) as i32, width))
}
