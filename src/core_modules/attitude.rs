//! Roll and pitch from a horizon segment.
//!
//! This is a flat-camera approximation. No lens model or camera tilt is applied.
//! - roll is the segment angle in image coordinates (y grows downward),
//!   `atan2(y2 - y1, x2 - x1)`, normalized to (-180, 180].
//! - pitch maps the vertical midpoint linearly from +90 at the top row, through 0 at
//!   `height / 2`, to -90 at the bottom, clamped to [-90, 90].

use crate::core_modules::frame::LineSegment;

/// The per-frame horizon result handed to the overlay compositor.
///
/// An estimate is valid exactly when it carries a segment; invalid estimates report
/// zero roll and pitch and must not be drawn as a horizon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizonEstimate {
    segment: Option<LineSegment>,
    pub roll_deg: f64,
    pub pitch_deg: f64,
}

impl HorizonEstimate {
    /// Estimate attitude for an optional segment in a `width` x `height` frame.
    ///
    /// Endpoints are clamped into the frame before anything is derived from them.
    pub fn from_segment(segment: Option<LineSegment>, width: u32, height: u32) -> Self {
        match segment.and_then(|s| clamp_to_frame(s, width, height)) {
            Some(s) => Self {
                segment: Some(s),
                roll_deg: roll_degrees(&s),
                pitch_deg: pitch_degrees(s.midpoint_y(), height),
            },
            None => Self::invalid(),
        }
    }

    pub const fn invalid() -> Self {
        Self {
            segment: None,
            roll_deg: 0.0,
            pitch_deg: 0.0,
        }
    }

    pub fn valid(&self) -> bool {
        self.segment.is_some()
    }

    pub fn segment(&self) -> Option<LineSegment> {
        self.segment
    }

    /// Row splitting sky from ground, `(y1 + y2) / 2`.
    pub fn horizon_row(&self) -> Option<i32> {
        self.segment.map(|s| s.midpoint_row())
    }
}

/// `degrees(atan2(dy, dx))` normalized to (-180, 180].
pub fn roll_degrees(segment: &LineSegment) -> f64 {
    normalize_degrees((segment.dy() as f64).atan2(segment.dx() as f64).to_degrees())
}

/// Map any angle onto (-180, 180].
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle % 360.0;
    if wrapped <= -180.0 {
        wrapped + 360.0
    } else if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// `((height / 2) - midpoint_y) / (height / 2) * 90`, clamped to [-90, 90].
pub fn pitch_degrees(midpoint_y: f64, height: u32) -> f64 {
    let half = height as f64 / 2.0;
    if half <= 0.0 {
        return 0.0;
    }
    ((half - midpoint_y) / half * 90.0).clamp(-90.0, 90.0)
}

fn clamp_to_frame(segment: LineSegment, width: u32, height: u32) -> Option<LineSegment> {
    if width == 0 || height == 0 {
        return None;
    }
    let max_x = width as i32 - 1;
    let max_y = height as i32 - 1;
    Some(LineSegment::new(
        segment.x1.clamp(0, max_x),
        segment.y1.clamp(0, max_y),
        segment.x2.clamp(0, max_x),
        segment.y2.clamp(0, max_y),
    ))
}
