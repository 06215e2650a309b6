//! Raster and geometry types shared by every stage.

/// A width x height, 3-channel (RGB) color raster.
///
/// Owned by the orchestrator for one iteration and mutated in place by the
/// overlay compositor.
pub type Frame = image::RgbImage;

/// A binary edge mask: `EDGE` marks an edge pixel, 0 everything else.
pub type EdgeMap = image::GrayImage;

/// Value of an edge pixel in an `EdgeMap`.
pub const EDGE: u8 = 255;

/// A straight segment in integer pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineSegment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl LineSegment {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// The same segment with its endpoints swapped.
    pub const fn reversed(&self) -> Self {
        Self::new(self.x2, self.y2, self.x1, self.y1)
    }

    pub const fn dx(&self) -> i32 {
        self.x2 - self.x1
    }

    pub const fn dy(&self) -> i32 {
        self.y2 - self.y1
    }

    /// `|x2 - x1|`
    pub const fn horizontal_extent(&self) -> u32 {
        self.dx().unsigned_abs()
    }

    /// `|y2 - y1|`
    pub const fn vertical_extent(&self) -> u32 {
        self.dy().unsigned_abs()
    }

    /// Integer horizon row, `(y1 + y2) / 2`.
    pub const fn midpoint_row(&self) -> i32 {
        (self.y1 + self.y2).div_euclid(2)
    }

    /// Exact vertical midpoint.
    pub fn midpoint_y(&self) -> f64 {
        (self.y1 + self.y2) as f64 / 2.0
    }

    /// True when both endpoints lie inside a `width` x `height` frame.
    pub fn lies_within(&self, width: u32, height: u32) -> bool {
        let inside = |x: i32, y: i32| x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height;
        inside(self.x1, self.y1) && inside(self.x2, self.y2)
    }

    /// A horizontal segment spanning the full frame width at `row`.
    pub fn full_width(row: i32, width: u32) -> Self {
        Self::new(0, row, width.saturating_sub(1) as i32, row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extents_and_midpoint() {
        let segment = LineSegment::new(0, 10, 50, 15);
        assert_eq!(segment.horizontal_extent(), 50);
        assert_eq!(segment.vertical_extent(), 5);
        assert_eq!(segment.midpoint_row(), 12);
        assert_eq!(segment.midpoint_y(), 12.5);
        assert_eq!(segment.reversed(), LineSegment::new(50, 15, 0, 10));
    }

    #[test]
    fn bounds_check_is_exclusive_of_width_and_height() {
        assert!(LineSegment::new(0, 0, 399, 199).lies_within(400, 200));
        assert!(!LineSegment::new(0, 0, 400, 199).lies_within(400, 200));
        assert!(!LineSegment::new(-1, 0, 10, 10).lies_within(400, 200));
        assert_eq!(LineSegment::full_width(100, 400), LineSegment::new(0, 100, 399, 100));
    }
}
