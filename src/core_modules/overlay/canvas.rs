//! Raster drawing primitives on a `Frame`.
//!
//! All coordinates are signed; anything that falls outside the frame is clipped
//! pixel by pixel, so callers may pass lines and circles that leave the frame.

use crate::config::Rgb;
use crate::core_modules::frame::Frame;
use crate::core_modules::overlay::glyphs::{GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH, glyph};
use crate::core_modules::pixel::pixel::Pixel;
use std::ops::Range;

#[inline]
fn put(frame: &mut Frame, x: i64, y: i64, color: Rgb) {
    if x < 0 || y < 0 || x >= frame.width() as i64 || y >= frame.height() as i64 {
        return;
    }
    frame.put_pixel(x as u32, y as u32, image::Rgb(color));
}

/// Blend full-width rows `rows` toward `color` with opacity `alpha`.
pub fn blend_rows(frame: &mut Frame, rows: Range<u32>, color: Rgb, alpha: f64) {
    let tint = Pixel::from(color);
    let end = rows.end.min(frame.height());
    for y in rows.start..end {
        for x in 0..frame.width() {
            let base = Pixel::from(*frame.get_pixel(x, y));
            frame.put_pixel(x, y, base.blend(&tint, alpha).into());
        }
    }
}

/// Filled disc of `radius` centered on (cx, cy).
fn stamp(frame: &mut Frame, cx: i64, cy: i64, radius: i64, color: Rgb) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put(frame, cx + dx, cy + dy, color);
            }
        }
    }
}

/// Straight line with round caps; `thickness` 1 draws single pixels.
pub fn draw_line(frame: &mut Frame, from: (i64, i64), to: (i64, i64), color: Rgb, thickness: u32) {
    let radius = (thickness / 2) as i64;
    let (mut x, mut y) = from;
    let dx = (to.0 - from.0).abs();
    let dy = -(to.1 - from.1).abs();
    let sx = if from.0 < to.0 { 1 } else { -1 };
    let sy = if from.1 < to.1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        stamp(frame, x, y, radius, color);
        if (x, y) == to {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Circle outline of `radius` around `center`, `thickness` pixels wide.
pub fn draw_circle(frame: &mut Frame, center: (i64, i64), radius: u32, color: Rgb, thickness: u32) {
    let r = radius as f64;
    let half = thickness.max(1) as f64 / 2.0;
    let (inner, outer) = ((r - half).max(0.0), r + half);
    let reach = outer.ceil() as i64;
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let d = ((dx * dx + dy * dy) as f64).sqrt();
            if d >= inner && d < outer {
                put(frame, center.0 + dx, center.1 + dy, color);
            }
        }
    }
}

/// Render `text` with the built-in bitmap font.
///
/// `origin` is the bottom-left corner of the first glyph, on the text baseline.
pub fn draw_text(frame: &mut Frame, text: &str, origin: (i64, i64), color: Rgb, scale: u32) {
    let scale = scale.max(1) as i64;
    let top = origin.1 - GLYPH_HEIGHT as i64 * scale;
    let mut left = origin.0;
    for c in text.chars() {
        let rows = glyph(c);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                let px = left + col as i64 * scale;
                let py = top + row as i64 * scale;
                for sy in 0..scale {
                    for sx in 0..scale {
                        put(frame, px + sx, py + sy, color);
                    }
                }
            }
        }
        left += GLYPH_ADVANCE as i64 * scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgb = [255, 255, 255];

    fn painted(frame: &Frame) -> usize {
        frame.pixels().filter(|p| p.0 != [0, 0, 0]).count()
    }

    #[test]
    fn blend_rows_touches_only_requested_rows() {
        let mut frame = Frame::from_pixel(10, 10, image::Rgb([100, 100, 100]));
        blend_rows(&mut frame, 0..4, [0, 0, 255], 0.4);
        assert_eq!(frame.get_pixel(3, 3).0, [60, 60, 162]);
        assert_eq!(frame.get_pixel(3, 4).0, [100, 100, 100]);
        // Rows past the bottom edge are ignored.
        blend_rows(&mut frame, 8..50, [255, 0, 0], 1.0);
        assert_eq!(frame.get_pixel(0, 9).0, [255, 0, 0]);
    }

    #[test]
    fn thin_horizontal_line_covers_its_span() {
        let mut frame = Frame::new(20, 5);
        draw_line(&mut frame, (2, 2), (12, 2), WHITE, 1);
        assert_eq!(painted(&frame), 11);
        assert_eq!(frame.get_pixel(2, 2).0, WHITE);
        assert_eq!(frame.get_pixel(12, 2).0, WHITE);
    }

    #[test]
    fn thick_line_is_wider_and_clipped() {
        let mut frame = Frame::new(20, 5);
        draw_line(&mut frame, (-10, 0), (30, 0), WHITE, 2);
        // Row 0 and the row below it; the row above is off-frame.
        assert!(frame.enumerate_pixels().filter(|(_, y, _)| *y == 1).all(|(_, _, p)| p.0 == WHITE));
        assert!(frame.enumerate_pixels().filter(|(_, y, _)| *y == 2).all(|(_, _, p)| p.0 == [0, 0, 0]));
    }

    #[test]
    fn circle_outline_leaves_center_untouched() {
        let mut frame = Frame::new(41, 41);
        draw_circle(&mut frame, (20, 20), 10, WHITE, 2);
        assert_eq!(frame.get_pixel(20, 20).0, [0, 0, 0]);
        assert_eq!(frame.get_pixel(30, 20).0, WHITE);
        assert_eq!(frame.get_pixel(20, 10).0, WHITE);
    }

    #[test]
    fn text_sits_above_its_baseline() {
        let mut frame = Frame::new(60, 30);
        draw_text(&mut frame, "H", (0, 21), WHITE, 3);
        assert!(painted(&frame) > 0);
        // Nothing at or below the baseline.
        assert!(frame.enumerate_pixels().filter(|(_, y, _)| *y >= 21).all(|(_, _, p)| p.0 == [0, 0, 0]));
        // Left stem of the H fills the top-left block.
        assert_eq!(frame.get_pixel(0, 0).0, WHITE);
    }
}
