// THEORY:
// The `LineDetector` turns an `EdgeMap` into an ordered list of straight segments
// using a point-based (probabilistic) Hough transform. It does not build the dense
// rho/theta accumulator from every edge pixel before looking for peaks. Instead it
// visits edge points in a shuffled order and lets each one vote. As soon as one of
// its bins crosses `vote_threshold`, the detector traces the corresponding line
// through the edge map, bridging at most `max_line_gap` missing pixels, and
// removes the traced pixels from further consideration.
//
// Key properties:
// 1.  **Determinism**: the shuffle is driven by a `StdRng` seeded from
//     `HoughParams::seed`, so identical edge maps always produce identical output in
//     identical order. The order is significant: horizon selection breaks ties by it.
// 2.  **Consumption**: pixels on a traced line are cleared from the mask whether or not
//     the line is long enough. Points that had already voted for an accepted line
//     take their votes back, so one physical line is reported once.
// 3.  **Length gate**: a traced line is reported only when its x or y extent reaches
//     `min_line_length`.

use crate::config::HoughParams;
use crate::core_modules::frame::{EdgeMap, LineSegment};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Fixed-point fraction bits used while stepping along a line.
const SHIFT: u32 = 16;

#[derive(Clone, Copy, PartialEq, Eq)]
enum PointState {
    /// Not an edge pixel, or already consumed by a traced line.
    Empty,
    /// Edge pixel that has not voted yet.
    Pending,
    /// Edge pixel whose votes are in the accumulator.
    Voted,
}

/// Probabilistic Hough line detector.
#[derive(Debug, Clone)]
pub struct LineDetector {
    params: HoughParams,
    /// `(cos, sin)` of every accumulator angle, pre-divided by the rho resolution.
    trig: Vec<(f64, f64)>,
}

impl LineDetector {
    pub fn new(params: &HoughParams) -> Self {
        let theta = params.theta_resolution_deg.to_radians();
        let num_angles = ((std::f64::consts::PI / theta).round() as usize).max(1);
        let inv_rho = 1.0 / params.rho_resolution;
        let trig = (0..num_angles)
            .map(|n| {
                let angle = n as f64 * theta;
                (angle.cos() * inv_rho, angle.sin() * inv_rho)
            })
            .collect();
        Self {
            params: params.clone(),
            trig,
        }
    }

    pub fn detect(&self, edges: &EdgeMap) -> Vec<LineSegment> {
        let width = edges.width() as usize;
        let height = edges.height() as usize;
        let mut segments = Vec::new();
        if width == 0 || height == 0 {
            return segments;
        }

        let num_angles = self.trig.len();
        let num_rho =
            ((((width + height) * 2 + 1) as f64 / self.params.rho_resolution).round() as usize).max(1);
        let rho_offset = ((num_rho - 1) / 2) as i64;
        let mut accumulator = vec![0i32; num_angles * num_rho];

        let mut state = vec![PointState::Empty; width * height];
        let mut points: Vec<(usize, usize)> = Vec::new();
        for (x, y, p) in edges.enumerate_pixels() {
            if p.0[0] != 0 {
                state[y as usize * width + x as usize] = PointState::Pending;
                points.push((x as usize, y as usize));
            }
        }

        let bin = |n: usize, x: usize, y: usize| -> Option<usize> {
            let (c, s) = self.trig[n];
            let r = (x as f64 * c + y as f64 * s).round() as i64 + rho_offset;
            (r >= 0 && (r as usize) < num_rho).then(|| n * num_rho + r as usize)
        };

        let threshold = self.params.vote_threshold as i32;
        let min_length = self.params.min_line_length as i64;
        let max_gap = self.params.max_line_gap as i64;
        let mut rng = StdRng::seed_from_u64(self.params.seed);

        for remaining in (1..=points.len()).rev() {
            // Draw a random point without replacement.
            let pick = rng.random_range(0..remaining);
            let (px, py) = points[pick];
            points[pick] = points[remaining - 1];

            let idx = py * width + px;
            if state[idx] != PointState::Pending {
                continue;
            }
            state[idx] = PointState::Voted;

            let mut max_votes = 0;
            let mut max_n = 0;
            for n in 0..num_angles {
                if let Some(b) = bin(n, px, py) {
                    accumulator[b] += 1;
                    if accumulator[b] > max_votes {
                        max_votes = accumulator[b];
                        max_n = n;
                    }
                }
            }
            if max_votes < threshold {
                continue;
            }

            let walker = Walker::new(px as i64, py as i64, self.trig[max_n]);

            // --- Trace in both directions, remembering the last edge pixel seen ---
            let mut line_end = [(px as i64, py as i64); 2];
            for (k, end) in line_end.iter_mut().enumerate() {
                let mut gap = 0;
                for (x, y) in walker.steps(k == 1) {
                    if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                        break;
                    }
                    if state[y as usize * width + x as usize] != PointState::Empty {
                        gap = 0;
                        *end = (x, y);
                    } else {
                        gap += 1;
                        if gap > max_gap {
                            break;
                        }
                    }
                }
            }

            let good_line = (line_end[1].0 - line_end[0].0).abs() >= min_length
                || (line_end[1].1 - line_end[0].1).abs() >= min_length;

            // --- Consume the traced pixels, unvoting them if the line is kept ---
            for (k, end) in line_end.iter().enumerate() {
                for (x, y) in walker.steps(k == 1) {
                    if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                        break;
                    }
                    let (ux, uy) = (x as usize, y as usize);
                    let cell = &mut state[uy * width + ux];
                    if *cell == PointState::Voted && good_line {
                        for n in 0..num_angles {
                            if let Some(b) = bin(n, ux, uy) {
                                accumulator[b] -= 1;
                            }
                        }
                    }
                    *cell = PointState::Empty;
                    if (x, y) == *end {
                        break;
                    }
                }
            }

            if good_line {
                segments.push(LineSegment::new(
                    line_end[0].0 as i32,
                    line_end[0].1 as i32,
                    line_end[1].0 as i32,
                    line_end[1].1 as i32,
                ));
            }
        }

        segments
    }
}

/// Fixed-point stepping along a Hough line through a seed point.
///
/// The major axis advances one pixel per step; the minor axis advances by the
/// line slope in `SHIFT`-bit fixed point.
#[derive(Clone, Copy)]
struct Walker {
    x0: i64,
    y0: i64,
    dx: i64,
    dy: i64,
    x_major: bool,
}

impl Walker {
    fn new(x: i64, y: i64, (cos, sin): (f64, f64)) -> Self {
        // The line direction is perpendicular to the accumulator normal.
        let a = -sin;
        let b = cos;
        let half = 1i64 << (SHIFT - 1);
        let one = (1i64 << SHIFT) as f64;
        if a.abs() > b.abs() {
            Walker {
                x0: x,
                y0: (y << SHIFT) + half,
                dx: if a > 0.0 { 1 } else { -1 },
                dy: (b * one / a.abs()).round() as i64,
                x_major: true,
            }
        } else {
            Walker {
                x0: (x << SHIFT) + half,
                y0: y,
                dx: (a * one / b.abs()).round() as i64,
                dy: if b > 0.0 { 1 } else { -1 },
                x_major: false,
            }
        }
    }

    /// Pixel positions starting at the seed, forward or backward along the line.
    fn steps(&self, backward: bool) -> impl Iterator<Item = (i64, i64)> + '_ {
        let (dx, dy) = if backward { (-self.dx, -self.dy) } else { (self.dx, self.dy) };
        let x_major = self.x_major;
        (0i64..).map(move |i| {
            let x = self.x0 + i * dx;
            let y = self.y0 + i * dy;
            if x_major { (x, y >> SHIFT) } else { (x >> SHIFT, y) }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::frame::EDGE;
    use image::Luma;

    fn params(max_line_gap: u32) -> HoughParams {
        HoughParams {
            max_line_gap,
            ..HoughParams::short_gap()
        }
    }

    fn draw_row(edges: &mut EdgeMap, y: u32, xs: std::ops::Range<u32>) {
        for x in xs {
            edges.put_pixel(x, y, Luma([EDGE]));
        }
    }

    #[test]
    fn empty_map_yields_no_segments() {
        let edges = EdgeMap::new(120, 80);
        assert!(LineDetector::new(&params(10)).detect(&edges).is_empty());
    }

    #[test]
    fn full_width_row_is_reported_once_end_to_end() {
        let mut edges = EdgeMap::new(400, 200);
        draw_row(&mut edges, 149, 0..400);
        let segments = LineDetector::new(&params(10)).detect(&edges);
        assert_eq!(segments.len(), 1);
        let s = segments[0];
        assert_eq!((s.y1, s.y2), (149, 149));
        assert_eq!((s.x1.min(s.x2), s.x1.max(s.x2)), (0, 399));
    }

    #[test]
    fn short_segments_are_rejected() {
        let mut edges = EdgeMap::new(400, 200);
        draw_row(&mut edges, 50, 10..90);
        assert!(LineDetector::new(&params(10)).detect(&edges).is_empty());
    }

    #[test]
    fn long_gap_bridges_what_short_gap_splits() {
        let mut edges = EdgeMap::new(400, 200);
        draw_row(&mut edges, 100, 0..180);
        draw_row(&mut edges, 100, 200..400);

        let bridged = LineDetector::new(&params(50)).detect(&edges);
        assert_eq!(bridged.len(), 1);
        assert_eq!(bridged[0].horizontal_extent(), 399);

        let split = LineDetector::new(&params(10)).detect(&edges);
        assert!(!split.is_empty());
        for s in &split {
            let (lo, hi) = (s.x1.min(s.x2), s.x1.max(s.x2));
            assert!(hi < 180 || lo >= 200, "segment {:?} spans the gap", s);
        }
    }

    #[test]
    fn detection_is_deterministic_for_a_seed() {
        let mut edges = EdgeMap::new(300, 300);
        draw_row(&mut edges, 40, 0..300);
        draw_row(&mut edges, 220, 20..280);
        for i in 0..250 {
            edges.put_pixel(i + 25, i + 25, Luma([EDGE]));
        }
        let detector = LineDetector::new(&params(10));
        let first = detector.detect(&edges);
        let second = detector.detect(&edges);
        assert_eq!(first, second);
        assert!(first.len() >= 2);
    }

    #[test]
    fn segments_stay_inside_the_frame() {
        let mut edges = EdgeMap::new(200, 150);
        for i in 0..150 {
            edges.put_pixel(i + 10, i, Luma([EDGE]));
        }
        draw_row(&mut edges, 0, 0..200);
        draw_row(&mut edges, 149, 0..200);
        for s in LineDetector::new(&params(10)).detect(&edges) {
            assert!(s.lies_within(200, 150), "segment {:?} out of bounds", s);
        }
    }
}
