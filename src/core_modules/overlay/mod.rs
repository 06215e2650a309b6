// THEORY:
// The `OverlayCompositor` is the last per-frame stage. It takes exclusive mutable
// access to the frame and paints, in order, so later layers overwrite earlier ones:
//
// 1.  **Sky/ground shading**: only for a valid estimate. Rows above the horizon row
//     are blended toward `sky_color`, the rest toward `ground_color`, with the
//     configured `alpha`. The horizon line is then drawn over the blend at full
//     opacity: either the selected segment itself, or a level line across the whole
//     frame at the horizon row (the near-horizontal-first rendering).
// 2.  **Attitude readout**: `Roll:` and `Pitch:` labels at fixed positions, only when
//     there is an estimate to report.
// 3.  **HUD**: the simulated instrument panel, driven by `HudState` alone.
//
// Compositing reads nothing but its arguments, so identical inputs always paint
// identical pixels.

pub mod canvas;
pub mod glyphs;
pub mod hud;

use crate::config::OverlayConfig;
use crate::core_modules::attitude::HorizonEstimate;
use crate::core_modules::frame::{Frame, LineSegment};
use hud::HudState;

const ROLL_LABEL_ORIGIN: (i64, i64) = (10, 30);
const PITCH_LABEL_ORIGIN: (i64, i64) = (10, 70);

#[derive(Debug, Clone)]
pub struct OverlayCompositor {
    config: OverlayConfig,
    full_width_line: bool,
}

impl OverlayCompositor {
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            full_width_line: false,
        }
    }

    /// Draw the horizon as a level line spanning the frame at the horizon row
    /// instead of the selected segment.
    pub fn with_full_width_line(mut self, full_width_line: bool) -> Self {
        self.full_width_line = full_width_line;
        self
    }

    pub fn full_width_line(&self) -> bool {
        self.full_width_line
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Paint the overlay for `estimate` onto `frame`. `hud` is drawn only when the
    /// overlay has `show_hud` set.
    pub fn compose(&self, frame: &mut Frame, estimate: &HorizonEstimate, hud: Option<&HudState>) {
        let config = &self.config;

        if let (Some(segment), Some(row)) = (estimate.segment(), estimate.horizon_row()) {
            let split = row.clamp(0, frame.height() as i32) as u32;
            canvas::blend_rows(frame, 0..split, config.sky_color, config.alpha);
            canvas::blend_rows(frame, split..frame.height(), config.ground_color, config.alpha);
            let segment = if self.full_width_line {
                LineSegment::full_width(row, frame.width())
            } else {
                segment
            };
            canvas::draw_line(
                frame,
                (segment.x1 as i64, segment.y1 as i64),
                (segment.x2 as i64, segment.y2 as i64),
                config.line_color,
                config.line_thickness,
            );

            if config.show_text {
                let roll = format!("Roll: {:.2} degrees", estimate.roll_deg);
                let pitch = format!("Pitch: {:.2} degrees", estimate.pitch_deg);
                canvas::draw_text(frame, &roll, ROLL_LABEL_ORIGIN, config.text_color, config.text_scale);
                canvas::draw_text(frame, &pitch, PITCH_LABEL_ORIGIN, config.text_color, config.text_scale);
            }
        }

        if config.show_hud {
            if let Some(state) = hud {
                hud::draw_hud(frame, state, config);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAY: [u8; 3] = [100, 100, 100];

    fn gray_frame() -> Frame {
        Frame::from_pixel(400, 200, image::Rgb(GRAY))
    }

    fn level_estimate(row: i32) -> HorizonEstimate {
        HorizonEstimate::from_segment(Some(LineSegment::full_width(row, 400)), 400, 200)
    }

    fn quiet() -> OverlayConfig {
        OverlayConfig {
            show_text: false,
            ..OverlayConfig::default()
        }
    }

    #[test]
    fn valid_estimate_shades_sky_and_ground() {
        let mut frame = gray_frame();
        OverlayCompositor::new(quiet()).compose(&mut frame, &level_estimate(150), None);
        // 0.6 * 100 + 0.4 * 255 = 162
        assert_eq!(frame.get_pixel(200, 20).0, [60, 60, 162]);
        assert_eq!(frame.get_pixel(200, 190).0, [162, 60, 60]);
        // Horizon line at full opacity.
        assert_eq!(frame.get_pixel(200, 150).0, [0, 255, 0]);
    }

    #[test]
    fn full_width_mode_spans_the_frame_at_the_horizon_row() {
        let short = HorizonEstimate::from_segment(Some(LineSegment::new(180, 148, 220, 152)), 400, 200);
        assert_eq!(short.horizon_row(), Some(150));

        let mut segment_only = gray_frame();
        OverlayCompositor::new(quiet()).compose(&mut segment_only, &short, None);
        assert_ne!(segment_only.get_pixel(5, 150).0, [0, 255, 0]);
        assert_eq!(segment_only.get_pixel(200, 150).0, [0, 255, 0]);

        let mut level = gray_frame();
        let compositor = OverlayCompositor::new(quiet()).with_full_width_line(true);
        compositor.compose(&mut level, &short, None);
        assert_eq!(level.get_pixel(5, 150).0, [0, 255, 0]);
        assert_eq!(level.get_pixel(395, 150).0, [0, 255, 0]);
        // Level, so rows away from the line keep their shading.
        assert_eq!(level.get_pixel(200, 145).0, [60, 60, 162]);
    }

    #[test]
    fn invalid_estimate_leaves_frame_untouched() {
        let mut frame = gray_frame();
        let compositor = OverlayCompositor::new(OverlayConfig::default());
        compositor.compose(&mut frame, &HorizonEstimate::invalid(), Some(&HudState::default()));
        assert!(frame.pixels().all(|p| p.0 == GRAY));
    }

    #[test]
    fn hud_renders_even_without_a_horizon() {
        let mut frame = gray_frame();
        let config = OverlayConfig {
            show_hud: true,
            ..quiet()
        };
        OverlayCompositor::new(config).compose(&mut frame, &HorizonEstimate::invalid(), Some(&HudState::default()));
        assert_eq!(frame.get_pixel(200, 100).0, [0, 255, 0]);
        assert_eq!(frame.get_pixel(200, 20).0, GRAY);
    }

    #[test]
    fn text_labels_are_drawn_when_enabled() {
        let mut plain = gray_frame();
        let mut labelled = gray_frame();
        let estimate = level_estimate(150);
        OverlayCompositor::new(quiet()).compose(&mut plain, &estimate, None);
        OverlayCompositor::new(OverlayConfig::default()).compose(&mut labelled, &estimate, None);
        let differing = plain
            .pixels()
            .zip(labelled.pixels())
            .filter(|(a, b)| a != b)
            .count();
        assert!(differing > 0);
        assert!(labelled.pixels().any(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn compositing_is_deterministic() {
        let config = OverlayConfig {
            show_hud: true,
            ..OverlayConfig::default()
        };
        let compositor = OverlayCompositor::new(config);
        let estimate = HorizonEstimate::from_segment(Some(LineSegment::new(0, 120, 399, 160)), 400, 200);
        let hud = HudState {
            roll_deg: 12.5,
            pitch_deg: -3.0,
            ..HudState::default()
        };
        let mut first = gray_frame();
        let mut second = gray_frame();
        compositor.compose(&mut first, &estimate, Some(&hud));
        compositor.compose(&mut second, &estimate, Some(&hud));
        assert_eq!(first.as_raw(), second.as_raw());
    }
}
