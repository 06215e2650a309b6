//! Simulated head-up display.
//!
//! The HUD is drawn from an externally supplied `HudState`, never from the detected
//! horizon, so it renders the same whether or not a horizon was found.

use crate::config::{OverlayConfig, Rgb};
use crate::core_modules::frame::Frame;
use crate::core_modules::overlay::canvas::{draw_circle, draw_line, draw_text};

const ATTITUDE_HALF_LENGTH: f64 = 200.0;
const COMPASS_RADIUS: u32 = 50;
/// Distance of the compass center from the right edge and from the top.
const COMPASS_INSET: i64 = 100;
const NEEDLE_COLOR: Rgb = [255, 0, 0];
const DIAL_COLOR: Rgb = [255, 255, 255];
const HUD_STROKE: u32 = 2;

/// Instrument readings for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudState {
    pub roll_deg: f64,
    pub pitch_deg: f64,
    pub altitude_ft: f64,
    pub airspeed_kt: f64,
    /// Clockwise from up.
    pub heading_deg: f64,
}

impl Default for HudState {
    fn default() -> Self {
        Self {
            roll_deg: 0.0,
            pitch_deg: 0.0,
            altitude_ft: 10_000.0,
            airspeed_kt: 300.0,
            heading_deg: 90.0,
        }
    }
}

/// Supplies HUD readings, once per frame.
pub trait HudProvider {
    fn hud_state(&mut self, frame_index: u64) -> HudState;
}

/// Constant readings.
impl HudProvider for HudState {
    fn hud_state(&mut self, _frame_index: u64) -> HudState {
        *self
    }
}

impl<F> HudProvider for F
where
    F: FnMut(u64) -> HudState,
{
    fn hud_state(&mut self, frame_index: u64) -> HudState {
        self(frame_index)
    }
}

/// Draw the attitude line, the airspeed and altitude labels, and the compass.
pub fn draw_hud(frame: &mut Frame, state: &HudState, config: &OverlayConfig) {
    let width = frame.width() as i64;
    let height = frame.height() as i64;
    let (cx, cy) = ((width / 2) as f64, (height / 2) as f64);

    let roll = state.roll_deg.to_radians();
    let pitch_offset = (state.pitch_deg * height as f64 / 90.0) as i64;
    let (reach_x, reach_y) = (ATTITUDE_HALF_LENGTH * roll.cos(), ATTITUDE_HALF_LENGTH * roll.sin());
    let from = ((cx - reach_x) as i64, (cy - reach_y) as i64 + pitch_offset);
    let to = ((cx + reach_x) as i64, (cy + reach_y) as i64 + pitch_offset);
    draw_line(frame, from, to, config.line_color, config.line_thickness);

    let text_scale = config.text_scale;
    draw_text(frame, &format!("ALT: {:.0} ft", state.altitude_ft), (50, 50), DIAL_COLOR, text_scale);
    draw_text(frame, &format!("SPD: {:.0} knots", state.airspeed_kt), (50, 100), DIAL_COLOR, text_scale);

    let center = (width - COMPASS_INSET, COMPASS_INSET);
    draw_circle(frame, center, COMPASS_RADIUS, DIAL_COLOR, HUD_STROKE);
    let heading = state.heading_deg.to_radians();
    let r = COMPASS_RADIUS as f64;
    let tip = (
        (center.0 as f64 + r * heading.sin()) as i64,
        (center.1 as f64 - r * heading.cos()) as i64,
    );
    draw_line(frame, center, tip, NEEDLE_COLOR, HUD_STROKE);
    draw_text(
        frame,
        &format!("HDG: {:.0}°", state.heading_deg),
        (center.0 - 70, center.1 + 70),
        DIAL_COLOR,
        text_scale,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> Frame {
        Frame::new(640, 480)
    }

    #[test]
    fn default_readings_match_the_simulator() {
        let hud = HudState::default();
        assert_eq!(hud.altitude_ft, 10_000.0);
        assert_eq!(hud.airspeed_kt, 300.0);
        assert_eq!(hud.heading_deg, 90.0);
        assert_eq!((hud.roll_deg, hud.pitch_deg), (0.0, 0.0));
    }

    #[test]
    fn closures_and_constants_provide_readings() {
        let mut constant = HudState::default();
        assert_eq!(constant.hud_state(7), HudState::default());

        let mut climbing = |i: u64| HudState {
            altitude_ft: 1000.0 + i as f64,
            ..HudState::default()
        };
        assert_eq!(climbing.hud_state(5).altitude_ft, 1005.0);
    }

    #[test]
    fn level_attitude_line_crosses_the_center() {
        let mut frame = blank();
        let config = OverlayConfig::default();
        draw_hud(&mut frame, &HudState::default(), &config);
        assert_eq!(frame.get_pixel(320, 240).0, config.line_color);
        assert_eq!(frame.get_pixel(120, 240).0, config.line_color);
        assert_eq!(frame.get_pixel(520, 240).0, config.line_color);
        assert_ne!(frame.get_pixel(560, 240).0, config.line_color);
    }

    #[test]
    fn pitch_shifts_the_attitude_line() {
        let mut frame = blank();
        let config = OverlayConfig::default();
        let state = HudState {
            pitch_deg: 9.0,
            ..HudState::default()
        };
        draw_hud(&mut frame, &state, &config);
        // 9 degrees on a 480-row frame moves the line 48 rows down.
        assert_eq!(frame.get_pixel(320, 288).0, config.line_color);
        assert_ne!(frame.get_pixel(320, 240).0, config.line_color);
    }

    #[test]
    fn compass_needle_points_east_at_ninety_degrees() {
        let mut frame = blank();
        draw_hud(&mut frame, &HudState::default(), &OverlayConfig::default());
        // Center (540, 100), needle toward (590, 100).
        assert_eq!(frame.get_pixel(565, 100).0, NEEDLE_COLOR);
        assert_eq!(frame.get_pixel(540, 75).0, [0, 0, 0]);
        // Dial ring directly above the center.
        assert_eq!(frame.get_pixel(540, 50).0, DIAL_COLOR);
    }
}
