//! Configuration for the horizon engine.
//!
//! Every threshold the per-frame stages use is carried here explicitly. The
//! selection policy has no default: a config file must name it, and Rust code
//! obtains a config through one of the named presets.

use crate::core_modules::horizon_selector::SelectionPolicy;
use crate::error::{HorizonError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// An RGB color, in the channel order of `Frame`.
pub type Rgb = [u8; 3];

/// Gap bridging for the short-gap preset (crisp single-horizon capture).
pub const SHORT_LINE_GAP: u32 = 10;
/// Gap bridging for the long-gap preset (partial or occluded horizons).
pub const LONG_LINE_GAP: u32 = 50;

/// Thickest horizon line `validate` accepts, in pixels.
pub const MAX_LINE_THICKNESS: u32 = 64;

/// Top-level configuration for `HorizonPipeline`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonConfig {
    /// Side of the square Gaussian smoothing kernel (odd, >= 3).
    #[serde(default = "default_blur_kernel_size")]
    pub blur_kernel_size: u32,

    /// Lower hysteresis threshold of the edge detector.
    #[serde(default = "default_edge_low")]
    pub edge_low: f32,

    /// Upper hysteresis threshold of the edge detector.
    #[serde(default = "default_edge_high")]
    pub edge_high: f32,

    /// Binarize with an Otsu threshold before edge detection.
    #[serde(default)]
    pub otsu_enabled: bool,

    pub hough: HoughParams,

    pub selection_policy: SelectionPolicy,

    #[serde(default)]
    pub overlay: OverlayConfig,

    /// Four-character code handed to the frame sink.
    #[serde(default)]
    pub codec: Codec,
}

/// Parameters of the probabilistic line detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoughParams {
    /// Distance resolution of the accumulator, in pixels.
    #[serde(default = "default_rho_resolution")]
    pub rho_resolution: f64,

    /// Angle resolution of the accumulator, in degrees.
    #[serde(default = "default_theta_resolution_deg")]
    pub theta_resolution_deg: f64,

    /// Minimum accumulator votes before a line is traced.
    #[serde(default = "default_vote_threshold")]
    pub vote_threshold: u32,

    /// Segments shorter than this (in both x and y extent) are rejected.
    #[serde(default = "default_min_line_length")]
    pub min_line_length: u32,

    /// Largest run of missing edge pixels bridged within one segment.
    pub max_line_gap: u32,

    /// Seed for the edge point shuffle.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl HoughParams {
    /// Short-gap preset, favoring crisp single-horizon capture.
    pub fn short_gap() -> Self {
        Self::with_gap(SHORT_LINE_GAP)
    }

    /// Long-gap preset, favoring partial or occluded horizons.
    pub fn long_gap() -> Self {
        Self::with_gap(LONG_LINE_GAP)
    }

    fn with_gap(max_line_gap: u32) -> Self {
        Self {
            rho_resolution: default_rho_resolution(),
            theta_resolution_deg: default_theta_resolution_deg(),
            vote_threshold: default_vote_threshold(),
            min_line_length: default_min_line_length(),
            max_line_gap,
            seed: default_seed(),
        }
    }
}

/// Rendering options for the overlay compositor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub line_color: Rgb,
    pub line_thickness: u32,
    pub sky_color: Rgb,
    pub ground_color: Rgb,
    pub text_color: Rgb,
    /// Integer magnification of the built-in 5x7 bitmap font.
    pub text_scale: u32,
    /// Opacity of the sky/ground tint, in [0, 1].
    pub alpha: f64,
    pub show_text: bool,
    pub show_hud: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            line_color: [0, 255, 0],
            line_thickness: 2,
            sky_color: [0, 0, 255],
            ground_color: [255, 0, 0],
            text_color: [255, 255, 255],
            text_scale: 3,
            alpha: 0.4,
            show_text: true,
            show_hud: false,
        }
    }
}

impl HorizonConfig {
    /// Policy A: first near-horizontal segment, short-gap preset, no Otsu.
    pub fn near_horizontal_first() -> Self {
        Self::preset(SelectionPolicy::NearHorizontalFirst, HoughParams::short_gap(), false)
    }

    /// Policy B: longest horizontal extent, long-gap preset, no Otsu.
    pub fn longest_extent() -> Self {
        Self::preset(SelectionPolicy::LongestHorizontalExtent, HoughParams::long_gap(), false)
    }

    /// Policy B on an Otsu-binarized frame, long-gap preset.
    pub fn contrast_normalized() -> Self {
        Self::preset(SelectionPolicy::LongestHorizontalExtent, HoughParams::long_gap(), true)
    }

    /// The preset each policy was tuned with.
    pub fn for_policy(policy: SelectionPolicy) -> Self {
        match policy {
            SelectionPolicy::NearHorizontalFirst => Self::near_horizontal_first(),
            SelectionPolicy::LongestHorizontalExtent => Self::longest_extent(),
        }
    }

    fn preset(selection_policy: SelectionPolicy, hough: HoughParams, otsu_enabled: bool) -> Self {
        Self {
            blur_kernel_size: default_blur_kernel_size(),
            edge_low: default_edge_low(),
            edge_high: default_edge_high(),
            otsu_enabled,
            hough,
            selection_policy,
            overlay: OverlayConfig::default(),
            codec: Codec::default(),
        }
    }

    /// Load and validate a config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| HorizonError::Config(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: HorizonConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.blur_kernel_size < 3 || self.blur_kernel_size % 2 == 0 {
            return Err(HorizonError::Config(format!(
                "blur_kernel_size must be odd and >= 3, got {}",
                self.blur_kernel_size
            )));
        }
        if !(self.edge_low >= 0.0 && self.edge_low <= self.edge_high) {
            return Err(HorizonError::Config(format!(
                "edge thresholds must satisfy 0 <= low <= high, got {}/{}",
                self.edge_low, self.edge_high
            )));
        }
        if !(self.hough.rho_resolution > 0.0) || !(self.hough.theta_resolution_deg > 0.0) {
            return Err(HorizonError::Config(
                "hough resolutions must be positive".to_string(),
            ));
        }
        if self.hough.theta_resolution_deg > 90.0 {
            return Err(HorizonError::Config(format!(
                "theta_resolution_deg must be <= 90, got {}",
                self.hough.theta_resolution_deg
            )));
        }
        if !(0.0..=1.0).contains(&self.overlay.alpha) {
            return Err(HorizonError::Config(format!(
                "overlay alpha must lie in [0, 1], got {}",
                self.overlay.alpha
            )));
        }
        if self.overlay.line_thickness > MAX_LINE_THICKNESS {
            return Err(HorizonError::Config(format!(
                "line_thickness must be <= {MAX_LINE_THICKNESS}, got {}",
                self.overlay.line_thickness
            )));
        }
        if self.overlay.text_scale == 0 {
            return Err(HorizonError::Config("text_scale must be >= 1".to_string()));
        }
        Ok(())
    }
}

/// A four-character video codec code, e.g. `mp4v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Codec(pub [u8; 4]);

impl Codec {
    pub const MP4V: Codec = Codec(*b"mp4v");

    pub fn chars(&self) -> [char; 4] {
        self.0.map(char::from)
    }
}

impl Default for Codec {
    fn default() -> Self {
        Codec::MP4V
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.chars() {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl TryFrom<String> for Codec {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        let bytes: [u8; 4] = value
            .as_bytes()
            .try_into()
            .map_err(|_| format!("codec must be exactly four ASCII characters, got {:?}", value))?;
        if !bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            return Err(format!("codec must be printable ASCII, got {:?}", value));
        }
        Ok(Codec(bytes))
    }
}

impl From<Codec> for String {
    fn from(codec: Codec) -> Self {
        codec.to_string()
    }
}

// Default value functions
fn default_blur_kernel_size() -> u32 {
    5
}
fn default_edge_low() -> f32 {
    50.0
}
fn default_edge_high() -> f32 {
    150.0
}
fn default_rho_resolution() -> f64 {
    1.0
}
fn default_theta_resolution_deg() -> f64 {
    1.0
}
fn default_vote_threshold() -> u32 {
    100
}
fn default_min_line_length() -> u32 {
    100
}
fn default_seed() -> u64 {
    // Fits a TOML integer.
    0xFFFF_FFFF
}
