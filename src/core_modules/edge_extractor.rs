// THEORY:
// The `EdgeExtractor` is the first stage of the per-frame pipeline. It turns a color
// `Frame` into a binary `EdgeMap` in four exact, reproducible steps:
//
// 1.  **Luma**: collapse RGB to one channel with Rec. 601 weights (`Pixel::luma`).
// 2.  **Smoothing**: a separable Gaussian of side `blur_kernel_size`; sigma is derived
//     from the kernel size as `0.3 * ((k - 1) * 0.5 - 1) + 0.8`. The filter runs in
//     `f32` and is rounded back to bytes once, at the end.
// 3.  **Contrast normalization** (optional): binarize at the Otsu level, the gray
//     level that maximizes the between-class variance of the histogram.
// 4.  **Dual-threshold edges**: Sobel gradients (L1 magnitude), non-maximum
//     suppression along the quantized gradient direction, then hysteresis: pixels
//     above `high` seed edges, pixels above `low` join them through 8-connectivity.
//
// Filtering and gradients come from `imageproc`. Its own `edges::canny` is not used
// because it always applies a fixed sigma 1.4 blur of its own; only the suppression
// and hysteresis steps are written out here.
//
// The extractor is stateless. It keeps only the precomputed kernel and thresholds,
// and the returned map is the only output.

use crate::config::HorizonConfig;
use crate::core_modules::frame::{EDGE, EdgeMap, Frame};
use crate::core_modules::pixel::pixel::Pixel;
use image::{GrayImage, ImageBuffer, Luma};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use imageproc::filter::separable_filter_equal;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

const TAN_22_5: f32 = 0.414_213_57;
const TAN_67_5: f32 = 2.414_213_6;

/// Converts frames into binary edge maps.
#[derive(Debug, Clone)]
pub struct EdgeExtractor {
    kernel: Vec<f32>,
    low: f32,
    high: f32,
    otsu_enabled: bool,
}

impl EdgeExtractor {
    pub fn new(config: &HorizonConfig) -> Self {
        Self {
            kernel: gaussian_kernel(config.blur_kernel_size as usize),
            low: config.edge_low,
            high: config.edge_high,
            otsu_enabled: config.otsu_enabled,
        }
    }

    pub fn extract(&self, frame: &Frame) -> EdgeMap {
        let gray = to_luma(frame);
        let blurred = gaussian_blur(&gray, &self.kernel);
        let source = if self.otsu_enabled {
            normalize_contrast(&blurred)
        } else {
            blurred
        };
        canny(&source, self.low, self.high)
    }
}

/// Single-channel luma of a frame.
pub fn to_luma(frame: &Frame) -> GrayImage {
    let mut gray = GrayImage::new(frame.width(), frame.height());
    for (out, rgb) in gray.pixels_mut().zip(frame.pixels()) {
        out.0[0] = Pixel::from(*rgb).luma();
    }
    gray
}

/// Normalized 1D Gaussian taps for a `ksize`-wide kernel.
pub fn gaussian_kernel(ksize: usize) -> Vec<f32> {
    let sigma = 0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (ksize / 2) as f64;
    let taps: Vec<f64> = (0..ksize)
        .map(|i| {
            let d = i as f64 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = taps.iter().sum();
    taps.iter().map(|t| (t / sum) as f32).collect()
}

/// Separable convolution with `kernel` along both axes, rounded back to bytes.
pub fn gaussian_blur(gray: &GrayImage, kernel: &[f32]) -> GrayImage {
    let float: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
            Luma([gray.get_pixel(x, y).0[0] as f32])
        });
    let smoothed = separable_filter_equal(&float, kernel);
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        Luma([smoothed.get_pixel(x, y).0[0].round().clamp(0.0, 255.0) as u8])
    })
}

/// Binarize at the Otsu level: pixels above it become 255, the rest 0.
pub fn normalize_contrast(gray: &GrayImage) -> GrayImage {
    threshold(gray, otsu_level(gray), ThresholdType::Binary)
}

/// Dual-threshold gradient edge detection.
pub fn canny(gray: &GrayImage, low: f32, high: f32) -> EdgeMap {
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    let mut edges = EdgeMap::new(gray.width(), gray.height());
    if w == 0 || h == 0 {
        return edges;
    }
    // --- 1. Sobel gradients ---
    let gx_image = horizontal_sobel(gray);
    let gy_image = vertical_sobel(gray);
    let (gx, gy) = (gx_image.as_raw(), gy_image.as_raw());
    let magnitude: Vec<f32> = gx
        .iter()
        .zip(gy.iter())
        .map(|(&dx, &dy)| ((dx as i32).abs() + (dy as i32).abs()) as f32)
        .collect();

    let mag = |x: isize, y: isize| -> f32 {
        if x < 0 || y < 0 || x >= w as isize || y >= h as isize {
            0.0
        } else {
            magnitude[y as usize * w + x as usize]
        }
    };

    // --- 2. Non-maximum suppression + threshold classification ---
    const NONE: u8 = 0;
    const WEAK: u8 = 1;
    const STRONG: u8 = 2;
    let mut class = vec![NONE; w * h];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            let m = magnitude[idx];
            if m <= low {
                continue;
            }
            let (xi, yi) = (x as isize, y as isize);
            let ax = gx[idx].abs() as f32;
            let ay = gy[idx].abs() as f32;
            let is_max = if ay <= ax * TAN_22_5 {
                m > mag(xi - 1, yi) && m >= mag(xi + 1, yi)
            } else if ay > ax * TAN_67_5 {
                m > mag(xi, yi - 1) && m >= mag(xi, yi + 1)
            } else {
                let s: isize = if (gx[idx] < 0) != (gy[idx] < 0) { -1 } else { 1 };
                m > mag(xi - s, yi - 1) && m > mag(xi + s, yi + 1)
            };
            if !is_max {
                continue;
            }
            if m > high {
                class[idx] = STRONG;
                stack.push((x, y));
            } else {
                class[idx] = WEAK;
            }
        }
    }

    // --- 3. Hysteresis: grow strong edges through weak neighbors ---
    while let Some((x, y)) = stack.pop() {
        for dy in -1isize..=1 {
            for dx in -1isize..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = x as isize + dx;
                let ny = y as isize + dy;
                if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                    continue;
                }
                let nidx = ny as usize * w + nx as usize;
                if class[nidx] == WEAK {
                    class[nidx] = STRONG;
                    stack.push((nx as usize, ny as usize));
                }
            }
        }
    }

    let dst: &mut [u8] = &mut edges;
    for (out, c) in dst.iter_mut().zip(class.iter()) {
        if *c == STRONG {
            *out = EDGE;
        }
    }
    edges
}
