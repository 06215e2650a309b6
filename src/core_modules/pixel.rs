// THEORY:
// The `Pixel` module is the most fundamental unit of the horizon engine. It is a
// "dumb" data container for a single RGB pixel of a `Frame` plus the two
// single-pixel operations every later stage needs:
// - `luma`: perceptual brightness (Rec. 601 weights), the first step of edge extraction.
// - `blend`: weighted interpolation toward a tint, the primitive behind the sky/ground
//   shading of the overlay compositor.
//
// Key principles:
// 1) Single-pixel scope: nothing here reads neighbors or other frames.
// 2) Byte in, byte out: results are rounded and saturated back to 0..=255 so that
//    identical inputs always produce identical output bytes.

pub mod pixel {
    use crate::config::Rgb;

    pub type Channel = u8;
    pub type Luminance = f64;

    /// A "dumb" data container representing a single RGB pixel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
    }

    impl Pixel {
        pub const fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Pixel { red, green, blue }
        }

        /// Luminance estimate (Rec. 601 luma), unrounded.
        pub fn luminance(&self) -> Luminance {
            0.299_f64 * self.red as f64 + 0.587_f64 * self.green as f64 + 0.114_f64 * self.blue as f64
        }

        /// Luma rounded to a byte.
        pub fn luma(&self) -> Channel {
            saturate(self.luminance())
        }

        /// `alpha * tint + (1 - alpha) * self`, per channel.
        pub fn blend(&self, tint: &Pixel, alpha: f64) -> Pixel {
            let mix = |base: Channel, over: Channel| {
                saturate(alpha * over as f64 + (1.0 - alpha) * base as f64)
            };
            Pixel {
                red: mix(self.red, tint.red),
                green: mix(self.green, tint.green),
                blue: mix(self.blue, tint.blue),
            }
        }
    }

    #[inline]
    fn saturate(value: f64) -> Channel {
        value.round().clamp(0.0, 255.0) as Channel
    }

    impl From<Rgb> for Pixel {
        fn from(rgb: Rgb) -> Self {
            Pixel::new(rgb[0], rgb[1], rgb[2])
        }
    }

    impl From<image::Rgb<u8>> for Pixel {
        fn from(rgb: image::Rgb<u8>) -> Self {
            Pixel::from(rgb.0)
        }
    }

    impl From<Pixel> for image::Rgb<u8> {
        fn from(pixel: Pixel) -> Self {
            image::Rgb([pixel.red, pixel.green, pixel.blue])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::pixel::*;

    #[test]
    fn luma_uses_perceptual_weights() {
        assert_eq!(Pixel::new(255, 255, 255).luma(), 255);
        assert_eq!(Pixel::new(0, 0, 0).luma(), 0);
        // Green dominates, blue contributes least.
        assert_eq!(Pixel::new(0, 255, 0).luma(), 150);
        assert_eq!(Pixel::new(255, 0, 0).luma(), 76);
        assert_eq!(Pixel::new(0, 0, 255).luma(), 29);
    }

    #[test]
    fn blend_interpolates_toward_tint() {
        let base = Pixel::new(100, 100, 100);
        let tint = Pixel::new(0, 0, 255);
        assert_eq!(base.blend(&tint, 0.0), base);
        assert_eq!(base.blend(&tint, 1.0), tint);
        assert_eq!(base.blend(&tint, 0.4), Pixel::new(60, 60, 162));
    }
}
