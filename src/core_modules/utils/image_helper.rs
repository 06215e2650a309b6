pub mod image_helper {
    use crate::core_modules::frame::Frame;
    use crate::error::Result;
    use image::ImageEncoder;
    use std::io::BufWriter;
    use std::path::Path;

    /// Extensions recognised as still frames, lowercase.
    pub const FRAME_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

    /// Write `frame` as an 8-bit RGB PNG.
    pub fn save_frame(path: &Path, frame: &Frame) -> Result<()> {
        let output = BufWriter::new(std::fs::File::create(path)?);
        let encoder = image::codecs::png::PngEncoder::new(output);

        encoder.write_image(
            frame.as_raw(),
            frame.width(),
            frame.height(),
            image::ExtendedColorType::Rgb8,
        )?;

        Ok(())
    }

    /// Decode any supported still image into an RGB frame.
    pub fn load_frame(path: &Path) -> Result<Frame> {
        Ok(image::open(path)?.into_rgb8())
    }

    pub fn is_frame_file(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }
}
