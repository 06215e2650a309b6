//! Picks a frame source and sink for each path.
//!
//! Directories are image sequences. Anything else is a video container, which needs
//! the `opencv` feature.

use crate::image_sequence::{ImageSequenceSink, ImageSequenceSource};
use horizon_vision::{Codec, FrameSink, FrameSource, HorizonError, Result, StreamGeometry, VideoBackend};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct CliBackend {
    /// Frame rate for image directories without a manifest.
    pub sequence_frame_rate: f64,
    /// Write frames to a directory instead of a video container.
    pub sequence_output: bool,
}

impl VideoBackend for CliBackend {
    fn open_source(&mut self, path: &Path) -> Result<Box<dyn FrameSource>> {
        if path.is_dir() {
            return Ok(Box::new(ImageSequenceSource::open(path, self.sequence_frame_rate)?));
        }
        open_video_source(path)
    }

    fn open_sink(
        &mut self,
        path: &Path,
        geometry: StreamGeometry,
        codec: Codec,
    ) -> Result<Box<dyn FrameSink>> {
        if self.sequence_output {
            return Ok(Box::new(ImageSequenceSink::open(path, geometry, codec)?));
        }
        open_video_sink(path, geometry, codec)
    }
}

#[cfg(feature = "opencv")]
fn open_video_source(path: &Path) -> Result<Box<dyn FrameSource>> {
    Ok(Box::new(crate::opencv_video::OpencvSource::open(path)?))
}

#[cfg(not(feature = "opencv"))]
fn open_video_source(path: &Path) -> Result<Box<dyn FrameSource>> {
    Err(HorizonError::InputOpen {
        path: path.to_path_buf(),
        reason: "video decoding needs the `opencv` feature; pass a frame directory instead".into(),
    })
}

#[cfg(feature = "opencv")]
fn open_video_sink(path: &Path, geometry: StreamGeometry, codec: Codec) -> Result<Box<dyn FrameSink>> {
    Ok(Box::new(crate::opencv_video::OpencvSink::open(path, geometry, codec)?))
}

#[cfg(not(feature = "opencv"))]
fn open_video_sink(path: &Path, _geometry: StreamGeometry, _codec: Codec) -> Result<Box<dyn FrameSink>> {
    Err(HorizonError::OutputOpen {
        path: path.to_path_buf(),
        reason: "video encoding needs the `opencv` feature; use --sequence instead".into(),
    })
}
