//! A "video" stored as a directory of numbered still frames.
//!
//! The sink writes `frame_000000.png`, `frame_000001.png`, ... and, on close, a
//! `sequence.toml` manifest recording the stream geometry. The source reads every PNG
//! or JPEG in a directory in file-name order and takes its frame rate from the
//! manifest when one is present.

use horizon_vision::core_modules::utils::image_helper::image_helper::{
    is_frame_file, load_frame, save_frame,
};
use horizon_vision::{Codec, Frame, FrameSink, FrameSource, HorizonError, Result, StreamGeometry};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const MANIFEST_NAME: &str = "sequence.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceManifest {
    pub width: u32,
    pub height: u32,
    pub frame_rate: f64,
    pub frame_count: u64,
    pub codec: Codec,
}

impl SequenceManifest {
    fn read(dir: &Path) -> Option<Self> {
        let text = fs::read_to_string(dir.join(MANIFEST_NAME)).ok()?;
        toml::from_str(&text).ok()
    }
}

pub struct ImageSequenceSource {
    frames: std::vec::IntoIter<PathBuf>,
    width: u32,
    height: u32,
    frame_rate: f64,
}

impl ImageSequenceSource {
    /// Open `dir`, using `default_frame_rate` when it carries no manifest.
    pub fn open(dir: &Path, default_frame_rate: f64) -> Result<Self> {
        let input_error = |reason: String| HorizonError::InputOpen {
            path: dir.to_path_buf(),
            reason,
        };

        let mut frames: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(|e| input_error(e.to_string()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_frame_file(p))
            .collect();
        frames.sort();

        let (width, height) = match frames.first() {
            Some(first) => image::image_dimensions(first).map_err(|e| input_error(e.to_string()))?,
            None => match SequenceManifest::read(dir) {
                Some(m) => (m.width, m.height),
                None => return Err(input_error("directory holds no frames".into())),
            },
        };
        let frame_rate = SequenceManifest::read(dir)
            .map(|m| m.frame_rate)
            .unwrap_or(default_frame_rate);
        debug!(dir = %dir.display(), frames = frames.len(), "image sequence opened");

        Ok(Self {
            frames: frames.into_iter(),
            width,
            height,
            frame_rate,
        })
    }
}

impl FrameSource for ImageSequenceSource {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn read(&mut self) -> Result<Option<Frame>> {
        match self.frames.next() {
            Some(path) => load_frame(&path)
                .map(Some)
                .map_err(|e| HorizonError::FrameDecode(format!("{}: {e}", path.display()))),
            None => Ok(None),
        }
    }
}

pub struct ImageSequenceSink {
    dir: PathBuf,
    manifest: SequenceManifest,
}

impl ImageSequenceSink {
    pub fn open(dir: &Path, geometry: StreamGeometry, codec: Codec) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|e| HorizonError::OutputOpen {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
            manifest: SequenceManifest {
                width: geometry.width,
                height: geometry.height,
                frame_rate: geometry.frame_rate,
                frame_count: 0,
                codec,
            },
        })
    }

    pub fn frame_path(dir: &Path, index: u64) -> PathBuf {
        dir.join(format!("frame_{index:06}.png"))
    }
}

impl FrameSink for ImageSequenceSink {
    fn write(&mut self, frame: &Frame) -> Result<()> {
        let path = Self::frame_path(&self.dir, self.manifest.frame_count);
        save_frame(&path, frame)
            .map_err(|e| HorizonError::OutputWrite(format!("{}: {e}", path.display())))?;
        self.manifest.frame_count += 1;
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        let text = toml::to_string_pretty(&self.manifest)
            .map_err(|e| HorizonError::OutputWrite(e.to_string()))?;
        fs::write(self.dir.join(MANIFEST_NAME), text)?;
        Ok(())
    }
}
