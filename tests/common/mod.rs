#![allow(dead_code)]

use horizon_vision::{
    Codec, Frame, FrameSink, FrameSource, HorizonError, Notifier, PathProvider, Result,
    StreamGeometry, VideoBackend,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub const WIDTH: u32 = 400;
pub const HEIGHT: u32 = 200;
pub const HORIZON_ROW: u32 = 150;

/// Bright sky above `row`, dark ground from `row` down.
pub fn horizon_frame(width: u32, height: u32, row: u32) -> Frame {
    Frame::from_fn(width, height, |_, y| {
        if y < row {
            image::Rgb([210, 220, 230])
        } else {
            image::Rgb([50, 45, 40])
        }
    })
}

pub fn featureless_frame() -> Frame {
    Frame::from_pixel(WIDTH, HEIGHT, image::Rgb([120, 120, 120]))
}

/// Shared record of everything the in-memory backend saw.
#[derive(Debug, Default)]
pub struct Recording {
    pub sources_opened: usize,
    pub sources_dropped: usize,
    pub sinks_opened: usize,
    pub sinks_closed: usize,
    pub sink_geometry: Option<StreamGeometry>,
    pub sink_codec: Option<Codec>,
    pub written: Vec<Frame>,
}

/// Failures to inject into the in-memory backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Faults {
    pub fail_source_open: bool,
    pub fail_sink_open: bool,
    /// Decode error on the n-th read.
    pub fail_read_at: Option<usize>,
    /// Encode error on the n-th write.
    pub fail_write_at: Option<usize>,
    /// Container finalization error from `close`.
    pub fail_close: bool,
}

pub struct MemoryBackend {
    frames: Vec<Frame>,
    frame_rate: f64,
    pub faults: Faults,
    pub recording: Rc<RefCell<Recording>>,
}

impl MemoryBackend {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            frame_rate: 25.0,
            faults: Faults::default(),
            recording: Rc::default(),
        }
    }

    pub fn with_faults(mut self, faults: Faults) -> Self {
        self.faults = faults;
        self
    }
}

struct MemorySource {
    frames: VecDeque<Frame>,
    geometry: StreamGeometry,
    reads: usize,
    fail_read_at: Option<usize>,
    recording: Rc<RefCell<Recording>>,
}

impl FrameSource for MemorySource {
    fn width(&self) -> u32 {
        self.geometry.width
    }

    fn height(&self) -> u32 {
        self.geometry.height
    }

    fn frame_rate(&self) -> f64 {
        self.geometry.frame_rate
    }

    fn read(&mut self) -> Result<Option<Frame>> {
        let index = self.reads;
        self.reads += 1;
        if self.fail_read_at == Some(index) {
            return Err(HorizonError::FrameDecode(format!("corrupt frame {index}")));
        }
        Ok(self.frames.pop_front())
    }
}

impl Drop for MemorySource {
    fn drop(&mut self) {
        self.recording.borrow_mut().sources_dropped += 1;
    }
}

struct MemorySink {
    writes: usize,
    fail_write_at: Option<usize>,
    fail_close: bool,
    recording: Rc<RefCell<Recording>>,
}

impl FrameSink for MemorySink {
    fn write(&mut self, frame: &Frame) -> Result<()> {
        let index = self.writes;
        self.writes += 1;
        if self.fail_write_at == Some(index) {
            return Err(HorizonError::OutputWrite(format!("disk full at frame {index}")));
        }
        self.recording.borrow_mut().written.push(frame.clone());
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.recording.borrow_mut().sinks_closed += 1;
        if self.fail_close {
            return Err(HorizonError::OutputWrite("moov atom not written".into()));
        }
        Ok(())
    }
}

impl VideoBackend for MemoryBackend {
    fn open_source(&mut self, path: &Path) -> Result<Box<dyn FrameSource>> {
        if self.faults.fail_source_open {
            return Err(HorizonError::InputOpen {
                path: path.to_path_buf(),
                reason: "unsupported codec".into(),
            });
        }
        self.recording.borrow_mut().sources_opened += 1;
        let (width, height) = self.frames.first().map(|f| f.dimensions()).unwrap_or((WIDTH, HEIGHT));
        Ok(Box::new(MemorySource {
            frames: self.frames.clone().into(),
            geometry: StreamGeometry {
                width,
                height,
                frame_rate: self.frame_rate,
            },
            reads: 0,
            fail_read_at: self.faults.fail_read_at,
            recording: Rc::clone(&self.recording),
        }))
    }

    fn open_sink(
        &mut self,
        path: &Path,
        geometry: StreamGeometry,
        codec: Codec,
    ) -> Result<Box<dyn FrameSink>> {
        if self.faults.fail_sink_open {
            return Err(HorizonError::OutputOpen {
                path: path.to_path_buf(),
                reason: "read-only filesystem".into(),
            });
        }
        let mut recording = self.recording.borrow_mut();
        recording.sinks_opened += 1;
        recording.sink_geometry = Some(geometry);
        recording.sink_codec = Some(codec);
        Ok(Box::new(MemorySink {
            writes: 0,
            fail_write_at: self.faults.fail_write_at,
            fail_close: self.faults.fail_close,
            recording: Rc::clone(&self.recording),
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub messages: Vec<(Level, String, String)>,
}

impl RecordingNotifier {
    pub fn count(&self, level: Level) -> usize {
        self.messages.iter().filter(|(l, _, _)| *l == level).count()
    }

    pub fn contains(&self, level: Level, title: &str, message: &str) -> bool {
        self.messages
            .iter()
            .any(|(l, t, m)| *l == level && t == title && m == message)
    }
}

impl Notifier for RecordingNotifier {
    fn info(&mut self, title: &str, message: &str) {
        self.messages.push((Level::Info, title.into(), message.into()));
    }

    fn warn(&mut self, title: &str, message: &str) {
        self.messages.push((Level::Warn, title.into(), message.into()));
    }

    fn error(&mut self, title: &str, message: &str) {
        self.messages.push((Level::Error, title.into(), message.into()));
    }
}

pub struct FixedPaths {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl FixedPaths {
    pub fn both() -> Self {
        Self {
            input: Some("flight.mp4".into()),
            output: Some("flight_horizon.mp4".into()),
        }
    }
}

impl PathProvider for FixedPaths {
    fn input_path(&mut self) -> Option<PathBuf> {
        self.input.clone()
    }

    fn output_path(&mut self) -> Option<PathBuf> {
        self.output.clone()
    }
}
