//! Video container I/O through OpenCV's `videoio`.
//!
//! OpenCV works in BGR; frames are converted to and from RGB at this boundary so the
//! rest of the program never sees BGR.

use horizon_vision::{Codec, Frame, FrameSink, FrameSource, HorizonError, Result, StreamGeometry};
use opencv::{
    core::{self, Mat, Scalar},
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture, VideoWriter},
};
use std::path::Path;

fn path_str(path: &Path) -> std::result::Result<&str, String> {
    path.to_str().ok_or_else(|| "path is not valid UTF-8".to_string())
}

pub struct OpencvSource {
    cap: VideoCapture,
    width: u32,
    height: u32,
    frame_rate: f64,
}

impl OpencvSource {
    pub fn open(path: &Path) -> Result<Self> {
        let input_error = |reason: String| HorizonError::InputOpen {
            path: path.to_path_buf(),
            reason,
        };
        let name = path_str(path).map_err(input_error)?;
        let cap = VideoCapture::from_file(name, videoio::CAP_ANY).map_err(|e| input_error(e.to_string()))?;
        if !cap.is_opened().map_err(|e| input_error(e.to_string()))? {
            return Err(input_error("container or codec not supported".into()));
        }

        let prop = |id| cap.get(id).map_err(|e| input_error(e.to_string()));
        let width = prop(videoio::CAP_PROP_FRAME_WIDTH)? as u32;
        let height = prop(videoio::CAP_PROP_FRAME_HEIGHT)? as u32;
        let frame_rate = prop(videoio::CAP_PROP_FPS)?;

        Ok(Self {
            cap,
            width,
            height,
            frame_rate,
        })
    }
}

impl FrameSource for OpencvSource {
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
        let decode = |e: opencv::Error| HorizonError::FrameDecode(e.to_string());
        let mut bgr = Mat::default();
        if !self.cap.read(&mut bgr).map_err(decode)? || bgr.empty() {
            return Ok(None);
        }

        let mut rgb = Mat::default();
        imgproc::cvt_color(&bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0).map_err(decode)?;
        let (width, height) = (rgb.cols() as u32, rgb.rows() as u32);
        let bytes = rgb.data_bytes().map_err(decode)?.to_vec();
        Frame::from_raw(width, height, bytes)
            .map(Some)
            .ok_or_else(|| HorizonError::FrameDecode("decoded frame has an unexpected layout".into()))
    }
}

pub struct OpencvSink {
    writer: VideoWriter,
}

impl OpencvSink {
    pub fn open(path: &Path, geometry: StreamGeometry, codec: Codec) -> Result<Self> {
        let output_error = |reason: String| HorizonError::OutputOpen {
            path: path.to_path_buf(),
            reason,
        };
        let name = path_str(path).map_err(output_error)?;
        let [a, b, c, d] = codec.chars();
        let fourcc = VideoWriter::fourcc(a, b, c, d).map_err(|e| output_error(e.to_string()))?;
        let writer = VideoWriter::new(
            name,
            fourcc,
            geometry.frame_rate,
            core::Size::new(geometry.width as i32, geometry.height as i32),
            true,
        )
        .map_err(|e| output_error(e.to_string()))?;
        if !writer.is_opened().map_err(|e| output_error(e.to_string()))? {
            return Err(output_error(format!("no encoder for codec {codec}")));
        }
        Ok(Self { writer })
    }
}

impl FrameSink for OpencvSink {
    fn write(&mut self, frame: &Frame) -> Result<()> {
        let encode = |e: opencv::Error| HorizonError::OutputWrite(e.to_string());
        let mut rgb = Mat::new_rows_cols_with_default(
            frame.height() as i32,
            frame.width() as i32,
            core::CV_8UC3,
            Scalar::all(0.0),
        )
        .map_err(encode)?;
        rgb.data_bytes_mut().map_err(encode)?.copy_from_slice(frame.as_raw());

        let mut bgr = Mat::default();
        imgproc::cvt_color(&rgb, &mut bgr, imgproc::COLOR_RGB2BGR, 0).map_err(encode)?;
        self.writer.write(&bgr).map_err(encode)
    }

    fn close(mut self: Box<Self>) -> Result<()> {
        self.writer
            .release()
            .map_err(|e| HorizonError::OutputWrite(e.to_string()))
    }
}
