//! Error types for the horizon engine.
//!
//! Every fatal condition the orchestrator can hit maps onto one variant here.
//! End of stream is not an error (`FrameSource::read` returns `Ok(None)`), and a
//! frame without a horizon candidate is handled by the selection policy.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HorizonError {
    #[error("no input video selected")]
    NoInputSelected,

    #[error("no output file specified")]
    NoOutputSpecified,

    #[error("failed to open input {path:?}: {reason}")]
    InputOpen { path: PathBuf, reason: String },

    #[error("failed to open output {path:?}: {reason}")]
    OutputOpen { path: PathBuf, reason: String },

    #[error("failed to decode frame: {0}")]
    FrameDecode(String),

    #[error("failed to write frame: {0}")]
    OutputWrite(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl From<toml::de::Error> for HorizonError {
    fn from(e: toml::de::Error) -> Self {
        HorizonError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HorizonError>;
