// THEORY:
// This file is the main entry point for the `horizon_vision` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the public
// API that will be exposed to external consumers (like the `horizon_tester` runner).
//
// The primary goal is to export the `VideoOrchestrator`, the per-frame
// `HorizonPipeline` and their associated data structures (`HorizonConfig`,
// `HorizonEstimate`, `HudState`, etc.) as the high-level interface for the engine.
// The per-frame stages live in `core_modules`; they are public so each stage can
// be driven and tested on its own, but a typical consumer only needs the pipeline.
//
// Data flows strictly forward, one frame at a time:
//   Frame -> EdgeMap -> Vec<LineSegment> -> HorizonEstimate -> rendered Frame

pub mod config;
pub mod core_modules;
pub mod error;
pub mod pipeline;

pub use config::{Codec, HorizonConfig, HoughParams, OverlayConfig, Rgb};
pub use core_modules::attitude::HorizonEstimate;
pub use core_modules::frame::{EdgeMap, Frame, LineSegment};
pub use core_modules::horizon_selector::SelectionPolicy;
pub use core_modules::overlay::hud::{HudProvider, HudState};
pub use error::{HorizonError, Result};
pub use pipeline::{
    CancellationToken, FrameSink, FrameSource, HorizonPipeline, Notifier, PathProvider,
    PipelineState, RunSummary, StreamGeometry, VideoBackend, VideoOrchestrator,
};
