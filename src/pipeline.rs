// THEORY:
// The `pipeline` module is the top-level API for the horizon engine. It has two
// layers:
//
// - `HorizonPipeline` runs the per-frame stages in sequence: edge extraction,
//   line detection, horizon selection, attitude estimation and overlay compositing.
//   It owns nothing but its configuration and the stage objects built from it, so
//   embedders can drive it from their own frame loop.
// - `VideoOrchestrator` drives a whole stream through the pipeline as a small state
//   machine, `Idle -> Streaming -> Draining -> Closed`. Everything outside the core
//   is injected through traits: where the paths come from (`PathProvider`), how
//   frames are decoded and encoded (`VideoBackend`, `FrameSource`, `FrameSink`) and
//   how the user is told what happened (`Notifier`).
//
// The frame loop is single-threaded and strictly sequential. Exactly one frame is
// resident at a time and every iteration starts from a fresh decode, so nothing is
// shared between iterations. Source and sink handles live in `run`'s scope and are
// released on every exit path: end of stream, cancellation and fatal errors alike.
// Failures are reported to the notifier exactly once, where they are detected, and
// then returned to the caller.

use crate::config::{Codec, HorizonConfig};
use crate::core_modules::attitude::HorizonEstimate;
use crate::core_modules::edge_extractor::EdgeExtractor;
use crate::core_modules::frame::Frame;
use crate::core_modules::horizon_selector::SelectionPolicy;
use crate::core_modules::line_detector::LineDetector;
use crate::core_modules::overlay::OverlayCompositor;
use crate::core_modules::overlay::hud::{HudProvider, HudState};
use crate::error::{HorizonError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};

/// Width, height and frame rate a source advertises before its first read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamGeometry {
    pub width: u32,
    pub height: u32,
    pub frame_rate: f64,
}

/// A decoded video stream. `read` returns `Ok(None)` at end of stream.
pub trait FrameSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn frame_rate(&self) -> f64;
    fn read(&mut self) -> Result<Option<Frame>>;

    fn geometry(&self) -> StreamGeometry {
        StreamGeometry {
            width: self.width(),
            height: self.height(),
            frame_rate: self.frame_rate(),
        }
    }
}

/// An encoded output stream. `close` flushes and finalizes the container.
pub trait FrameSink {
    fn write(&mut self, frame: &Frame) -> Result<()>;
    fn close(self: Box<Self>) -> Result<()>;
}

/// Opens sources and sinks for the orchestrator.
pub trait VideoBackend {
    fn open_source(&mut self, path: &Path) -> Result<Box<dyn FrameSource>>;
    fn open_sink(
        &mut self,
        path: &Path,
        geometry: StreamGeometry,
        codec: Codec,
    ) -> Result<Box<dyn FrameSink>>;
}

/// Supplies input and output paths. `None` or an empty path means the user gave none.
pub trait PathProvider {
    fn input_path(&mut self) -> Option<PathBuf>;
    fn output_path(&mut self) -> Option<PathBuf>;
}

/// User-facing messages, each with a short title.
pub trait Notifier {
    fn info(&mut self, title: &str, message: &str);
    fn warn(&mut self, title: &str, message: &str);
    fn error(&mut self, title: &str, message: &str);
}

/// Cooperative cancellation flag, shared between the orchestrator and whoever stops it.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Streaming,
    Draining,
    Closed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Streaming => "streaming",
            PipelineState::Draining => "draining",
            PipelineState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// What a completed run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames_processed: u64,
    pub frames_with_horizon: u64,
    pub cancelled: bool,
    pub final_state: PipelineState,
}

/// The per-frame horizon engine.
#[derive(Debug, Clone)]
pub struct HorizonPipeline {
    config: HorizonConfig,
    extractor: EdgeExtractor,
    detector: LineDetector,
    compositor: OverlayCompositor,
}

impl HorizonPipeline {
    /// Build the stages for `config`, rejecting invalid settings.
    pub fn new(config: HorizonConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            extractor: EdgeExtractor::new(&config),
            detector: LineDetector::new(&config.hough),
            compositor: OverlayCompositor::new(config.overlay.clone()).with_full_width_line(
                config.selection_policy == SelectionPolicy::NearHorizontalFirst,
            ),
            config,
        })
    }

    pub fn config(&self) -> &HorizonConfig {
        &self.config
    }

    /// Estimate the horizon in `frame` without touching its pixels.
    pub fn detect(&self, frame: &Frame) -> HorizonEstimate {
        let (width, height) = frame.dimensions();

        // Stage 1: Edge Extraction
        let edges = self.extractor.extract(frame);

        // Stage 2: Line Candidates
        let segments = self.detector.detect(&edges);
        if segments.is_empty() {
            debug!(policy = self.config.selection_policy.name(), "no horizon candidate");
        }

        // Stage 3: Horizon Selection
        let selected = self.config.selection_policy.select(&segments, width, height);

        // Stage 4: Attitude
        let estimate = HorizonEstimate::from_segment(selected, width, height);
        debug!(
            candidates = segments.len(),
            valid = estimate.valid(),
            roll_deg = estimate.roll_deg,
            pitch_deg = estimate.pitch_deg,
            "frame analysed"
        );
        estimate
    }

    /// Estimate the horizon and paint the overlay onto `frame` in place.
    pub fn process_frame(&self, frame: &mut Frame, hud: Option<&HudState>) -> HorizonEstimate {
        let estimate = self.detect(frame);
        // Stage 5: Overlay
        self.compositor.compose(frame, &estimate, hud);
        estimate
    }
}

/// Drives a whole video through a `HorizonPipeline`.
pub struct VideoOrchestrator<B: VideoBackend, N: Notifier> {
    pipeline: HorizonPipeline,
    backend: B,
    notifier: N,
    state: PipelineState,
    transitions: Vec<PipelineState>,
}

impl<B: VideoBackend, N: Notifier> VideoOrchestrator<B, N> {
    pub fn new(config: HorizonConfig, backend: B, notifier: N) -> Result<Self> {
        Ok(Self {
            pipeline: HorizonPipeline::new(config)?,
            backend,
            notifier,
            state: PipelineState::Idle,
            transitions: vec![PipelineState::Idle],
        })
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Every state visited by the last run, starting with `Idle`.
    pub fn transitions(&self) -> &[PipelineState] {
        &self.transitions
    }

    pub fn pipeline(&self) -> &HorizonPipeline {
        &self.pipeline
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    fn enter(&mut self, next: PipelineState) {
        info!(from = %self.state, to = %next, "pipeline state");
        self.state = next;
        self.transitions.push(next);
    }

    /// Process one video from the provider's input path to its output path.
    pub fn run(
        &mut self,
        paths: &mut dyn PathProvider,
        hud: &mut dyn HudProvider,
        cancel: &CancellationToken,
    ) -> Result<RunSummary> {
        self.state = PipelineState::Idle;
        self.transitions = vec![PipelineState::Idle];

        // --- Paths: abort before any resource is acquired ---
        let Some(input) = non_empty(paths.input_path()) else {
            self.notifier.warn("Input Required", "No input video selected.");
            return Err(HorizonError::NoInputSelected);
        };
        let Some(output) = non_empty(paths.output_path()) else {
            self.notifier.warn("Output Required", "No output file specified.");
            return Err(HorizonError::NoOutputSpecified);
        };

        // --- Acquire ---
        let mut source = match self.backend.open_source(&input) {
            Ok(source) => source,
            Err(e) => {
                error!(path = %input.display(), error = %e, "cannot open input");
                self.notifier.error("Error", "Failed to open the input video.");
                self.enter(PipelineState::Closed);
                return Err(e);
            }
        };
        let geometry = source.geometry();
        let codec = self.pipeline.config().codec;
        let mut sink = match self.backend.open_sink(&output, geometry, codec) {
            Ok(sink) => sink,
            Err(e) => {
                error!(path = %output.display(), error = %e, "cannot open output");
                self.notifier.error("Error", "Failed to open the output video.");
                drop(source);
                self.enter(PipelineState::Closed);
                return Err(e);
            }
        };
        info!(
            input = %input.display(),
            output = %output.display(),
            width = geometry.width,
            height = geometry.height,
            frame_rate = geometry.frame_rate,
            %codec,
            policy = self.pipeline.config().selection_policy.name(),
            "stream opened"
        );
        self.enter(PipelineState::Streaming);

        // --- Frame loop ---
        let show_hud = self.pipeline.config().overlay.show_hud;
        let mut frames_processed = 0u64;
        let mut frames_with_horizon = 0u64;
        let mut cancelled = false;
        loop {
            if cancel.is_cancelled() {
                info!(frames_processed, "cancellation requested");
                cancelled = true;
                break;
            }

            let mut frame = match source.read() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => return Err(self.abort(source, sink, e, "Failed to read a frame from the input video.")),
            };
            if frame.dimensions() != (geometry.width, geometry.height) {
                warn!(
                    frame = frames_processed,
                    width = frame.width(),
                    height = frame.height(),
                    "frame size differs from stream geometry"
                );
            }

            let hud_state = show_hud.then(|| hud.hud_state(frames_processed));
            let estimate = self.pipeline.process_frame(&mut frame, hud_state.as_ref());
            if estimate.valid() {
                frames_with_horizon += 1;
            }

            if let Err(e) = sink.write(&frame) {
                return Err(self.abort(source, sink, e, "Failed to write a frame to the output video."));
            }
            frames_processed += 1;
        }

        // --- Drain ---
        self.enter(PipelineState::Draining);
        drop(source);
        let finalized = sink.close();
        self.enter(PipelineState::Closed);

        if let Err(e) = finalized {
            error!(error = %e, frames_processed, "output did not finalize");
            self.notifier.error("Error", "Failed to finalize the output video.");
            return Err(e);
        }

        let summary = RunSummary {
            frames_processed,
            frames_with_horizon,
            cancelled,
            final_state: self.state,
        };
        info!(
            frames_processed,
            frames_with_horizon,
            cancelled,
            "run finished"
        );

        if cancelled {
            self.notifier.info("Cancelled", "Processing cancelled. Partial output saved.");
        } else {
            self.notifier.info("Success", "Processing complete. Output saved.");
        }
        Ok(summary)
    }

    /// Release both handles after a fatal mid-stream failure and report it once.
    fn abort(
        &mut self,
        source: Box<dyn FrameSource>,
        sink: Box<dyn FrameSink>,
        cause: HorizonError,
        message: &str,
    ) -> HorizonError {
        error!(error = %cause, "aborting stream");
        drop(source);
        if let Err(e) = sink.close() {
            warn!(error = %e, "output close failed after abort");
        }
        self.notifier.error("Error", message);
        self.enter(PipelineState::Closed);
        cause
    }
}

fn non_empty(path: Option<PathBuf>) -> Option<PathBuf> {
    path.filter(|p| !p.as_os_str().is_empty())
}
