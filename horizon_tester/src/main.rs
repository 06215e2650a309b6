mod backend;
mod image_sequence;
mod notify;
#[cfg(feature = "opencv")]
mod opencv_video;
mod paths;

use anyhow::Context;
use backend::CliBackend;
use clap::{Parser, ValueEnum};
use horizon_vision::{
    CancellationToken, HorizonConfig, HudState, VideoOrchestrator,
};
use notify::ConsoleNotifier;
use paths::CliPaths;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "horizon_tester")]
#[command(about = "Overlay the detected horizon and attitude readout onto a video")]
#[command(version)]
struct Cli {
    /// Input video file, or a directory of still frames.
    input: Option<PathBuf>,

    /// Output video file, or a directory when `--sequence` is set.
    output: Option<PathBuf>,

    /// TOML configuration file. Without one, the preset for `--policy` is used.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Horizon selection preset. With `--config`, it replaces the file's selection
    /// policy, Otsu switch and line gap; every other setting comes from the file.
    #[arg(long, value_enum)]
    policy: Option<Preset>,

    /// Write numbered PNG frames into the output directory.
    #[arg(long)]
    sequence: bool,

    /// Frame rate assumed for frame directories without a manifest.
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Draw the simulated instrument panel.
    #[arg(long)]
    hud: bool,

    /// Leave out the roll/pitch readout.
    #[arg(long)]
    no_text: bool,

    /// Simulated altitude in feet.
    #[arg(long, default_value_t = 10_000.0)]
    altitude: f64,

    /// Simulated airspeed in knots.
    #[arg(long, default_value_t = 300.0)]
    airspeed: f64,

    /// Simulated heading in degrees, clockwise from north.
    #[arg(long, default_value_t = 90.0)]
    heading: f64,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    print_config: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    /// First near-horizontal line, level fallback.
    NearHorizontalFirst,
    /// Widest line, no fallback.
    LongestExtent,
    /// Widest line after Otsu binarization.
    ContrastNormalized,
}

impl Preset {
    fn config(self) -> HorizonConfig {
        match self {
            Preset::NearHorizontalFirst => HorizonConfig::near_horizontal_first(),
            Preset::LongestExtent => HorizonConfig::longest_extent(),
            Preset::ContrastNormalized => HorizonConfig::contrast_normalized(),
        }
    }

    /// Overwrite the detection settings that make up this preset.
    fn apply(self, config: &mut HorizonConfig) {
        let preset = self.config();
        config.selection_policy = preset.selection_policy;
        config.otsu_enabled = preset.otsu_enabled;
        config.hough.max_line_gap = preset.hough.max_line_gap;
    }
}

fn resolve_config(cli: &Cli) -> anyhow::Result<HorizonConfig> {
    let mut config = match (&cli.config, cli.policy) {
        (Some(path), preset) => {
            let mut config = HorizonConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?;
            if let Some(preset) = preset {
                preset.apply(&mut config);
            }
            config
        }
        (None, Some(preset)) => preset.config(),
        (None, None) => HorizonConfig::near_horizontal_first(),
    };
    if cli.hud {
        config.overlay.show_hud = true;
    }
    if cli.no_text {
        config.overlay.show_text = false;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn try_main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    if cli.print_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(ExitCode::SUCCESS);
    }

    let cancel = CancellationToken::new();
    let handle = cancel.clone();
    ctrlc::set_handler(move || handle.cancel()).context("installing Ctrl-C handler")?;

    let backend = CliBackend {
        sequence_frame_rate: cli.fps,
        sequence_output: cli.sequence,
    };
    let mut orchestrator = VideoOrchestrator::new(config, backend, ConsoleNotifier)?;
    let mut paths = CliPaths::new(cli.input, cli.output, cli.sequence);
    let mut hud = HudState {
        altitude_ft: cli.altitude,
        airspeed_kt: cli.airspeed,
        heading_deg: cli.heading,
        ..HudState::default()
    };

    // Failures were already shown by the notifier.
    match orchestrator.run(&mut paths, &mut hud, &cancel) {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(_) => Ok(ExitCode::FAILURE),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("horizon_vision=info")),
        )
        .init();

    match try_main() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
