//! Command-line stand-in for the input/output file dialogs.

use horizon_vision::PathProvider;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Container extensions offered for input videos.
pub const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "avi", "mov", "mkv"];
/// Appended to an output video path that has no extension.
pub const DEFAULT_VIDEO_EXTENSION: &str = "mp4";

pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| VIDEO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Paths taken from the command line.
#[derive(Debug, Clone)]
pub struct CliPaths {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    /// The output is a frame directory rather than a video file.
    sequence_output: bool,
}

impl CliPaths {
    pub fn new(input: Option<PathBuf>, output: Option<PathBuf>, sequence_output: bool) -> Self {
        Self {
            input,
            output,
            sequence_output,
        }
    }
}

impl PathProvider for CliPaths {
    fn input_path(&mut self) -> Option<PathBuf> {
        let path = self.input.clone()?;
        if !path.as_os_str().is_empty() && !path.is_dir() && !is_video_file(&path) {
            warn!(path = %path.display(), "input is neither a frame directory nor a known video type");
        }
        Some(path)
    }

    fn output_path(&mut self) -> Option<PathBuf> {
        let mut path = self.output.clone()?;
        if path.as_os_str().is_empty() {
            return Some(path);
        }
        if !self.sequence_output && path.extension().is_none() {
            path.set_extension(DEFAULT_VIDEO_EXTENSION);
        }
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_extensions_are_case_insensitive() {
        assert!(is_video_file(Path::new("flight.MP4")));
        assert!(is_video_file(Path::new("/tmp/a.mkv")));
        assert!(!is_video_file(Path::new("notes.txt")));
        assert!(!is_video_file(Path::new("frames")));
    }

    #[test]
    fn bare_output_name_gets_mp4() {
        let mut paths = CliPaths::new(Some("in.mp4".into()), Some("out".into()), false);
        assert_eq!(paths.output_path(), Some(PathBuf::from("out.mp4")));
        assert_eq!(paths.input_path(), Some(PathBuf::from("in.mp4")));
    }

    #[test]
    fn sequence_output_keeps_directory_name() {
        let mut paths = CliPaths::new(Some("in.mp4".into()), Some("frames_out".into()), true);
        assert_eq!(paths.output_path(), Some(PathBuf::from("frames_out")));
    }

    #[test]
    fn missing_paths_stay_missing() {
        let mut paths = CliPaths::new(None, None, false);
        assert_eq!(paths.input_path(), None);
        assert_eq!(paths.output_path(), None);

        let mut empty = CliPaths::new(Some(PathBuf::new()), Some(PathBuf::new()), false);
        assert_eq!(empty.output_path(), Some(PathBuf::new()));
    }
}
