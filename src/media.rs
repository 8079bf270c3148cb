//! Wrappers around the external transcode and probe tools.
//!
//! Each invocation is synchronous and blocks until the tool exits. Stderr is
//! captured and surfaced in the error when a tool exits non-zero, so per-row
//! failures carry the tool's own diagnostics.

use std::{
    path::{Path, PathBuf},
    process::Command,
};

use thiserror::Error;
use tracing::debug;

/// Errors from invoking the external media tools.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        source: std::io::Error,
    },
    #[error("{program} failed on {path} ({status}): {stderr}")]
    ToolFailed {
        program: String,
        path: PathBuf,
        status: String,
        stderr: String,
    },
    #[error("Unparsable duration '{output}' reported for {path}")]
    Duration { path: PathBuf, output: String },
}

/// External tool programs used by the stages.
///
/// The program names are configurable so tests can substitute stubs.
#[derive(Debug, Clone)]
pub struct MediaTools {
    transcoder: String,
    prober: String,
}

impl Default for MediaTools {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

impl MediaTools {
    /// Create wrappers around the given transcoder and prober programs.
    pub fn new(transcoder: impl Into<String>, prober: impl Into<String>) -> Self {
        Self {
            transcoder: transcoder.into(),
            prober: prober.into(),
        }
    }

    /// Transcode `input` to `output` with the given codec or filter args.
    ///
    /// Arguments are inserted between the input and output paths, matching
    /// `ffmpeg -i <input> <args..> <output> -y -loglevel error`. The output
    /// is overwritten when it already exists.
    pub fn transcode(
        &self,
        input: &Path,
        output: &Path,
        args: &[String],
    ) -> Result<(), MediaError> {
        let mut command = Command::new(&self.transcoder);
        command.arg("-i").arg(input);
        command.args(args);
        command
            .arg(output)
            .arg("-y")
            .args(["-loglevel", "error"]);
        debug!(input = %input.display(), output = %output.display(), "Running transcode");
        let result = command.output().map_err(|source| MediaError::Launch {
            program: self.transcoder.clone(),
            source,
        })?;
        if !result.status.success() {
            return Err(MediaError::ToolFailed {
                program: self.transcoder.clone(),
                path: input.to_path_buf(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    /// Probe a media file's duration in seconds.
    ///
    /// Runs the prober with `format=duration` output only; anything other
    /// than a decimal number on stdout is an error.
    pub fn probe_duration_secs(&self, path: &Path) -> Result<f64, MediaError> {
        let result = Command::new(&self.prober)
            .args(["-v", "error"])
            .args(["-show_entries", "format=duration"])
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .arg(path)
            .output()
            .map_err(|source| MediaError::Launch {
                program: self.prober.clone(),
                source,
            })?;
        if !result.status.success() {
            return Err(MediaError::ToolFailed {
                program: self.prober.clone(),
                path: path.to_path_buf(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }
        let output = String::from_utf8_lossy(&result.stdout);
        parse_duration_secs(output.trim()).ok_or_else(|| MediaError::Duration {
            path: path.to_path_buf(),
            output: output.trim().to_string(),
        })
    }
}

fn parse_duration_secs(output: &str) -> Option<f64> {
    let value = output.parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}
