//! Container-to-WAV conversion with a duration filter.
//!
//! Unlike the augmentation stages this one is not manifest-driven: it scans
//! the input directory for `.webm` recordings, converts each to a normalized
//! PCM WAV, and copies only recordings at or under the duration threshold
//! into the kept directory consumed by the rest of the pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info};

use crate::config::ConvertConfig;
use crate::media::{MediaError, MediaTools};

/// Container extension picked up by the input scan.
const INPUT_EXTENSION: &str = "webm";

/// Transcoder arguments for the normalized WAV format: 16-bit PCM, 16 kHz,
/// mono.
pub fn transcode_args() -> Vec<String> {
    vec![
        "-acodec".to_string(),
        "pcm_s16le".to_string(),
        "-ar".to_string(),
        "16000".to_string(),
        "-ac".to_string(),
        "1".to_string(),
    ]
}

/// Tally of conversion outcomes.
#[derive(Debug, Default, Clone)]
pub struct ConvertCounters {
    /// Recordings converted and at or under the duration threshold.
    pub kept: usize,
    /// Recordings converted but over the threshold.
    pub skipped: usize,
    /// Recordings that failed to convert, probe, or copy.
    pub failed_files: Vec<String>,
}

/// Fatal conversion-stage errors; per-file failures are collected in
/// [`ConvertCounters::failed_files`].
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Input directory not found: {0}")]
    MissingInputDir(PathBuf),
    #[error("Failed to read input directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
enum RowFailure {
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error("Failed to copy {path}: {source}")]
    Copy {
        path: PathBuf,
        source: std::io::Error,
    },
}

enum RowOutcome {
    Kept(f64),
    Skipped(f64),
}

/// Run the conversion stage: scan, transcode, filter by duration.
pub fn run(config: &ConvertConfig, tools: &MediaTools) -> Result<ConvertCounters, ConvertError> {
    for dir in [&config.wav_dir, &config.kept_dir] {
        fs::create_dir_all(dir).map_err(|source| ConvertError::CreateDir {
            path: dir.clone(),
            source,
        })?;
    }

    let names = scan_input_files(&config.input_dir)?;
    info!(
        dir = %config.input_dir.display(),
        files = names.len(),
        "Starting conversion"
    );

    let mut counters = ConvertCounters::default();
    for name in names {
        match convert_one(config, tools, &name) {
            Ok(RowOutcome::Kept(duration)) => {
                info!(
                    file = %name,
                    duration_secs = format!("{duration:.1}"),
                    "Kept"
                );
                counters.kept += 1;
            }
            Ok(RowOutcome::Skipped(duration)) => {
                info!(
                    file = %name,
                    duration_secs = format!("{duration:.1}"),
                    "Skipped; duration above threshold"
                );
                counters.skipped += 1;
            }
            Err(err) => {
                error!(file = %name, error = %err, "Conversion failed");
                counters.failed_files.push(name);
            }
        }
    }
    Ok(counters)
}

/// List `.webm` filenames in the input directory, sorted for deterministic
/// run order.
fn scan_input_files(dir: &Path) -> Result<Vec<String>, ConvertError> {
    if !dir.is_dir() {
        return Err(ConvertError::MissingInputDir(dir.to_path_buf()));
    }
    let entries = fs::read_dir(dir).map_err(|source| ConvertError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ConvertError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(INPUT_EXTENSION) {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

fn convert_one(
    config: &ConvertConfig,
    tools: &MediaTools,
    name: &str,
) -> Result<RowOutcome, RowFailure> {
    let input = config.input_dir.join(name);
    let output_name = wav_file_name(name);
    let wav_path = config.wav_dir.join(&output_name);

    tools.transcode(&input, &wav_path, &transcode_args())?;
    // The probe runs against the converted WAV, not the container.
    let duration = tools.probe_duration_secs(&wav_path)?;

    if duration > config.max_duration_secs {
        return Ok(RowOutcome::Skipped(duration));
    }
    let kept_path = config.kept_dir.join(&output_name);
    fs::copy(&wav_path, &kept_path).map_err(|source| RowFailure::Copy {
        path: kept_path.clone(),
        source,
    })?;
    Ok(RowOutcome::Kept(duration))
}

/// Output filename: container stem with a `.wav` extension.
fn wav_file_name(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, _)) => format!("{stem}.wav"),
        None => format!("{name}.wav"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_request_pcm_16bit_16khz_mono() {
        assert_eq!(
            transcode_args(),
            vec!["-acodec", "pcm_s16le", "-ar", "16000", "-ac", "1"]
        );
    }

    #[test]
    fn wav_names_swap_the_container_extension() {
        assert_eq!(wav_file_name("take.webm"), "take.wav");
        assert_eq!(wav_file_name("a.b.webm"), "a.b.wav");
        assert_eq!(wav_file_name("noext"), "noext.wav");
    }
}
