//! Direct WAV sample I/O for transforms that touch the waveform.
//!
//! Samples are exposed as normalized `f32` regardless of on-disk format so
//! transforms work in one domain; writing converts back to the source spec.

use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec};
use thiserror::Error;

/// Errors from decoding or encoding a WAV file.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Failed to open wav {path}: {source}")]
    Open { path: PathBuf, source: hound::Error },
    #[error("Failed to decode sample in {path}: {source}")]
    Decode { path: PathBuf, source: hound::Error },
    #[error("Failed to encode wav {path}: {source}")]
    Encode { path: PathBuf, source: hound::Error },
}

/// Read all samples from a WAV file as interleaved normalized `f32`.
///
/// Integer formats are scaled into [-1.0, 1.0]; the original spec is
/// returned so the caller can re-encode in the same format.
pub fn read_samples(path: &Path) -> Result<(Vec<f32>, WavSpec), AudioError> {
    let mut reader = hound::WavReader::open(path).map_err(|source| AudioError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let spec = reader.spec();
    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .map(|sample| {
                sample.map_err(|source| AudioError::Decode {
                    path: path.to_path_buf(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let scale = (1i64 << spec.bits_per_sample.saturating_sub(1)).max(1) as f32;
            reader
                .samples::<i32>()
                .map(|sample| {
                    sample
                        .map(|value| value as f32 / scale)
                        .map_err(|source| AudioError::Decode {
                            path: path.to_path_buf(),
                            source,
                        })
                })
                .collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok((samples, spec))
}

/// Write normalized `f32` samples back to disk under the given spec.
///
/// Integer specs rescale and saturate at the integer range; float specs
/// write the samples as-is.
pub fn write_samples(path: &Path, samples: &[f32], spec: WavSpec) -> Result<(), AudioError> {
    let mut writer = hound::WavWriter::create(path, spec).map_err(|source| AudioError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    let map_err = |source| AudioError::Encode {
        path: path.to_path_buf(),
        source,
    };
    match spec.sample_format {
        SampleFormat::Float => {
            for &sample in samples {
                writer.write_sample(sample).map_err(map_err)?;
            }
        }
        SampleFormat::Int => {
            let scale = (1i64 << spec.bits_per_sample.saturating_sub(1)).max(1) as f32;
            let max = scale - 1.0;
            for &sample in samples {
                let value = (sample * scale).round().clamp(-scale, max) as i32;
                writer.write_sample(value).map_err(map_err)?;
            }
        }
    }
    writer.finalize().map_err(|source| AudioError::Encode {
        path: path.to_path_buf(),
        source,
    })
}

/// Largest absolute sample value, or 0.0 for an empty buffer.
pub fn peak_absolute_sample(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |peak, &sample| {
        let magnitude = sample.abs();
        if magnitude > peak { magnitude } else { peak }
    })
}
