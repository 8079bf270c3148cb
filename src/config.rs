//! Stage configuration with the dataset's directory and manifest-chain
//! conventions as defaults.
//!
//! Defaults encode the conventional chain: conversion fills
//! `filteredforwhisper/`, the volume stage reads the base manifest and each
//! later augmentation stage reads its predecessor's output manifest, with the
//! speed stage branching off the base manifest. An optional `wavprep.toml`
//! overrides any of it, and CLI flags override both through the same
//! override structs.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Default filename for the optional configuration file.
pub const CONFIG_FILE_NAME: &str = "wavprep.toml";

/// Duration threshold shared by the conversion filter and the augmentation
/// stages' skip predicate.
pub const DEFAULT_MAX_DURATION_SECS: f64 = 30.0;

/// Errors returned while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// External tool program names.
#[derive(Debug, Clone)]
pub struct ToolsConfig {
    pub ffmpeg: String,
    pub ffprobe: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

/// Settings for the container-to-WAV conversion stage.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Directory scanned for `.webm` recordings.
    pub input_dir: PathBuf,
    /// Directory receiving every converted WAV.
    pub wav_dir: PathBuf,
    /// Directory receiving only WAVs at or under the duration threshold.
    pub kept_dir: PathBuf,
    pub max_duration_secs: f64,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("webaudios"),
            wav_dir: PathBuf::from("wavaudios"),
            kept_dir: PathBuf::from("filteredforwhisper"),
            max_duration_secs: DEFAULT_MAX_DURATION_SECS,
        }
    }
}

/// Settings for one manifest-driven augmentation stage.
#[derive(Debug, Clone)]
pub struct AugmentStageConfig {
    /// Directory holding the source WAVs named by the manifest.
    pub input_dir: PathBuf,
    /// Directory receiving the derived files.
    pub output_dir: PathBuf,
    /// Manifest read at the start of the run.
    pub input_manifest: PathBuf,
    /// Manifest written at the end of the run.
    pub output_manifest: PathBuf,
    /// Rows with a probed duration above this are skipped; `None` disables
    /// the filter.
    pub max_duration_secs: Option<f64>,
}

impl AugmentStageConfig {
    fn stage(
        output_dir: &str,
        input_manifest: &str,
        output_manifest: &str,
        max_duration_secs: Option<f64>,
    ) -> Self {
        Self {
            input_dir: PathBuf::from("filteredforwhisper"),
            output_dir: PathBuf::from(output_dir),
            input_manifest: PathBuf::from(input_manifest),
            output_manifest: PathBuf::from(output_manifest),
            max_duration_secs,
        }
    }

    /// Defaults for the 2x speed stage, which runs without a duration
    /// filter.
    pub fn speed() -> Self {
        Self::stage("augmented_2x", "recordings.csv", "recordings_speed.csv", None)
    }

    /// Defaults for the volume-gain stage, first link of the manifest chain.
    pub fn volume() -> Self {
        Self::stage(
            "augmented_volume",
            "recordings.csv",
            "recordings_volume.csv",
            Some(DEFAULT_MAX_DURATION_SECS),
        )
    }

    /// Defaults for the additive-noise stage, chained after volume.
    pub fn noise() -> Self {
        Self::stage(
            "augmented_noise",
            "recordings_volume.csv",
            "recordings_noise.csv",
            Some(DEFAULT_MAX_DURATION_SECS),
        )
    }

    /// Defaults for the low-pass stage, chained after noise.
    pub fn lowpass() -> Self {
        Self::stage(
            "augmented_lowpass",
            "recordings_noise.csv",
            "recordings_lowpass.csv",
            Some(DEFAULT_MAX_DURATION_SECS),
        )
    }
}

/// Partial overrides for [`ToolsConfig`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ToolsOverrides {
    pub ffmpeg: Option<String>,
    pub ffprobe: Option<String>,
}

impl ToolsConfig {
    /// Apply any set override fields on top of this config.
    pub fn apply(&mut self, overrides: &ToolsOverrides) {
        if let Some(ffmpeg) = &overrides.ffmpeg {
            self.ffmpeg = ffmpeg.clone();
        }
        if let Some(ffprobe) = &overrides.ffprobe {
            self.ffprobe = ffprobe.clone();
        }
    }
}

/// Partial overrides for [`ConvertConfig`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConvertOverrides {
    pub input_dir: Option<PathBuf>,
    pub wav_dir: Option<PathBuf>,
    pub kept_dir: Option<PathBuf>,
    pub max_duration_secs: Option<f64>,
}

impl ConvertConfig {
    /// Apply any set override fields on top of this config.
    pub fn apply(&mut self, overrides: &ConvertOverrides) {
        if let Some(input_dir) = &overrides.input_dir {
            self.input_dir = input_dir.clone();
        }
        if let Some(wav_dir) = &overrides.wav_dir {
            self.wav_dir = wav_dir.clone();
        }
        if let Some(kept_dir) = &overrides.kept_dir {
            self.kept_dir = kept_dir.clone();
        }
        if let Some(max) = overrides.max_duration_secs {
            self.max_duration_secs = max;
        }
    }
}

/// Partial overrides for [`AugmentStageConfig`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StageOverrides {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub input_manifest: Option<PathBuf>,
    pub output_manifest: Option<PathBuf>,
    pub max_duration_secs: Option<f64>,
}

impl AugmentStageConfig {
    /// Apply any set override fields on top of this config.
    pub fn apply(&mut self, overrides: &StageOverrides) {
        if let Some(input_dir) = &overrides.input_dir {
            self.input_dir = input_dir.clone();
        }
        if let Some(output_dir) = &overrides.output_dir {
            self.output_dir = output_dir.clone();
        }
        if let Some(input_manifest) = &overrides.input_manifest {
            self.input_manifest = input_manifest.clone();
        }
        if let Some(output_manifest) = &overrides.output_manifest {
            self.output_manifest = output_manifest.clone();
        }
        if let Some(max) = overrides.max_duration_secs {
            self.max_duration_secs = Some(max);
        }
    }
}

/// Contents of an optional `wavprep.toml`, one section per stage.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub tools: ToolsOverrides,
    pub convert: ConvertOverrides,
    pub speed: StageOverrides,
    pub volume: StageOverrides,
    pub noise: StageOverrides,
    pub lowpass: StageOverrides,
}

/// Load overrides from `path`, returning defaults when the file is absent.
pub fn load_overrides(path: &Path) -> Result<ConfigFile, ConfigError> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_config_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let overrides = load_overrides(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        let mut config = AugmentStageConfig::volume();
        config.apply(&overrides.volume);
        assert_eq!(config.input_dir, PathBuf::from("filteredforwhisper"));
        assert_eq!(config.output_manifest, PathBuf::from("recordings_volume.csv"));
        assert_eq!(config.max_duration_secs, Some(DEFAULT_MAX_DURATION_SECS));
    }

    #[test]
    fn partial_section_overrides_only_named_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            "[volume]\noutput_dir = \"loud\"\n\n[tools]\nffmpeg = \"/opt/ffmpeg\"\n",
        )
        .unwrap();
        let overrides = load_overrides(&path).unwrap();

        let mut config = AugmentStageConfig::volume();
        config.apply(&overrides.volume);
        assert_eq!(config.output_dir, PathBuf::from("loud"));
        assert_eq!(config.input_manifest, PathBuf::from("recordings.csv"));

        let mut tools = ToolsConfig::default();
        tools.apply(&overrides.tools);
        assert_eq!(tools.ffmpeg, "/opt/ffmpeg");
        assert_eq!(tools.ffprobe, "ffprobe");
    }

    #[test]
    fn malformed_config_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[volume\noops").unwrap();
        assert!(matches!(
            load_overrides(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn manifest_chain_defaults_link_stage_outputs_to_inputs() {
        assert_eq!(
            AugmentStageConfig::volume().output_manifest,
            AugmentStageConfig::noise().input_manifest
        );
        assert_eq!(
            AugmentStageConfig::noise().output_manifest,
            AugmentStageConfig::lowpass().input_manifest
        );
        assert_eq!(AugmentStageConfig::speed().max_duration_secs, None);
    }
}
