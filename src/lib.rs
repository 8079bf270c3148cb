//! Manifest-driven batch preparation of audio recordings for ASR training.
/// Direct WAV sample I/O.
pub mod audio;
/// Shared argument parsing for the stage binaries.
pub mod cli;
/// Stage configuration and the `wavprep.toml` overrides.
pub mod config;
/// Logging setup shared by the stage binaries.
pub mod logging;
/// Ordered CSV manifest of recordings.
pub mod manifest;
/// External transcode and probe tool wrappers.
pub mod media;
/// The manifest-driven per-file transform runner.
pub mod pipeline;
/// The five dataset preparation stages.
pub mod stages;
