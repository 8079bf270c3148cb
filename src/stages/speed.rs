//! Fixed 2x speed augmentation via the external transcoder.

use crate::config::AugmentStageConfig;
use crate::media::MediaTools;
use crate::pipeline::{self, PipelineError, RunCounters, TransformOutput};

/// Manifest column recording the derived file path.
pub const DERIVED_COLUMN: &str = "augmented_audio_2x";
/// Filename suffix for derived files.
pub const SUFFIX: &str = "_2x";

/// Tempo multiplier applied to every row.
const TEMPO: f64 = 2.0;

/// Transcoder arguments for the speed change.
pub fn transcode_args() -> Vec<String> {
    vec!["-filter:a".to_string(), format!("atempo={TEMPO:.1}")]
}

/// Run the 2x speed stage over the configured manifest.
pub fn run(config: &AugmentStageConfig, tools: &MediaTools) -> Result<RunCounters, PipelineError> {
    let output_dir = config.output_dir.clone();
    pipeline::run_stage(
        config,
        DERIVED_COLUMN,
        |path| tools.probe_duration_secs(path),
        move |source, file_name| {
            let derived = output_dir.join(pipeline::derived_file_name(file_name, SUFFIX));
            tools.transcode(source, &derived, &transcode_args())?;
            Ok(TransformOutput {
                derived_path: derived,
                detail: None,
            })
        },
    )
}
