//! Random low-pass filter augmentation via the external transcoder.
//!
//! Each row draws its own cutoff frequency so the augmented corpus covers a
//! band of muffled variants rather than one fixed response.

use rand::Rng;

use crate::config::AugmentStageConfig;
use crate::media::MediaTools;
use crate::pipeline::{self, PipelineError, RunCounters, TransformOutput};

/// Manifest column recording the derived file path.
pub const DERIVED_COLUMN: &str = "augmented_audio_lowpass";
/// Filename suffix for derived files.
pub const SUFFIX: &str = "_lowpass";

/// Inclusive cutoff frequency range in Hz.
pub const CUTOFF_RANGE_HZ: std::ops::RangeInclusive<u32> = 3000..=6000;

/// Draw a cutoff frequency for one row.
pub fn draw_cutoff_hz<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.random_range(CUTOFF_RANGE_HZ)
}

/// Transcoder arguments for a low-pass filter at `cutoff_hz`.
pub fn transcode_args(cutoff_hz: u32) -> Vec<String> {
    vec!["-af".to_string(), format!("lowpass=f={cutoff_hz}")]
}

/// Run the low-pass stage over the configured manifest.
pub fn run<R: Rng + ?Sized>(
    config: &AugmentStageConfig,
    tools: &MediaTools,
    rng: &mut R,
) -> Result<RunCounters, PipelineError> {
    let output_dir = config.output_dir.clone();
    pipeline::run_stage(
        config,
        DERIVED_COLUMN,
        |path| tools.probe_duration_secs(path),
        move |source, file_name| {
            let cutoff_hz = draw_cutoff_hz(rng);
            let derived = output_dir.join(pipeline::derived_file_name(file_name, SUFFIX));
            tools.transcode(source, &derived, &transcode_args(cutoff_hz))?;
            Ok(TransformOutput {
                derived_path: derived,
                detail: Some(format!("cutoff {cutoff_hz} Hz")),
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn cutoffs_stay_within_the_configured_band() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let cutoff = draw_cutoff_hz(&mut rng);
            assert!(CUTOFF_RANGE_HZ.contains(&cutoff), "cutoff {cutoff} out of range");
        }
    }

    #[test]
    fn args_embed_the_drawn_cutoff() {
        assert_eq!(transcode_args(4500), vec!["-af", "lowpass=f=4500"]);
    }
}
