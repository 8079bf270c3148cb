//! Random volume gain augmentation via the external transcoder.

use rand::Rng;

use crate::config::AugmentStageConfig;
use crate::media::MediaTools;
use crate::pipeline::{self, PipelineError, RunCounters, TransformOutput};

/// Manifest column recording the derived file path.
pub const DERIVED_COLUMN: &str = "augmented_audio_volume";
/// Filename suffix for derived files.
pub const SUFFIX: &str = "_volume";

/// Gain bounds in dB, inclusive on both ends.
pub const GAIN_RANGE_DB: std::ops::RangeInclusive<f64> = -3.0..=3.0;

/// Draw a gain for one row, rounded to two decimal places.
pub fn draw_gain_db<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let gain = rng.random_range(GAIN_RANGE_DB);
    (gain * 100.0).round() / 100.0
}

/// Transcoder arguments applying `gain_db` of volume change.
pub fn transcode_args(gain_db: f64) -> Vec<String> {
    vec!["-filter:a".to_string(), format!("volume={gain_db}dB")]
}

/// Run the volume stage over the configured manifest.
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
            let gain_db = draw_gain_db(rng);
            let derived = output_dir.join(pipeline::derived_file_name(file_name, SUFFIX));
            tools.transcode(source, &derived, &transcode_args(gain_db))?;
            Ok(TransformOutput {
                derived_path: derived,
                detail: Some(format!("gain {gain_db:+.2} dB")),
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn gains_stay_within_bounds_at_two_decimals() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let gain = draw_gain_db(&mut rng);
            assert!(GAIN_RANGE_DB.contains(&gain), "gain {gain} out of range");
            let hundredths = gain * 100.0;
            assert!(
                (hundredths - hundredths.round()).abs() < 1e-9,
                "gain {gain} not rounded to 2 decimals"
            );
        }
    }

    #[test]
    fn args_embed_the_drawn_gain() {
        assert_eq!(transcode_args(1.25), vec!["-filter:a", "volume=1.25dB"]);
        assert_eq!(transcode_args(-0.5), vec!["-filter:a", "volume=-0.5dB"]);
    }
}
