//! Additive Gaussian noise augmentation.
//!
//! The only stage that touches the waveform directly: the source is decoded
//! to normalized samples, noise scaled to a fraction of the signal peak is
//! added, and the result is re-encoded in the source's own format.

use rand::Rng;
use rand_distr::StandardNormal;

use crate::audio;
use crate::config::AugmentStageConfig;
use crate::media::MediaTools;
use crate::pipeline::{self, PipelineError, RunCounters, TransformOutput};

/// Manifest column recording the derived file path.
pub const DERIVED_COLUMN: &str = "augmented_audio_noise";
/// Filename suffix for derived files.
pub const SUFFIX: &str = "_noise";

/// Base noise level as a fraction of the signal peak.
const NOISE_LEVEL: f32 = 0.02;

/// Add Gaussian noise to normalized samples, clamped back to [-1.0, 1.0].
///
/// The amplitude is `0.02 × U(0.5, 1.0) × peak_absolute_sample`, so silence
/// stays silent and quiet recordings receive proportionally quiet noise.
/// Returns the noisy samples and the drawn amplitude.
pub fn add_noise<R: Rng + ?Sized>(samples: &[f32], rng: &mut R) -> (Vec<f32>, f32) {
    let peak = audio::peak_absolute_sample(samples);
    let amplitude = NOISE_LEVEL * rng.random_range(0.5..1.0f32) * peak;
    let noisy = samples
        .iter()
        .map(|&sample| {
            let noise: f32 = rng.sample(StandardNormal);
            (sample + amplitude * noise).clamp(-1.0, 1.0)
        })
        .collect();
    (noisy, amplitude)
}

/// Run the noise stage over the configured manifest.
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
            let (samples, spec) = audio::read_samples(source)?;
            let (noisy, amplitude) = add_noise(&samples, rng);
            let derived = output_dir.join(pipeline::derived_file_name(file_name, SUFFIX));
            audio::write_samples(&derived, &noisy, spec)?;
            Ok(TransformOutput {
                derived_path: derived,
                detail: Some(format!("noise amplitude {amplitude:.5}")),
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn noisy_samples_stay_within_the_valid_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let samples: Vec<f32> = (0..4096)
            .map(|i| ((i as f32) * 0.01).sin() * 0.999)
            .collect();
        let (noisy, amplitude) = add_noise(&samples, &mut rng);
        assert_eq!(noisy.len(), samples.len());
        assert!(amplitude > 0.0);
        assert!(noisy.iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn amplitude_scales_with_the_signal_peak() {
        let loud: Vec<f32> = vec![0.8; 512];
        let quiet: Vec<f32> = vec![0.08; 512];
        let (_, loud_amp) = add_noise(&loud, &mut StdRng::seed_from_u64(5));
        let (_, quiet_amp) = add_noise(&quiet, &mut StdRng::seed_from_u64(5));
        assert!((loud_amp / quiet_amp - 10.0).abs() < 1e-3);
        // Bounds follow from amplitude = 0.02 * U(0.5, 1.0) * peak.
        assert!(loud_amp >= 0.02 * 0.5 * 0.8);
        assert!(loud_amp <= 0.02 * 0.8);
    }

    #[test]
    fn silence_stays_silent() {
        let mut rng = StdRng::seed_from_u64(9);
        let (noisy, amplitude) = add_noise(&vec![0.0; 256], &mut rng);
        assert_eq!(amplitude, 0.0);
        assert!(noisy.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let samples: Vec<f32> = (0..128).map(|i| (i as f32 / 128.0) - 0.5).collect();
        let (a, amp_a) = add_noise(&samples, &mut StdRng::seed_from_u64(42));
        let (b, amp_b) = add_noise(&samples, &mut StdRng::seed_from_u64(42));
        assert_eq!(amp_a, amp_b);
        assert_eq!(a, b);
    }
}
