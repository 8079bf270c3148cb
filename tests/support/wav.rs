use std::path::Path;

/// Write a 16-bit PCM mono WAV at 16 kHz from normalized samples.
pub fn write_pcm16_wav(path: &Path, samples: &[f32]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create wav parent dirs");
    }
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav writer");
    for &sample in samples {
        let value = (sample * 32768.0).round().clamp(-32768.0, 32767.0) as i16;
        writer.write_sample(value).expect("write wav sample");
    }
    writer.finalize().expect("finalize wav");
}

/// A short sine burst that stays comfortably inside [-1, 1].
pub fn sine_samples(len: usize) -> Vec<f32> {
    (0..len).map(|i| ((i as f32) * 0.05).sin() * 0.5).collect()
}
