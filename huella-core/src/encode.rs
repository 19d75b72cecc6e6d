use tracing::warn;

use crate::config::EncoderConfig;
use crate::error::{Error, Result};
use crate::fractal::FractalPattern;
use crate::spectrum::ChunkTransform;

/// Encode a fractal watermark into audio samples (in-place).
///
/// The buffer is partitioned into consecutive `chunk_size` chunks. Each
/// full chunk is phase-rotated by a timing shift selected by cycling
/// through the normalized pattern; a trailing partial chunk passes through
/// unmodified, so output length always equals input length. Chunks whose
/// shift comes out to exactly zero are left untouched rather than paying
/// an FFT round trip.
pub fn encode(
    samples: &mut [f32],
    pattern: &FractalPattern,
    config: &EncoderConfig,
) -> Result<()> {
    config.validate()?;
    if samples.is_empty() {
        return Err(Error::EmptyAudio);
    }

    let normalized = match pattern.normalized() {
        Ok(normalized) => normalized,
        Err(Error::DegeneratePattern) => {
            warn!("all-zero fractal pattern, leaving audio unmodified");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let chunk_size = config.chunk_size;
    let max_shift = config.max_shift_samples();
    let num_chunks = samples.len() / chunk_size;

    let mut transform = ChunkTransform::new(chunk_size)?;

    for chunk_idx in 0..num_chunks {
        let shift = normalized[chunk_idx % normalized.len()] * max_shift;
        let offset = chunk_idx * chunk_size;
        transform.shift_chunk(&mut samples[offset..offset + chunk_size], shift)?;
    }

    Ok(())
}

/// Expected per-chunk shift sequence for `num_chunks` chunks of audio.
///
/// This is what [`encode`] applies and what the detector's matched filter
/// correlates against.
pub fn expected_shifts(
    pattern: &FractalPattern,
    config: &EncoderConfig,
    num_chunks: usize,
) -> Result<Vec<f32>> {
    let normalized = pattern.normalized()?;
    let max_shift = config.max_shift_samples();
    Ok((0..num_chunks)
        .map(|i| normalized[i % normalized.len()] * max_shift)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Seed;

    fn make_test_audio(num_samples: usize, sample_rate: u32) -> Vec<f32> {
        let mut samples = vec![0.0f32; num_samples];
        for (i, sample) in samples.iter_mut().enumerate() {
            let t = i as f32 / sample_rate as f32;
            for k in 1u32..80 {
                let freq = k as f32 * 60.0;
                let amp = 1.0 / (k as f32).sqrt();
                *sample += amp * (2.0 * std::f32::consts::PI * freq * t + k as f32).sin();
            }
        }
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
        if peak > 0.0 {
            for s in samples.iter_mut() {
                *s *= 0.5 / peak;
            }
        }
        samples
    }

    #[test]
    fn output_length_equals_input_length() {
        let config = EncoderConfig::default();
        let pattern = FractalPattern::generate(&Seed::from("len"), 100).unwrap();
        // Deliberately not a multiple of chunk_size
        let mut samples = make_test_audio(config.chunk_size * 5 + 777, config.sample_rate);
        let before = samples.len();
        encode(&mut samples, &pattern, &config).unwrap();
        assert_eq!(samples.len(), before);
    }

    #[test]
    fn zero_strength_is_identity() {
        let config = EncoderConfig {
            strength_ms: 0.0,
            ..EncoderConfig::default()
        };
        let pattern = FractalPattern::generate(&Seed::from("identity"), 100).unwrap();
        let original = make_test_audio(config.chunk_size * 4, config.sample_rate);
        let mut encoded = original.clone();
        encode(&mut encoded, &pattern, &config).unwrap();
        assert_eq!(original, encoded);
    }

    #[test]
    fn trailing_partial_chunk_untouched() {
        let config = EncoderConfig {
            strength_ms: 0.2,
            ..EncoderConfig::default()
        };
        let pattern = FractalPattern::generate(&Seed::from("tail"), 100).unwrap();
        let original = make_test_audio(config.chunk_size * 3 + 500, config.sample_rate);
        let mut encoded = original.clone();
        encode(&mut encoded, &pattern, &config).unwrap();

        let tail_start = config.chunk_size * 3;
        assert_eq!(&original[tail_start..], &encoded[tail_start..]);
        // But the full chunks were modified
        assert_ne!(&original[..tail_start], &encoded[..tail_start]);
    }

    #[test]
    fn encode_perturbs_but_preserves() {
        let config = EncoderConfig::default();
        let pattern = FractalPattern::generate(&Seed::from("preserve"), 100).unwrap();
        let original = make_test_audio(config.chunk_size * 8, config.sample_rate);
        let mut encoded = original.clone();
        encode(&mut encoded, &pattern, &config).unwrap();

        let max_diff: f32 = original
            .iter()
            .zip(encoded.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f32, f32::max);
        assert!(max_diff > 0.0, "encoding had no effect");
        assert!(max_diff < 0.05, "distortion too high: {max_diff}");
    }

    #[test]
    fn degenerate_pattern_is_noop() {
        let config = EncoderConfig::default();
        let pattern = FractalPattern::from_values(vec![0.0; 100]).unwrap();
        let original = make_test_audio(config.chunk_size * 4, config.sample_rate);
        let mut encoded = original.clone();
        encode(&mut encoded, &pattern, &config).unwrap();
        assert_eq!(original, encoded);
    }

    #[test]
    fn empty_audio_rejected() {
        let config = EncoderConfig::default();
        let pattern = FractalPattern::generate(&Seed::from("empty"), 100).unwrap();
        let mut samples: Vec<f32> = Vec::new();
        assert!(matches!(
            encode(&mut samples, &pattern, &config),
            Err(Error::EmptyAudio)
        ));
    }

    #[test]
    fn audio_shorter_than_one_chunk_passes_through() {
        let config = EncoderConfig {
            strength_ms: 0.2,
            ..EncoderConfig::default()
        };
        let pattern = FractalPattern::generate(&Seed::from("short"), 100).unwrap();
        let original = make_test_audio(config.chunk_size / 2, config.sample_rate);
        let mut encoded = original.clone();
        encode(&mut encoded, &pattern, &config).unwrap();
        assert_eq!(original, encoded);
    }

    #[test]
    fn expected_shifts_cycle_through_pattern() {
        let config = EncoderConfig::default();
        let pattern = FractalPattern::generate(&Seed::from("cycle"), 100).unwrap();
        let shifts = expected_shifts(&pattern, &config, 250).unwrap();
        assert_eq!(shifts.len(), 250);
        assert_eq!(shifts[0], shifts[100]);
        assert_eq!(shifts[37], shifts[137]);
    }
}
