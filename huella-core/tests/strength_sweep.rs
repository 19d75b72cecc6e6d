//! Property checks across encoding strengths: how correlation degrades as
//! shifts grow, and the documented sweet spot where the encoding is both
//! present and imperceptible.

use huella_core::detect::pearson;
use huella_core::{EncoderConfig, FractalPattern, Seed};

fn make_sine(freq: f32, seconds: f32, sample_rate: u32) -> Vec<f32> {
    let num_samples = (seconds * sample_rate as f32) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            0.5 * (2.0 * std::f32::consts::PI * freq * t).sin()
        })
        .collect()
}

fn make_broadband(num_samples: usize, sample_rate: u32) -> Vec<f32> {
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
fn correlation_non_increasing_in_strength() {
    let seed = Seed::from("sweep-seed");
    let original = make_broadband(2048 * 40, 44100);

    let strengths = [0.0f32, 0.005, 0.01, 0.05, 0.1, 0.2, 0.5];
    let mut correlations = Vec::new();

    for &strength_ms in &strengths {
        let config = EncoderConfig {
            strength_ms,
            ..EncoderConfig::default()
        };
        let pattern = FractalPattern::generate(&seed, config.pattern_len).unwrap();
        let mut encoded = original.clone();
        huella_core::encode(&mut encoded, &pattern, &config).unwrap();
        correlations.push(pearson(&original, &encoded));
    }

    assert_eq!(correlations[0], 1.0, "zero strength must be an exact no-op");
    for w in correlations.windows(2) {
        assert!(
            w[1] <= w[0] + 1e-6,
            "correlation increased with strength: {correlations:?}"
        );
    }
}

#[test]
fn sweet_spot_sine_scenario() {
    // 2 seconds of 440 Hz at 44100 Hz, encoded at 0.01 ms with the
    // documented seed: imperceptible (correlation > 0.999) yet not a no-op.
    let config = EncoderConfig {
        sample_rate: 44100,
        strength_ms: 0.01,
        chunk_size: 2048,
        ..EncoderConfig::default()
    };
    let seed = Seed::from("artist_fractal_seed_123");
    let pattern = FractalPattern::generate(&seed, config.pattern_len).unwrap();

    let original = make_sine(440.0, 2.0, config.sample_rate);
    let mut encoded = original.clone();
    huella_core::encode(&mut encoded, &pattern, &config).unwrap();

    assert_eq!(encoded.len(), original.len());
    assert_ne!(original, encoded, "sweet-spot encoding must not be a no-op");

    let corr = pearson(&original, &encoded);
    assert!(corr > 0.999, "sweet-spot correlation too low: {corr}");
}

#[test]
fn sweet_spot_range_preserves_audio() {
    let original = make_broadband(2048 * 40, 44100);
    let pattern = FractalPattern::generate(&Seed::from("range-seed"), 100).unwrap();

    for &strength_ms in &[0.001f32, 0.005, 0.01] {
        let config = EncoderConfig {
            strength_ms,
            ..EncoderConfig::default()
        };
        let mut encoded = original.clone();
        huella_core::encode(&mut encoded, &pattern, &config).unwrap();
        let corr = pearson(&original, &encoded);
        assert!(
            corr > 0.999,
            "strength {strength_ms} ms: correlation {corr} below sweet-spot bound"
        );
    }
}

#[test]
fn detection_rejects_unrelated_seed_across_strengths() {
    let original = make_broadband(2048 * 48, 44100);
    let pattern_a = FractalPattern::generate(&Seed::from("owner-seed"), 100).unwrap();
    let pattern_b = FractalPattern::generate(&Seed::from("impostor-seed"), 100).unwrap();

    for &strength_ms in &[0.05f32, 0.2, 0.5] {
        let config = EncoderConfig {
            strength_ms,
            ..EncoderConfig::default()
        };
        let mut encoded = original.clone();
        huella_core::encode(&mut encoded, &pattern_a, &config).unwrap();

        let own = huella_core::verify(&original, &encoded, &pattern_a, &config).unwrap();
        let other = huella_core::verify(&original, &encoded, &pattern_b, &config).unwrap();

        assert!(
            own.detected,
            "strength {strength_ms} ms: owner's seed not detected: {own:?}"
        );
        assert!(
            !other.detected,
            "strength {strength_ms} ms: impostor seed detected: {other:?}"
        );
    }
}
