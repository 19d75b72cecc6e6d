//! Fractal phase-shift audio watermarking.
//!
//! A seed deterministically expands into a midpoint-displacement noise
//! pattern; the pattern drives sub-sample timing shifts applied to audio
//! chunks as frequency-domain phase rotations. Verification measures the
//! per-chunk shifts back out of an encoded buffer and matched-filters them
//! against the claimed seed's pattern.
//!
//! Data flow: seed -> [`FractalPattern`] -> [`encode`] -> encoded audio ->
//! [`verify`] -> [`DetectionResult`].

pub mod config;
pub mod detect;
pub mod encode;
pub mod error;
pub mod fractal;
pub mod phase;
pub mod seed;
pub mod spectrum;

#[cfg(feature = "parallel")]
pub mod parallel;

// Re-export primary API types
pub use config::EncoderConfig;
pub use detect::DetectionResult;
pub use error::Error;
pub use fractal::FractalPattern;
pub use seed::Seed;

#[cfg(feature = "parallel")]
pub use parallel::{encode_parallel, verify_parallel};

/// Encode a fractal watermark into audio samples (in-place).
///
/// Output length always equals input length; a trailing partial chunk is
/// passed through unmodified.
pub fn encode(
    samples: &mut [f32],
    pattern: &FractalPattern,
    config: &EncoderConfig,
) -> error::Result<()> {
    encode::encode(samples, pattern, config)
}

/// Verify that `encoded` preserves `original` and carries the watermark of
/// the claimed `pattern`.
pub fn verify(
    original: &[f32],
    encoded: &[f32],
    pattern: &FractalPattern,
    config: &EncoderConfig,
) -> error::Result<DetectionResult> {
    detect::verify(original, encoded, pattern, config)
}

/// Measure the per-chunk timing shifts between an original and an encoded
/// buffer, one estimate per full chunk.
pub fn measure_shifts(
    original: &[f32],
    encoded: &[f32],
    config: &EncoderConfig,
) -> error::Result<Vec<f32>> {
    detect::measure_shifts(original, encoded, config)
}
