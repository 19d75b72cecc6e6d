use tracing::{debug, warn};

use crate::config::EncoderConfig;
use crate::encode::expected_shifts;
use crate::error::{Error, Result};
use crate::fractal::FractalPattern;
use crate::spectrum::ChunkTransform;

/// Outcome of verifying an encoded buffer against its original and a
/// claimed pattern.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    /// Pearson correlation between original and encoded samples, in [-1, 1].
    /// Near 1.0 means the encoding is imperceptible.
    pub correlation: f32,
    /// Matched-filter correlation between the measured per-chunk shifts and
    /// the shifts the claimed pattern would have applied.
    pub pattern_correlation: f32,
    /// Whether `correlation` clears the configured preservation threshold.
    pub preserved: bool,
    /// Whether `pattern_correlation` clears the detection threshold, i.e.
    /// the buffer carries the claimed seed's watermark.
    pub detected: bool,
}

impl DetectionResult {
    /// The encoding is both imperceptible and carries the claimed pattern.
    pub fn meets_standards(&self) -> bool {
        self.preserved && self.detected
    }
}

/// Pearson correlation coefficient between two equal-length sample slices.
///
/// Returns 0.0 when either slice has zero variance (a constant signal has
/// no meaningful correlation).
pub fn pearson(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let n = a.len();
    if n < 2 {
        return 0.0;
    }

    let mean_a = a.iter().map(|&x| x as f64).sum::<f64>() / n as f64;
    let mean_b = b.iter().map(|&x| x as f64).sum::<f64>() / n as f64;

    let mut cov = 0.0f64;
    let mut var_a = 0.0f64;
    let mut var_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let dx = x as f64 - mean_a;
        let dy = y as f64 - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a <= 0.0 || var_b <= 0.0 {
        return 0.0;
    }
    (cov / (var_a * var_b).sqrt()) as f32
}

/// Matched-filter score between measured and expected shift sequences.
///
/// Correlates first differences rather than raw values. Fractal patterns
/// are smooth, so two unrelated patterns can share enough low-frequency
/// shape to correlate around 0.3-0.5 by chance; differencing whitens them
/// and collapses chance correlation toward zero while a genuine match
/// stays near 1.
pub fn matched_filter_score(measured: &[f32], expected: &[f32]) -> f32 {
    debug_assert_eq!(measured.len(), expected.len());
    if measured.len() < 3 {
        return 0.0;
    }
    let diff = |s: &[f32]| -> Vec<f32> { s.windows(2).map(|w| w[1] - w[0]).collect() };
    pearson(&diff(measured), &diff(expected))
}

/// Measure the per-chunk timing shift between an original and an encoded
/// buffer.
///
/// Both buffers are truncated to the shorter length; one shift estimate is
/// produced per full chunk. This is the raw signal the matched-filter
/// detector consumes, and is also useful on its own for tuning sweeps.
pub fn measure_shifts(
    original: &[f32],
    encoded: &[f32],
    config: &EncoderConfig,
) -> Result<Vec<f32>> {
    config.validate()?;
    if original.is_empty() || encoded.is_empty() {
        return Err(Error::EmptyAudio);
    }

    let chunk_size = config.chunk_size;
    let len = original.len().min(encoded.len());
    let num_chunks = len / chunk_size;

    let mut transform = ChunkTransform::new(chunk_size)?;
    let mut shifts = Vec::with_capacity(num_chunks);

    for chunk_idx in 0..num_chunks {
        let offset = chunk_idx * chunk_size;
        shifts.push(transform.estimate_chunk_shift(
            &original[offset..offset + chunk_size],
            &encoded[offset..offset + chunk_size],
        )?);
    }

    Ok(shifts)
}

/// Verify that `encoded` preserves `original` and carries the watermark of
/// the claimed `pattern`.
///
/// Preservation is the overall Pearson correlation between the two buffers
/// against `correlation_threshold`. Detection is a matched filter: the
/// measured per-chunk shifts are correlated against the shift sequence the
/// claimed pattern implies, so an unrelated seed's pattern scores near zero
/// and is rejected.
pub fn verify(
    original: &[f32],
    encoded: &[f32],
    pattern: &FractalPattern,
    config: &EncoderConfig,
) -> Result<DetectionResult> {
    config.validate()?;
    if original.is_empty() || encoded.is_empty() {
        return Err(Error::EmptyAudio);
    }

    let len = original.len().min(encoded.len());
    let correlation = pearson(&original[..len], &encoded[..len]);
    let preserved = correlation > config.correlation_threshold;

    let measured = measure_shifts(&original[..len], &encoded[..len], config)?;
    let pattern_correlation = match expected_shifts(pattern, config, measured.len()) {
        Ok(expected) => matched_filter_score(&measured, &expected),
        Err(Error::DegeneratePattern) => {
            warn!("all-zero claimed pattern, nothing to detect against");
            0.0
        }
        Err(e) => return Err(e),
    };
    let detected = pattern_correlation > config.detection_threshold;

    debug!(
        correlation,
        pattern_correlation,
        preserved,
        detected,
        chunks = measured.len(),
        "verification complete"
    );

    Ok(DetectionResult {
        correlation,
        pattern_correlation,
        preserved,
        detected,
    })
}
