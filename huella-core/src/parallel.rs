//! Optional parallel processing using rayon.
//!
//! Enable with the `parallel` feature flag. Chunks are independent by
//! construction, so encoding and shift measurement parallelize freely; the
//! only ordering requirement is reassembling results in buffer order.

use rayon::prelude::*;
use tracing::warn;

use crate::config::EncoderConfig;
use crate::detect::{DetectionResult, matched_filter_score, pearson};
use crate::encode::expected_shifts;
use crate::error::{Error, Result};
use crate::fractal::FractalPattern;
use crate::spectrum::ChunkTransform;

/// Number of chunks processed per rayon task.
const BATCH_SIZE: usize = 64;

/// Encode a fractal watermark into audio samples in parallel.
///
/// Bit-identical to [`crate::encode`]: each task creates its own
/// [`ChunkTransform`] and processes a batch of chunks with the same
/// per-chunk math as the sequential path.
pub fn encode_parallel(
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

    // Trim to the chunk boundary; the trailing partial chunk passes through.
    let usable = num_chunks * chunk_size;
    let batch_len = BATCH_SIZE * chunk_size;

    samples[..usable]
        .par_chunks_mut(batch_len)
        .enumerate()
        .try_for_each(|(batch_idx, batch)| -> Result<()> {
            let mut transform = ChunkTransform::new(chunk_size)?;
            let base_chunk = batch_idx * BATCH_SIZE;
            let chunks_in_batch = batch.len() / chunk_size;

            for local in 0..chunks_in_batch {
                let chunk_idx = base_chunk + local;
                let shift = normalized[chunk_idx % normalized.len()] * max_shift;
                let offset = local * chunk_size;
                transform.shift_chunk(&mut batch[offset..offset + chunk_size], shift)?;
            }

            Ok(())
        })?;

    Ok(())
}

/// Measure per-chunk timing shifts in parallel.
pub fn measure_shifts_parallel(
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
    let usable = num_chunks * chunk_size;
    let batch_len = BATCH_SIZE * chunk_size;

    let batches: Vec<Vec<(usize, f32)>> = original[..usable]
        .par_chunks(batch_len)
        .zip(encoded[..usable].par_chunks(batch_len))
        .enumerate()
        .map(|(batch_idx, (orig_batch, enc_batch))| -> Result<Vec<(usize, f32)>> {
            let mut transform = ChunkTransform::new(chunk_size)?;
            let base_chunk = batch_idx * BATCH_SIZE;
            let chunks_in_batch = orig_batch.len() / chunk_size;

            let mut local = Vec::with_capacity(chunks_in_batch);
            for i in 0..chunks_in_batch {
                let offset = i * chunk_size;
                let shift = transform.estimate_chunk_shift(
                    &orig_batch[offset..offset + chunk_size],
                    &enc_batch[offset..offset + chunk_size],
                )?;
                local.push((base_chunk + i, shift));
            }
            Ok(local)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut shifts = vec![0.0f32; num_chunks];
    for batch in &batches {
        for &(idx, shift) in batch {
            shifts[idx] = shift;
        }
    }
    Ok(shifts)
}

/// Verify in parallel. Same semantics as [`crate::verify`]; the FFT-heavy
/// shift measurement is parallelized, the scoring stays sequential.
pub fn verify_parallel(
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

    let measured = measure_shifts_parallel(&original[..len], &encoded[..len], config)?;
    let pattern_correlation = match expected_shifts(pattern, config, measured.len()) {
        Ok(expected) => matched_filter_score(&measured, &expected),
        Err(Error::DegeneratePattern) => {
            warn!("all-zero claimed pattern, nothing to detect against");
            0.0
        }
        Err(e) => return Err(e),
    };
    let detected = pattern_correlation > config.detection_threshold;

    Ok(DetectionResult {
        correlation,
        pattern_correlation,
        preserved,
        detected,
    })
}
