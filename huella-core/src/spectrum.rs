use realfft::num_complex::Complex32;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::phase;

/// Frequency-domain workhorse for one chunk size: applies timing shifts to
/// chunks and estimates them back out.
///
/// Plans both transform directions once and reuses its time, bin and
/// scratch buffers, so processing a long buffer allocates nothing per
/// chunk. One instance per thread; the parallel paths create one per
/// batch task.
pub struct ChunkTransform {
    chunk_size: usize,
    forward: Arc<dyn RealToComplex<f32>>,
    inverse: Arc<dyn ComplexToReal<f32>>,
    time_buf: Vec<f32>,
    freq_buf: Vec<Complex32>,
    // Holds the original chunk's spectrum while freq_buf holds the encoded one.
    ref_bins: Vec<Complex32>,
    scratch_fwd: Vec<Complex32>,
    scratch_inv: Vec<Complex32>,
}

impl ChunkTransform {
    /// Create a transform for the given chunk size (must be even, non-zero).
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 || chunk_size % 2 != 0 {
            return Err(Error::InvalidChunkSize(chunk_size));
        }
        let mut planner = RealFftPlanner::<f32>::new();
        let forward = planner.plan_fft_forward(chunk_size);
        let inverse = planner.plan_fft_inverse(chunk_size);

        let time_buf = forward.make_input_vec();
        let freq_buf = forward.make_output_vec();
        let ref_bins = forward.make_output_vec();
        let scratch_fwd = forward.make_scratch_vec();
        let scratch_inv = inverse.make_scratch_vec();

        Ok(Self {
            chunk_size,
            forward,
            inverse,
            time_buf,
            freq_buf,
            ref_bins,
            scratch_fwd,
            scratch_inv,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn check_len(&self, chunk: &[f32]) -> Result<()> {
        if chunk.len() != self.chunk_size {
            return Err(Error::Fft(format!(
                "chunk of {} samples fed to a {}-sample transform",
                chunk.len(),
                self.chunk_size
            )));
        }
        Ok(())
    }

    /// Move the spectrum of `chunk` into the internal bin buffer.
    fn analyze(&mut self, chunk: &[f32]) -> Result<()> {
        self.time_buf.copy_from_slice(chunk);
        self.forward
            .process_with_scratch(&mut self.time_buf, &mut self.freq_buf, &mut self.scratch_fwd)
            .map_err(|e| Error::Fft(e.to_string()))?;
        Ok(())
    }

    /// Apply a timing shift of `shift_samples` to one chunk, in place.
    ///
    /// Forward transform, linear phase ramp, inverse transform. A zero
    /// shift returns immediately without touching the chunk; everything
    /// else goes through a lossy but near-exact float round trip. The
    /// chunk's magnitude spectrum is preserved.
    pub fn shift_chunk(&mut self, chunk: &mut [f32], shift_samples: f32) -> Result<()> {
        self.check_len(chunk)?;
        if shift_samples == 0.0 {
            return Ok(());
        }

        self.analyze(chunk)?;
        phase::apply_shift(&mut self.freq_buf, self.chunk_size, shift_samples);
        self.inverse
            .process_with_scratch(&mut self.freq_buf, &mut self.time_buf, &mut self.scratch_inv)
            .map_err(|e| Error::Fft(e.to_string()))?;

        // realfft's inverse is scaled by chunk_size; fold the rescale into
        // the write-back.
        let scale = 1.0 / self.chunk_size as f32;
        for (out, &s) in chunk.iter_mut().zip(self.time_buf.iter()) {
            *out = s * scale;
        }
        Ok(())
    }

    /// Estimate the timing shift between an original chunk and its encoded
    /// counterpart, in samples.
    pub fn estimate_chunk_shift(&mut self, original: &[f32], encoded: &[f32]) -> Result<f32> {
        self.check_len(original)?;
        self.check_len(encoded)?;

        self.analyze(original)?;
        std::mem::swap(&mut self.freq_buf, &mut self.ref_bins);
        self.analyze(encoded)?;

        Ok(phase::estimate_shift(
            &self.ref_bins,
            &self.freq_buf,
            self.chunk_size,
        ))
    }
}
