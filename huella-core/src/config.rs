use crate::error::{Error, Result};

/// Configuration for watermark encoding and verification.
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Sample rate in Hz (e.g. 44100, 48000).
    pub sample_rate: u32,
    /// Maximum timing shift in milliseconds. Higher = more detectable but
    /// more audible. Typical range: 0.001 to 0.5. Default: 0.01.
    pub strength_ms: f32,
    /// Chunk size in samples. Must be even. Default: 2048.
    pub chunk_size: usize,
    /// Fractal pattern length in values. Default: 100.
    pub pattern_len: usize,
    /// Minimum Pearson correlation between original and encoded audio for
    /// the encoding to count as audio-preserving. Default: 0.99.
    pub correlation_threshold: f32,
    /// Minimum matched-filter correlation between measured chunk shifts and
    /// the claimed pattern for the watermark to count as detected.
    /// Default: 0.5.
    pub detection_threshold: f32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            strength_ms: 0.01,
            chunk_size: 2048,
            pattern_len: 100,
            correlation_threshold: 0.99,
            detection_threshold: 0.5,
        }
    }
}

impl EncoderConfig {
    /// Maximum shift in samples. Kept fractional: sub-sample shifts are
    /// meaningful in the phase domain and sweet-spot strengths
    /// (0.01 ms at 44100 Hz) map to less than one sample.
    pub fn max_shift_samples(&self) -> f32 {
        self.strength_ms / 1000.0 * self.sample_rate as f32
    }

    /// Number of complex frequency bins (chunk_size / 2 + 1).
    pub fn num_bins(&self) -> usize {
        self.chunk_size / 2 + 1
    }

    /// Validate chunk size and strength against the error taxonomy.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 || self.chunk_size % 2 != 0 {
            return Err(Error::InvalidChunkSize(self.chunk_size));
        }
        let shift = self.max_shift_samples();
        if !shift.is_finite() || shift.abs() > self.chunk_size as f32 {
            return Err(Error::StrengthTooLarge {
                shift,
                chunk_size: self.chunk_size,
            });
        }
        Ok(())
    }
}
