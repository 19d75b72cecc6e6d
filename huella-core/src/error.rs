use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("audio buffer is empty")]
    EmptyAudio,

    #[error("fractal pattern is empty")]
    EmptyPattern,

    #[error("pattern length must be at least 2, got {0}")]
    PatternTooShort(usize),

    #[error("chunk size must be even and non-zero, got {0}")]
    InvalidChunkSize(usize),

    #[error("max shift of {shift:.1} samples exceeds chunk size {chunk_size}")]
    StrengthTooLarge { shift: f32, chunk_size: usize },

    #[error("pattern is all zeros, cannot normalize")]
    DegeneratePattern,

    #[error("FFT error: {0}")]
    Fft(String),
}

pub type Result<T> = std::result::Result<T, Error>;
