use sha2::{Digest, Sha256};

/// An opaque seed from which a fractal pattern is derived.
///
/// Typically produced by an upstream identity pipeline (signature features,
/// lyric hashes); the codec only cares that identical seed bytes always
/// derive the identical pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    bytes: Vec<u8>,
}

impl Seed {
    /// Create a seed from raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Raw seed bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Derive the 64-bit PRNG seed: first 8 bytes of SHA-256(seed),
    /// little-endian.
    ///
    /// This reduction and the ChaCha8 generator it feeds are a compatibility
    /// contract: changing either makes every previously derived pattern
    /// unreproducible, and detection depends on regenerating the identical
    /// pattern from the same seed.
    pub fn rng_seed(&self) -> u64 {
        let digest = Sha256::digest(&self.bytes);
        let mut word = [0u8; 8];
        word.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(word)
    }
}

impl From<&str> for Seed {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes().to_vec())
    }
}

impl From<String> for Seed {
    fn from(s: String) -> Self {
        Self::new(s.into_bytes())
    }
}
