use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{Error, Result};
use crate::seed::Seed;

/// A deterministic pseudo-fractal noise sequence derived from a seed.
///
/// Built by one-dimensional midpoint displacement: element 0 is drawn
/// directly from the seeded generator, every other element is the average
/// of its two neighbors at the current step distance plus a perturbation
/// whose scale halves with the step. Indices whose every visit would read
/// past the end of the sequence stay zero; this matches the construction
/// the detector expects and is deliberately left as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct FractalPattern {
    values: Vec<f32>,
}

impl FractalPattern {
    /// Generate a pattern of `length` values (length must be >= 2).
    ///
    /// Identical seeds produce bit-identical patterns across runs and
    /// platforms: the seed is reduced via SHA-256 and fed to ChaCha8, both
    /// fixed algorithms.
    pub fn generate(seed: &Seed, length: usize) -> Result<Self> {
        if length < 2 {
            return Err(Error::PatternTooShort(length));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed.rng_seed());
        let mut values = vec![0.0f32; length];
        values[0] = rng.gen_range(-1.0f32..1.0);

        let mut step = length / 2;
        let mut scale = 1.0f32;

        while step > 0 {
            let mut i = step;
            while i < length {
                if i + step < length {
                    values[i] = (values[i - step] + values[i + step]) / 2.0
                        + rng.gen_range(-scale..scale);
                }
                i += 2 * step;
            }
            step /= 2;
            scale *= 0.5;
        }

        Ok(Self { values })
    }

    /// Wrap an existing sequence as a pattern.
    pub fn from_values(values: Vec<f32>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::EmptyPattern);
        }
        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Copy of the pattern scaled so the maximum absolute value is 1.
    ///
    /// The canonical pattern is never mutated. Fails on an all-zero
    /// pattern, which has no meaningful normalization.
    pub fn normalized(&self) -> Result<Vec<f32>> {
        let max_abs = self.values.iter().fold(0.0f32, |m, v| m.max(v.abs()));
        if max_abs <= f32::EPSILON {
            return Err(Error::DegeneratePattern);
        }
        Ok(self.values.iter().map(|v| v / max_abs).collect())
    }
}
