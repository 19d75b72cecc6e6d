use realfft::num_complex::Complex32;

/// Phase ramp slope at bin `k` for a chunk of `chunk_size` samples, per
/// unit shift: the ramp runs linearly from 0 at DC to `2π / chunk_size`
/// at the top of the spectrum.
#[inline]
fn ramp(k: usize, chunk_size: usize) -> f64 {
    2.0 * std::f64::consts::PI * k as f64 / (chunk_size as f64 * (chunk_size as f64 - 1.0))
}

/// Rotate the phase of each frequency bin by a linear ramp scaled to
/// `shift_samples`.
///
/// Magnitudes are untouched, so the magnitude spectrum of the chunk is
/// preserved exactly. DC and Nyquist are skipped: both must stay purely
/// real for the inverse real FFT, and the ramp is zero at DC anyway.
pub fn apply_shift(freq_bins: &mut [Complex32], chunk_size: usize, shift_samples: f32) {
    if shift_samples == 0.0 || freq_bins.len() < 3 {
        return;
    }
    let last = freq_bins.len() - 1;
    for (k, bin) in freq_bins.iter_mut().enumerate().take(last).skip(1) {
        let angle = (shift_samples as f64 * ramp(k, chunk_size)) as f32;
        *bin *= Complex32::from_polar(1.0, angle);
    }
}

/// Estimate the shift that was applied between an original and an encoded
/// chunk, in samples.
///
/// Magnitude-weighted least squares over per-bin phase differences: each
/// bin contributes its measured phase delta against the known ramp slope,
/// weighted by the original bin's power so near-silent bins (whose phase
/// is numerically meaningless) barely count. The phase delta is taken as
/// the argument of `encoded * conj(original)`, which wraps correctly.
pub fn estimate_shift(
    original_bins: &[Complex32],
    encoded_bins: &[Complex32],
    chunk_size: usize,
) -> f32 {
    debug_assert_eq!(original_bins.len(), encoded_bins.len());
    if original_bins.len() < 3 {
        return 0.0;
    }
    let last = original_bins.len() - 1;

    let mut num = 0.0f64;
    let mut den = 0.0f64;

    for k in 1..last {
        let o = original_bins[k];
        let e = encoded_bins[k];
        let power = (o.re as f64) * (o.re as f64) + (o.im as f64) * (o.im as f64);
        if power <= 0.0 {
            continue;
        }
        let cross_re = (e.re as f64) * (o.re as f64) + (e.im as f64) * (o.im as f64);
        let cross_im = (e.im as f64) * (o.re as f64) - (e.re as f64) * (o.im as f64);
        let delta_phase = cross_im.atan2(cross_re);

        let r = ramp(k, chunk_size);
        num += power * delta_phase * r;
        den += power * r * r;
    }

    if den <= 0.0 {
        return 0.0;
    }
    (num / den) as f32
}
