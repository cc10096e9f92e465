//! Window functions for spectral analysis.
//!
//! The signature frontend uses a Hann window whose two zero endpoints have
//! been trimmed, so every sample of the analysis frame keeps some weight.

use std::f64::consts::PI;
use std::sync::OnceLock;

use crate::core::fft::FFT_SIZE;

/// Returns `Some(trivial_window)` for degenerate sizes (0 or 1), or `None`
/// to indicate the caller should compute the full window.
#[inline]
fn trivial_window(size: usize) -> Option<Vec<f32>> {
    match size {
        0 => Some(vec![]),
        1 => Some(vec![1.0]),
        _ => None,
    }
}

/// Generates a symmetric Hann window (zero at both ends).
pub fn hann_window(size: usize) -> Vec<f32> {
    if let Some(w) = trivial_window(size) {
        return w;
    }
    let n = size as f64;
    (0..size)
        .map(|i| {
            let x = (2.0 * PI * i as f64) / (n - 1.0);
            (0.5 * (1.0 - x.cos())) as f32
        })
        .collect()
}

/// Generates a Hann window of `size + 2` points with the endpoints removed.
///
/// All coefficients are strictly positive.
pub fn trimmed_hann_window(size: usize) -> Vec<f32> {
    let full = hann_window(size + 2);
    full[1..=size].to_vec()
}

/// Returns the process-wide analysis window used by the spectral frontend.
pub fn signature_window() -> &'static [f32] {
    static WINDOW: OnceLock<Vec<f32>> = OnceLock::new();
    WINDOW.get_or_init(|| trimmed_hann_window(FFT_SIZE))
}

/// Multiplies `samples` by `window` into `out`.
#[inline]
pub fn apply_window_into(samples: &[i16], window: &[f32], out: &mut [f32]) {
    for ((o, &s), &w) in out.iter_mut().zip(samples.iter()).zip(window.iter()) {
        *o = s as f32 * w;
    }
}
