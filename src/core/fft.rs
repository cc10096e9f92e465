//! FFT-related constants and the power-spectrum helper shared across the crate.

use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// Zero-valued complex number, used for FFT buffer initialization.
pub const COMPLEX_ZERO: Complex<f32> = Complex::new(0.0, 0.0);

/// Analysis window length in samples.
pub const FFT_SIZE: usize = 2048;

/// New samples consumed per FFT frame.
pub const HOP_SIZE: usize = 128;

/// Bins in a real FFT of `FFT_SIZE` points (DC through Nyquist).
pub const NUM_BINS: usize = FFT_SIZE / 2 + 1;

/// Number of power and spread frames kept in history.
pub const FRAME_HISTORY: usize = 256;

/// Divisor applied to squared FFT magnitudes.
pub const POWER_SCALE: f32 = (1u32 << 17) as f32;

/// Floor applied to power values so that later logarithms stay finite.
pub const POWER_FLOOR: f32 = 1e-10;

/// Forward real-input FFT producing floored power spectra.
pub struct PowerSpectrum {
    fft: Arc<dyn Fft<f32>>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl PowerSpectrum {
    /// Plans a forward FFT of `FFT_SIZE` points.
    pub fn new() -> Self {
        let fft = FftPlanner::new().plan_fft_forward(FFT_SIZE);
        let scratch_len = fft.get_inplace_scratch_len();
        Self {
            fft,
            buffer: vec![COMPLEX_ZERO; FFT_SIZE],
            scratch: vec![COMPLEX_ZERO; scratch_len],
        }
    }

    /// Transforms `frame` (`FFT_SIZE` windowed samples) and writes the
    /// `NUM_BINS` power values into `out`.
    ///
    /// `power = max((re² + im²) / 2¹⁷, 1e-10)`
    pub fn compute(&mut self, frame: &[f32], out: &mut [f32]) {
        debug_assert_eq!(frame.len(), FFT_SIZE);
        debug_assert_eq!(out.len(), NUM_BINS);

        for (c, &s) in self.buffer.iter_mut().zip(frame.iter()) {
            *c = Complex::new(s, 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        for (p, c) in out.iter_mut().zip(self.buffer.iter()) {
            *p = ((c.re * c.re + c.im * c.im) / POWER_SCALE).max(POWER_FLOOR);
        }
    }
}

impl Default for PowerSpectrum {
    fn default() -> Self {
        Self::new()
    }
}
