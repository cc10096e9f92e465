//! Streaming spectral frontend: 128-sample hops into a sliding 2048-sample
//! window, one windowed power spectrum per hop.

use crate::core::fft::{PowerSpectrum, FFT_SIZE, FRAME_HISTORY, HOP_SIZE, NUM_BINS};
use crate::core::ring_buffer::CircularBuffer;
use crate::core::window::{apply_window_into, signature_window};

/// Turns PCM hops into a history of power spectra.
pub struct SpectralFrontend {
    samples: CircularBuffer<i16>,
    /// Chronological copy of the sample ring, reused every hop.
    reordered: Vec<i16>,
    windowed: Vec<f32>,
    spectrum: PowerSpectrum,
    frames: CircularBuffer<Vec<f32>>,
}

impl SpectralFrontend {
    pub fn new() -> Self {
        Self {
            samples: CircularBuffer::new(FFT_SIZE, 0i16),
            reordered: vec![0; FFT_SIZE],
            windowed: vec![0.0; FFT_SIZE],
            spectrum: PowerSpectrum::new(),
            frames: CircularBuffer::new(FRAME_HISTORY, vec![0.0f32; NUM_BINS]),
        }
    }

    /// Consumes one hop of exactly `HOP_SIZE` samples and pushes a new
    /// power frame.
    pub fn process_hop(&mut self, hop: &[i16]) {
        debug_assert_eq!(hop.len(), HOP_SIZE);

        self.samples.push_slice(hop);
        self.samples.copy_chronological(&mut self.reordered);
        apply_window_into(&self.reordered, signature_window(), &mut self.windowed);

        let spectrum = &mut self.spectrum;
        let windowed = &self.windowed;
        self.frames
            .push_with(|frame| spectrum.compute(windowed, frame));
    }

    /// History of power frames; `latest()` is the newest.
    #[inline]
    pub fn frames(&self) -> &CircularBuffer<Vec<f32>> {
        &self.frames
    }

    /// Total samples consumed.
    #[inline]
    pub fn samples_written(&self) -> u64 {
        self.samples.total_written()
    }
}

impl Default for SpectralFrontend {
    fn default() -> Self {
        Self::new()
    }
}
