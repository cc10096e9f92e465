//! Peak spreading: dilates each power frame across neighbouring bins and
//! recent frames. The result only serves as the local-maximum reference
//! for peak recognition.

use crate::core::fft::{FRAME_HISTORY, NUM_BINS};
use crate::core::ring_buffer::CircularBuffer;

/// Width of the sliding maximum along frequency.
const FREQUENCY_SPREAD: usize = 3;

/// Past spread frames the new frame is folded into, applied in order.
const TIME_SPREAD_OFFSETS: [isize; 3] = [-1, -3, -6];

/// Maintains the history of spread frames.
pub struct PeakSpreader {
    frames: CircularBuffer<Vec<f32>>,
    scratch: Vec<f32>,
    running: Vec<f32>,
}

impl PeakSpreader {
    pub fn new() -> Self {
        Self {
            frames: CircularBuffer::new(FRAME_HISTORY, vec![0.0f32; NUM_BINS]),
            scratch: vec![0.0; NUM_BINS],
            running: vec![0.0; NUM_BINS],
        }
    }

    /// Spreads `power` (the newest power frame) and pushes the result.
    pub fn spread(&mut self, power: &[f32]) {
        debug_assert_eq!(power.len(), NUM_BINS);
        self.scratch.copy_from_slice(power);
        spread_frequency(&mut self.scratch);

        // The running max cascades: each older frame receives the max of
        // itself and everything folded in before it.
        self.running.copy_from_slice(&self.scratch);
        for &offset in &TIME_SPREAD_OFFSETS {
            let target = self.frames.get_mut(offset);
            for (t, r) in target.iter_mut().zip(self.running.iter_mut()) {
                *r = r.max(*t);
                *t = *r;
            }
        }

        let scratch = &self.scratch;
        self.frames.push_with(|frame| frame.copy_from_slice(scratch));
    }

    /// History of spread frames; `latest()` is the newest.
    #[inline]
    pub fn frames(&self) -> &CircularBuffer<Vec<f32>> {
        &self.frames
    }
}

impl Default for PeakSpreader {
    fn default() -> Self {
        Self::new()
    }
}

/// Replaces each bin but the last two with the max of itself and its two
/// right neighbours.
pub fn spread_frequency(frame: &mut [f32]) {
    if frame.len() < FREQUENCY_SPREAD {
        return;
    }
    for i in 0..=frame.len() - FREQUENCY_SPREAD {
        frame[i] = frame[i].max(frame[i + 1]).max(frame[i + 2]);
    }
}
