//! Peak recognition: finds time-frequency local maxima in the power history
//! and turns them into landmark peaks.
//!
//! Each call inspects the raw power frame lagging 46 frames behind the
//! newest one, so that spread frames on both sides of it in time are
//! available for comparison.

use crate::core::ring_buffer::CircularBuffer;
use crate::core::types::{bin_to_hz, Fingerprint, FrequencyBand, FrequencyPeak, BIN_SUBDIVISIONS};
use crate::error::SignatureError;

/// Lag of the inspected raw frame, also the number of spread frames needed
/// before recognition starts.
pub const PEAK_LAG: u64 = 46;

/// Raw frame under inspection, relative to the next write.
const RAW_OFFSET: isize = -(PEAK_LAG as isize);

/// Spread frame used for the frequency-domain comparison.
const SPREAD_OFFSET: isize = -49;

/// Bins of the spread frame compared against the candidate.
const FREQUENCY_NEIGHBORS: [isize; 8] = [-10, -7, -4, -3, 1, 2, 5, 8];

/// Further spread frames compared at the bin left of the candidate.
/// Positive offsets wrap around the 256-frame history.
const TIME_NEIGHBORS: [isize; 14] = [
    -53, -45, 165, 172, 179, 186, 193, 200, 214, 221, 228, 235, 242, 249,
];

/// Candidate bins, `[FIRST_BIN, END_BIN)`.
const FIRST_BIN: usize = 10;
const END_BIN: usize = 1015;

/// Minimum power of a peak, also the floor of the log magnitude.
pub const MIN_PEAK_POWER: f32 = 1.0 / 64.0;

const MAGNITUDE_SCALE: f64 = 1477.3;
const MAGNITUDE_OFFSET: f64 = 6144.0;

/// Fixed-point log magnitude stored in signatures.
#[inline]
pub fn log_magnitude(power: f32) -> f64 {
    (power.max(MIN_PEAK_POWER) as f64).ln() * MAGNITUDE_SCALE + MAGNITUDE_OFFSET
}

/// Refines `bin` with a parabola through the log magnitudes of the bin and
/// its two neighbours.
///
/// Returns the bin scaled by 64 plus the sub-bin correction. The curvature
/// `2c - l - r` must be positive, which holds for any true local maximum.
pub fn interpolate_peak(bin: usize, left: f64, center: f64, right: f64) -> Result<f64, SignatureError> {
    let curvature = center * 2.0 - left - right;
    if !(curvature > 0.0) {
        return Err(SignatureError::InvalidPeakGeometry(format!(
            "bin {}: curvature {} from magnitudes ({}, {}, {})",
            bin, curvature, left, center, right
        )));
    }
    let correction = (right - left) * (BIN_SUBDIVISIONS / 2.0) / curvature;
    Ok(bin as f64 * BIN_SUBDIVISIONS + correction)
}

/// Detects peaks and appends them to the signature under construction.
#[derive(Debug, Clone, Copy)]
pub struct PeakRecognizer {
    sample_rate_hz: u32,
}

impl PeakRecognizer {
    pub fn new(sample_rate_hz: u32) -> Self {
        Self { sample_rate_hz }
    }

    /// Scans the lagged raw frame against the spread history.
    ///
    /// `power` and `spread` must have received the same number of frames.
    /// Does nothing until `PEAK_LAG` spread frames exist. Returns the
    /// number of peaks appended.
    pub fn recognize(
        &self,
        power: &CircularBuffer<Vec<f32>>,
        spread: &CircularBuffer<Vec<f32>>,
        signature: &mut Fingerprint,
    ) -> usize {
        let frames_done = spread.total_written();
        if frames_done < PEAK_LAG {
            return 0;
        }
        let pass_number = (frames_done - PEAK_LAG) as u32;

        let raw = power.get(RAW_OFFSET);
        let reference = spread.get(SPREAD_OFFSET);
        let mut found = 0;

        for bin in FIRST_BIN..END_BIN {
            let candidate = raw[bin];
            if candidate < MIN_PEAK_POWER || candidate < reference[bin - 1] {
                continue;
            }

            let mut neighborhood_max = 0.0f32;
            for &offset in &FREQUENCY_NEIGHBORS {
                neighborhood_max = neighborhood_max.max(reference[(bin as isize + offset) as usize]);
            }
            if candidate <= neighborhood_max {
                continue;
            }

            for &offset in &TIME_NEIGHBORS {
                neighborhood_max = neighborhood_max.max(spread.get(offset)[bin - 1]);
            }
            if candidate <= neighborhood_max {
                continue;
            }

            let center = log_magnitude(candidate);
            let left = log_magnitude(raw[bin - 1]);
            let right = log_magnitude(raw[bin + 1]);
            let corrected_bin = match interpolate_peak(bin, left, center, right) {
                Ok(corrected) => corrected,
                Err(e) => {
                    log::warn!("Dropping peak candidate at pass {}: {}", pass_number, e);
                    continue;
                }
            };

            let frequency_hz = bin_to_hz(corrected_bin, self.sample_rate_hz);
            let Some(band) = FrequencyBand::classify(frequency_hz) else {
                continue;
            };

            log::trace!(
                "Peak at pass {}: {:.1} Hz, magnitude {:.0}, band {}",
                pass_number,
                frequency_hz,
                center,
                band.name()
            );

            signature.push_peak(
                band,
                FrequencyPeak {
                    pass_number,
                    magnitude: center.round() as u16,
                    frequency_bin: corrected_bin.round() as u16,
                    sample_rate_hz: self.sample_rate_hz,
                },
            );
            found += 1;
        }

        found
    }
}
