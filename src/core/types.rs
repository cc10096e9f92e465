use serde::{Deserialize, Serialize};

use crate::core::fft::{FFT_SIZE, HOP_SIZE};
use crate::core::resample::resample_pcm;
use crate::error::SignatureError;

/// Sample rates the wire format can describe, with their header codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleRate {
    Hz8000 = 1,
    Hz11025 = 2,
    Hz16000 = 3,
    Hz32000 = 4,
    Hz44100 = 5,
    Hz48000 = 6,
}

impl SampleRate {
    /// Looks up the wire code for a rate in Hz.
    pub fn from_hz(hz: u32) -> Result<Self, SignatureError> {
        match hz {
            8000 => Ok(SampleRate::Hz8000),
            11025 => Ok(SampleRate::Hz11025),
            16000 => Ok(SampleRate::Hz16000),
            32000 => Ok(SampleRate::Hz32000),
            44100 => Ok(SampleRate::Hz44100),
            48000 => Ok(SampleRate::Hz48000),
            other => Err(SignatureError::UnsupportedSampleRate(other)),
        }
    }

    /// Maps a header code back to a rate.
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            1 => Some(SampleRate::Hz8000),
            2 => Some(SampleRate::Hz11025),
            3 => Some(SampleRate::Hz16000),
            4 => Some(SampleRate::Hz32000),
            5 => Some(SampleRate::Hz44100),
            6 => Some(SampleRate::Hz48000),
            _ => None,
        }
    }

    /// Header code.
    #[inline]
    pub fn id(self) -> u32 {
        self as u32
    }

    /// Rate in Hz.
    pub fn hz(self) -> u32 {
        match self {
            SampleRate::Hz8000 => 8000,
            SampleRate::Hz11025 => 11025,
            SampleRate::Hz16000 => 16000,
            SampleRate::Hz32000 => 32000,
            SampleRate::Hz44100 => 44100,
            SampleRate::Hz48000 => 48000,
        }
    }
}

/// Frequency ranges peaks are bucketed into.
///
/// Peaks below 250 Hz or above 5.5 kHz are dropped and have no band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FrequencyBand {
    Hz250To520 = 0,
    Hz520To1450 = 1,
    Hz1450To3500 = 2,
    Hz3500To5500 = 3,
}

impl FrequencyBand {
    /// All bands in wire order.
    pub const ALL: [FrequencyBand; 4] = [
        FrequencyBand::Hz250To520,
        FrequencyBand::Hz520To1450,
        FrequencyBand::Hz1450To3500,
        FrequencyBand::Hz3500To5500,
    ];

    /// Base of the TLV tags, the band id is added to it.
    pub const TAG_BASE: u32 = 0x6003_0040;

    /// Band id, also the index into [`Fingerprint::peaks_by_band`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// TLV tag of this band.
    #[inline]
    pub fn tag(self) -> u32 {
        Self::TAG_BASE + self as u32
    }

    pub fn from_tag(tag: u32) -> Option<Self> {
        tag.checked_sub(Self::TAG_BASE)
            .and_then(|id| Self::from_index(id as usize))
    }

    /// Classifies a frequency in Hz.
    ///
    /// Lower bounds are inclusive; the top band also includes 5500 Hz.
    pub fn classify(frequency_hz: f64) -> Option<Self> {
        if frequency_hz < 250.0 {
            None
        } else if frequency_hz < 520.0 {
            Some(FrequencyBand::Hz250To520)
        } else if frequency_hz < 1450.0 {
            Some(FrequencyBand::Hz520To1450)
        } else if frequency_hz < 3500.0 {
            Some(FrequencyBand::Hz1450To3500)
        } else if frequency_hz <= 5500.0 {
            Some(FrequencyBand::Hz3500To5500)
        } else {
            None
        }
    }

    /// Nominal `(low, high)` range in Hz.
    pub fn range_hz(self) -> (f64, f64) {
        match self {
            FrequencyBand::Hz250To520 => (250.0, 520.0),
            FrequencyBand::Hz520To1450 => (520.0, 1450.0),
            FrequencyBand::Hz1450To3500 => (1450.0, 3500.0),
            FrequencyBand::Hz3500To5500 => (3500.0, 5500.0),
        }
    }

    /// Short name used in debug dumps, e.g. `"250_520"`.
    pub fn name(self) -> &'static str {
        match self {
            FrequencyBand::Hz250To520 => "250_520",
            FrequencyBand::Hz520To1450 => "520_1450",
            FrequencyBand::Hz1450To3500 => "1450_3500",
            FrequencyBand::Hz3500To5500 => "3500_5500",
        }
    }
}

/// Sub-bin resolution of stored frequency bins.
pub const BIN_SUBDIVISIONS: f64 = 64.0;

/// One landmark peak of a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyPeak {
    /// FFT frame the peak was detected in (one frame per 128 samples).
    pub pass_number: u32,
    /// `ln(power) * 1477.3 + 6144`, rounded.
    pub magnitude: u16,
    /// FFT bin multiplied by 64, including the interpolated fraction.
    pub frequency_bin: u16,
    pub sample_rate_hz: u32,
}

impl FrequencyPeak {
    /// Frequency of the peak in Hz.
    pub fn frequency_hz(&self) -> f64 {
        bin_to_hz(self.frequency_bin as f64, self.sample_rate_hz)
    }

    /// Rough linear amplitude recovered from the log magnitude.
    pub fn amplitude_pcm(&self) -> f64 {
        let power = ((self.magnitude as f64 - 6144.0) / 1477.3).exp();
        (power * (1u32 << 17) as f64 / 2.0).sqrt() / 1024.0
    }

    /// Position of the peak in seconds from the start of the signature.
    pub fn seconds(&self) -> f64 {
        (self.pass_number as f64 * HOP_SIZE as f64) / self.sample_rate_hz as f64
    }
}

/// Converts a 64×-subdivided FFT bin into Hz.
#[inline]
pub fn bin_to_hz(corrected_bin: f64, sample_rate_hz: u32) -> f64 {
    corrected_bin * (sample_rate_hz as f64 / 2.0 / (FFT_SIZE / 2) as f64 / BIN_SUBDIVISIONS)
}

/// A decoded audio signature: landmark peaks grouped by frequency band.
///
/// Within a band, peaks are ordered by non-decreasing pass number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub sample_rate_hz: u32,
    /// Samples of audio the signature covers.
    pub number_samples: u32,
    /// Peaks indexed by [`FrequencyBand::index`].
    pub peaks_by_band: [Vec<FrequencyPeak>; 4],
}

impl Fingerprint {
    /// Creates an empty signature.
    pub fn new(sample_rate_hz: u32) -> Self {
        Self {
            sample_rate_hz,
            number_samples: 0,
            peaks_by_band: Default::default(),
        }
    }

    /// Peaks of one band.
    #[inline]
    pub fn peaks(&self, band: FrequencyBand) -> &[FrequencyPeak] {
        &self.peaks_by_band[band.index()]
    }

    /// Appends a peak to a band.
    #[inline]
    pub fn push_peak(&mut self, band: FrequencyBand, peak: FrequencyPeak) {
        self.peaks_by_band[band.index()].push(peak);
    }

    /// Total number of peaks across all bands.
    pub fn peak_count(&self) -> usize {
        self.peaks_by_band.iter().map(Vec::len).sum()
    }

    /// Returns true if no band holds a peak.
    pub fn is_empty(&self) -> bool {
        self.peak_count() == 0
    }

    /// Iterates the populated bands in wire order.
    pub fn bands(&self) -> impl Iterator<Item = (FrequencyBand, &[FrequencyPeak])> + '_ {
        FrequencyBand::ALL
            .into_iter()
            .map(move |band| (band, self.peaks(band)))
            .filter(|(_, peaks)| !peaks.is_empty())
    }

    /// Duration covered by the signature, in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate_hz == 0 {
            return 0.0;
        }
        self.number_samples as f64 / self.sample_rate_hz as f64
    }
}

/// Parameters of a [`SignatureGenerator`](crate::SignatureGenerator).
///
/// Can be loaded from JSON; missing fields take their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureParams {
    /// Rate of the PCM fed to the generator (default: 16000).
    pub sample_rate: u32,
    /// Flush once a signature covers this many seconds (default: 3.1).
    pub max_time_seconds: f64,
    /// Flush once a signature holds this many peaks (default: 255).
    pub max_peaks: usize,
}

impl Default for SignatureParams {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            max_time_seconds: 3.1,
            max_peaks: 255,
        }
    }
}

impl SignatureParams {
    /// Default parameters: 16 kHz input, flush at 3.1 s or 255 peaks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters that never flush on their own, so a single `pull`
    /// consumes all pending input.
    pub fn unbounded() -> Self {
        Self {
            max_time_seconds: f64::MAX,
            max_peaks: usize::MAX,
            ..Self::default()
        }
    }

    /// Set the input sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the duration flush threshold.
    pub fn with_max_time_seconds(mut self, seconds: f64) -> Self {
        self.max_time_seconds = seconds;
        self
    }

    /// Set the peak-count flush threshold.
    pub fn with_max_peaks(mut self, max_peaks: usize) -> Self {
        self.max_peaks = max_peaks;
        self
    }

    /// Checks that the rate has a wire code and the thresholds are usable.
    pub fn validate(&self) -> Result<(), SignatureError> {
        SampleRate::from_hz(self.sample_rate)?;
        if !self.max_time_seconds.is_finite() || self.max_time_seconds <= 0.0 {
            return Err(SignatureError::InvalidParams(format!(
                "max_time_seconds must be positive and finite, got {}",
                self.max_time_seconds
            )));
        }
        if self.max_peaks == 0 {
            return Err(SignatureError::InvalidParams(
                "max_peaks must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parses parameters from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, SignatureError> {
        let params: Self = serde_json::from_str(json)
            .map_err(|e| SignatureError::InvalidParams(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Reads parameters from a JSON file.
    pub fn from_json_file(path: &str) -> Result<Self, SignatureError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| SignatureError::IoError(format!("{}: {}", path, e)))?;
        Self::from_json(&data)
    }
}

/// Decoded audio as interleaved signed 16-bit PCM.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Interleaved samples, `channels` per frame.
    pub samples: Vec<i16>,
    /// Number of channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<i16>, channels: u16, sample_rate: u32) -> Self {
        Self {
            samples,
            channels,
            sample_rate,
        }
    }

    /// Number of frames in the buffer (total samples / channels).
    pub fn num_frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.num_frames() as f64 / self.sample_rate as f64
    }

    /// Averages all channels into one, rounding toward zero.
    pub fn to_mono(&self) -> Vec<i16> {
        let nc = self.channels.max(1) as usize;
        if nc == 1 {
            return self.samples.clone();
        }
        self.samples
            .chunks_exact(nc)
            .map(|frame| (frame.iter().map(|&s| s as i32).sum::<i32>() / nc as i32) as i16)
            .collect()
    }

    /// Converts to mono PCM at `target_rate`, the input format of the
    /// signature generator. Mono input already at `target_rate` passes
    /// through untouched.
    pub fn to_signature_pcm(&self, target_rate: u32) -> Vec<i16> {
        resample_pcm(&self.to_mono(), self.sample_rate, target_rate)
    }
}
