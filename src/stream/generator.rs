use crate::analysis::{PeakRecognizer, PeakSpreader, SpectralFrontend};
use crate::core::fft::HOP_SIZE;
use crate::core::types::{Fingerprint, SignatureParams};
use crate::error::SignatureError;

/// Per-signature DSP state. Rebuilt from scratch for every signature.
struct SignatureState {
    frontend: SpectralFrontend,
    spreader: PeakSpreader,
    recognizer: PeakRecognizer,
    signature: Fingerprint,
}

impl SignatureState {
    fn new(sample_rate: u32) -> Self {
        Self {
            frontend: SpectralFrontend::new(),
            spreader: PeakSpreader::new(),
            recognizer: PeakRecognizer::new(sample_rate),
            signature: Fingerprint::new(sample_rate),
        }
    }

    fn process_hop(&mut self, hop: &[i16]) {
        self.signature.number_samples = self.signature.number_samples.saturating_add(hop.len() as u32);
        self.frontend.process_hop(hop);
        self.spreader.spread(self.frontend.frames().latest());
        self.recognizer
            .recognize(self.frontend.frames(), self.spreader.frames(), &mut self.signature);
    }
}

/// Streaming signature generator.
///
/// Accumulates mono 16-bit PCM and cuts it into signatures. Each call to
/// [`pull`](Self::pull) runs the pending input through a fresh analysis
/// state, one 128-sample hop at a time, until either the signature covers
/// `max_time_seconds` or holds `max_peaks` peaks, or the pending input runs
/// out. The consumed samples are dropped; a trailing partial hop stays
/// pending.
pub struct SignatureGenerator {
    params: SignatureParams,
    buffer: Vec<i16>,
    /// Samples at the front of `buffer` already turned into signatures.
    consumed: usize,
}

impl SignatureGenerator {
    /// Creates a generator after validating `params`.
    pub fn new(params: SignatureParams) -> Result<Self, SignatureError> {
        params.validate()?;
        Ok(Self {
            params,
            buffer: Vec::new(),
            consumed: 0,
        })
    }

    /// Appends PCM samples to the pending input.
    pub fn feed(&mut self, samples: &[i16]) {
        self.buffer.extend_from_slice(samples);
    }

    /// Produces the next signature, or `None` if less than one hop of
    /// input is pending.
    pub fn pull(&mut self) -> Option<Fingerprint> {
        if self.pending_samples() < HOP_SIZE {
            return None;
        }

        let mut state = SignatureState::new(self.params.sample_rate);
        let mut consumed = 0;
        let mut flushed = false;
        for hop in self.buffer[self.consumed..].chunks_exact(HOP_SIZE) {
            state.process_hop(hop);
            consumed += HOP_SIZE;
            if self.should_flush(&state.signature) {
                flushed = true;
                break;
            }
        }
        self.consumed += consumed;
        self.compact();

        let signature = state.signature;
        log::debug!(
            "Signature cut after {} samples ({:.2}s), {} peaks, {}",
            signature.number_samples,
            signature.duration_secs(),
            signature.peak_count(),
            if flushed { "threshold reached" } else { "input exhausted" }
        );
        Some(signature)
    }

    /// Iterator over all signatures the pending input yields.
    pub fn signatures(&mut self) -> impl Iterator<Item = Fingerprint> + '_ {
        std::iter::from_fn(move || self.pull())
    }

    /// Samples fed but not yet consumed by a signature.
    pub fn pending_samples(&self) -> usize {
        self.buffer.len() - self.consumed
    }

    pub fn params(&self) -> &SignatureParams {
        &self.params
    }

    /// Discards all pending input.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.consumed = 0;
    }

    /// Drops consumed samples once they make up half of the buffer, so each
    /// sample is moved at most once on average.
    fn compact(&mut self) {
        if self.consumed > 0 && self.consumed * 2 >= self.buffer.len() {
            self.buffer.drain(..self.consumed);
            self.consumed = 0;
        }
    }

    fn should_flush(&self, signature: &Fingerprint) -> bool {
        signature.duration_secs() >= self.params.max_time_seconds
            || signature.peak_count() >= self.params.max_peaks
    }
}

impl Default for SignatureGenerator {
    fn default() -> Self {
        Self {
            params: SignatureParams::default(),
            buffer: Vec::new(),
            consumed: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_params() {
        assert!(matches!(
            SignatureGenerator::new(SignatureParams::new().with_sample_rate(22050)),
            Err(SignatureError::UnsupportedSampleRate(22050))
        ));
        assert!(SignatureGenerator::new(SignatureParams::new().with_max_peaks(0)).is_err());
    }

    #[test]
    fn test_pull_needs_one_hop() {
        let mut generator = SignatureGenerator::default();
        assert!(generator.pull().is_none());
        generator.feed(&[0; HOP_SIZE - 1]);
        assert!(generator.pull().is_none());
        assert_eq!(generator.pending_samples(), HOP_SIZE - 1);
    }

    #[test]
    fn test_partial_hop_stays_pending() {
        let mut generator = SignatureGenerator::default();
        generator.feed(&[0; HOP_SIZE * 3 + 50]);
        let sig = generator.pull().unwrap();
        assert_eq!(sig.number_samples, (HOP_SIZE * 3) as u32);
        assert_eq!(sig.sample_rate_hz, 16000);
        assert!(sig.is_empty());
        assert_eq!(generator.pending_samples(), 50);
        assert!(generator.pull().is_none());
    }

    #[test]
    fn test_duration_threshold_cuts_signature() {
        let params = SignatureParams::new().with_max_time_seconds(0.5);
        let mut generator = SignatureGenerator::new(params).unwrap();
        generator.feed(&vec![0; 16000]);
        let first = generator.pull().unwrap();
        // 63 hops is 0.504 s, the first multiple of 128 samples past 0.5 s.
        assert_eq!(first.number_samples, 63 * HOP_SIZE as u32);
        assert_eq!(generator.pending_samples(), 16000 - 63 * HOP_SIZE);
    }

    #[test]
    fn test_many_pulls_keep_backlog_bounded() {
        let params = SignatureParams::new().with_max_time_seconds(0.05);
        let mut generator = SignatureGenerator::new(params).unwrap();
        generator.feed(&vec![0; 16000 * 10 + 77]);

        let mut total = 0;
        let mut pulls = 0;
        while let Some(sig) = generator.pull() {
            total += sig.number_samples as usize;
            pulls += 1;
            assert!(generator.buffer.len() <= 2 * generator.pending_samples());
            generator.feed(&[0; 13]);
        }
        assert!(pulls > 100);
        assert_eq!(total + generator.pending_samples(), 16000 * 10 + 77 + 13 * pulls);
    }

    #[test]
    fn test_reset_discards_pending() {
        let mut generator = SignatureGenerator::default();
        generator.feed(&[1; 1000]);
        generator.reset();
        assert_eq!(generator.pending_samples(), 0);
        assert!(generator.pull().is_none());
    }
}
