#![forbid(unsafe_code)]
//! Landmark audio fingerprinting in pure Rust.
//!
//! `songsig` turns mono 16-bit PCM into compact audio signatures: sparse
//! sets of spectral peaks ("landmarks") grouped into four frequency bands.
//! Signatures serialize to a checksummed binary format, usually carried as
//! a base64 `data:` URI, that recognition services accept.
//!
//! # Quick Start
//!
//! ```
//! // 2 seconds of a decaying 1 kHz pluck at 16 kHz
//! let pcm: Vec<i16> = (0..32000)
//!     .map(|i| {
//!         let t = (i % 4000) as f64 / 16000.0;
//!         let s = (2.0 * std::f64::consts::PI * 1000.0 * i as f64 / 16000.0).sin();
//!         (12000.0 * (-t * 10.0).exp() * s) as i16
//!     })
//!     .collect();
//!
//! let signature = songsig::make_signature(&pcm, 16000).unwrap();
//! assert_eq!(signature.number_samples, 32000);
//!
//! let uri = signature.encode_to_uri().unwrap();
//! let decoded = songsig::Fingerprint::decode_from_uri(&uri).unwrap();
//! assert_eq!(decoded, signature);
//! ```
//!
//! # Streaming
//!
//! For live input, feed audio in chunks via [`SignatureGenerator`]; it cuts
//! a new signature every few seconds or peaks:
//!
//! ```
//! use songsig::{SignatureGenerator, SignatureParams};
//!
//! let params = SignatureParams::new().with_max_time_seconds(3.1);
//! let mut generator = SignatureGenerator::new(params).unwrap();
//! generator.feed(&vec![0i16; 16000 * 4]);
//! for signature in generator.signatures() {
//!     println!("{:.2}s, {} peaks", signature.duration_secs(), signature.peak_count());
//! }
//! ```

pub mod analysis;
pub mod core;
pub mod error;
pub mod io;
pub mod stream;

pub use core::types::{
    AudioBuffer, Fingerprint, FrequencyBand, FrequencyPeak, SampleRate, SignatureParams,
};
pub use error::SignatureError;
pub use io::payload::RecognitionPayload;
pub use stream::SignatureGenerator;

/// Length of the excerpt fingerprinted from a recording, in seconds.
pub const DEFAULT_EXCERPT_SECONDS: f64 = 12.0;

/// Computes a single signature over a whole PCM buffer.
///
/// Unlike the streaming generator, no duration or peak threshold applies:
/// every complete 128-sample hop of `samples` is analysed. A trailing
/// partial hop is ignored, and less than one hop yields an empty signature.
///
/// # Errors
///
/// Returns [`SignatureError::UnsupportedSampleRate`] if `sample_rate` has
/// no wire-format code.
///
/// # Example
///
/// ```
/// let silence = vec![0i16; 16000];
/// let signature = songsig::make_signature(&silence, 16000).unwrap();
/// assert!(signature.is_empty());
/// assert_eq!(signature.number_samples, 16000);
/// ```
pub fn make_signature(samples: &[i16], sample_rate: u32) -> Result<Fingerprint, SignatureError> {
    let params = SignatureParams::unbounded().with_sample_rate(sample_rate);
    let mut generator = SignatureGenerator::new(params)?;
    generator.feed(samples);
    Ok(generator
        .pull()
        .unwrap_or_else(|| Fingerprint::new(sample_rate)))
}

/// Returns the `seconds`-long slice centred on the middle of `samples`,
/// or all of `samples` if they are not longer than that.
///
/// # Example
///
/// ```
/// let samples: Vec<i16> = (0..100).collect();
/// let middle = songsig::excerpt_middle(&samples, 10, 4.0);
/// assert_eq!(middle, &samples[30..70]);
/// ```
pub fn excerpt_middle<T>(samples: &[T], sample_rate: u32, seconds: f64) -> &[T] {
    let window = (seconds.max(0.0) * sample_rate as f64) as usize;
    if samples.len() <= window {
        return samples;
    }
    let start = samples.len() / 2 - window / 2;
    &samples[start..start + window]
}

/// Signs a decoded recording: downmix, resample to 16 kHz, keep the middle
/// `seconds`, then compute one signature.
///
/// # Errors
///
/// Propagates [`make_signature`] errors.
pub fn signature_from_buffer(buffer: &AudioBuffer, seconds: f64) -> Result<Fingerprint, SignatureError> {
    let rate = SignatureParams::default().sample_rate;
    let pcm = buffer.to_signature_pcm(rate);
    let excerpt = excerpt_middle(&pcm, rate, seconds);
    log::debug!(
        "Signing {:.2}s of {:.2}s recording ({} Hz, {} channel(s))",
        excerpt.len() as f64 / rate as f64,
        buffer.duration_secs(),
        buffer.sample_rate,
        buffer.channels
    );
    make_signature(excerpt, rate)
}

/// Reads a WAV file and signs its middle `seconds`.
///
/// # Errors
///
/// Returns [`SignatureError::IoError`] or [`SignatureError::InvalidFormat`]
/// if the file cannot be read or decoded.
pub fn signature_from_wav_file(path: &str, seconds: f64) -> Result<Fingerprint, SignatureError> {
    let buffer = io::wav::read_wav_file(path)?;
    signature_from_buffer(&buffer, seconds)
}
