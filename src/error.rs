//! Error types for the songsig crate.

use std::fmt;

/// Errors that can occur while generating, encoding or decoding signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// Wrong magic numbers, inconsistent sizes or unknown header values.
    MalformedHeader(String),
    /// The CRC-32 stored in the header does not match the message body.
    ChecksumMismatch { stored: u32, computed: u32 },
    /// A TLV block carries a tag outside the four frequency bands.
    UnknownBand(u32),
    /// A TLV block or peak record runs past the end of the data.
    TruncatedPayload { needed: usize, available: usize },
    /// Parabolic interpolation around a peak has a non-positive curvature.
    InvalidPeakGeometry(String),
    /// Peaks handed to the encoder are not ordered by pass number.
    UnsortedPeaks {
        band: u32,
        previous: u32,
        found: u32,
    },
    /// Sample rate without a wire-format code.
    UnsupportedSampleRate(u32),
    /// Invalid generator parameters.
    InvalidParams(String),
    /// Data URI without the expected prefix or with invalid base64.
    InvalidUri(String),
    /// Unsupported or corrupt audio input.
    InvalidFormat(String),
    /// I/O error.
    IoError(String),
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureError::MalformedHeader(msg) => write!(f, "malformed signature header: {}", msg),
            SignatureError::ChecksumMismatch { stored, computed } => write!(
                f,
                "checksum mismatch: header says {:#010x}, body hashes to {:#010x}",
                stored, computed
            ),
            SignatureError::UnknownBand(tag) => write!(f, "unknown frequency band tag {:#010x}", tag),
            SignatureError::TruncatedPayload { needed, available } => write!(
                f,
                "truncated payload: {} bytes needed, {} available",
                needed, available
            ),
            SignatureError::InvalidPeakGeometry(msg) => write!(f, "invalid peak geometry: {}", msg),
            SignatureError::UnsortedPeaks {
                band,
                previous,
                found,
            } => write!(
                f,
                "peaks of band {} are not sorted: pass {} follows pass {}",
                band, found, previous
            ),
            SignatureError::UnsupportedSampleRate(rate) => {
                write!(f, "unsupported sample rate: {} Hz", rate)
            }
            SignatureError::InvalidParams(msg) => write!(f, "invalid parameters: {}", msg),
            SignatureError::InvalidUri(msg) => write!(f, "invalid signature URI: {}", msg),
            SignatureError::InvalidFormat(msg) => write!(f, "invalid format: {}", msg),
            SignatureError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for SignatureError {}

impl From<std::io::Error> for SignatureError {
    fn from(err: std::io::Error) -> Self {
        SignatureError::IoError(err.to_string())
    }
}

impl From<base64::DecodeError> for SignatureError {
    fn from(err: base64::DecodeError) -> Self {
        SignatureError::InvalidUri(err.to_string())
    }
}
