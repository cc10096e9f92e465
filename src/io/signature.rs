//! Binary signature format and its base64 data-URI wrapper.
//!
//! Layout, all integers little-endian:
//!
//! | offset | field                                             |
//! |--------|---------------------------------------------------|
//! | 0      | magic `0xCAFE2580`                                |
//! | 4      | CRC-32 of every byte from offset 8 to the end     |
//! | 8      | total size minus the 48-byte header               |
//! | 12     | magic `0x94119C00`                                |
//! | 16     | 12 zero bytes                                     |
//! | 28     | sample rate code `<< 27`                          |
//! | 32     | 8 zero bytes                                      |
//! | 40     | `number_samples + floor(sample_rate * 0.24)`      |
//! | 44     | `(15 << 19) + 0x40000`                            |
//! | 48     | `0x40000000`, then the size field again           |
//! | 56     | one TLV block per non-empty band, in band order   |
//!
//! A TLV block is a `0x60030040 + band` tag, the payload length, then the
//! payload zero-padded to a multiple of four bytes. The payload is a list
//! of 5-byte peak records: a pass-number delta byte, the magnitude and the
//! frequency bin. Deltas of 255 or more are written as an escape byte
//! `0xFF` with the absolute pass number, followed by a record with delta 0.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use crc32fast::Hasher;

use crate::core::types::{Fingerprint, FrequencyBand, FrequencyPeak, SampleRate};
use crate::error::SignatureError;

pub const DATA_URI_PREFIX: &str = "data:audio/vnd.shazam.sig;base64,";

pub const MAGIC1: u32 = 0xCAFE_2580;
pub const MAGIC2: u32 = 0x9411_9C00;
pub const HEADER_SIZE: usize = 48;

const PREAMBLE_TAG: u32 = 0x4000_0000;
const PREAMBLE_SIZE: usize = 8;
const FIXED_VALUE: u32 = (15 << 19) + 0x40000;
const SAMPLE_RATE_SHIFT: u32 = 27;

/// Delta byte announcing an absolute pass number.
const PASS_ESCAPE: u8 = 0xFF;
const RECORD_SIZE: usize = 5;

/// Offset stored on top of the sample count, `floor(rate * 0.24)`.
#[inline]
fn sample_count_offset(sample_rate_hz: u32) -> u32 {
    (sample_rate_hz as f64 * 0.24) as u32
}

/// Serializes a signature.
///
/// Peaks of each band must be ordered by pass number.
pub fn encode_binary(signature: &Fingerprint) -> Result<Vec<u8>, SignatureError> {
    let rate = SampleRate::from_hz(signature.sample_rate_hz)?;
    let header_samples = signature
        .number_samples
        .checked_add(sample_count_offset(rate.hz()))
        .ok_or_else(|| {
            SignatureError::MalformedHeader(format!(
                "{} samples do not fit the header",
                signature.number_samples
            ))
        })?;

    let mut out = Vec::with_capacity(HEADER_SIZE + PREAMBLE_SIZE + signature.peak_count() * RECORD_SIZE);

    out.extend_from_slice(&MAGIC1.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // crc, patched below
    out.extend_from_slice(&0u32.to_le_bytes()); // size, patched below
    out.extend_from_slice(&MAGIC2.to_le_bytes());
    out.extend_from_slice(&[0u8; 12]);
    out.extend_from_slice(&(rate.id() << SAMPLE_RATE_SHIFT).to_le_bytes());
    out.extend_from_slice(&[0u8; 8]);
    out.extend_from_slice(&header_samples.to_le_bytes());
    out.extend_from_slice(&FIXED_VALUE.to_le_bytes());

    out.extend_from_slice(&PREAMBLE_TAG.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // size, patched below

    for (band, peaks) in signature.bands() {
        let payload = encode_peaks(band, peaks)?;
        out.extend_from_slice(&band.tag().to_le_bytes());
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(&payload);
        out.resize(out.len() + padding(payload.len()), 0);
    }

    let size = (out.len() - HEADER_SIZE) as u32;
    out[8..12].copy_from_slice(&size.to_le_bytes());
    out[52..56].copy_from_slice(&size.to_le_bytes());

    let mut hasher = Hasher::new();
    hasher.update(&out[8..]);
    out[4..8].copy_from_slice(&hasher.finalize().to_le_bytes());

    log::debug!(
        "Encoded signature: {} bytes, {} peaks, {} samples at {} Hz",
        out.len(),
        signature.peak_count(),
        signature.number_samples,
        signature.sample_rate_hz
    );

    Ok(out)
}

fn encode_peaks(band: FrequencyBand, peaks: &[FrequencyPeak]) -> Result<Vec<u8>, SignatureError> {
    let mut payload = Vec::with_capacity(peaks.len() * RECORD_SIZE);
    let mut last_pass = 0u32;

    for peak in peaks {
        if peak.pass_number < last_pass {
            return Err(SignatureError::UnsortedPeaks {
                band: band as u32,
                previous: last_pass,
                found: peak.pass_number,
            });
        }
        if peak.pass_number - last_pass >= PASS_ESCAPE as u32 {
            payload.push(PASS_ESCAPE);
            payload.extend_from_slice(&peak.pass_number.to_le_bytes());
            last_pass = peak.pass_number;
        }
        payload.push((peak.pass_number - last_pass) as u8);
        payload.extend_from_slice(&peak.magnitude.to_le_bytes());
        payload.extend_from_slice(&peak.frequency_bin.to_le_bytes());
        last_pass = peak.pass_number;
    }

    Ok(payload)
}

#[inline]
fn padding(len: usize) -> usize {
    (4 - len % 4) % 4
}

/// Parses a binary signature, verifying its header and checksum.
pub fn decode_binary(data: &[u8]) -> Result<Fingerprint, SignatureError> {
    if data.len() < HEADER_SIZE + PREAMBLE_SIZE {
        return Err(SignatureError::MalformedHeader(format!(
            "{} bytes is shorter than the {}-byte header",
            data.len(),
            HEADER_SIZE + PREAMBLE_SIZE
        )));
    }

    let magic1 = read_u32_le(data, 0);
    if magic1 != MAGIC1 {
        return Err(SignatureError::MalformedHeader(format!(
            "bad magic {:#010x}",
            magic1
        )));
    }

    let stored = read_u32_le(data, 4);
    let mut hasher = Hasher::new();
    hasher.update(&data[8..]);
    let computed = hasher.finalize();
    if stored != computed {
        return Err(SignatureError::ChecksumMismatch { stored, computed });
    }

    let body_size = (data.len() - HEADER_SIZE) as u32;
    let size = read_u32_le(data, 8);
    if size != body_size {
        return Err(SignatureError::MalformedHeader(format!(
            "size field {} but body is {} bytes",
            size, body_size
        )));
    }

    let magic2 = read_u32_le(data, 12);
    if magic2 != MAGIC2 {
        return Err(SignatureError::MalformedHeader(format!(
            "bad second magic {:#010x}",
            magic2
        )));
    }

    let rate_id = read_u32_le(data, 28) >> SAMPLE_RATE_SHIFT;
    let rate = SampleRate::from_id(rate_id).ok_or_else(|| {
        SignatureError::MalformedHeader(format!("unknown sample rate code {}", rate_id))
    })?;

    let number_samples = read_u32_le(data, 40)
        .checked_sub(sample_count_offset(rate.hz()))
        .ok_or_else(|| {
            SignatureError::MalformedHeader("sample count below the rate offset".to_string())
        })?;

    let preamble_tag = read_u32_le(data, 48);
    let preamble_size = read_u32_le(data, 52);
    if preamble_tag != PREAMBLE_TAG || preamble_size != body_size {
        return Err(SignatureError::MalformedHeader(format!(
            "bad preamble ({:#010x}, {})",
            preamble_tag, preamble_size
        )));
    }

    let mut signature = Fingerprint::new(rate.hz());
    signature.number_samples = number_samples;

    let mut cursor = HEADER_SIZE + PREAMBLE_SIZE;
    while cursor < data.len() {
        ensure_available(data, cursor, 8)?;
        let tag = read_u32_le(data, cursor);
        let len = read_u32_le(data, cursor + 4) as usize;
        cursor += 8;

        let band = FrequencyBand::from_tag(tag).ok_or(SignatureError::UnknownBand(tag))?;
        ensure_available(data, cursor, len + padding(len))?;
        decode_peaks(&data[cursor..cursor + len], rate.hz(), band, &mut signature)?;
        cursor += len + padding(len);
    }

    log::debug!(
        "Decoded signature: {} samples at {} Hz, {} peaks",
        signature.number_samples,
        signature.sample_rate_hz,
        signature.peak_count()
    );

    Ok(signature)
}

fn decode_peaks(
    payload: &[u8],
    sample_rate_hz: u32,
    band: FrequencyBand,
    signature: &mut Fingerprint,
) -> Result<(), SignatureError> {
    let mut cursor = 0;
    let mut pass_number = 0u32;

    while cursor < payload.len() {
        ensure_available(payload, cursor, RECORD_SIZE)?;
        let delta = payload[cursor];
        if delta == PASS_ESCAPE {
            pass_number = read_u32_le(payload, cursor + 1);
            cursor += RECORD_SIZE;
            continue;
        }
        pass_number = pass_number.wrapping_add(delta as u32);
        signature.push_peak(
            band,
            FrequencyPeak {
                pass_number,
                magnitude: read_u16_le(payload, cursor + 1),
                frequency_bin: read_u16_le(payload, cursor + 3),
                sample_rate_hz,
            },
        );
        cursor += RECORD_SIZE;
    }

    Ok(())
}

/// Serializes a signature as a `data:` URI.
pub fn encode_uri(signature: &Fingerprint) -> Result<String, SignatureError> {
    let binary = encode_binary(signature)?;
    Ok(format!("{}{}", DATA_URI_PREFIX, STANDARD.encode(binary)))
}

/// Parses a signature from a `data:` URI.
pub fn decode_uri(uri: &str) -> Result<Fingerprint, SignatureError> {
    let encoded = uri.trim().strip_prefix(DATA_URI_PREFIX).ok_or_else(|| {
        SignatureError::InvalidUri(format!("missing prefix {}", DATA_URI_PREFIX))
    })?;
    let binary = STANDARD.decode(encoded)?;
    decode_binary(&binary)
}

impl Fingerprint {
    /// See [`encode_binary`].
    pub fn encode_to_binary(&self) -> Result<Vec<u8>, SignatureError> {
        encode_binary(self)
    }

    /// See [`encode_uri`].
    pub fn encode_to_uri(&self) -> Result<String, SignatureError> {
        encode_uri(self)
    }

    /// See [`decode_binary`].
    pub fn decode_from_binary(data: &[u8]) -> Result<Self, SignatureError> {
        decode_binary(data)
    }

    /// See [`decode_uri`].
    pub fn decode_from_uri(uri: &str) -> Result<Self, SignatureError> {
        decode_uri(uri)
    }
}

#[inline]
fn ensure_available(data: &[u8], offset: usize, needed: usize) -> Result<(), SignatureError> {
    let available = data.len().saturating_sub(offset);
    if needed > available {
        return Err(SignatureError::TruncatedPayload { needed, available });
    }
    Ok(())
}

#[inline]
fn read_u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

#[inline]
fn read_u32_le(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}
