//! RIFF/WAVE input, decoded straight to interleaved 16-bit PCM.
//!
//! Only the two layouts recordings usually come in are accepted: 16-bit
//! integer PCM, kept bit for bit, and 32-bit IEEE float, scaled by 32768
//! and saturated.

use crate::core::types::AudioBuffer;
use crate::error::SignatureError;

const FORMAT_PCM: u16 = 1;
const FORMAT_IEEE_FLOAT: u16 = 3;

/// `RIFF`, file size, `WAVE`.
const RIFF_HEADER_SIZE: usize = 12;
/// Chunk id and size.
const CHUNK_HEADER_SIZE: usize = 8;
const FMT_CHUNK_MIN_SIZE: usize = 16;

/// Sample layout declared by the `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WavFormat {
    code: u16,
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

impl WavFormat {
    fn parse(chunk: &[u8]) -> Result<Self, SignatureError> {
        if chunk.len() < FMT_CHUNK_MIN_SIZE {
            return Err(invalid("fmt chunk too short".to_string()));
        }
        let format = Self {
            code: le_u16(chunk, 0),
            channels: le_u16(chunk, 2),
            sample_rate: le_u32(chunk, 4),
            bits_per_sample: le_u16(chunk, 14),
        };

        if !(1..=2).contains(&format.channels) {
            return Err(invalid(format!("Unsupported channel count: {}", format.channels)));
        }
        if format.sample_rate == 0 {
            return Err(invalid("Sample rate is zero".to_string()));
        }
        match (format.code, format.bits_per_sample) {
            (FORMAT_PCM, 16) | (FORMAT_IEEE_FLOAT, 32) => Ok(format),
            (code, bits) => Err(invalid(format!(
                "Unsupported WAV format: code={}, bits={}",
                code, bits
            ))),
        }
    }

    /// Decodes the `data` chunk. A trailing partial sample is ignored.
    fn decode(&self, data: &[u8]) -> Vec<i16> {
        if self.code == FORMAT_PCM {
            data.chunks_exact(2)
                .map(|b| i16::from_le_bytes([b[0], b[1]]))
                .collect()
        } else {
            data.chunks_exact(4)
                .map(|b| float_to_pcm(f32::from_le_bytes([b[0], b[1], b[2], b[3]])))
                .collect()
        }
    }
}

/// Reads a RIFF/WAVE file from a byte slice.
pub fn read_wav(data: &[u8]) -> Result<AudioBuffer, SignatureError> {
    if data.len() < RIFF_HEADER_SIZE || &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
        return Err(invalid("Missing RIFF/WAVE header".to_string()));
    }

    let mut format = None;
    let mut body = None;
    for (id, chunk) in chunks(&data[RIFF_HEADER_SIZE..]) {
        match id {
            b"fmt " => format = Some(WavFormat::parse(chunk)?),
            b"data" => body = Some(chunk),
            _ => {}
        }
    }
    let format = format.ok_or_else(|| invalid("No fmt chunk found".to_string()))?;
    let body = body.ok_or_else(|| invalid("No data chunk found".to_string()))?;

    let samples = format.decode(body);
    log::debug!(
        "Read WAV: {} Hz, {} channel(s), {} bits, {} frames",
        format.sample_rate,
        format.channels,
        format.bits_per_sample,
        samples.len() / format.channels as usize
    );

    Ok(AudioBuffer::new(samples, format.channels, format.sample_rate))
}

/// Reads a WAV file from disk.
pub fn read_wav_file(path: &str) -> Result<AudioBuffer, SignatureError> {
    let data =
        std::fs::read(path).map_err(|e| SignatureError::IoError(format!("{}: {}", path, e)))?;
    read_wav(&data)
}

/// Walks the chunks following the RIFF header as `(id, body)` pairs. Bodies
/// are word-aligned; one running past the end of the file is cut short.
fn chunks(data: &[u8]) -> impl Iterator<Item = (&[u8], &[u8])> + '_ {
    let mut rest = data;
    std::iter::from_fn(move || {
        if rest.len() < CHUNK_HEADER_SIZE {
            return None;
        }
        let (header, tail) = rest.split_at(CHUNK_HEADER_SIZE);
        let size = le_u32(header, 4) as usize;
        let body = &tail[..size.min(tail.len())];
        rest = &tail[(size + size % 2).min(tail.len())..];
        Some((&header[..4], body))
    })
}

fn float_to_pcm(sample: f32) -> i16 {
    (sample as f64 * 32768.0)
        .round()
        .clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

fn invalid(message: String) -> SignatureError {
    SignatureError::InvalidFormat(message)
}

#[inline]
fn le_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

#[inline]
fn le_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}
