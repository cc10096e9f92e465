mod common;

use songsig::io::signature::{decode_binary, decode_uri, encode_binary, encode_uri, DATA_URI_PREFIX};
use songsig::{Fingerprint, FrequencyBand, FrequencyPeak, SignatureError};

use common::SAMPLE_URI;

fn sample_binary() -> Vec<u8> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(&SAMPLE_URI[DATA_URI_PREFIX.len()..])
        .unwrap()
}

fn u32_at(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}

#[test]
fn test_sample_uri_decodes() {
    let sig = decode_uri(SAMPLE_URI).unwrap();
    assert_eq!(sig.sample_rate_hz, 16000);
    assert_eq!(sig.number_samples, 96000);
    assert!((sig.duration_secs() - 6.0).abs() < 1e-12);

    let counts: Vec<usize> = FrequencyBand::ALL.iter().map(|&b| sig.peaks(b).len()).collect();
    assert_eq!(counts, vec![24, 74, 79, 78]);
    assert_eq!(sig.peak_count(), 255);
}

#[test]
fn test_sample_uri_peaks_inside_their_band() {
    let sig = decode_uri(SAMPLE_URI).unwrap();
    for (band, peaks) in sig.bands() {
        let mut last_pass = 0;
        for peak in peaks {
            assert_eq!(
                FrequencyBand::classify(peak.frequency_hz()),
                Some(band),
                "peak {:?} at {:.1} Hz",
                peak,
                peak.frequency_hz()
            );
            let (low, high) = band.range_hz();
            assert!(peak.frequency_hz() >= low && peak.frequency_hz() <= high);
            assert_eq!(peak.sample_rate_hz, sig.sample_rate_hz);
            assert!(peak.pass_number >= last_pass);
            last_pass = peak.pass_number;
        }
    }
}

#[test]
fn test_sample_uri_reencodes_byte_identical() {
    let original = sample_binary();
    let sig = decode_binary(&original).unwrap();
    assert_eq!(encode_binary(&sig).unwrap(), original);
    assert_eq!(encode_uri(&sig).unwrap(), SAMPLE_URI);
}

#[test]
fn test_single_bit_flips_fail_checksum() {
    let original = sample_binary();
    for byte in 8..original.len() {
        let mut corrupted = original.clone();
        corrupted[byte] ^= 1 << (byte % 8);
        match decode_binary(&corrupted) {
            Err(SignatureError::ChecksumMismatch { stored, computed }) => {
                assert_eq!(stored, u32_at(&original, 4));
                assert_ne!(stored, computed);
            }
            other => panic!("byte {}: expected ChecksumMismatch, got {:?}", byte, other),
        }
    }
}

#[test]
fn test_header_invariants_of_encoded_signatures() {
    let sig = decode_uri(SAMPLE_URI).unwrap();
    let data = encode_binary(&sig).unwrap();

    assert_eq!(u32_at(&data, 0), 0xCAFE_2580);
    assert_eq!(u32_at(&data, 8) as usize, data.len() - 48);
    assert_eq!(u32_at(&data, 12), 0x9411_9C00);
    assert_eq!(u32_at(&data, 28) >> 27, 3);
    assert_eq!(u32_at(&data, 40), 96000 + 3840);
    assert_eq!(u32_at(&data, 44), (15 << 19) + 0x40000);
    assert_eq!(u32_at(&data, 48), 0x4000_0000);
    assert_eq!(u32_at(&data, 52) as usize, data.len() - 48);
    assert_eq!(data.len() % 4, 0);

    // TLV tags in ascending band order.
    let mut offset = 56;
    let mut tags = Vec::new();
    while offset < data.len() {
        let tag = u32_at(&data, offset);
        let len = u32_at(&data, offset + 4) as usize;
        tags.push(tag);
        offset += 8 + len + (4 - len % 4) % 4;
    }
    assert_eq!(offset, data.len());
    assert_eq!(tags, vec![0x6003_0040, 0x6003_0041, 0x6003_0042, 0x6003_0043]);
}

#[test]
fn test_every_rate_roundtrips() {
    for rate in [8000, 11025, 16000, 32000, 44100, 48000] {
        let mut sig = Fingerprint::new(rate);
        sig.number_samples = 12345;
        sig.push_peak(
            FrequencyBand::Hz520To1450,
            FrequencyPeak {
                pass_number: 7,
                magnitude: 20000,
                frequency_bin: 10000,
                sample_rate_hz: rate,
            },
        );
        let uri = sig.encode_to_uri().unwrap();
        assert_eq!(Fingerprint::decode_from_uri(&uri).unwrap(), sig);
    }
}

#[test]
fn test_pass_gaps_roundtrip() {
    let mut sig = Fingerprint::new(16000);
    sig.number_samples = 10_000_000;
    let passes = [0u32, 0, 1, 254, 509, 510, 765, 1020, 70_000, 70_254, 78_000];
    for (i, &pass_number) in passes.iter().enumerate() {
        sig.push_peak(
            FrequencyBand::Hz3500To5500,
            FrequencyPeak {
                pass_number,
                magnitude: 30000 + i as u16,
                frequency_bin: 40000 + i as u16,
                sample_rate_hz: 16000,
            },
        );
    }
    let decoded = decode_binary(&encode_binary(&sig).unwrap()).unwrap();
    assert_eq!(decoded, sig);
}

#[test]
fn test_decode_rejects_garbage() {
    assert!(matches!(decode_uri("hello"), Err(SignatureError::InvalidUri(_))));
    assert!(matches!(
        decode_uri(&format!("{}AAAA", DATA_URI_PREFIX)),
        Err(SignatureError::MalformedHeader(_))
    ));

    let mut truncated = sample_binary();
    truncated.truncate(200);
    // Shortening the message changes the checksummed bytes.
    assert!(matches!(
        decode_binary(&truncated),
        Err(SignatureError::ChecksumMismatch { .. })
    ));
}
