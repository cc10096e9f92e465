//! Human-readable JSON rendering of a signature, for inspection only.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::core::types::{Fingerprint, FrequencyBand, FrequencyPeak};
use crate::error::SignatureError;

/// JSON view of one peak, with its derived values.
#[derive(Debug, Clone, Serialize)]
pub struct PeakDump {
    pub pass_number: u32,
    pub magnitude: u16,
    pub frequency_bin: u16,
    pub frequency_hz: f64,
    pub amplitude_pcm: f64,
    pub seconds: f64,
}

impl From<&FrequencyPeak> for PeakDump {
    fn from(peak: &FrequencyPeak) -> Self {
        Self {
            pass_number: peak.pass_number,
            magnitude: peak.magnitude,
            frequency_bin: peak.frequency_bin,
            frequency_hz: peak.frequency_hz(),
            amplitude_pcm: peak.amplitude_pcm(),
            seconds: peak.seconds(),
        }
    }
}

/// JSON view of a signature. Bands are keyed by name in band order.
#[derive(Debug, Clone, Serialize)]
pub struct SignatureDump {
    pub sample_rate_hz: u32,
    pub number_samples: u32,
    pub seconds: f64,
    #[serde(serialize_with = "serialize_bands")]
    pub bands: Vec<(FrequencyBand, Vec<PeakDump>)>,
}

impl From<&Fingerprint> for SignatureDump {
    fn from(signature: &Fingerprint) -> Self {
        Self {
            sample_rate_hz: signature.sample_rate_hz,
            number_samples: signature.number_samples,
            seconds: signature.duration_secs(),
            bands: signature
                .bands()
                .map(|(band, peaks)| (band, peaks.iter().map(PeakDump::from).collect()))
                .collect(),
        }
    }
}

fn serialize_bands<S: Serializer>(
    bands: &[(FrequencyBand, Vec<PeakDump>)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(bands.len()))?;
    for (band, peaks) in bands {
        map.serialize_entry(band.name(), peaks)?;
    }
    map.end()
}

/// Pretty-printed JSON dump of `signature`.
pub fn to_json_pretty(signature: &Fingerprint) -> Result<String, SignatureError> {
    serde_json::to_string_pretty(&SignatureDump::from(signature))
        .map_err(|e| SignatureError::InvalidFormat(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_fields_and_band_order() {
        let mut fp = Fingerprint::new(16000);
        fp.number_samples = 32000;
        let peak = |pass_number| FrequencyPeak {
            pass_number,
            magnitude: 6144,
            frequency_bin: 8192,
            sample_rate_hz: 16000,
        };
        fp.push_peak(FrequencyBand::Hz3500To5500, peak(2));
        fp.push_peak(FrequencyBand::Hz520To1450, peak(125));

        let json = to_json_pretty(&fp).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["sample_rate_hz"], 16000);
        assert_eq!(value["number_samples"], 32000);
        assert_eq!(value["seconds"], 2.0);

        let p = &value["bands"]["520_1450"][0];
        assert_eq!(p["pass_number"], 125);
        assert_eq!(p["frequency_hz"], 1000.0);
        assert_eq!(p["seconds"], 1.0);
        assert!(value["bands"].get("250_520").is_none());

        // Map keys follow band order, not alphabetical order.
        let low = json.find("520_1450").unwrap();
        let high = json.find("3500_5500").unwrap();
        assert!(low < high);
    }
}
