//! JSON body a recognition client posts along with a signature.
//!
//! The crate never talks to the network or reads the clock: the caller
//! supplies the timestamp and sends the body.

use serde::{Deserialize, Serialize};

use crate::core::types::Fingerprint;
use crate::error::SignatureError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geolocation {
    pub altitude: f64,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for Geolocation {
    fn default() -> Self {
        Self {
            altitude: 300.0,
            latitude: 45.0,
            longitude: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignaturePayload {
    /// Duration of the signed audio in milliseconds.
    pub samplems: u64,
    pub timestamp: u64,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionPayload {
    pub geolocation: Geolocation,
    pub signature: SignaturePayload,
    pub timestamp: u64,
    pub timezone: String,
}

pub const DEFAULT_TIMEZONE: &str = "Europe/Paris";

impl RecognitionPayload {
    /// Builds the body for `signature`, taken at `timestamp_ms` (Unix
    /// milliseconds).
    pub fn new(signature: &Fingerprint, timestamp_ms: u64) -> Result<Self, SignatureError> {
        let uri = signature.encode_to_uri()?;
        Ok(Self {
            geolocation: Geolocation::default(),
            signature: SignaturePayload {
                samplems: signature.number_samples as u64 * 1000 / signature.sample_rate_hz as u64,
                timestamp: timestamp_ms,
                uri,
            },
            timestamp: timestamp_ms,
            timezone: DEFAULT_TIMEZONE.to_string(),
        })
    }

    pub fn with_geolocation(mut self, geolocation: Geolocation) -> Self {
        self.geolocation = geolocation;
        self
    }

    pub fn with_timezone(mut self, timezone: &str) -> Self {
        self.timezone = timezone.to_string();
        self
    }

    pub fn to_json(&self) -> Result<String, SignatureError> {
        serde_json::to_string(self).map_err(|e| SignatureError::InvalidFormat(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, SignatureError> {
        serde_json::to_string_pretty(self).map_err(|e| SignatureError::InvalidFormat(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_fields() {
        let mut fp = Fingerprint::new(16000);
        fp.number_samples = 49664;
        let payload = RecognitionPayload::new(&fp, 1_700_000_000_123).unwrap();
        assert_eq!(payload.signature.samplems, 3104);
        assert_eq!(payload.signature.timestamp, 1_700_000_000_123);
        assert_eq!(payload.timestamp, 1_700_000_000_123);
        assert_eq!(payload.timezone, "Europe/Paris");
        assert_eq!(Fingerprint::decode_from_uri(&payload.signature.uri).unwrap(), fp);

        let value: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
        assert_eq!(value["geolocation"]["altitude"], 300.0);
        assert_eq!(value["signature"]["samplems"], 3104);
        let back: RecognitionPayload = serde_json::from_value(value).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_payload_overrides() {
        let fp = Fingerprint::new(8000);
        let payload = RecognitionPayload::new(&fp, 0)
            .unwrap()
            .with_timezone("America/New_York")
            .with_geolocation(Geolocation {
                altitude: 10.0,
                latitude: 40.7,
                longitude: -74.0,
            });
        assert_eq!(payload.timezone, "America/New_York");
        assert_eq!(payload.geolocation.longitude, -74.0);
    }

    #[test]
    fn test_payload_rejects_unsupported_rate() {
        let fp = Fingerprint::new(22050);
        assert!(RecognitionPayload::new(&fp, 0).is_err());
    }
}
