//! Signature serialization and audio input.

pub mod dump;
pub mod payload;
pub mod signature;
pub mod wav;

pub use payload::RecognitionPayload;
pub use signature::{decode_binary, decode_uri, encode_binary, encode_uri, DATA_URI_PREFIX};
