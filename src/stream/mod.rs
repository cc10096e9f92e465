//! Streaming signature generation.

pub mod generator;

pub use generator::SignatureGenerator;
