//! Core types, ring buffers, window functions and FFT helpers.

pub mod fft;
pub mod resample;
pub mod ring_buffer;
pub mod types;
pub mod window;

pub use ring_buffer::CircularBuffer;
pub use types::*;
