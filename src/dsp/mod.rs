//! Peaking EQ design and offline buffer rendering.
//!
//! Everything here is synchronous and CPU-bound. The engine works on whole
//! in-memory buffers; there is no streaming state carried between calls.

pub mod buffer;
pub mod filter;
pub mod processor;

pub use buffer::AudioBuffer;
pub use filter::{BiquadCoefficients, BiquadFilter, design_peaking};
pub use processor::apply;
