//! Whole-buffer biquad rendering with a shared anti-clipping pass.

use super::buffer::AudioBuffer;
use super::filter::{BiquadCoefficients, BiquadFilter};

/// Peak level above which the output would clip a fixed-point container.
pub const FULL_SCALE: f64 = 1.0;

/// Peak the buffer is scaled to when it exceeds [`FULL_SCALE`].
pub const SAFE_PEAK: f64 = 0.999;

/// Filter every channel independently, each from a zeroed delay state.
pub fn filter_channels(buffer: &AudioBuffer, coeffs: &BiquadCoefficients) -> AudioBuffer {
    let channels = buffer
        .channels()
        .iter()
        .map(|channel| BiquadFilter::new(*coeffs).process_block(channel))
        .collect();
    buffer.with_channels(channels)
}

/// Scale the whole buffer down to [`SAFE_PEAK`] if any sample exceeds full scale.
///
/// The gain is shared by every channel so inter-channel balance is preserved.
pub fn protect_full_scale(buffer: AudioBuffer) -> AudioBuffer {
    let peak = buffer.peak();
    if peak <= 0.0 || peak <= FULL_SCALE || !peak.is_finite() {
        return buffer;
    }
    buffer.scaled(SAFE_PEAK / peak)
}

/// Render `coeffs` over `buffer`, returning a new, clip-safe buffer.
pub fn apply(buffer: &AudioBuffer, coeffs: &BiquadCoefficients) -> AudioBuffer {
    protect_full_scale(filter_channels(buffer, coeffs))
}
