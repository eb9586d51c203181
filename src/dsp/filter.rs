//! Peaking (bell) biquad: coefficient design and per-sample processing.
//!
//! Coefficient formulas from the Audio EQ Cookbook (Robert Bristow-Johnson).
//! The filter runs in Direct Form II Transposed, which produces the same output
//! as the textbook difference equation
//! `y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]`
//! from a zeroed initial state.

use std::f64::consts::PI;

use crate::error::{GameError, Result};

/// Normalized biquad coefficients (a0 divided out, so a0 == 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl BiquadCoefficients {
    /// Pass-through coefficients.
    pub const IDENTITY: BiquadCoefficients = BiquadCoefficients {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };
}

/// Design a peaking EQ centred on `center_hz`.
///
/// Fails with [`GameError::InvalidFrequency`] unless `0 < center_hz < sample_rate / 2`,
/// and with [`GameError::InvalidQ`] unless `q > 0`.
pub fn design_peaking(
    sample_rate: f64,
    center_hz: f64,
    q: f64,
    gain_db: f64,
) -> Result<BiquadCoefficients> {
    let nyquist = sample_rate / 2.0;
    if !(center_hz.is_finite() && sample_rate.is_finite() && center_hz > 0.0 && center_hz < nyquist)
    {
        return Err(GameError::InvalidFrequency {
            center_hz,
            sample_rate,
        });
    }
    if !(q.is_finite() && q > 0.0) {
        return Err(GameError::InvalidQ(q));
    }

    let a_lin = (10.0_f64).powf(gain_db / 40.0);
    let w0 = 2.0 * PI * center_hz / sample_rate;
    let cos_w0 = w0.cos();
    let alpha = w0.sin() / (2.0 * q);

    let b0 = 1.0 + alpha * a_lin;
    let b1 = -2.0 * cos_w0;
    let b2 = 1.0 - alpha * a_lin;
    let a0 = 1.0 + alpha / a_lin;
    let a1 = -2.0 * cos_w0;
    let a2 = 1.0 - alpha / a_lin;

    // Normalize by a0
    Ok(BiquadCoefficients {
        b0: b0 / a0,
        b1: b1 / a0,
        b2: b2 / a0,
        a1: a1 / a0,
        a2: a2 / a0,
    })
}

/// A biquad IIR filter (2nd order) with its own delay state.
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    coeffs: BiquadCoefficients,

    // State (Direct Form II Transposed)
    z1: f64,
    z2: f64,
}

impl BiquadFilter {
    pub fn new(coeffs: BiquadCoefficients) -> Self {
        BiquadFilter {
            coeffs,
            z1: 0.0,
            z2: 0.0,
        }
    }

    /// Process a single sample through the filter.
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let c = &self.coeffs;
        let output = c.b0 * input + self.z1;
        self.z1 = c.b1 * input - c.a1 * output + self.z2;
        self.z2 = c.b2 * input - c.a2 * output;
        output
    }

    /// Filter a whole channel from a zeroed state.
    pub fn process_block(&mut self, input: &[f64]) -> Vec<f64> {
        self.reset();
        input.iter().map(|&x| self.process(x)).collect()
    }

    /// Reset filter state.
    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}
