//! Frequency bands offered to the player.
//!
//! The catalog is ordered and the position of a band is its public identifier.
//! Only the last band may be open-ended; it carries a private sampling ceiling
//! that is used to draw targets and is never serialized to clients.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Sampling ceiling of the default open-ended top band.
pub const DEFAULT_TOP_SAMPLING_CEILING_HZ: f64 = 8000.0;

/// A labelled band of frequencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRange {
    pub label: String,
    pub min_hz: f64,
    /// Upper bound, `None` for the open-ended top band.
    pub max_hz: Option<f64>,
    /// Ceiling used to draw targets in an open-ended band.
    #[serde(default, skip_serializing)]
    pub sampling_ceiling_hz: Option<f64>,
}

impl FrequencyRange {
    pub fn bounded(label: impl Into<String>, min_hz: f64, max_hz: f64) -> Self {
        Self {
            label: label.into(),
            min_hz,
            max_hz: Some(max_hz),
            sampling_ceiling_hz: None,
        }
    }

    pub fn open_ended(label: impl Into<String>, min_hz: f64, sampling_ceiling_hz: f64) -> Self {
        Self {
            label: label.into(),
            min_hz,
            max_hz: None,
            sampling_ceiling_hz: Some(sampling_ceiling_hz),
        }
    }

    pub fn is_open_ended(&self) -> bool {
        self.max_hz.is_none()
    }

    /// Upper bound used when drawing a target from this band.
    pub fn effective_max_hz(&self) -> f64 {
        self.max_hz
            .or(self.sampling_ceiling_hz)
            .unwrap_or(self.min_hz)
    }
}

/// Ordered, validated list of bands, fixed once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RangeCatalog {
    ranges: Vec<FrequencyRange>,
}

impl RangeCatalog {
    pub fn new(ranges: Vec<FrequencyRange>) -> Result<Self> {
        if ranges.is_empty() {
            return Err(GameError::InvalidConfig("range catalog is empty".into()));
        }
        let last = ranges.len() - 1;
        for (i, r) in ranges.iter().enumerate() {
            if !(r.min_hz.is_finite() && r.min_hz >= 0.0) {
                return Err(GameError::InvalidConfig(format!(
                    "range '{}' has invalid minimum {}",
                    r.label, r.min_hz
                )));
            }
            match r.max_hz {
                Some(max) if !(max.is_finite() && r.min_hz < max) => {
                    return Err(GameError::InvalidConfig(format!(
                        "range '{}' needs min < max, got {} – {max}",
                        r.label, r.min_hz
                    )));
                }
                Some(_) => {}
                None if i != last => {
                    return Err(GameError::InvalidConfig(format!(
                        "only the last range may be open-ended, '{}' is at position {i}",
                        r.label
                    )));
                }
                None => match r.sampling_ceiling_hz {
                    Some(cap) if cap.is_finite() && cap > r.min_hz => {}
                    _ => {
                        return Err(GameError::InvalidConfig(format!(
                            "open-ended range '{}' needs a sampling ceiling above {}",
                            r.label, r.min_hz
                        )));
                    }
                },
            }
        }
        Ok(Self { ranges })
    }

    pub fn get(&self, index: usize) -> Result<&FrequencyRange> {
        self.ranges.get(index).ok_or(GameError::InvalidRange(index))
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn as_slice(&self) -> &[FrequencyRange] {
        &self.ranges
    }
}

impl Default for RangeCatalog {
    fn default() -> Self {
        Self {
            ranges: vec![
                FrequencyRange::bounded("20 – 120", 20.0, 120.0),
                FrequencyRange::bounded("121 – 500", 121.0, 500.0),
                FrequencyRange::bounded("501 – 800", 501.0, 800.0),
                FrequencyRange::bounded("801 – 4000", 801.0, 4000.0),
                FrequencyRange::open_ended("4001+", 4001.0, DEFAULT_TOP_SAMPLING_CEILING_HZ),
            ],
        }
    }
}
