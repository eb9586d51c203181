//! Planar multi-channel audio buffer.
//!
//! Buffers are treated as values: transforms return a new buffer and never
//! touch the source, so the untouched original can be delivered side by side
//! with the processed copy.

use crate::error::{GameError, Result};

/// Planar f64 audio with an associated sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    channels: Vec<Vec<f64>>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Build a buffer from per-channel sample vectors. All channels must share a length.
    pub fn new(channels: Vec<Vec<f64>>, sample_rate: u32) -> Result<Self> {
        if channels.is_empty() {
            return Err(GameError::Codec("audio buffer needs at least one channel".into()));
        }
        if sample_rate == 0 {
            return Err(GameError::Codec("sample rate must be non-zero".into()));
        }
        let len = channels[0].len();
        if let Some(bad) = channels.iter().position(|c| c.len() != len) {
            return Err(GameError::Codec(format!(
                "channel {bad} has {} frames, expected {len}",
                channels[bad].len()
            )));
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Deinterleave `samples` into `channel_count` planar channels.
    pub fn from_interleaved(samples: &[f64], channel_count: usize, sample_rate: u32) -> Result<Self> {
        if channel_count == 0 {
            return Err(GameError::Codec("channel count must be non-zero".into()));
        }
        if samples.len() % channel_count != 0 {
            return Err(GameError::Codec(format!(
                "{} interleaved samples do not divide into {channel_count} channels",
                samples.len()
            )));
        }
        let frames = samples.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for (i, &sample) in samples.iter().enumerate() {
            channels[i % channel_count].push(sample);
        }
        Self::new(channels, sample_rate)
    }

    /// Interleave channels frame by frame.
    pub fn to_interleaved(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.len() * self.channel_count());
        for frame in 0..self.len() {
            for channel in &self.channels {
                out.push(channel[frame]);
            }
        }
        out
    }

    pub fn channels(&self) -> &[Vec<f64>] {
        &self.channels
    }

    pub fn channel(&self, index: usize) -> Option<&[f64]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames (samples per channel).
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn duration_secs(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample across every channel (0.0 for an empty buffer).
    pub fn peak(&self) -> f64 {
        self.channels
            .iter()
            .flat_map(|c| c.iter())
            .fold(0.0_f64, |m, s| m.max(s.abs()))
    }

    /// A copy of this buffer with every sample multiplied by `gain`.
    pub fn scaled(&self, gain: f64) -> AudioBuffer {
        AudioBuffer {
            channels: self
                .channels
                .iter()
                .map(|c| c.iter().map(|s| s * gain).collect())
                .collect(),
            sample_rate: self.sample_rate,
        }
    }

    /// A buffer with the same sample rate and new channel data.
    pub(crate) fn with_channels(&self, channels: Vec<Vec<f64>>) -> AudioBuffer {
        AudioBuffer {
            channels,
            sample_rate: self.sample_rate,
        }
    }
}
