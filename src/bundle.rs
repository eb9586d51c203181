//! Round generation. Picks a sound, a band and a hidden frequency, renders
//! the boosted copy, and commits the new target to the session.
//!
//! The returned metadata never carries the center frequency: [`EqParams`]
//! holds it for rendering, [`PublicEqMetadata`] is what leaves the engine and
//! has no field for it.

use std::path::Path;
use std::sync::Arc;

use log::{debug, info};
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::assets::{Asset, AssetSource};
use crate::codec::{self, MIME_WAV, OutputFormat};
use crate::config::{EngineConfig, EqSettings};
use crate::dsp::{self, AudioBuffer, design_peaking};
use crate::error::{GameError, Result};
use crate::ranges::{FrequencyRange, RangeCatalog};
use crate::session::GameSession;

/// Full parameter set of one render, including the secret center frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EqParams {
    pub center_hz: f64,
    pub q: f64,
    pub gain_db: f64,
    pub sample_rate: u32,
    pub channel_count: usize,
}

impl EqParams {
    /// Client-safe view of these parameters.
    pub fn public_metadata(&self, filename: &str) -> PublicEqMetadata {
        PublicEqMetadata {
            kind: "peaking".to_string(),
            gain_db: self.gain_db,
            q: self.q,
            sample_rate: self.sample_rate,
            channels: self.channel_count,
            filename: filename.to_string(),
        }
    }
}

/// Render metadata sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicEqMetadata {
    #[serde(rename = "type")]
    pub kind: String,
    pub gain_db: f64,
    #[serde(rename = "Q")]
    pub q: f64,
    pub sample_rate: u32,
    pub channels: usize,
    pub filename: String,
}

/// One encoded audio file.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedAudio {
    pub filename: String,
    pub mime: String,
    pub data: Vec<u8>,
}

/// Everything a client needs for one round.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub original: RenderedAudio,
    pub filtered: RenderedAudio,
    pub eq: PublicEqMetadata,
}

/// Render-time knobs shared by every round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    pub eq: EqSettings,
    pub output_format: OutputFormat,
    pub filter_ceiling_ratio: f64,
    pub min_center_hz: f64,
}

impl From<&EngineConfig> for RenderSettings {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            eq: cfg.eq,
            output_format: cfg.output_format,
            filter_ceiling_ratio: cfg.filter_ceiling_ratio,
            min_center_hz: cfg.min_center_hz,
        }
    }
}

/// Interval a target may be drawn from for `range` at `sample_rate`.
///
/// The band's own ceiling and the filter's safe ceiling are applied
/// independently; an empty interval fails with `InvalidFrequency`.
pub fn sampling_bounds(
    range: &FrequencyRange,
    sample_rate: u32,
    settings: &RenderSettings,
) -> Result<(f64, f64)> {
    let filter_ceiling = sample_rate as f64 / 2.0 * settings.filter_ceiling_ratio;
    let lo = range.min_hz.max(settings.min_center_hz);
    let hi = range.effective_max_hz().min(filter_ceiling);
    if lo < hi {
        Ok((lo, hi))
    } else {
        Err(GameError::InvalidFrequency {
            center_hz: lo,
            sample_rate: sample_rate as f64,
        })
    }
}

/// Draw a target uniformly from `[lo, hi)`.
pub fn draw_target<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (f64, f64)) -> f64 {
    rng.random_range(lo..hi)
}

fn output_names(asset: &Asset) -> (String, String) {
    let stem = Path::new(&asset.name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    (format!("{stem}.wav"), format!("{stem}__eq.wav"))
}

/// Produces rounds and is the only writer of the shared [`GameSession`].
pub struct BundleGenerator<R = ChaCha8Rng> {
    assets: Arc<dyn AssetSource>,
    catalog: RangeCatalog,
    session: Arc<GameSession>,
    settings: RenderSettings,
    rng: Mutex<R>,
}

impl BundleGenerator<ChaCha8Rng> {
    /// Generator seeded from the OS.
    pub fn new(
        config: &EngineConfig,
        assets: Arc<dyn AssetSource>,
        session: Arc<GameSession>,
    ) -> Result<Self> {
        Self::with_rng(config, assets, session, ChaCha8Rng::from_os_rng())
    }

    /// Generator with a fixed seed, for reproducible rounds.
    pub fn seeded(
        config: &EngineConfig,
        assets: Arc<dyn AssetSource>,
        session: Arc<GameSession>,
        seed: u64,
    ) -> Result<Self> {
        Self::with_rng(config, assets, session, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send> BundleGenerator<R> {
    pub fn with_rng(
        config: &EngineConfig,
        assets: Arc<dyn AssetSource>,
        session: Arc<GameSession>,
        rng: R,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            assets,
            catalog: config.catalog()?,
            session,
            settings: RenderSettings::from(config),
            rng: Mutex::new(rng),
        })
    }

    pub fn catalog(&self) -> &RangeCatalog {
        &self.catalog
    }

    pub fn session(&self) -> &Arc<GameSession> {
        &self.session
    }

    /// Start a new round with a random sound, band and target.
    pub fn generate(&self) -> Result<Bundle> {
        let available = self.available_assets()?;
        let (asset_index, range_index) = {
            let mut rng = self.rng.lock();
            (
                rng.random_range(0..available.len()),
                rng.random_range(0..self.catalog.len()),
            )
        };
        let asset = &available[asset_index];
        let range = self.catalog.get(range_index)?;

        let original = self.load(asset)?;
        let bounds = sampling_bounds(range, original.sample_rate(), &self.settings)?;
        let target_hz = draw_target(&mut *self.rng.lock(), bounds);

        self.render(asset, &original, range_index, target_hz)
    }

    /// Start a new round with a chosen band and target; the sound is still random.
    pub fn generate_with_target(&self, range_index: usize, target_hz: f64) -> Result<Bundle> {
        self.catalog.get(range_index)?;
        let available = self.available_assets()?;
        let asset_index = self.rng.lock().random_range(0..available.len());
        let asset = &available[asset_index];

        let original = self.load(asset)?;
        self.render(asset, &original, range_index, target_hz)
    }

    fn available_assets(&self) -> Result<Vec<Asset>> {
        let available = self.assets.list_available_assets()?;
        if available.is_empty() {
            return Err(GameError::NoSourceAvailable);
        }
        Ok(available)
    }

    fn load(&self, asset: &Asset) -> Result<AudioBuffer> {
        let bytes = self.assets.read(asset)?;
        codec::decode(&bytes, &asset.mime)
    }

    /// Render both files, then commit the target. Nothing is committed on failure.
    fn render(
        &self,
        asset: &Asset,
        original: &AudioBuffer,
        range_index: usize,
        target_hz: f64,
    ) -> Result<Bundle> {
        let params = EqParams {
            center_hz: target_hz,
            q: self.settings.eq.q,
            gain_db: self.settings.eq.gain_db,
            sample_rate: original.sample_rate(),
            channel_count: original.channel_count(),
        };
        let coeffs = design_peaking(
            params.sample_rate as f64,
            params.center_hz,
            params.q,
            params.gain_db,
        )?;
        let filtered = dsp::apply(original, &coeffs);
        debug!(
            "Rendered {} ({} ch, {} frames, {} Hz)",
            asset.name,
            params.channel_count,
            filtered.len(),
            params.sample_rate
        );

        let format = self.settings.output_format;
        let (original_name, filtered_name) = output_names(asset);
        let original_wav = codec::encode_wav(original, format)?;
        let filtered_wav = codec::encode_wav(&filtered, format)?;

        self.session.set(target_hz, range_index);
        info!("New round: asset={} range={}", asset.name, range_index);

        Ok(Bundle {
            original: RenderedAudio {
                filename: original_name,
                mime: MIME_WAV.to_string(),
                data: original_wav,
            },
            eq: params.public_metadata(&filtered_name),
            filtered: RenderedAudio {
                filename: filtered_name,
                mime: MIME_WAV.to_string(),
                data: filtered_wav,
            },
        })
    }
}
