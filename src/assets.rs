//! Source audio enumeration.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::codec::{MIME_MP3, MIME_WAV};
use crate::error::{GameError, Result};

/// A playable source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// File name shown to the client, e.g. `loop1.wav`.
    pub name: String,
    pub path: PathBuf,
    pub mime: String,
}

/// Read-only access to a collection of source sounds.
pub trait AssetSource: Send + Sync {
    /// Every asset that can currently be served. May be empty.
    fn list_available_assets(&self) -> Result<Vec<Asset>>;

    /// Raw container bytes of `asset`.
    fn read(&self, asset: &Asset) -> Result<Vec<u8>>;
}

/// Map a file extension to the MIME type the codec understands.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?;
    if ext.eq_ignore_ascii_case("wav") {
        Some(MIME_WAV)
    } else if ext.eq_ignore_ascii_case("mp3") {
        Some(MIME_MP3)
    } else {
        None
    }
}

/// A directory of sound files, rescanned on every listing.
#[derive(Debug, Clone)]
pub struct SoundLibrary {
    root: PathBuf,
}

impl SoundLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for SoundLibrary {
    fn list_available_assets(&self) -> Result<Vec<Asset>> {
        if !self.root.is_dir() {
            warn!("Sound library {} does not exist", self.root.display());
            return Ok(Vec::new());
        }

        let mut assets = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|e| GameError::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(mime) = mime_for_path(entry.path()) else {
                continue;
            };
            assets.push(Asset {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path().to_path_buf(),
                mime: mime.to_string(),
            });
        }
        debug!("Found {} assets under {}", assets.len(), self.root.display());
        Ok(assets)
    }

    fn read(&self, asset: &Asset) -> Result<Vec<u8>> {
        Ok(fs::read(&asset.path)?)
    }
}

/// Assets held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    entries: Vec<(Asset, Vec<u8>)>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset(mut self, name: &str, mime: &str, bytes: Vec<u8>) -> Self {
        let asset = Asset {
            name: name.to_string(),
            path: PathBuf::from(name),
            mime: mime.to_string(),
        };
        self.entries.push((asset, bytes));
        self
    }
}

impl AssetSource for MemoryAssets {
    fn list_available_assets(&self) -> Result<Vec<Asset>> {
        Ok(self.entries.iter().map(|(a, _)| a.clone()).collect())
    }

    fn read(&self, asset: &Asset) -> Result<Vec<u8>> {
        self.entries
            .iter()
            .find(|(a, _)| a.name == asset.name)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| {
                GameError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("asset '{}' not found", asset.name),
                ))
            })
    }
}
