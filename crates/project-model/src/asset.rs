//! Library assets produced by the upload collaborator.

use serde::{Deserialize, Serialize};

/// Kind of media carried by an asset or clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

/// File extensions the backend treats as video containers.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi"];

impl MediaKind {
    /// Classify an uploaded file by extension. Anything that is not a
    /// known video container is treated as audio.
    pub fn from_filename(filename: &str) -> Self {
        let ext = std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext {
            Some(ext) if VIDEO_EXTENSIONS.contains(&ext.as_str()) => MediaKind::Video,
            _ => MediaKind::Audio,
        }
    }
}

/// An addressable media item in the library. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub filename: String,
    /// Server-relative URL (e.g. `/uploads/<id>.mp4`).
    pub url: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Duration in seconds.
    pub duration: f64,
}

impl Asset {
    /// Path the render backend resolves for this asset's media.
    ///
    /// Cache-busting query strings are stripped and the leading slash is
    /// replaced by `media_root`, so `/uploads/a.mp4?t=1` becomes
    /// `media/uploads/a.mp4`.
    pub fn source_path(&self, media_root: &str) -> String {
        let path = self.url.split('?').next().unwrap_or_default();
        let path = path.trim_start_matches('/');
        if media_root.is_empty() {
            path.to_string()
        } else {
            format!("{}/{}", media_root.trim_end_matches('/'), path)
        }
    }
}

/// In-memory asset list owned by the editing session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetLibrary {
    pub assets: Vec<Asset>,
}

impl AssetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an asset. Re-registering an id replaces the earlier entry.
    pub fn register(&mut self, asset: Asset) {
        if let Some(existing) = self.assets.iter_mut().find(|a| a.id == asset.id) {
            *existing = asset;
        } else {
            self.assets.push(asset);
        }
    }

    pub fn get(&self, id: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
