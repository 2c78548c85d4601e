//! On-disk project bundle.
//!
//! ```text
//! <root>/
//! ├── bundle.json    (name, schema version, timestamps)
//! ├── project.json   (tracks, clips, overlays; the render wire model)
//! └── library.json   (registered assets)
//! ```

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::asset::AssetLibrary;
use crate::project::{Project, ProjectError};

/// Bundle metadata (`bundle.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleMeta {
    /// Schema version.
    pub version: String,

    /// Human-readable project name.
    pub name: String,

    /// Creation timestamp (ISO 8601).
    pub created_at: String,

    /// Last modified timestamp (ISO 8601).
    pub modified_at: String,
}

/// The complete in-memory representation of a project directory.
#[derive(Debug, Clone)]
pub struct ProjectBundle {
    /// Filesystem path to the bundle directory.
    pub root: PathBuf,

    pub meta: BundleMeta,

    pub project: Project,

    pub library: AssetLibrary,
}

impl BundleMeta {
    pub fn new(name: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            version: "1.0".to_string(),
            name: name.into(),
            created_at: now.clone(),
            modified_at: now,
        }
    }
}

impl ProjectBundle {
    /// Create a new bundle on disk with the standard track layout.
    pub fn create(
        root: impl AsRef<Path>,
        name: impl Into<String>,
        audio_tracks: usize,
    ) -> Result<Self, ProjectError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root).map_err(|e| ProjectError::IoError {
            path: root.clone(),
            source: e,
        })?;

        let mut bundle = Self {
            root,
            meta: BundleMeta::new(name),
            project: Project::with_layout(audio_tracks),
            library: AssetLibrary::new(),
        };
        bundle.save()?;
        Ok(bundle)
    }

    /// Load a bundle from a directory. A missing library is treated as empty.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let root = root.as_ref().to_path_buf();

        let meta: BundleMeta = read_json(&root.join("bundle.json"))?;
        let project: Project = read_json(&root.join("project.json"))?;

        let library_path = root.join("library.json");
        let library = if library_path.exists() {
            read_json(&library_path)?
        } else {
            AssetLibrary::new()
        };

        Ok(Self {
            root,
            meta,
            project,
            library,
        })
    }

    /// Write all bundle files, stamping `modified_at`.
    pub fn save(&mut self) -> Result<(), ProjectError> {
        self.meta.modified_at = chrono::Utc::now().to_rfc3339();
        write_json(&self.root.join("bundle.json"), &self.meta)?;
        write_json(&self.root.join("project.json"), &self.project)?;
        write_json(&self.root.join("library.json"), &self.library)?;
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ProjectError> {
    let content = std::fs::read_to_string(path).map_err(|e| ProjectError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| ProjectError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ProjectError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| ProjectError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    std::fs::write(path, json).map_err(|e| ProjectError::IoError {
        path: path.to_path_buf(),
        source: e,
    })
}
