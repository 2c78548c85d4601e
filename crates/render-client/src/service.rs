//! External collaborator interfaces.

use serde::{Deserialize, Serialize};
use trackcut_common::TrackcutResult;
use trackcut_project_model::{Asset, Project};

/// Outcome class of a preview or export render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStatus {
    Ready,
    /// Nothing to render: the timeline has no clips.
    Empty,
    Error,
}

/// Response body of `/preview` and `/export`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOutput {
    pub status: RenderStatus,
    #[serde(default)]
    pub url: String,
}

impl RenderOutput {
    pub fn is_ready(&self) -> bool {
        self.status == RenderStatus::Ready && !self.url.is_empty()
    }
}

/// Turns uploaded bytes into an addressable asset.
#[async_trait::async_trait]
pub trait AssetStore: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, filename: &str) -> TrackcutResult<Asset>;
}

/// Renders timeline descriptions.
#[async_trait::async_trait]
pub trait RenderService: Send + Sync {
    /// Render a normalized clip run into a single new asset.
    async fn request_merge(&self, project: &Project) -> TrackcutResult<Asset>;

    /// Fast, low-quality render of the whole timeline.
    async fn request_preview(&self, project: &Project) -> TrackcutResult<RenderOutput>;

    /// Full-quality render of the whole timeline.
    async fn request_export(&self, project: &Project) -> TrackcutResult<RenderOutput>;
}
