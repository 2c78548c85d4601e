//! HTTP implementation of the collaborators against the render server.
//!
//! Endpoints:
//! - `POST /upload` (multipart `file`) returns an asset
//! - `POST /preview` and `POST /export` take a project and return `{status, url}`
//! - `POST /merge` takes a normalized project and returns an asset

use std::time::Duration;

use serde::de::DeserializeOwned;
use trackcut_common::{ServiceConfig, TrackcutError, TrackcutResult};
use trackcut_project_model::{Asset, Project};

use crate::service::{AssetStore, RenderOutput, RenderService, RenderStatus};

/// Client for the render/upload server.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: &ServiceConfig) -> TrackcutResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TrackcutError::transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a server-relative URL (e.g. `/previews/x.mp4`).
    pub fn absolute_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            format!("{}/{}", self.base_url, url)
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post_project<T: DeserializeOwned>(
        &self,
        path: &str,
        project: &Project,
    ) -> TrackcutResult<T> {
        let url = self.endpoint(path);
        tracing::debug!(%url, project_id = %project.id, clips = project.clip_count(), "POST project");

        let response = self
            .client
            .post(&url)
            .json(project)
            .send()
            .await
            .map_err(|e| TrackcutError::transport(format!("{url}: {e}")))?;
        read_json(&url, response).await
    }
}

async fn read_json<T: DeserializeOwned>(url: &str, response: reqwest::Response) -> TrackcutResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TrackcutError::transport(format!(
            "{url} returned {status}: {body}"
        )));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| TrackcutError::transport(format!("{url}: invalid response body: {e}")))
}

#[async_trait::async_trait]
impl AssetStore for HttpBackend {
    async fn upload(&self, bytes: Vec<u8>, filename: &str) -> TrackcutResult<Asset> {
        if bytes.is_empty() {
            return Err(TrackcutError::upload(format!("{filename} is empty")));
        }
        let url = self.endpoint("upload");
        let size = bytes.len();
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TrackcutError::transport(format!("{url}: {e}")))?;
        let asset: Asset = read_json(&url, response).await?;

        tracing::info!(
            asset_id = %asset.id,
            filename,
            size,
            duration = asset.duration,
            "Uploaded asset"
        );
        Ok(asset)
    }
}

#[async_trait::async_trait]
impl RenderService for HttpBackend {
    async fn request_merge(&self, project: &Project) -> TrackcutResult<Asset> {
        let asset: Asset = self.post_project("merge", project).await?;
        if !(asset.duration > 0.0) {
            return Err(TrackcutError::render(format!(
                "merge returned asset {} with duration {}",
                asset.id, asset.duration
            )));
        }
        Ok(asset)
    }

    async fn request_preview(&self, project: &Project) -> TrackcutResult<RenderOutput> {
        self.post_project("preview", project).await
    }

    async fn request_export(&self, project: &Project) -> TrackcutResult<RenderOutput> {
        let output: RenderOutput = self.post_project("export", project).await?;
        if output.status != RenderStatus::Ready {
            return Err(TrackcutError::render(format!(
                "export finished with status {:?}",
                output.status
            )));
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base_url: &str) -> HttpBackend {
        HttpBackend::new(&ServiceConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let backend = backend("http://localhost:8000/");
        assert_eq!(backend.base_url(), "http://localhost:8000");
        assert_eq!(backend.endpoint("preview"), "http://localhost:8000/preview");
    }

    #[test]
    fn test_absolute_url() {
        let backend = backend("http://localhost:8000");
        assert_eq!(
            backend.absolute_url("/previews/p.mp4?t=1"),
            "http://localhost:8000/previews/p.mp4?t=1"
        );
        assert_eq!(
            backend.absolute_url("uploads/a.wav"),
            "http://localhost:8000/uploads/a.wav"
        );
        assert_eq!(backend.absolute_url("https://cdn/x.mp4"), "https://cdn/x.mp4");
    }

    #[tokio::test]
    async fn test_empty_upload_rejected_before_sending() {
        let backend = backend("http://127.0.0.1:9");
        let err = backend.upload(vec![], "a.wav").await.unwrap_err();
        assert!(matches!(err, TrackcutError::Upload { .. }));
    }
}
