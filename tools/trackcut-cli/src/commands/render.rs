//! Preview and export renders.

use std::path::PathBuf;

use trackcut_common::AppConfig;
use trackcut_project_model::ProjectBundle;
use trackcut_render_client::{HttpBackend, RenderService, RenderStatus};

pub async fn preview(path: PathBuf, config: &AppConfig) -> anyhow::Result<()> {
    let bundle =
        ProjectBundle::load(&path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;
    let backend = HttpBackend::new(&config.service)?;

    let output = backend.request_preview(&bundle.project).await?;
    match output.status {
        RenderStatus::Ready => println!("Preview: {}", backend.absolute_url(&output.url)),
        RenderStatus::Empty => println!("Timeline is empty; nothing to preview"),
        RenderStatus::Error => anyhow::bail!("Preview render failed"),
    }
    Ok(())
}

pub async fn export(path: PathBuf, config: &AppConfig) -> anyhow::Result<()> {
    println!("Exporting project at: {}", path.display());
    let bundle =
        ProjectBundle::load(&path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;
    if bundle.project.is_empty() {
        anyhow::bail!("Timeline is empty; nothing to export");
    }

    let backend = HttpBackend::new(&config.service)?;
    let output = backend.request_export(&bundle.project).await?;
    println!("Export complete: {}", backend.absolute_url(&output.url));
    Ok(())
}
