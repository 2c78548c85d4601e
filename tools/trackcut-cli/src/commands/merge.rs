//! Merge a run of clips through the render backend.

use std::path::PathBuf;
use std::sync::Arc;

use trackcut_common::AppConfig;
use trackcut_render_client::{HttpBackend, MergeOrchestrator};

use super::{open, save};

pub async fn run(
    path: PathBuf,
    track: String,
    clips: Vec<String>,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let (bundle, session) = open(&path, config)?;
    let session = Arc::new(tokio::sync::Mutex::new(session));

    let backend = Arc::new(HttpBackend::new(&config.service)?);
    let orchestrator = MergeOrchestrator::new(backend);

    println!("Merging {} clip(s) on {}...", clips.len(), track);
    let merged = orchestrator.merge(&session, &track, &clips).await?;
    println!("Merged into {merged}");

    let session = Arc::try_unwrap(session)
        .map_err(|_| anyhow::anyhow!("Session still shared after merge"))?
        .into_inner();
    save(bundle, session)
}
