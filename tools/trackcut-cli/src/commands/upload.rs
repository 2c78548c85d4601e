//! Upload a media file and place it.

use std::path::PathBuf;

use trackcut_common::AppConfig;
use trackcut_render_client::{AssetStore, HttpBackend};

use super::{open, placement_mode, save};
use crate::Target;

pub async fn run(
    path: PathBuf,
    file: PathBuf,
    target: Target,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let (bundle, mut session) = open(&path, config)?;

    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid file name: {}", file.display()))?
        .to_string();
    let bytes = tokio::fs::read(&file)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", file.display()))?;

    println!("Uploading {} ({} bytes)", filename, bytes.len());
    let backend = HttpBackend::new(&config.service)?;
    let asset = backend.upload(bytes, &filename).await?;
    println!(
        "  Asset: {} ({:?}, {:.1}s)",
        asset.id, asset.kind, asset.duration
    );

    let placed = session.place_asset(asset, target.track.as_deref(), placement_mode(&target))?;
    println!(
        "  Placed on {} at {:.3}s as {}",
        placed.track_id, placed.start_time, placed.clip_id
    );
    save(bundle, session)
}
