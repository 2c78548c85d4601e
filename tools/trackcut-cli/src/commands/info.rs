//! Show project information.

use std::path::PathBuf;

use trackcut_project_model::ProjectBundle;

pub fn run(path: PathBuf, json: bool) -> anyhow::Result<()> {
    let bundle =
        ProjectBundle::load(&path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;
    let p = &bundle.project;

    if json {
        println!("{}", serde_json::to_string_pretty(p)?);
        return Ok(());
    }

    println!("Project: {}", bundle.meta.name);
    println!("  ID: {}", p.id);
    println!("  Created: {}", bundle.meta.created_at);
    println!("  Modified: {}", bundle.meta.modified_at);
    println!("  Duration: {:.3}s", p.duration());
    println!();

    println!("Tracks:");
    for track in p.tracks() {
        println!("  {} ({:?}, {} clips)", track.id, track.kind, track.clips.len());
        for clip in &track.clips {
            let link = clip
                .linked_id
                .as_deref()
                .map(|id| format!(" linked={id}"))
                .unwrap_or_default();
            println!(
                "    {} [{:.3}, {:.3}) src@{:.3} x{} vol={}{}",
                clip.id, clip.start_time, clip.end_time, clip.source_start, clip.speed, clip.volume, link
            );
        }
    }
    println!();

    println!("Library ({} assets):", bundle.library.len());
    for asset in &bundle.library.assets {
        println!(
            "  {} {} ({:?}, {:.1}s)",
            asset.id, asset.filename, asset.kind, asset.duration
        );
    }

    if !p.text_overlays.is_empty() || !p.shape_overlays.is_empty() {
        println!();
        println!(
            "Overlays: {} text, {} shape",
            p.text_overlays.len(),
            p.shape_overlays.len()
        );
    }

    Ok(())
}
