//! Initialize a new Trackcut project.

use std::path::PathBuf;

use trackcut_common::AppConfig;
use trackcut_project_model::ProjectBundle;

pub fn run(name: String, output: PathBuf, config: &AppConfig) -> anyhow::Result<()> {
    let project_dir = output.join(&name);
    println!("Creating project '{}' at {}", name, project_dir.display());

    let bundle = ProjectBundle::create(&project_dir, &name, config.editor.audio_tracks)
        .map_err(|e| anyhow::anyhow!("Failed to create project: {e}"))?;

    println!("Project created successfully:");
    println!("  Directory: {}", bundle.root.display());
    println!("  ID: {}", bundle.project.id);
    println!("  Tracks:");
    for track in bundle.project.tracks() {
        println!("    {} ({:?})", track.id, track.kind);
    }

    Ok(())
}
