//! Validate a Trackcut project bundle.

use std::path::PathBuf;

use trackcut_common::AppConfig;
use trackcut_project_model::ProjectBundle;

pub fn run(path: PathBuf, config: &AppConfig) -> anyhow::Result<()> {
    println!("Validating project at: {}", path.display());

    let bundle =
        ProjectBundle::load(&path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;
    let project = &bundle.project;

    println!("  Name: {}", bundle.meta.name);
    println!("  Version: {}", bundle.meta.version);
    println!("  Clips: {}", project.clip_count());

    let mut issues = project.check_invariants(config.editor.overlap_epsilon);
    for overlay in &project.text_overlays {
        if let Err(e) = overlay.validate() {
            issues.push(e.to_string());
        }
    }
    for overlay in &project.shape_overlays {
        if let Err(e) = overlay.validate() {
            issues.push(e.to_string());
        }
    }

    if issues.is_empty() {
        println!("\nProject is valid.");
        return Ok(());
    }

    println!("\nValidation issues:");
    for issue in &issues {
        println!("  - {issue}");
    }
    anyhow::bail!("{} issue(s) found", issues.len())
}
