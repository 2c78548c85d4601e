pub mod config;
pub mod edit;
pub mod info;
pub mod init;
pub mod merge;
pub mod render;
pub mod upload;
pub mod validate;

use std::path::Path;

use trackcut_common::AppConfig;
use trackcut_edit_core::{EditError, EditorSession, ErrorCategory, PlacementMode};
use trackcut_project_model::ProjectBundle;
use trackcut_render_client::MergeError;

use crate::Target;

/// Load a bundle and open an editing session over a copy of its contents.
pub(crate) fn open(path: &Path, config: &AppConfig) -> anyhow::Result<(ProjectBundle, EditorSession)> {
    let bundle =
        ProjectBundle::load(path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;
    let session = EditorSession::new(
        bundle.project.clone(),
        bundle.library.clone(),
        config.editor.clone(),
    );
    Ok((bundle, session))
}

/// Write the session's state back into the bundle, if anything changed.
pub(crate) fn save(mut bundle: ProjectBundle, session: EditorSession) -> anyhow::Result<()> {
    if session.revision() == 0 {
        return Ok(());
    }
    let (project, library) = session.into_parts();
    bundle.project = project;
    bundle.library = library;
    bundle
        .save()
        .map_err(|e| anyhow::anyhow!("Failed to save project: {e}"))?;
    tracing::debug!(root = %bundle.root.display(), "Project saved");
    Ok(())
}

pub(crate) fn placement_mode(target: &Target) -> PlacementMode {
    match target.at {
        Some(t) => PlacementMode::At(t),
        None => PlacementMode::Append,
    }
}

/// Category of the editing failure behind `err`, if it is one.
pub(crate) fn edit_failure(err: &anyhow::Error) -> Option<ErrorCategory> {
    if let Some(e) = err.downcast_ref::<EditError>() {
        return Some(e.category());
    }
    match err.downcast_ref::<MergeError>() {
        Some(MergeError::Edit(e)) => Some(e.category()),
        _ => None,
    }
}
