//! Delete and per-clip property edits.

use trackcut_project_model::{ClipId, Project};

use crate::error::{invariant_violation, EditError};
use crate::selection::{link_closure, Selection};

/// Remove every selected clip together with its linked partner.
///
/// Returns the new snapshot and the removed ids in id order. A selected
/// clip whose link points nowhere refuses the delete.
pub fn delete(
    project: &Project,
    selection: &Selection,
) -> Result<(Project, Vec<ClipId>), EditError> {
    let doomed: Vec<ClipId> = link_closure(project, selection.iter().cloned())?
        .into_iter()
        .collect();

    let mut next = project.clone();
    for id in &doomed {
        next.remove_clip(id);
    }
    if !doomed.is_empty() {
        tracing::info!(removed = doomed.len(), "Deleted clips");
    }
    Ok((next, doomed))
}

/// Set one clip's volume. Linked partners keep their own volume.
pub fn set_volume(project: &Project, clip_id: &str, volume: f64) -> Result<Project, EditError> {
    if !volume.is_finite() || volume < 0.0 {
        return Err(EditError::InvalidProperty {
            property: "volume",
            value: volume,
        });
    }
    if project.clip(clip_id).is_none() {
        return Err(EditError::clip_not_found(clip_id));
    }

    let mut next = project.clone();
    next.modify_clip(clip_id, |c| c.volume = volume);
    tracing::debug!(clip_id, volume, "Volume changed");
    Ok(next)
}

/// Set a clip's playback speed, and its linked partner's with it.
///
/// Timeline span is unchanged; the clip consumes more or less source.
pub fn set_speed(project: &Project, clip_id: &str, speed: f64) -> Result<Project, EditError> {
    if !speed.is_finite() || speed <= 0.0 {
        return Err(EditError::InvalidProperty {
            property: "speed",
            value: speed,
        });
    }
    let clip = project
        .clip(clip_id)
        .ok_or_else(|| EditError::clip_not_found(clip_id))?;

    let mut targets = vec![clip.id.clone()];
    if let Some(linked_id) = &clip.linked_id {
        if project.clip(linked_id).is_none() {
            return Err(invariant_violation(format!(
                "clip {clip_id} links to missing clip {linked_id}"
            )));
        }
        targets.push(linked_id.clone());
    }

    let mut next = project.clone();
    for id in &targets {
        next.modify_clip(id, |c| c.speed = speed);
    }
    tracing::debug!(clip_id, speed, clips = targets.len(), "Speed changed");
    Ok(next)
}
