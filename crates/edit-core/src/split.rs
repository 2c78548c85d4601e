//! Splitting a clip at a timeline instant.

use trackcut_project_model::{Clip, ClipId, Project, TimeSpan};

use crate::error::{invariant_violation, EditError};

/// Result of a split request.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitOutcome {
    /// The clip (and its linked partner) were cut. `right_ids` holds the
    /// new right halves, primary first.
    Done {
        project: Project,
        right_ids: Vec<ClipId>,
    },
    /// The instant was not more than epsilon inside the clip.
    Noop,
}

/// Split `clip_id` at timeline instant `at`.
///
/// The left half keeps the clip's id and its link. The right half gets a
/// fresh id and a source offset advanced by `(at - start) * speed`. A
/// linked partner is split at the same instant and the two right halves
/// are linked to each other. If the partner cannot be cut at `at`, the
/// split is refused rather than leaving a one-sided link.
///
/// Both halves must be longer than `epsilon`. A cut closer than that to
/// either edge is a no-op.
pub fn split(
    project: &Project,
    clip_id: &str,
    at: f64,
    epsilon: f64,
) -> Result<SplitOutcome, EditError> {
    let clip = project
        .clip(clip_id)
        .ok_or_else(|| EditError::clip_not_found(clip_id))?;

    if !cuts_cleanly(clip.span(), at, epsilon) {
        tracing::debug!(clip_id, at, "Split point outside clip; ignoring");
        return Ok(SplitOutcome::Noop);
    }

    let partner = match clip.linked_id.as_deref() {
        Some(linked_id) => {
            let partner = project.clip(linked_id).ok_or_else(|| {
                invariant_violation(format!(
                    "clip {clip_id} links to missing clip {linked_id}"
                ))
            })?;
            if !cuts_cleanly(partner.span(), at, epsilon) {
                return Err(EditError::LinkedSplitMismatch {
                    clip_id: clip_id.to_string(),
                    linked_id: linked_id.to_string(),
                    at,
                });
            }
            Some(partner)
        }
        None => None,
    };

    let mut right = right_half(clip, at);
    let mut partner_right = partner.map(|p| right_half(p, at));
    if let Some(pr) = partner_right.as_mut() {
        pr.linked_id = Some(right.id.clone());
        right.linked_id = Some(pr.id.clone());
    }

    let mut next = project.clone();
    for left in std::iter::once(clip).chain(partner) {
        next.modify_clip(&left.id, |c| c.end_time = at);
    }

    let right_ids: Vec<ClipId> = std::iter::once(&right)
        .chain(partner_right.as_ref())
        .map(|c| c.id.clone())
        .collect();
    for half in std::iter::once(right).chain(partner_right) {
        next.insert_clip(half)
            .map_err(|e| invariant_violation(format!("split insert failed: {e}")))?;
    }

    tracing::info!(clip_id, at, pieces = right_ids.len() * 2, "Split clip");
    Ok(SplitOutcome::Done {
        project: next,
        right_ids,
    })
}

fn cuts_cleanly(span: TimeSpan, at: f64, epsilon: f64) -> bool {
    span.strictly_contains(at) && at - span.start > epsilon && span.end - at > epsilon
}

fn right_half(clip: &Clip, at: f64) -> Clip {
    Clip {
        id: trackcut_project_model::new_id(),
        start_time: at,
        source_start: clip.source_offset_at(at),
        linked_id: None,
        ..clip.clone()
    }
}
