//! Selection and link closure.
//!
//! A selection is always closed under the link relation: selecting one
//! half of a linked pair selects the other half too, so drags and
//! deletes never separate a pair.

use std::collections::BTreeSet;

use trackcut_project_model::{ClipId, Project};

use crate::error::{invariant_violation, EditError};

/// A closed set of selected clip ids, iterated in id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<ClipId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selection holding the link closure of `seeds`.
    pub fn closed<I, S>(project: &Project, seeds: I) -> Result<Self, EditError>
    where
        I: IntoIterator<Item = S>,
        S: Into<ClipId>,
    {
        Ok(Self {
            ids: link_closure(project, seeds)?,
        })
    }

    pub fn contains(&self, clip_id: &str) -> bool {
        self.ids.contains(clip_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClipId> {
        self.ids.iter()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Drop ids that no longer resolve in `project`, then re-close.
    pub fn retain_existing(&self, project: &Project) -> Result<Self, EditError> {
        Self::closed(
            project,
            self.ids.iter().filter(|id| project.clip(id).is_some()).cloned(),
        )
    }
}

/// Resolve a click into a new selection.
///
/// A plain click selects `clip_id` alone. An additive click toggles it:
/// adding pulls in its linked partner, removing drops the whole pair.
pub fn select(
    project: &Project,
    current: &Selection,
    clip_id: &str,
    additive: bool,
) -> Result<Selection, EditError> {
    if project.clip(clip_id).is_none() {
        return Err(EditError::clip_not_found(clip_id));
    }

    let seeds: Vec<ClipId> = if !additive {
        vec![clip_id.to_string()]
    } else if current.contains(clip_id) {
        let pair = link_closure(project, [clip_id])?;
        current
            .iter()
            .filter(|id| !pair.contains(*id))
            .cloned()
            .collect()
    } else {
        current
            .iter()
            .cloned()
            .chain(std::iter::once(clip_id.to_string()))
            .collect()
    };

    let selection = Selection::closed(project, seeds)?;
    tracing::debug!(clip_id, additive, selected = selection.len(), "Selection changed");
    Ok(selection)
}

/// Every clip reachable from `seeds` by following links.
///
/// Explicit worklist iteration to a fixed point. Each clip enters the
/// result at most once, so the loop is bounded by seeds + clips. Seeds
/// that do not resolve are skipped. A link to a missing clip is a broken
/// model and is reported through [`invariant_violation`].
pub fn link_closure<I, S>(project: &Project, seeds: I) -> Result<BTreeSet<ClipId>, EditError>
where
    I: IntoIterator<Item = S>,
    S: Into<ClipId>,
{
    let mut worklist: Vec<ClipId> = seeds.into_iter().map(Into::into).collect();
    let bound = worklist.len() + project.clip_count();
    let mut closed = BTreeSet::new();
    let mut steps = 0usize;

    while let Some(id) = worklist.pop() {
        steps += 1;
        debug_assert!(steps <= bound, "link closure failed to terminate");

        let Some(clip) = project.clip(&id) else {
            tracing::debug!(clip_id = %id, "Skipping unresolved id in link closure");
            continue;
        };
        if !closed.insert(clip.id.clone()) {
            continue;
        }
        if let Some(linked) = &clip.linked_id {
            if project.clip(linked).is_none() {
                return Err(invariant_violation(format!(
                    "clip {} links to missing clip {linked}",
                    clip.id
                )));
            }
            if !closed.contains(linked) {
                worklist.push(linked.clone());
            }
        }
    }

    Ok(closed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use trackcut_project_model::MediaKind;

    fn project() -> Project {
        let mut project = Project::with_layout(1);
        linked_pair(&mut project, "v1", "a1", 0.0, 4.0);
        linked_pair(&mut project, "v2", "a2", 4.0, 8.0);
        project
            .insert_clip(clip("m", "audio-1", MediaKind::Audio, 0.0, 2.0))
            .unwrap();
        project
    }

    fn ids(selection: &Selection) -> Vec<&str> {
        selection.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_click_selects_linked_partner() {
        let project = project();
        let selection = select(&project, &Selection::new(), "v1", false).unwrap();
        assert_eq!(ids(&selection), vec!["a1", "v1"]);
    }

    #[test]
    fn test_plain_click_replaces_selection() {
        let project = project();
        let first = select(&project, &Selection::new(), "v1", false).unwrap();
        let second = select(&project, &first, "m", false).unwrap();
        assert_eq!(ids(&second), vec!["m"]);
    }

    #[test]
    fn test_additive_click_toggles() {
        let project = project();
        let selection = select(&project, &Selection::new(), "m", false).unwrap();
        let selection = select(&project, &selection, "a2", true).unwrap();
        assert_eq!(ids(&selection), vec!["a2", "m", "v2"]);

        // Toggling either half off removes the pair.
        let selection = select(&project, &selection, "v2", true).unwrap();
        assert_eq!(ids(&selection), vec!["m"]);
    }

    #[test]
    fn test_unknown_clip_is_rejected() {
        let project = project();
        let err = select(&project, &Selection::new(), "ghost", false).unwrap_err();
        assert!(matches!(err, EditError::ClipNotFound { .. }));
    }

    #[test]
    fn test_closure_skips_missing_ids() {
        let project = project();
        let closed = link_closure(&project, ["ghost", "a1"]).unwrap();
        assert_eq!(closed.len(), 2);
        assert!(closed.contains("v1"));
    }

    #[test]
    fn test_retain_existing_drops_removed_clips() {
        let mut project = project();
        let selection = Selection::closed(&project, ["v1", "m"]).unwrap();
        project.remove_clip("m");
        let pruned = selection.retain_existing(&project).unwrap();
        assert_eq!(ids(&pruned), vec!["a1", "v1"]);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "model invariant violated")]
    fn test_dangling_link_asserts_in_debug() {
        let mut project = project();
        let mut c = clip("orphan", "video-1", MediaKind::Video, 8.0, 10.0);
        c.linked_id = Some("ghost".to_string());
        project.insert_clip(c).unwrap();
        let _ = select(&project, &Selection::new(), "orphan", false);
    }
}
