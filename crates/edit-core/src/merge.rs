//! Merge planning.
//!
//! Merging replaces a run of clips on one track with a single clip
//! referencing a newly rendered asset. Planning and applying are pure;
//! the render round trip in between belongs to the caller.

use std::collections::BTreeSet;

use trackcut_common::EditorConfig;
use trackcut_project_model::{Asset, Clip, ClipId, Project, TimeSpan, Track, TrackId, TrackKind};

use crate::error::{invariant_violation, EditError};

/// A validated merge request.
#[derive(Debug, Clone, PartialEq)]
pub struct MergePlan {
    pub track_id: TrackId,
    pub track_kind: TrackKind,
    /// Clips to replace, in start order, as they were when planned.
    pub clips: Vec<Clip>,
    /// Earliest start among the merged clips; the merged clip lands here.
    pub origin: f64,
    /// Self-contained timeline sent to the render service: the selected
    /// clips shifted so the earliest starts at zero, gaps preserved.
    pub request: Project,
}

impl MergePlan {
    pub fn clip_ids(&self) -> impl Iterator<Item = &ClipId> {
        self.clips.iter().map(|c| &c.id)
    }
}

/// Validate a merge of `clip_ids` on `track_id` and build the render
/// request. Checked before any network interaction.
pub fn plan_merge(
    project: &Project,
    track_id: &str,
    clip_ids: &[ClipId],
) -> Result<MergePlan, EditError> {
    let track = project
        .track(track_id)
        .ok_or_else(|| EditError::TrackNotFound {
            track_id: track_id.to_string(),
        })?;

    let unique: BTreeSet<&str> = clip_ids.iter().map(String::as_str).collect();
    if unique.len() < 2 {
        return Err(EditError::MergeTooFewClips {
            count: unique.len(),
        });
    }

    let mut clips = Vec::with_capacity(unique.len());
    for id in unique {
        let clip = project
            .clip(id)
            .ok_or_else(|| EditError::clip_not_found(id))?;
        if clip.track_id != track.id {
            return Err(EditError::ClipNotOnTrack {
                clip_id: id.to_string(),
                track_id: track.id.clone(),
            });
        }
        if let Some(linked_id) = &clip.linked_id {
            return Err(EditError::MergeLinkedClip {
                clip_id: id.to_string(),
                linked_id: linked_id.clone(),
            });
        }
        clips.push(clip.clone());
    }
    clips.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

    let origin = clips[0].start_time;
    let mut mini = Track::new(track.id.clone(), track.kind);
    mini.clips = clips
        .iter()
        .map(|c| Clip {
            start_time: c.start_time - origin,
            end_time: c.end_time - origin,
            ..c.clone()
        })
        .collect();

    tracing::debug!(track_id, clips = clips.len(), origin, "Merge planned");
    Ok(MergePlan {
        track_id: track.id.clone(),
        track_kind: track.kind,
        request: Project::from_tracks(trackcut_project_model::new_id(), vec![mini]),
        clips,
        origin,
    })
}

/// Replace the planned clips with one clip referencing `asset`.
///
/// `project` is the snapshot current when the render finished, which may
/// differ from the one the plan was made against. The planned clips must
/// still be where they were and the merged clip must fit; otherwise the
/// result is dropped and nothing changes.
pub fn apply_merge(
    project: &Project,
    plan: &MergePlan,
    asset: &Asset,
    config: &EditorConfig,
) -> Result<(Project, ClipId), EditError> {
    if !(asset.duration > config.overlap_epsilon) {
        return Err(EditError::InvalidProperty {
            property: "duration",
            value: asset.duration,
        });
    }

    for planned in &plan.clips {
        match project.clip(&planned.id) {
            Some(current)
                if current.track_id == planned.track_id
                    && current.span() == planned.span()
                    && !current.is_linked() => {}
            Some(_) => {
                return Err(EditError::StaleMerge {
                    message: format!("clip {} changed while rendering", planned.id),
                })
            }
            None => {
                return Err(EditError::StaleMerge {
                    message: format!("clip {} was removed while rendering", planned.id),
                })
            }
        }
    }

    let track = project
        .track(&plan.track_id)
        .ok_or_else(|| invariant_violation(format!("merge track {} vanished", plan.track_id)))?;
    let span = TimeSpan::starting_at(plan.origin, asset.duration);
    let ignore: Vec<&str> = plan.clip_ids().map(String::as_str).collect();
    if let Some(conflict) = track
        .overlapping(span, config.overlap_epsilon, &ignore)
        .next()
    {
        return Err(EditError::Overlap {
            track_id: track.id.clone(),
            conflicting: conflict.id.clone(),
        });
    }

    let merged = Clip::from_asset(
        asset,
        plan.track_kind.media_kind(),
        plan.track_id.clone(),
        plan.origin,
        &config.media_root,
    );
    let merged_id = merged.id.clone();

    let mut next = project.clone();
    for id in plan.clip_ids() {
        next.remove_clip(id);
    }
    next.insert_clip(merged)
        .map_err(|e| invariant_violation(format!("merge insert failed: {e}")))?;

    tracing::info!(
        track_id = %plan.track_id,
        merged = plan.clips.len(),
        clip_id = %merged_id,
        asset_id = %asset.id,
        "Merged clips"
    );
    Ok((next, merged_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use trackcut_project_model::MediaKind;

    fn project() -> Project {
        let mut project = Project::with_layout(1);
        project
            .insert_clip(clip("c1", "audio-1", MediaKind::Audio, 3.0, 5.0))
            .unwrap();
        project
            .insert_clip(clip("c2", "audio-1", MediaKind::Audio, 7.0, 9.0))
            .unwrap();
        project
            .insert_clip(clip("c3", "audio-1", MediaKind::Audio, 20.0, 21.0))
            .unwrap();
        project
    }

    fn ids(list: &[&str]) -> Vec<ClipId> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_plan_normalizes_and_keeps_gaps() {
        let plan = plan_merge(&project(), "audio-1", &ids(&["c2", "c1"])).unwrap();
        assert_eq!(plan.origin, 3.0);
        let mini = &plan.request.tracks()[0];
        assert_eq!(mini.kind, TrackKind::Audio);
        let spans: Vec<_> = mini.clips.iter().map(|c| (c.start_time, c.end_time)).collect();
        assert_eq!(spans, vec![(0.0, 2.0), (4.0, 6.0)]);
    }

    #[test]
    fn test_plan_rejects_single_clip() {
        let err = plan_merge(&project(), "audio-1", &ids(&["c1", "c1"])).unwrap_err();
        assert_eq!(err, EditError::MergeTooFewClips { count: 1 });
    }

    #[test]
    fn test_plan_rejects_linked_clips() {
        let mut project = project();
        linked_pair(&mut project, "v1", "a1", 0.0, 2.0);
        linked_pair(&mut project, "v2", "a2", 2.0, 4.0);
        let before = project.clone();

        let err = plan_merge(&project, "video-1", &ids(&["v1", "v2"])).unwrap_err();
        assert!(matches!(err, EditError::MergeLinkedClip { .. }));
        assert!(err.to_string().contains("unlink"));
        assert_eq!(project, before);
    }

    #[test]
    fn test_plan_rejects_clip_from_other_track() {
        let mut project = project();
        project
            .insert_clip(clip("v", "video-1", MediaKind::Video, 0.0, 1.0))
            .unwrap();
        let err = plan_merge(&project, "audio-1", &ids(&["c1", "v"])).unwrap_err();
        assert!(matches!(err, EditError::ClipNotOnTrack { .. }));
    }

    #[test]
    fn test_apply_replaces_clips_with_merged_asset() {
        let project = project();
        let plan = plan_merge(&project, "audio-1", &ids(&["c1", "c2"])).unwrap();
        let rendered = asset("merged", MediaKind::Video, 6.0);

        let (next, merged_id) = apply_merge(&project, &plan, &rendered, &config()).unwrap();
        let merged = next.clip(&merged_id).unwrap();
        assert_eq!((merged.start_time, merged.end_time), (3.0, 9.0));
        assert_eq!(merged.source_start, 0.0);
        assert_eq!(merged.speed, 1.0);
        assert_eq!(merged.kind, MediaKind::Audio);
        assert!(next.clip("c1").is_none());
        assert!(next.clip("c2").is_none());
        assert_eq!(next.clip_count(), 2);
    }

    #[test]
    fn test_apply_rejects_overlong_render() {
        let project = project();
        let plan = plan_merge(&project, "audio-1", &ids(&["c1", "c2"])).unwrap();
        let rendered = asset("merged", MediaKind::Audio, 30.0);
        let err = apply_merge(&project, &plan, &rendered, &config()).unwrap_err();
        assert!(err.is_overlap());
    }

    #[test]
    fn test_apply_detects_stale_plan() {
        let project = project();
        let plan = plan_merge(&project, "audio-1", &ids(&["c1", "c2"])).unwrap();
        let mut moved = project.clone();
        moved.modify_clip("c2", |c| {
            c.start_time = 10.0;
            c.end_time = 12.0;
        });
        let err = apply_merge(&moved, &plan, &asset("m", MediaKind::Audio, 6.0), &config())
            .unwrap_err();
        assert!(matches!(err, EditError::StaleMerge { .. }));
    }

    #[test]
    fn test_apply_rejects_sliver_render() {
        let project = project();
        let plan = plan_merge(&project, "audio-1", &ids(&["c1", "c2"])).unwrap();
        let rendered = asset("merged", MediaKind::Audio, 0.0005);
        let err = apply_merge(&project, &plan, &rendered, &config()).unwrap_err();
        assert!(matches!(err, EditError::InvalidProperty { property: "duration", .. }));
    }

    #[test]
    fn test_apply_rejects_clip_linked_since_planning() {
        let project = project();
        let plan = plan_merge(&project, "audio-1", &ids(&["c1", "c2"])).unwrap();
        let mut relinked = project.clone();
        relinked.modify_clip("c1", |c| c.linked_id = Some("c2".to_string()));
        relinked.modify_clip("c2", |c| c.linked_id = Some("c1".to_string()));
        let err = apply_merge(&relinked, &plan, &asset("m", MediaKind::Audio, 6.0), &config())
            .unwrap_err();
        assert!(matches!(err, EditError::StaleMerge { .. }));
    }
}
