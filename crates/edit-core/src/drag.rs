//! Drag gestures: moving the selection along its tracks.
//!
//! A gesture captures a baseline of every selected clip on pointer-down.
//! Each pointer move recomputes the delta from the pointer origin and
//! snaps it; positions are always baseline + delta, never accumulated,
//! so the gesture cannot drift. The model is only touched on commit,
//! which validates the whole group and either moves every clip or none.

use std::collections::HashSet;

use trackcut_common::EditorConfig;
use trackcut_project_model::{ClipId, Project, TimeSpan, TrackId};

use crate::error::{invariant_violation, EditError};
use crate::selection::{link_closure, Selection};
use crate::snap::SnapSearch;

/// Position of one dragged clip when the gesture began.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineClip {
    pub clip_id: ClipId,
    pub track_id: TrackId,
    pub start_time: f64,
    pub end_time: f64,
}

impl BaselineClip {
    fn span(&self) -> TimeSpan {
        TimeSpan::new(self.start_time, self.end_time)
    }
}

/// How a finished gesture ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// Every dragged clip moved by `delta`.
    Committed { project: Project, delta: f64 },
    /// The move was invalid; nothing changed and the clips snap back.
    SnappedBack { reason: EditError },
}

/// An in-progress drag of the selection.
#[derive(Debug, Clone)]
pub struct DragGesture {
    baseline: Vec<BaselineClip>,
    origin_x: f64,
    delta: f64,
}

impl DragGesture {
    /// Start dragging from `clip_id`, which must be part of `selection`.
    ///
    /// The baseline is the link closure of the selection, in track order.
    pub fn begin(
        project: &Project,
        selection: &Selection,
        clip_id: &str,
        pointer_x: f64,
    ) -> Result<Self, EditError> {
        if project.clip(clip_id).is_none() {
            return Err(EditError::clip_not_found(clip_id));
        }
        if !selection.contains(clip_id) {
            return Err(EditError::NotSelected {
                clip_id: clip_id.to_string(),
            });
        }

        let closure = link_closure(project, selection.iter().cloned())?;
        let baseline: Vec<BaselineClip> = project
            .clips()
            .filter(|c| closure.contains(&c.id))
            .map(|c| BaselineClip {
                clip_id: c.id.clone(),
                track_id: c.track_id.clone(),
                start_time: c.start_time,
                end_time: c.end_time,
            })
            .collect();

        tracing::debug!(clip_id, clips = baseline.len(), pointer_x, "Drag started");
        Ok(Self {
            baseline,
            origin_x: pointer_x,
            delta: 0.0,
        })
    }

    pub fn baseline(&self) -> &[BaselineClip] {
        &self.baseline
    }

    /// Current snapped delta in seconds.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Where `clip_id` is drawn while the gesture is live.
    pub fn preview_span(&self, clip_id: &str) -> Option<TimeSpan> {
        self.baseline
            .iter()
            .find(|b| b.clip_id == clip_id)
            .map(|b| b.span().shifted(self.shown_delta()))
    }

    fn shown_delta(&self) -> f64 {
        if self.delta.is_finite() {
            self.delta
        } else {
            0.0
        }
    }

    /// Pointer moved to `pointer_x`. Returns the snapped delta.
    ///
    /// A non-finite position is kept as-is without snapping; the preview
    /// stays at the baseline and a release snaps back.
    pub fn update(&mut self, project: &Project, pointer_x: f64, config: &EditorConfig) -> f64 {
        let raw = config.pixels_to_secs(pointer_x - self.origin_x);
        if !raw.is_finite() {
            tracing::debug!(pointer_x, "Non-finite drag position");
            self.delta = raw;
            return raw;
        }
        self.delta = self.snap(project, raw, config.snap_threshold_secs());
        self.delta
    }

    /// Snap a raw delta.
    ///
    /// Zero-snap proposals are offered before neighbor-edge proposals;
    /// within each, baseline clips and track clips are visited in order.
    /// The closest proposal within `threshold` wins, otherwise `raw`.
    fn snap(&self, project: &Project, raw: f64, threshold: f64) -> f64 {
        let mut search = SnapSearch::new(threshold);

        for b in &self.baseline {
            search.offer(b.start_time + raw, -b.start_time);
        }

        let moving = self.moving_ids();
        for b in &self.baseline {
            let Some(track) = project.track(&b.track_id) else {
                continue;
            };
            let start = b.start_time + raw;
            let end = b.end_time + raw;
            for neighbor in track.clips.iter().filter(|c| !moving.contains(c.id.as_str())) {
                search.offer(start - neighbor.end_time, neighbor.end_time - b.start_time);
                search.offer(end - neighbor.start_time, neighbor.start_time - b.end_time);
            }
        }

        search.resolve(raw)
    }

    /// Pointer released: validate and apply the move.
    pub fn commit(self, project: &Project, config: &EditorConfig) -> DragOutcome {
        let verdict = if self.delta.is_finite() {
            let delta = self.feasible_delta();
            self.validate(project, delta, config.overlap_epsilon)
                .map(|()| delta)
        } else {
            Err(EditError::InvalidProperty {
                property: "delta",
                value: self.delta,
            })
        };
        match verdict {
            Ok(delta) => {
                let mut next = project.clone();
                for b in &self.baseline {
                    next.modify_clip(&b.clip_id, |c| {
                        c.start_time = b.start_time + delta;
                        c.end_time = b.end_time + delta;
                    });
                }
                tracing::info!(clips = self.baseline.len(), delta, "Drag committed");
                DragOutcome::Committed {
                    project: next,
                    delta,
                }
            }
            Err(reason) => {
                tracing::warn!(%reason, delta = self.delta, "Drag rejected; snapping back");
                DragOutcome::SnappedBack { reason }
            }
        }
    }

    /// Pointer left the surface without a clean release. Runs the same
    /// validation as a release and commits if the move is valid.
    pub fn cancel(self, project: &Project, config: &EditorConfig) -> DragOutcome {
        tracing::debug!("Drag ended by pointer leave");
        self.commit(project, config)
    }

    /// Clamp the delta group-wide so no clip starts before zero.
    fn feasible_delta(&self) -> f64 {
        let min_start = self
            .baseline
            .iter()
            .map(|b| b.start_time)
            .fold(f64::INFINITY, f64::min);
        if min_start.is_finite() && min_start + self.delta < 0.0 {
            -min_start
        } else {
            self.delta
        }
    }

    fn validate(&self, project: &Project, delta: f64, epsilon: f64) -> Result<(), EditError> {
        let moving: Vec<&str> = self.baseline.iter().map(|b| b.clip_id.as_str()).collect();

        for b in &self.baseline {
            if project.clip(&b.clip_id).is_none() {
                return Err(EditError::clip_not_found(&b.clip_id));
            }
            let track = project.track(&b.track_id).ok_or_else(|| {
                invariant_violation(format!(
                    "dragged clip {} references missing track {}",
                    b.clip_id, b.track_id
                ))
            })?;
            let target = b.span().shifted(delta);
            if !(target.end > target.start) {
                return Err(EditError::InvalidProperty {
                    property: "delta",
                    value: delta,
                });
            }
            if let Some(conflict) = track.overlapping(target, epsilon, &moving).next() {
                return Err(EditError::Overlap {
                    track_id: track.id.clone(),
                    conflicting: conflict.id.clone(),
                });
            }
        }
        Ok(())
    }

    fn moving_ids(&self) -> HashSet<&str> {
        self.baseline.iter().map(|b| b.clip_id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::select;
    use crate::test_support::*;
    use trackcut_project_model::MediaKind;

    fn committed(outcome: DragOutcome) -> (Project, f64) {
        match outcome {
            DragOutcome::Committed { project, delta } => (project, delta),
            DragOutcome::SnappedBack { reason } => panic!("unexpected snap back: {reason}"),
        }
    }

    fn start_drag(project: &Project, clip_id: &str) -> DragGesture {
        let selection = select(project, &Selection::new(), clip_id, false).unwrap();
        DragGesture::begin(project, &selection, clip_id, 100.0).unwrap()
    }

    #[test]
    fn test_snaps_to_neighbor_end() {
        let mut project = Project::with_layout(1);
        project
            .insert_clip(clip("n", "audio-1", MediaKind::Audio, 1.0, 5.0))
            .unwrap();
        project
            .insert_clip(clip("c", "audio-1", MediaKind::Audio, 4.9, 6.9))
            .unwrap();

        let mut drag = start_drag(&project, "c");
        // 4 px at 20 px/s = 0.2 s raw.
        let delta = drag.update(&project, 104.0, &config());
        assert!((delta - 0.1).abs() < 1e-9);

        let (next, delta) = committed(drag.commit(&project, &config()));
        assert!((delta - 0.1).abs() < 1e-9);
        let moved = next.clip("c").unwrap();
        assert!((moved.start_time - 5.0).abs() < 1e-9);
        assert!((moved.duration() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_end_snaps_to_neighbor_start() {
        let mut project = Project::with_layout(1);
        project
            .insert_clip(clip("c", "audio-1", MediaKind::Audio, 10.0, 12.0))
            .unwrap();
        project
            .insert_clip(clip("n", "audio-1", MediaKind::Audio, 15.0, 16.0))
            .unwrap();

        let mut drag = start_drag(&project, "c");
        // Raw 2.6 s puts the end at 14.6; snaps to 15.0.
        let delta = drag.update(&project, 152.0, &config());
        assert!((delta - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_snap_beats_farther_neighbor() {
        let mut project = Project::with_layout(1);
        project
            .insert_clip(clip("c", "audio-1", MediaKind::Audio, 2.0, 3.0))
            .unwrap();

        let mut drag = start_drag(&project, "c");
        // Raw -1.7 s puts the start at 0.3; zero is 0.3 away.
        let delta = drag.update(&project, 66.0, &config());
        assert!((delta + 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_unsnapped_move_uses_raw_delta() {
        let mut project = Project::with_layout(1);
        project
            .insert_clip(clip("c", "audio-1", MediaKind::Audio, 10.0, 12.0))
            .unwrap();

        let mut drag = start_drag(&project, "c");
        let delta = drag.update(&project, 140.0, &config());
        assert!((delta - 2.0).abs() < 1e-9);
        assert_eq!(drag.preview_span("c"), Some(TimeSpan::new(12.0, 14.0)));
        // Model untouched until commit.
        assert_eq!(project.clip("c").unwrap().start_time, 10.0);
    }

    #[test]
    fn test_updates_are_relative_to_baseline() {
        let mut project = Project::with_layout(1);
        project
            .insert_clip(clip("c", "audio-1", MediaKind::Audio, 10.0, 12.0))
            .unwrap();

        let mut drag = start_drag(&project, "c");
        drag.update(&project, 140.0, &config());
        drag.update(&project, 160.0, &config());
        let delta = drag.update(&project, 120.0, &config());
        assert!((delta - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_overlap_snaps_back_without_mutation() {
        let mut project = Project::with_layout(1);
        project
            .insert_clip(clip("c", "audio-1", MediaKind::Audio, 0.0, 2.0))
            .unwrap();
        project
            .insert_clip(clip("n", "audio-1", MediaKind::Audio, 5.0, 9.0))
            .unwrap();

        let mut drag = start_drag(&project, "c");
        drag.update(&project, 200.0, &config()); // +5 s lands inside "n"
        match drag.commit(&project, &config()) {
            DragOutcome::SnappedBack { reason } => assert!(reason.is_overlap()),
            other => panic!("expected snap back, got {other:?}"),
        }
    }

    #[test]
    fn test_linked_pair_moves_together() {
        let mut project = Project::with_layout(1);
        linked_pair(&mut project, "v", "a", 2.0, 6.0);

        let mut drag = start_drag(&project, "a");
        assert_eq!(drag.baseline().len(), 2);
        drag.update(&project, 160.0, &config());
        let (next, _) = committed(drag.commit(&project, &config()));

        assert_eq!(next.clip("v").unwrap().start_time, 5.0);
        assert_eq!(next.clip("a").unwrap().start_time, 5.0);
        assert!(next.check_invariants(0.001).is_empty());
    }

    #[test]
    fn test_negative_delta_clamps_group_wide() {
        let mut project = Project::with_layout(2);
        project
            .insert_clip(clip("c1", "audio-1", MediaKind::Audio, 3.0, 4.0))
            .unwrap();
        project
            .insert_clip(clip("c2", "audio-2", MediaKind::Audio, 5.0, 6.0))
            .unwrap();

        let selection = Selection::closed(&project, ["c1", "c2"]).unwrap();
        let mut drag = DragGesture::begin(&project, &selection, "c1", 0.0).unwrap();
        drag.update(&project, -200.0, &config()); // -10 s
        let (next, delta) = committed(drag.commit(&project, &config()));

        assert_eq!(delta, -3.0);
        assert_eq!(next.clip("c1").unwrap().start_time, 0.0);
        assert_eq!(next.clip("c2").unwrap().start_time, 2.0);
    }

    #[test]
    fn test_cancel_runs_commit_validation() {
        let mut project = Project::with_layout(1);
        project
            .insert_clip(clip("c", "audio-1", MediaKind::Audio, 10.0, 12.0))
            .unwrap();

        let mut drag = start_drag(&project, "c");
        drag.update(&project, 140.0, &config());
        let (next, _) = committed(drag.cancel(&project, &config()));
        assert_eq!(next.clip("c").unwrap().start_time, 12.0);
    }

    #[test]
    fn test_begin_requires_selection() {
        let mut project = Project::with_layout(1);
        project
            .insert_clip(clip("c", "audio-1", MediaKind::Audio, 0.0, 1.0))
            .unwrap();
        let err = DragGesture::begin(&project, &Selection::new(), "c", 0.0).unwrap_err();
        assert!(matches!(err, EditError::NotSelected { .. }));
    }

    fn snapped_back(outcome: DragOutcome) -> EditError {
        match outcome {
            DragOutcome::SnappedBack { reason } => reason,
            other => panic!("expected snap back, got {other:?}"),
        }
    }

    #[test]
    fn test_non_finite_pointer_snaps_back() {
        let mut project = Project::with_layout(1);
        project
            .insert_clip(clip("c", "audio-1", MediaKind::Audio, 3.0, 5.0))
            .unwrap();
        project
            .insert_clip(clip("n", "audio-1", MediaKind::Audio, 8.0, 9.0))
            .unwrap();

        for pointer_x in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let mut drag = start_drag(&project, "c");
            drag.update(&project, pointer_x, &config());
            assert_eq!(drag.preview_span("c"), Some(TimeSpan::new(3.0, 5.0)));

            let reason = snapped_back(drag.commit(&project, &config()));
            assert!(matches!(reason, EditError::InvalidProperty { property: "delta", .. }));
        }
        assert!(project.check_invariants(0.001).is_empty());
    }

    #[test]
    fn test_finite_pointer_recovers_after_non_finite() {
        let mut project = Project::with_layout(1);
        project
            .insert_clip(clip("c", "audio-1", MediaKind::Audio, 3.0, 5.0))
            .unwrap();

        let mut drag = start_drag(&project, "c");
        drag.update(&project, f64::NAN, &config());
        drag.update(&project, 120.0, &config()); // +1 s
        let (next, delta) = committed(drag.commit(&project, &config()));
        assert_eq!(delta, 1.0);
        assert_eq!(next.clip("c").unwrap().start_time, 4.0);
    }

    #[test]
    fn test_delta_that_collapses_span_snaps_back() {
        let mut project = Project::with_layout(1);
        project
            .insert_clip(clip("c", "audio-1", MediaKind::Audio, 3.0, 5.0))
            .unwrap();

        let mut drag = start_drag(&project, "c");
        // Far enough out that start and end round to the same value.
        drag.update(&project, 1e302, &config());
        let reason = snapped_back(drag.commit(&project, &config()));
        assert!(matches!(reason, EditError::InvalidProperty { property: "delta", .. }));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "model invariant violated")]
    fn test_dangling_link_asserts_in_debug() {
        let mut project = Project::with_layout(1);
        linked_pair(&mut project, "v", "a", 0.0, 4.0);
        let selection = Selection::closed(&project, ["v"]).unwrap();
        project.remove_clip("a");
        let _ = DragGesture::begin(&project, &selection, "v", 0.0);
    }
}
