//! Editor session: the single owner of the current project snapshot.
//!
//! All interaction goes through the session, which runs the pure
//! transitions and swaps in the new snapshot on success. Each committed
//! change bumps `revision` and is handed to the attached [`ChangeSink`],
//! which is how the preview path hears about it.

use std::fmt;
use std::sync::Arc;

use trackcut_common::EditorConfig;
use trackcut_project_model::{Asset, AssetLibrary, ClipId, Project, TimeSpan};

use crate::drag::{DragGesture, DragOutcome};
use crate::edit;
use crate::error::EditError;
use crate::merge::{self, MergePlan};
use crate::placement::{self, PlacementMode, Placed};
use crate::selection::{self, Selection};
use crate::split::{self, SplitOutcome};

/// What happened when a drag ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DragSummary {
    Moved { delta: f64 },
    SnappedBack { reason: EditError },
}

/// Receives every committed snapshot.
///
/// Called synchronously from inside the edit; implementations should
/// hand the snapshot off and return.
pub trait ChangeSink: Send + Sync {
    fn project_changed(&self, revision: u64, project: &Project);
}

/// Interactive editing state for one project.
#[derive(Clone)]
pub struct EditorSession {
    project: Project,
    library: AssetLibrary,
    selection: Selection,
    drag: Option<DragGesture>,
    config: EditorConfig,
    revision: u64,
    sink: Option<Arc<dyn ChangeSink>>,
}

impl fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorSession")
            .field("project", &self.project.id)
            .field("clips", &self.project.clip_count())
            .field("selection", &self.selection)
            .field("dragging", &self.drag.is_some())
            .field("revision", &self.revision)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl EditorSession {
    pub fn new(project: Project, library: AssetLibrary, config: EditorConfig) -> Self {
        Self {
            project,
            library,
            selection: Selection::new(),
            drag: None,
            config,
            revision: 0,
            sink: None,
        }
    }

    /// Send every future committed snapshot to `sink`.
    pub fn set_change_sink(&mut self, sink: Arc<dyn ChangeSink>) {
        self.sink = Some(sink);
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn library(&self) -> &AssetLibrary {
        &self.library
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Counter bumped on every committed model change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Hand back the project and library, e.g. for saving.
    pub fn into_parts(self) -> (Project, AssetLibrary) {
        (self.project, self.library)
    }

    pub fn register_asset(&mut self, asset: Asset) {
        self.library.register(asset);
    }

    /// Place a library asset by id.
    pub fn place(
        &mut self,
        asset_id: &str,
        hint: Option<&str>,
        mode: PlacementMode,
    ) -> Result<Placed, EditError> {
        let asset = self
            .library
            .get(asset_id)
            .cloned()
            .ok_or_else(|| EditError::AssetNotFound {
                asset_id: asset_id.to_string(),
            })?;
        self.place_asset(asset, hint, mode)
    }

    /// Register `asset` (if new) and place it.
    pub fn place_asset(
        &mut self,
        asset: Asset,
        hint: Option<&str>,
        mode: PlacementMode,
    ) -> Result<Placed, EditError> {
        let (next, placed) = placement::place(&self.project, &asset, hint, mode, &self.config)?;
        self.library.register(asset);
        self.commit(next);
        Ok(placed)
    }

    pub fn select(&mut self, clip_id: &str, additive: bool) -> Result<&Selection, EditError> {
        self.selection = selection::select(&self.project, &self.selection, clip_id, additive)?;
        Ok(&self.selection)
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::new();
    }

    /// Pointer pressed on a clip. An unselected clip becomes the
    /// selection first; then a drag of the whole selection begins.
    pub fn pointer_down(&mut self, clip_id: &str, pointer_x: f64) -> Result<(), EditError> {
        if !self.selection.contains(clip_id) {
            self.select(clip_id, false)?;
        }
        self.drag = Some(DragGesture::begin(
            &self.project,
            &self.selection,
            clip_id,
            pointer_x,
        )?);
        Ok(())
    }

    /// Pointer moved. Returns the snapped delta while dragging.
    pub fn pointer_move(&mut self, pointer_x: f64) -> Option<f64> {
        let drag = self.drag.as_mut()?;
        Some(drag.update(&self.project, pointer_x, &self.config))
    }

    /// Transient position of a clip during a drag, for rendering.
    pub fn drag_preview(&self, clip_id: &str) -> Option<TimeSpan> {
        self.drag.as_ref()?.preview_span(clip_id)
    }

    /// Pointer released.
    pub fn pointer_up(&mut self) -> Option<DragSummary> {
        let drag = self.drag.take()?;
        let outcome = drag.commit(&self.project, &self.config);
        Some(self.finish_drag(outcome))
    }

    /// Pointer left the timeline mid-drag.
    pub fn pointer_leave(&mut self) -> Option<DragSummary> {
        let drag = self.drag.take()?;
        let outcome = drag.cancel(&self.project, &self.config);
        Some(self.finish_drag(outcome))
    }

    fn finish_drag(&mut self, outcome: DragOutcome) -> DragSummary {
        match outcome {
            DragOutcome::Committed { project, delta } => {
                if delta != 0.0 {
                    self.commit(project);
                }
                DragSummary::Moved { delta }
            }
            DragOutcome::SnappedBack { reason } => DragSummary::SnappedBack { reason },
        }
    }

    /// Split a clip. Returns the new right-half ids, empty for a no-op.
    pub fn split(&mut self, clip_id: &str, at: f64) -> Result<Vec<ClipId>, EditError> {
        match split::split(&self.project, clip_id, at, self.config.overlap_epsilon)? {
            SplitOutcome::Done { project, right_ids } => {
                self.commit(project);
                Ok(right_ids)
            }
            SplitOutcome::Noop => Ok(vec![]),
        }
    }

    /// Delete the selection (with linked partners).
    pub fn delete_selection(&mut self) -> Result<Vec<ClipId>, EditError> {
        let (next, removed) = edit::delete(&self.project, &self.selection)?;
        if !removed.is_empty() {
            self.commit(next);
        }
        Ok(removed)
    }

    pub fn set_volume(&mut self, clip_id: &str, volume: f64) -> Result<(), EditError> {
        let next = edit::set_volume(&self.project, clip_id, volume)?;
        self.commit(next);
        Ok(())
    }

    pub fn set_speed(&mut self, clip_id: &str, speed: f64) -> Result<(), EditError> {
        let next = edit::set_speed(&self.project, clip_id, speed)?;
        self.commit(next);
        Ok(())
    }

    /// Validate a merge against the current snapshot.
    pub fn plan_merge(&self, track_id: &str, clip_ids: &[ClipId]) -> Result<MergePlan, EditError> {
        merge::plan_merge(&self.project, track_id, clip_ids)
    }

    /// Apply a finished render: register the asset and swap in the merged clip.
    pub fn apply_merge(&mut self, plan: &MergePlan, asset: Asset) -> Result<ClipId, EditError> {
        let (next, merged_id) = merge::apply_merge(&self.project, plan, &asset, &self.config)?;
        self.library.register(asset);
        self.commit(next);
        Ok(merged_id)
    }

    fn commit(&mut self, next: Project) {
        self.project = next;
        // A failure here has already been reported; start over empty.
        self.selection = self
            .selection
            .retain_existing(&self.project)
            .unwrap_or_default();
        self.revision += 1;
        tracing::trace!(revision = self.revision, "Project snapshot committed");
        if let Some(sink) = &self.sink {
            sink.project_changed(self.revision, &self.project);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use trackcut_project_model::MediaKind;

    fn session() -> EditorSession {
        let mut library = AssetLibrary::new();
        library.register(asset("vid", MediaKind::Video, 4.0));
        library.register(asset("snd", MediaKind::Audio, 3.0));
        EditorSession::new(Project::with_layout(2), library, config())
    }

    #[test]
    fn test_click_drag_release_moves_pair() {
        let mut session = session();
        let placed = session.place("vid", None, PlacementMode::Append).unwrap();
        assert_eq!(session.revision(), 1);

        session.pointer_down(&placed.clip_id, 50.0).unwrap();
        assert_eq!(session.selection().len(), 2);
        session.pointer_move(70.0);
        session.pointer_move(90.0); // +2 s
        assert_eq!(
            session.drag_preview(&placed.clip_id),
            Some(TimeSpan::new(2.0, 6.0))
        );

        let summary = session.pointer_up().unwrap();
        assert_eq!(summary, DragSummary::Moved { delta: 2.0 });
        let linked = placed.linked_id.unwrap();
        assert_eq!(session.project().clip(&linked).unwrap().start_time, 2.0);
        assert_eq!(session.revision(), 2);
        assert!(!session.is_dragging());
    }

    #[test]
    fn test_snapped_back_drag_keeps_revision() {
        let mut session = session();
        let first = session.place("snd", None, PlacementMode::Append).unwrap();
        session.place("snd", None, PlacementMode::Append).unwrap();
        let revision = session.revision();

        session.pointer_down(&first.clip_id, 0.0).unwrap();
        session.pointer_move(40.0); // +2 s into the second clip
        let summary = session.pointer_leave().unwrap();
        assert!(matches!(summary, DragSummary::SnappedBack { .. }));
        assert_eq!(session.revision(), revision);
        assert_eq!(session.project().clip(&first.clip_id).unwrap().start_time, 0.0);
    }

    #[test]
    fn test_pointer_up_without_drag_is_none() {
        let mut session = session();
        assert!(session.pointer_up().is_none());
        assert!(session.pointer_move(10.0).is_none());
    }

    #[test]
    fn test_split_then_delete_prunes_selection() {
        let mut session = session();
        let placed = session.place("vid", None, PlacementMode::At(1.0)).unwrap();
        let right = session.split(&placed.clip_id, 3.0).unwrap();
        assert_eq!(right.len(), 2);
        assert_eq!(session.project().clip_count(), 4);

        session.select(&right[0], false).unwrap();
        let removed = session.delete_selection().unwrap();
        assert_eq!(removed.len(), 2);
        assert!(session.selection().is_empty());
        assert!(session.project().check_invariants(0.001).is_empty());
    }

    #[test]
    fn test_unknown_asset_is_rejected() {
        let mut session = session();
        let err = session
            .place("missing", None, PlacementMode::Append)
            .unwrap_err();
        assert!(matches!(err, EditError::AssetNotFound { .. }));
        assert_eq!(session.revision(), 0);
    }

    #[test]
    fn test_merge_registers_asset() {
        let mut session = session();
        let a = session.place("snd", None, PlacementMode::Append).unwrap();
        let b = session.place("snd", None, PlacementMode::Append).unwrap();
        let plan = session
            .plan_merge("audio-1", &[a.clip_id.clone(), b.clip_id.clone()])
            .unwrap();

        let merged_id = session
            .apply_merge(&plan, asset("merged", MediaKind::Audio, 6.0))
            .unwrap();
        assert!(session.library().get("merged").is_some());
        assert_eq!(session.project().clip(&merged_id).unwrap().end_time, 6.0);
        assert_eq!(session.project().clip_count(), 1);
    }

    #[derive(Default)]
    struct Recorder {
        seen: std::sync::Mutex<Vec<(u64, usize)>>,
    }

    impl ChangeSink for Recorder {
        fn project_changed(&self, revision: u64, project: &Project) {
            self.seen.lock().unwrap().push((revision, project.clip_count()));
        }
    }

    #[test]
    fn test_sink_sees_each_committed_snapshot() {
        let recorder = Arc::new(Recorder::default());
        let mut session = session();
        session.set_change_sink(recorder.clone());

        let a = session.place("snd", None, PlacementMode::Append).unwrap();
        session.place("snd", None, PlacementMode::Append).unwrap();
        // Rejected edits commit nothing.
        assert!(session.set_volume(&a.clip_id, -1.0).is_err());
        session.select(&a.clip_id, false).unwrap();
        session.delete_selection().unwrap();

        let seen = recorder.seen.lock().unwrap().clone();
        assert_eq!(seen, vec![(1, 1), (2, 2), (3, 1)]);
    }

    #[test]
    fn test_non_finite_pointer_snaps_back() {
        let mut session = session();
        let placed = session.place("snd", None, PlacementMode::At(2.0)).unwrap();
        let revision = session.revision();

        session.pointer_down(&placed.clip_id, 50.0).unwrap();
        session.pointer_move(f64::INFINITY);
        let summary = session.pointer_up().unwrap();
        assert!(matches!(
            summary,
            DragSummary::SnappedBack {
                reason: EditError::InvalidProperty { property: "delta", .. }
            }
        ));
        assert_eq!(session.revision(), revision);
        assert_eq!(session.project().clip(&placed.clip_id).unwrap().start_time, 2.0);
        assert!(session.project().check_invariants(0.001).is_empty());
    }

    #[test]
    fn test_non_finite_drop_is_rejected() {
        let mut session = session();
        let err = session
            .place("vid", None, PlacementMode::At(f64::NAN))
            .unwrap_err();
        assert!(matches!(err, EditError::InvalidProperty { .. }));
        assert_eq!(session.revision(), 0);
        assert!(session.project().is_empty());
    }
}
