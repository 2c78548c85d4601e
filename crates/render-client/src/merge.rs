//! Merge orchestration.
//!
//! A merge is the only editing operation that suspends. The flow is:
//! plan against the current snapshot, claim the clip set, render the
//! normalized clip run, then re-validate against whatever snapshot is
//! current when the render returns. The session is never locked across
//! the render call.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use trackcut_common::TrackcutError;
use trackcut_edit_core::{EditError, EditorSession, MergePlan};
use trackcut_project_model::ClipId;

use crate::service::RenderService;

/// Editor session shared between the UI loop and background tasks.
pub type SharedSession = Arc<tokio::sync::Mutex<EditorSession>>;

#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// Rejected by validation; nothing was sent or changed.
    #[error(transparent)]
    Edit(#[from] EditError),

    /// The render call failed; the project is untouched.
    #[error(transparent)]
    Transport(#[from] TrackcutError),
}

/// Runs merges and keeps overlapping clip sets from merging concurrently.
pub struct MergeOrchestrator<R> {
    service: Arc<R>,
    in_flight: Mutex<HashSet<ClipId>>,
}

impl<R: RenderService> MergeOrchestrator<R> {
    pub fn new(service: Arc<R>) -> Self {
        Self {
            service,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Number of clips currently claimed by running merges.
    pub fn in_flight(&self) -> usize {
        self.lock_in_flight().len()
    }

    /// Merge `clip_ids` on `track_id` into one rendered clip.
    ///
    /// Returns the id of the merged clip.
    pub async fn merge(
        &self,
        session: &SharedSession,
        track_id: &str,
        clip_ids: &[ClipId],
    ) -> Result<ClipId, MergeError> {
        let plan = session.lock().await.plan_merge(track_id, clip_ids)?;
        let _claim = self.claim(&plan)?;

        tracing::info!(
            track_id,
            clips = plan.clips.len(),
            origin = plan.origin,
            "Requesting merge render"
        );
        let asset = match self.service.request_merge(&plan.request).await {
            Ok(asset) => asset,
            Err(e) => {
                tracing::warn!(track_id, error = %e, "Merge render failed");
                return Err(e.into());
            }
        };

        let merged_id = session.lock().await.apply_merge(&plan, asset)?;
        tracing::info!(track_id, merged_id = %merged_id, "Merge applied");
        Ok(merged_id)
    }

    fn claim(&self, plan: &MergePlan) -> Result<Claim<'_>, EditError> {
        let mut in_flight = self.lock_in_flight();
        if let Some(busy) = plan.clip_ids().find(|id| in_flight.contains(*id)) {
            return Err(EditError::MergeInProgress {
                clip_id: busy.clone(),
            });
        }
        let ids: Vec<ClipId> = plan.clip_ids().cloned().collect();
        in_flight.extend(ids.iter().cloned());
        Ok(Claim {
            set: &self.in_flight,
            ids,
        })
    }

    fn lock_in_flight(&self) -> std::sync::MutexGuard<'_, HashSet<ClipId>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Releases a claimed clip set when the merge finishes, however it ends.
struct Claim<'a> {
    set: &'a Mutex<HashSet<ClipId>>,
    ids: Vec<ClipId>,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        let mut set = self
            .set
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for id in &self.ids {
            set.remove(id);
        }
    }
}
