//! Editing errors.

use trackcut_project_model::{ClipId, MediaKind, TrackId, TrackKind};

/// Broad class of an editing failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The requested edit breaks a rule; recoverable, nothing changed.
    Validation,
    /// The model itself is inconsistent (programming fault).
    Invariant,
}

/// Why an edit was refused. No variant is ever returned after a
/// partial mutation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("Clip not found: {clip_id}")]
    ClipNotFound { clip_id: ClipId },

    #[error("Asset not found in library: {asset_id}")]
    AssetNotFound { asset_id: String },

    #[error("Track not found: {track_id}")]
    TrackNotFound { track_id: TrackId },

    #[error("No track can hold {kind:?} media")]
    NoCompatibleTrack { kind: MediaKind },

    #[error("Track {track_id} ({track_kind:?}) cannot hold {kind:?} media")]
    TrackKindMismatch {
        track_id: TrackId,
        track_kind: TrackKind,
        kind: MediaKind,
    },

    #[error("Would overlap clip {conflicting} on track {track_id}")]
    Overlap {
        track_id: TrackId,
        conflicting: ClipId,
    },

    #[error("Clip {clip_id} is not selected")]
    NotSelected { clip_id: ClipId },

    #[error("Linked clip {linked_id} does not span t={at}; unlink {clip_id} before splitting")]
    LinkedSplitMismatch {
        clip_id: ClipId,
        linked_id: ClipId,
        at: f64,
    },

    #[error("Merge needs at least two clips, got {count}")]
    MergeTooFewClips { count: usize },

    #[error("Clip {clip_id} is not on track {track_id}")]
    ClipNotOnTrack { clip_id: ClipId, track_id: TrackId },

    #[error("Clip {clip_id} is linked to {linked_id}; unlink it before merging")]
    MergeLinkedClip { clip_id: ClipId, linked_id: ClipId },

    #[error("A merge involving clip {clip_id} is already in progress")]
    MergeInProgress { clip_id: ClipId },

    #[error("Merge result no longer applies: {message}")]
    StaleMerge { message: String },

    #[error("Invalid {property}: {value}")]
    InvalidProperty { property: &'static str, value: f64 },

    #[error("Model invariant violated: {message}")]
    InvariantViolation { message: String },
}

impl EditError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EditError::InvariantViolation { .. } => ErrorCategory::Invariant,
            _ => ErrorCategory::Validation,
        }
    }

    pub fn is_overlap(&self) -> bool {
        matches!(self, EditError::Overlap { .. })
    }

    /// Asset kind and track kind disagree, or no track fits at all.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(
            self,
            EditError::TrackKindMismatch { .. } | EditError::NoCompatibleTrack { .. }
        )
    }

    pub(crate) fn clip_not_found(clip_id: &str) -> Self {
        EditError::ClipNotFound {
            clip_id: clip_id.to_string(),
        }
    }
}

/// Report a broken model invariant.
///
/// Panics in debug builds. In release builds the fault is logged and
/// returned so the caller drops the edit instead of corrupting the model.
pub(crate) fn invariant_violation(message: impl Into<String>) -> EditError {
    let message = message.into();
    tracing::error!(%message, "Model invariant violated");
    debug_assert!(false, "model invariant violated: {message}");
    EditError::InvariantViolation { message }
}
