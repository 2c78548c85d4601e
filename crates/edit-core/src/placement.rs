//! Placement: putting a library asset onto the timeline.
//!
//! Video assets land on the video track and, when the project has an av
//! track, bring a linked audio clip along with identical geometry. Both
//! halves are validated before either is inserted.

use trackcut_common::EditorConfig;
use trackcut_project_model::{Asset, Clip, ClipId, MediaKind, Project, TimeSpan, Track, TrackKind};

use crate::error::{invariant_violation, EditError};
use crate::snap::snap_time;

/// Where the new clip should start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementMode {
    /// Pointer drop at a timeline instant; snapped before validation.
    At(f64),
    /// Click-to-add: after the last clip on the target track(s).
    Append,
}

/// Clips created by a successful placement.
#[derive(Debug, Clone, PartialEq)]
pub struct Placed {
    pub clip_id: ClipId,
    /// Audio half on the av track for video assets.
    pub linked_id: Option<ClipId>,
    pub track_id: String,
    pub start_time: f64,
}

/// Place `asset` on the timeline.
///
/// `hint` is the track the user aimed at, if any. Video assets only go
/// to a video track; audio assets use the hinted track when it carries
/// audio and the first freestanding audio track otherwise.
pub fn place(
    project: &Project,
    asset: &Asset,
    hint: Option<&str>,
    mode: PlacementMode,
    config: &EditorConfig,
) -> Result<(Project, Placed), EditError> {
    if !(asset.duration > config.overlap_epsilon) {
        return Err(EditError::InvalidProperty {
            property: "duration",
            value: asset.duration,
        });
    }
    if let PlacementMode::At(requested) = mode {
        if !requested.is_finite() {
            return Err(EditError::InvalidProperty {
                property: "start_time",
                value: requested,
            });
        }
    }

    let target = resolve_track(project, asset.kind, hint)?;
    let partner = match asset.kind {
        MediaKind::Video => project.first_track_of_kind(TrackKind::Av),
        MediaKind::Audio => None,
    };

    let start_time = match mode {
        PlacementMode::At(requested) => {
            let edges = target
                .clips
                .iter()
                .flat_map(|c| [c.start_time, c.end_time]);
            snap_time(requested, edges, config.snap_threshold_secs()).max(0.0)
        }
        PlacementMode::Append => partner
            .map(Track::max_end)
            .unwrap_or(0.0)
            .max(target.max_end()),
    };

    let span = TimeSpan::starting_at(start_time, asset.duration);
    if !(span.duration() > config.overlap_epsilon) {
        return Err(EditError::InvalidProperty {
            property: "start_time",
            value: start_time,
        });
    }
    for track in std::iter::once(target).chain(partner) {
        if let Some(conflict) = track.overlapping(span, config.overlap_epsilon, &[]).next() {
            tracing::debug!(
                track_id = %track.id,
                conflicting = %conflict.id,
                start_time,
                "Placement rejected: overlap"
            );
            return Err(EditError::Overlap {
                track_id: track.id.clone(),
                conflicting: conflict.id.clone(),
            });
        }
    }

    let mut primary = Clip::from_asset(
        asset,
        asset.kind,
        target.id.clone(),
        start_time,
        &config.media_root,
    );
    let mut linked = partner.map(|av| {
        Clip::from_asset(
            asset,
            MediaKind::Audio,
            av.id.clone(),
            start_time,
            &config.media_root,
        )
    });
    if let Some(audio) = linked.as_mut() {
        audio.linked_id = Some(primary.id.clone());
        primary.linked_id = Some(audio.id.clone());
    }

    let placed = Placed {
        clip_id: primary.id.clone(),
        linked_id: linked.as_ref().map(|c| c.id.clone()),
        track_id: target.id.clone(),
        start_time,
    };

    let mut next = project.clone();
    for clip in std::iter::once(primary).chain(linked) {
        next.insert_clip(clip)
            .map_err(|e| invariant_violation(format!("placement insert failed: {e}")))?;
    }

    tracing::info!(
        asset_id = %asset.id,
        clip_id = %placed.clip_id,
        track_id = %placed.track_id,
        start_time,
        linked = placed.linked_id.is_some(),
        "Placed asset"
    );
    Ok((next, placed))
}

/// Pick the track an asset of `kind` lands on.
pub fn resolve_track<'a>(
    project: &'a Project,
    kind: MediaKind,
    hint: Option<&str>,
) -> Result<&'a Track, EditError> {
    let hinted = match hint {
        Some(id) => Some(project.track(id).ok_or_else(|| EditError::TrackNotFound {
            track_id: id.to_string(),
        })?),
        None => None,
    };

    match kind {
        MediaKind::Video => match hinted {
            Some(track) if track.kind != TrackKind::Video => Err(EditError::TrackKindMismatch {
                track_id: track.id.clone(),
                track_kind: track.kind,
                kind,
            }),
            Some(track) => Ok(track),
            None => project
                .first_track_of_kind(TrackKind::Video)
                .ok_or(EditError::NoCompatibleTrack { kind }),
        },
        MediaKind::Audio => match hinted {
            Some(track) if track.kind.is_audio_bearing() => Ok(track),
            _ => project
                .first_track_of_kind(TrackKind::Audio)
                .ok_or(EditError::NoCompatibleTrack { kind }),
        },
    }
}
