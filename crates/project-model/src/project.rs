//! The project: tracks, clips, overlays, and the clip id index.
//!
//! The track list is fixed at creation. Every clip mutation goes through
//! `Project` so the id index stays in step with the tracks; lookups by
//! clip id are O(1) instead of a scan over every track.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::clip::{Clip, ClipId, Track, TrackId, TrackKind};
use crate::overlay::{ShapeOverlay, TextOverlay};

/// Position of a clip inside the track list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipLocation {
    /// Index into `Project::tracks()`.
    pub track: usize,
    /// Index into that track's `clips`.
    pub position: usize,
}

/// A timeline project snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProjectData", into = "ProjectData")]
pub struct Project {
    pub id: String,
    tracks: Vec<Track>,
    pub text_overlays: Vec<TextOverlay>,
    pub shape_overlays: Vec<ShapeOverlay>,
    index: HashMap<ClipId, ClipLocation>,
}

/// Wire shape of a project as the render backend reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProjectData {
    id: String,
    #[serde(default)]
    tracks: Vec<Track>,
    /// Derived on write, ignored on read.
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    text_overlays: Vec<TextOverlay>,
    #[serde(default)]
    shape_overlays: Vec<ShapeOverlay>,
}

impl From<ProjectData> for Project {
    fn from(data: ProjectData) -> Self {
        let mut project = Project {
            id: data.id,
            tracks: data.tracks,
            text_overlays: data.text_overlays,
            shape_overlays: data.shape_overlays,
            index: HashMap::new(),
        };
        project.reindex();
        project
    }
}

impl From<Project> for ProjectData {
    fn from(project: Project) -> Self {
        let duration = project.duration();
        ProjectData {
            id: project.id,
            tracks: project.tracks,
            duration,
            text_overlays: project.text_overlays,
            shape_overlays: project.shape_overlays,
        }
    }
}

impl Project {
    /// Create a project from a fixed track list.
    pub fn from_tracks(id: impl Into<String>, tracks: Vec<Track>) -> Self {
        let mut project = Self {
            id: id.into(),
            tracks,
            text_overlays: vec![],
            shape_overlays: vec![],
            index: HashMap::new(),
        };
        project.reindex();
        project
    }

    /// Create an empty project with the standard layout: one video track,
    /// one av track for the sound of video clips, and `audio_tracks`
    /// freestanding audio tracks.
    pub fn with_layout(audio_tracks: usize) -> Self {
        let mut tracks = vec![
            Track::new("video-1", TrackKind::Video),
            Track::new("av-1", TrackKind::Av),
        ];
        for n in 1..=audio_tracks {
            tracks.push(Track::new(format!("audio-{n}"), TrackKind::Audio));
        }
        Self::from_tracks(crate::new_id(), tracks)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// First track of the given kind, in track order.
    pub fn first_track_of_kind(&self, kind: TrackKind) -> Option<&Track> {
        self.tracks.iter().find(|t| t.kind == kind)
    }

    pub fn locate(&self, clip_id: &str) -> Option<ClipLocation> {
        self.index.get(clip_id).copied()
    }

    pub fn clip(&self, clip_id: &str) -> Option<&Clip> {
        let loc = self.locate(clip_id)?;
        self.tracks.get(loc.track)?.clips.get(loc.position)
    }

    /// Track that owns `clip_id`.
    pub fn track_of(&self, clip_id: &str) -> Option<&Track> {
        let loc = self.locate(clip_id)?;
        self.tracks.get(loc.track)
    }

    /// Counterpart of a linked clip, if the link resolves.
    pub fn linked_clip(&self, clip_id: &str) -> Option<&Clip> {
        let linked = self.clip(clip_id)?.linked_id.as_deref()?;
        self.clip(linked)
    }

    /// Every clip, track by track.
    pub fn clips(&self) -> impl Iterator<Item = &Clip> {
        self.tracks.iter().flat_map(|t| t.clips.iter())
    }

    pub fn clip_count(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Derived project length: the latest clip end on any track.
    pub fn duration(&self) -> f64 {
        self.tracks.iter().map(Track::max_end).fold(0.0, f64::max)
    }

    /// Insert a clip onto the track named by `clip.track_id`.
    ///
    /// Only structural checks happen here (track exists, id unique,
    /// positive length). Overlap rules belong to the editing layer.
    pub fn insert_clip(&mut self, clip: Clip) -> Result<(), ProjectError> {
        if self.index.contains_key(&clip.id) {
            return Err(ProjectError::validation(format!(
                "clip id {} already exists",
                clip.id
            )));
        }
        if clip.end_time <= clip.start_time {
            return Err(ProjectError::validation(format!(
                "clip {} has non-positive length",
                clip.id
            )));
        }
        let track = self
            .tracks
            .iter()
            .position(|t| t.id == clip.track_id)
            .ok_or_else(|| ProjectError::UnknownTrack {
                track_id: clip.track_id.clone(),
            })?;

        let position = self.tracks[track].clips.len();
        self.index
            .insert(clip.id.clone(), ClipLocation { track, position });
        self.tracks[track].clips.push(clip);
        Ok(())
    }

    /// Remove a clip, returning it. Links pointing at it are left for the
    /// caller to clear.
    pub fn remove_clip(&mut self, clip_id: &str) -> Option<Clip> {
        let loc = self.index.remove(clip_id)?;
        let clip = self.tracks[loc.track].clips.remove(loc.position);
        self.reindex_track(loc.track);
        Some(clip)
    }

    /// Edit a clip in place. `id` and `track_id` are restored after `f`
    /// runs; moving a clip between tracks goes through remove + insert.
    pub fn modify_clip<F>(&mut self, clip_id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Clip),
    {
        let Some(loc) = self.locate(clip_id) else {
            return false;
        };
        let clip = &mut self.tracks[loc.track].clips[loc.position];
        let id = clip.id.clone();
        let track_id = clip.track_id.clone();
        f(clip);
        clip.id = id;
        clip.track_id = track_id;
        true
    }

    pub fn add_text_overlay(&mut self, overlay: TextOverlay) -> Result<(), ProjectError> {
        overlay.validate()?;
        if self.has_overlay(&overlay.id) {
            return Err(ProjectError::validation(format!(
                "overlay id {} already exists",
                overlay.id
            )));
        }
        self.text_overlays.push(overlay);
        Ok(())
    }

    pub fn add_shape_overlay(&mut self, overlay: ShapeOverlay) -> Result<(), ProjectError> {
        overlay.validate()?;
        if self.has_overlay(&overlay.id) {
            return Err(ProjectError::validation(format!(
                "overlay id {} already exists",
                overlay.id
            )));
        }
        self.shape_overlays.push(overlay);
        Ok(())
    }

    /// Remove a text or shape overlay by id.
    pub fn remove_overlay(&mut self, overlay_id: &str) -> bool {
        let before = self.text_overlays.len() + self.shape_overlays.len();
        self.text_overlays.retain(|o| o.id != overlay_id);
        self.shape_overlays.retain(|o| o.id != overlay_id);
        before != self.text_overlays.len() + self.shape_overlays.len()
    }

    fn has_overlay(&self, overlay_id: &str) -> bool {
        self.text_overlays.iter().any(|o| o.id == overlay_id)
            || self.shape_overlays.iter().any(|o| o.id == overlay_id)
    }

    /// Check every structural and geometric invariant, returning a
    /// human-readable description of each violation.
    pub fn check_invariants(&self, epsilon: f64) -> Vec<String> {
        let mut errors = vec![];
        let mut seen: HashSet<&str> = HashSet::new();

        for track in &self.tracks {
            for (i, clip) in track.clips.iter().enumerate() {
                if !seen.insert(clip.id.as_str()) {
                    errors.push(format!("duplicate clip id {}", clip.id));
                }
                if clip.track_id != track.id {
                    errors.push(format!(
                        "clip {} claims track {} but lives on {}",
                        clip.id, clip.track_id, track.id
                    ));
                }
                if !track.kind.accepts(clip.kind) {
                    errors.push(format!(
                        "clip {} of kind {:?} on {:?} track {}",
                        clip.id, clip.kind, track.kind, track.id
                    ));
                }
                if clip.end_time <= clip.start_time {
                    errors.push(format!("clip {} has non-positive length", clip.id));
                }
                if clip.start_time < 0.0 {
                    errors.push(format!("clip {} starts before zero", clip.id));
                }
                if clip.source_start < 0.0 {
                    errors.push(format!("clip {} has negative source_start", clip.id));
                }
                if clip.speed <= 0.0 {
                    errors.push(format!("clip {} has non-positive speed", clip.id));
                }
                if clip.volume < 0.0 {
                    errors.push(format!("clip {} has negative volume", clip.id));
                }
                for other in &track.clips[i + 1..] {
                    if clip.span().overlaps(&other.span(), epsilon) {
                        errors.push(format!(
                            "clips {} and {} overlap on track {}",
                            clip.id, other.id, track.id
                        ));
                    }
                }
            }
        }

        for clip in self.clips() {
            let Some(linked_id) = clip.linked_id.as_deref() else {
                continue;
            };
            let Some(partner) = self.clip(linked_id) else {
                errors.push(format!("clip {} links to missing clip {linked_id}", clip.id));
                continue;
            };
            if partner.linked_id.as_deref() != Some(clip.id.as_str()) {
                errors.push(format!(
                    "link from {} to {} is not mutual",
                    clip.id, partner.id
                ));
            }
            if partner.track_id == clip.track_id {
                errors.push(format!(
                    "linked clips {} and {} share track {}",
                    clip.id, partner.id, clip.track_id
                ));
            }
            // Report each pair once.
            if clip.id < partner.id && !same_geometry(clip, partner, epsilon) {
                errors.push(format!(
                    "linked clips {} and {} are out of sync",
                    clip.id, partner.id
                ));
            }
        }

        errors
    }

    fn reindex(&mut self) {
        self.index.clear();
        for track in 0..self.tracks.len() {
            self.reindex_track(track);
        }
    }

    fn reindex_track(&mut self, track: usize) {
        for (position, clip) in self.tracks[track].clips.iter().enumerate() {
            self.index
                .insert(clip.id.clone(), ClipLocation { track, position });
        }
    }
}

/// Whether two clips share start, end, source offset, and speed.
pub fn same_geometry(a: &Clip, b: &Clip, epsilon: f64) -> bool {
    (a.start_time - b.start_time).abs() <= epsilon
        && (a.end_time - b.end_time).abs() <= epsilon
        && (a.source_start - b.source_start).abs() <= epsilon
        && (a.speed - b.speed).abs() <= epsilon
}

/// Errors that can occur when working with projects.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Unknown track: {track_id}")]
    UnknownTrack { track_id: TrackId },

    #[error("Invalid project: {message}")]
    ValidationError { message: String },
}

impl ProjectError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError {
            message: msg.into(),
        }
    }
}
