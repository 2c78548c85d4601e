//! Clips and the tracks that hold them.

use serde::{Deserialize, Serialize};

use crate::asset::{Asset, MediaKind};
use crate::span::TimeSpan;

/// Clip identifier (UUID string).
pub type ClipId = String;

/// Track identifier.
pub type TrackId = String;

/// A placed, time-bounded reference to a segment of source media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: ClipId,
    pub track_id: TrackId,
    /// Media path as resolved by the render backend.
    pub source_path: String,
    /// Timeline start (seconds).
    pub start_time: f64,
    /// Timeline end (seconds), always greater than `start_time`.
    pub end_time: f64,
    /// Offset into the source media (seconds).
    pub source_start: f64,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Linear gain, 1.0 = unity.
    #[serde(default = "default_unity")]
    pub volume: f64,
    /// Playback speed multiplier.
    #[serde(default = "default_unity")]
    pub speed: f64,
    #[serde(default)]
    pub z_index: i32,
    /// Paired clip on another track (video image and its sound).
    #[serde(default)]
    pub linked_id: Option<ClipId>,
}

fn default_unity() -> f64 {
    1.0
}

impl Clip {
    /// Create a clip for `asset` spanning its full duration from `start_time`.
    pub fn from_asset(
        asset: &Asset,
        kind: MediaKind,
        track_id: impl Into<TrackId>,
        start_time: f64,
        media_root: &str,
    ) -> Self {
        Self {
            id: crate::new_id(),
            track_id: track_id.into(),
            source_path: asset.source_path(media_root),
            start_time,
            end_time: start_time + asset.duration,
            source_start: 0.0,
            kind,
            volume: 1.0,
            speed: 1.0,
            z_index: 0,
            linked_id: None,
        }
    }

    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.start_time, self.end_time)
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Source media consumed by this clip, in seconds.
    pub fn source_duration(&self) -> f64 {
        self.duration() * self.speed
    }

    /// Source offset that corresponds to timeline instant `t`.
    pub fn source_offset_at(&self, t: f64) -> f64 {
        self.source_start + (t - self.start_time) * self.speed
    }

    pub fn is_linked(&self) -> bool {
        self.linked_id.is_some()
    }
}

/// Kind of track. `Av` holds the audio half of linked video clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
    Av,
}

impl TrackKind {
    /// Whether clips of `kind` may be placed on this track.
    pub fn accepts(self, kind: MediaKind) -> bool {
        match self {
            TrackKind::Video => kind == MediaKind::Video,
            TrackKind::Audio | TrackKind::Av => kind == MediaKind::Audio,
        }
    }

    pub fn is_audio_bearing(self) -> bool {
        matches!(self, TrackKind::Audio | TrackKind::Av)
    }

    /// Media kind of the clips this track holds.
    pub fn media_kind(self) -> MediaKind {
        match self {
            TrackKind::Video => MediaKind::Video,
            TrackKind::Audio | TrackKind::Av => MediaKind::Audio,
        }
    }
}

/// A track and its clips. Clip order carries no meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    #[serde(rename = "type")]
    pub kind: TrackKind,
    #[serde(default)]
    pub clips: Vec<Clip>,
}

impl Track {
    pub fn new(id: impl Into<TrackId>, kind: TrackKind) -> Self {
        Self {
            id: id.into(),
            kind,
            clips: vec![],
        }
    }

    /// Latest `end_time` on the track, 0 when empty.
    pub fn max_end(&self) -> f64 {
        self.clips.iter().map(|c| c.end_time).fold(0.0, f64::max)
    }

    /// Clips intersecting `span`, skipping any id in `ignore`.
    pub fn overlapping<'a>(
        &'a self,
        span: TimeSpan,
        epsilon: f64,
        ignore: &'a [&str],
    ) -> impl Iterator<Item = &'a Clip> + 'a {
        self.clips.iter().filter(move |c| {
            !ignore.contains(&c.id.as_str()) && c.span().overlaps(&span, epsilon)
        })
    }

    /// Whether `span` fits on the track without touching any clip other
    /// than those in `ignore`.
    pub fn is_free(&self, span: TimeSpan, epsilon: f64, ignore: &[&str]) -> bool {
        self.overlapping(span, epsilon, ignore).next().is_none()
    }
}
