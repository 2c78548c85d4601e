//! Trackcut Project Model
//!
//! Defines the core data contracts for Trackcut projects:
//! - **Assets:** Library items produced by the upload collaborator
//! - **Clips / Tracks:** Time-bounded references to source media placed on tracks
//! - **Project:** The track list plus an id index kept in step with every mutation
//! - **Bundle:** On-disk layout (`project.json`, `library.json`, `bundle.json`)
//!
//! All times are timeline seconds as `f64`. Interval comparisons go
//! through [`TimeSpan`] with an explicit epsilon.

pub mod asset;
pub mod bundle;
pub mod clip;
pub mod overlay;
pub mod project;
pub mod span;

pub use asset::*;
pub use bundle::*;
pub use clip::*;
pub use overlay::*;
pub use project::*;
pub use span::*;

/// Generate a fresh UUID v4 string identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
