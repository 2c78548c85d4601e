//! Trackcut Edit Core: the timeline clip-graph engine
//!
//! Turns user intent into validated project transitions:
//! - **Placement:** resolve the target track, snap, reject overlaps, create linked pairs
//! - **Selection:** click / shift-click with link closure
//! - **Drag:** baseline + delta gestures snapped to zero and neighbor edges
//! - **Split:** cut a clip (and its linked partner) with source-offset accounting
//! - **Merge planning:** validate and normalize a clip run for the render service
//!
//! This crate is pure computation with no I/O and no async. Every operation
//! takes the current [`Project`](trackcut_project_model::Project) snapshot
//! and returns either a new snapshot or a typed rejection; the input
//! snapshot is never mutated.

pub mod drag;
pub mod edit;
pub mod error;
pub mod merge;
pub mod placement;
pub mod selection;
pub mod session;
pub mod snap;
pub mod split;

pub use drag::{DragGesture, DragOutcome};
pub use error::{EditError, ErrorCategory};
pub use merge::MergePlan;
pub use placement::{PlacementMode, Placed};
pub use selection::Selection;
pub use session::{ChangeSink, DragSummary, EditorSession};
pub use split::SplitOutcome;
