//! Trackcut Render Client: the asynchronous edge of the editor
//!
//! The clip-graph engine is synchronous and pure; everything that waits
//! on the network lives here:
//! - **Service traits:** [`AssetStore`] and [`RenderService`], the two
//!   external collaborators
//! - **HTTP backend:** [`HttpBackend`], speaking the render server's JSON API
//! - **Merge orchestration:** plan, render, then re-validate and apply
//! - **Preview scheduling:** debounced, latest-wins preview requests fed
//!   by the session's committed snapshots

pub mod http;
pub mod merge;
pub mod preview;
pub mod service;

pub use http::HttpBackend;
pub use merge::{MergeError, MergeOrchestrator, SharedSession};
pub use preview::{PreviewNotifier, PreviewScheduler, PreviewState};
pub use service::{AssetStore, RenderOutput, RenderService, RenderStatus};
