//! Synchronous timeline edits.

use std::path::PathBuf;

use trackcut_common::AppConfig;
use trackcut_edit_core::session::DragSummary;

use super::{open, placement_mode, save};
use crate::Target;

pub fn place(path: PathBuf, asset: String, target: Target, config: &AppConfig) -> anyhow::Result<()> {
    let (bundle, mut session) = open(&path, config)?;
    let placed = session.place(&asset, target.track.as_deref(), placement_mode(&target))?;

    println!(
        "Placed {} on {} at {:.3}s as {}",
        asset, placed.track_id, placed.start_time, placed.clip_id
    );
    if let Some(linked) = &placed.linked_id {
        println!("  Linked audio: {linked}");
    }
    save(bundle, session)
}

/// Simulate a pointer drag: press on the clip, move by `dx` pixels, release.
pub fn drag(path: PathBuf, clip: String, dx: f64, config: &AppConfig) -> anyhow::Result<()> {
    let (bundle, mut session) = open(&path, config)?;
    session.pointer_down(&clip, 0.0)?;
    let snapped = session.pointer_move(dx).unwrap_or(0.0);
    tracing::debug!(clip_id = %clip, dx, snapped, "Drag updated");

    match session.pointer_up() {
        Some(DragSummary::Moved { delta }) => {
            println!(
                "Moved {} clip(s) by {:+.3}s",
                session.selection().len(),
                delta
            );
            save(bundle, session)
        }
        Some(DragSummary::SnappedBack { reason }) => {
            println!("Move rejected, clips left in place: {reason}");
            Ok(())
        }
        None => Ok(()),
    }
}

pub fn split(path: PathBuf, clip: String, at: f64, config: &AppConfig) -> anyhow::Result<()> {
    let (bundle, mut session) = open(&path, config)?;
    let right = session.split(&clip, at)?;
    if right.is_empty() {
        println!("{at}s is not strictly inside {clip}; nothing to split");
        return Ok(());
    }
    println!("Split at {at:.3}s; new clips: {}", right.join(", "));
    save(bundle, session)
}

pub fn delete(path: PathBuf, clips: Vec<String>, config: &AppConfig) -> anyhow::Result<()> {
    let (bundle, mut session) = open(&path, config)?;
    for clip in &clips {
        if !session.selection().contains(clip) {
            session.select(clip, true)?;
        }
    }
    let removed = session.delete_selection()?;
    println!("Deleted {} clip(s): {}", removed.len(), removed.join(", "));
    save(bundle, session)
}

pub fn volume(path: PathBuf, clip: String, value: f64, config: &AppConfig) -> anyhow::Result<()> {
    let (bundle, mut session) = open(&path, config)?;
    session.set_volume(&clip, value)?;
    println!("Volume of {clip} set to {value}");
    save(bundle, session)
}

pub fn speed(path: PathBuf, clip: String, value: f64, config: &AppConfig) -> anyhow::Result<()> {
    let (bundle, mut session) = open(&path, config)?;
    session.set_speed(&clip, value)?;
    println!("Speed of {clip} set to {value}");
    save(bundle, session)
}
