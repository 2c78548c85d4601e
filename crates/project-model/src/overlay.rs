//! Text and shape overlays burned in by the render backend.
//!
//! Overlays are plain property bags: the only rules are the input
//! checks in `validate`.

use serde::{Deserialize, Serialize};

use crate::project::ProjectError;

/// A caption drawn over the video for a time range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOverlay {
    pub id: String,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    /// Percent from left (0-100).
    #[serde(default = "default_text_x")]
    pub x: f64,
    /// Percent from bottom (0-100).
    #[serde(default = "default_text_y")]
    pub y: f64,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_color")]
    pub color: String,
}

/// Shape drawn by a shape overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Line,
    Arrow,
}

/// A line or arrow drawn over the video for a time range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeOverlay {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default = "default_x1")]
    pub x1: f64,
    #[serde(default = "default_y")]
    pub y1: f64,
    #[serde(default = "default_x2")]
    pub x2: f64,
    #[serde(default = "default_y")]
    pub y2: f64,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_stroke")]
    pub width: u32,
}

fn default_text_x() -> f64 {
    50.0
}
fn default_text_y() -> f64 {
    10.0
}
fn default_font_size() -> u32 {
    48
}
fn default_font_family() -> String {
    "Sans".to_string()
}
fn default_color() -> String {
    "white".to_string()
}
fn default_x1() -> f64 {
    10.0
}
fn default_x2() -> f64 {
    90.0
}
fn default_y() -> f64 {
    10.0
}
fn default_stroke() -> u32 {
    3
}

fn check_range(start: f64, end: f64) -> Result<(), ProjectError> {
    if start < 0.0 || end <= start {
        return Err(ProjectError::validation(format!(
            "overlay time range [{start}, {end}) is empty or negative"
        )));
    }
    Ok(())
}

fn check_percent(label: &str, value: f64) -> Result<(), ProjectError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(ProjectError::validation(format!(
            "{label} must be within 0-100, got {value}"
        )));
    }
    Ok(())
}

impl TextOverlay {
    pub fn new(text: impl Into<String>, start_time: f64, end_time: f64) -> Self {
        Self {
            id: crate::new_id(),
            text: text.into(),
            start_time,
            end_time,
            x: default_text_x(),
            y: default_text_y(),
            font_size: default_font_size(),
            font_family: default_font_family(),
            color: default_color(),
        }
    }

    pub fn validate(&self) -> Result<(), ProjectError> {
        check_range(self.start_time, self.end_time)?;
        check_percent("x", self.x)?;
        check_percent("y", self.y)?;
        if self.text.trim().is_empty() {
            return Err(ProjectError::validation("overlay text is empty"));
        }
        if self.font_size == 0 {
            return Err(ProjectError::validation("font_size must be positive"));
        }
        Ok(())
    }
}

impl ShapeOverlay {
    pub fn new(kind: ShapeKind, start_time: f64, end_time: f64) -> Self {
        Self {
            id: crate::new_id(),
            name: String::new(),
            kind,
            start_time,
            end_time,
            x1: default_x1(),
            y1: default_y(),
            x2: default_x2(),
            y2: default_y(),
            color: default_color(),
            width: default_stroke(),
        }
    }

    pub fn validate(&self) -> Result<(), ProjectError> {
        check_range(self.start_time, self.end_time)?;
        for (label, value) in [
            ("x1", self.x1),
            ("y1", self.y1),
            ("x2", self.x2),
            ("y2", self.y2),
        ] {
            check_percent(label, value)?;
        }
        if self.width == 0 {
            return Err(ProjectError::validation("stroke width must be positive"));
        }
        Ok(())
    }
}
