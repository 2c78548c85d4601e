//! Magnetic snapping.
//!
//! A snap search collects candidate corrections, each with the distance
//! it would move the proposal, and keeps the closest one inside the
//! threshold. Ties go to the earliest offer, so callers control priority
//! purely through offer order.

/// Closest-candidate search within a fixed threshold.
#[derive(Debug, Clone)]
pub struct SnapSearch {
    best: Option<f64>,
    best_distance: f64,
}

impl SnapSearch {
    /// Start a search accepting candidates strictly closer than `threshold`.
    pub fn new(threshold: f64) -> Self {
        Self {
            best: None,
            best_distance: threshold,
        }
    }

    /// Offer `value`, which is `distance` away from the unsnapped proposal.
    pub fn offer(&mut self, distance: f64, value: f64) {
        let distance = distance.abs();
        if distance < self.best_distance {
            self.best_distance = distance;
            self.best = Some(value);
        }
    }

    /// The winning candidate, if any qualified.
    pub fn best(&self) -> Option<f64> {
        self.best
    }

    /// The winning candidate, or `fallback` when nothing was close enough.
    pub fn resolve(&self, fallback: f64) -> f64 {
        self.best.unwrap_or(fallback)
    }
}

/// Snap a timeline instant to zero or to any of `edges`.
pub fn snap_time(t: f64, edges: impl IntoIterator<Item = f64>, threshold: f64) -> f64 {
    let mut search = SnapSearch::new(threshold);
    search.offer(t, 0.0);
    for edge in edges {
        search.offer(t - edge, edge);
    }
    search.resolve(t)
}
