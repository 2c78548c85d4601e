//! Half-open time intervals on the timeline.

use serde::{Deserialize, Serialize};

/// Default tolerance for floating point interval comparisons (seconds).
pub const DEFAULT_EPSILON: f64 = 0.001;

/// A half-open interval `[start, end)` in timeline seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: f64,
    pub end: f64,
}

impl TimeSpan {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Span starting at `start` lasting `duration` seconds.
    pub fn starting_at(start: f64, duration: f64) -> Self {
        Self {
            start,
            end: start + duration,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Shift both edges by `delta`, preserving duration.
    pub fn shifted(&self, delta: f64) -> Self {
        Self {
            start: self.start + delta,
            end: self.end + delta,
        }
    }

    /// Whether the two spans share more than `epsilon` of time.
    ///
    /// Touching edges (`a.end == b.start`) never overlap, and neither do
    /// edges that interpenetrate by less than `epsilon`.
    pub fn overlaps(&self, other: &TimeSpan, epsilon: f64) -> bool {
        self.start < other.end - epsilon && self.end > other.start + epsilon
    }

    /// Whether `t` lies strictly inside the open interval `(start, end)`.
    pub fn strictly_contains(&self, t: f64) -> bool {
        t > self.start && t < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjacent_spans_do_not_overlap() {
        let a = TimeSpan::new(0.0, 5.0);
        let b = TimeSpan::new(5.0, 8.0);
        assert!(!a.overlaps(&b, DEFAULT_EPSILON));
        assert!(!b.overlaps(&a, DEFAULT_EPSILON));
    }

    #[test]
    fn test_epsilon_absorbs_float_noise() {
        let a = TimeSpan::new(0.0, 5.0004);
        let b = TimeSpan::new(5.0, 8.0);
        assert!(!a.overlaps(&b, DEFAULT_EPSILON));
        assert!(a.overlaps(&b, 0.0));
    }

    #[test]
    fn test_nested_span_overlaps() {
        let outer = TimeSpan::new(0.0, 10.0);
        let inner = TimeSpan::new(2.0, 3.0);
        assert!(outer.overlaps(&inner, DEFAULT_EPSILON));
        assert!(inner.overlaps(&outer, DEFAULT_EPSILON));
    }

    #[test]
    fn test_strict_containment_excludes_edges() {
        let span = TimeSpan::new(2.0, 10.0);
        assert!(span.strictly_contains(5.0));
        assert!(!span.strictly_contains(2.0));
        assert!(!span.strictly_contains(10.0));
    }

    #[test]
    fn test_shift_preserves_duration() {
        let span = TimeSpan::new(1.5, 4.0).shifted(2.25);
        assert!((span.start - 3.75).abs() < 1e-9);
        assert!((span.duration() - 2.5).abs() < 1e-9);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_overlap_is_symmetric(
                a in 0.0f64..100.0, la in 0.01f64..20.0,
                b in 0.0f64..100.0, lb in 0.01f64..20.0,
            ) {
                let x = TimeSpan::starting_at(a, la);
                let y = TimeSpan::starting_at(b, lb);
                prop_assert_eq!(x.overlaps(&y, DEFAULT_EPSILON), y.overlaps(&x, DEFAULT_EPSILON));
            }

            #[test]
            fn test_back_to_back_never_overlaps(a in 0.0f64..100.0, la in 0.01f64..20.0, lb in 0.01f64..20.0) {
                let x = TimeSpan::starting_at(a, la);
                let y = TimeSpan::starting_at(x.end, lb);
                prop_assert!(!x.overlaps(&y, DEFAULT_EPSILON));
            }
        }
    }
}
