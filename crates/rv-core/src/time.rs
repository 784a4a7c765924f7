//! Time model for imported logs.
//!
//! # Design
//!
//! Event logs timestamp every record with a floating-point number of
//! simulated seconds (`time="21510.0"`).  Imports may be restricted to a
//! sub-range of the log with an optional start and an optional end bound;
//! [`TimeWindow`] holds those bounds and answers the two questions the
//! pipeline asks of them:
//!
//! 1. Does an event at time `t` belong to the import?  (`contains`)
//! 2. Which range should the scene animate once the log has been read?
//!    (`effective_range`)
//!
//! Both bounds are inclusive.

use std::fmt;

/// Optional `[start, end]` bounds, in simulated seconds.
///
/// `TimeWindow::default()` is unbounded on both sides.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeWindow {
    pub start: Option<f64>,
    pub end:   Option<f64>,
}

impl TimeWindow {
    /// A window with no bounds.
    pub const UNBOUNDED: TimeWindow = TimeWindow { start: None, end: None };

    pub fn new(start: Option<f64>, end: Option<f64>) -> Self {
        Self { start, end }
    }

    /// Window bounded on both sides.
    pub fn between(start: f64, end: f64) -> Self {
        Self { start: Some(start), end: Some(end) }
    }

    /// `true` when neither bound is set.
    #[inline]
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// `true` if `t` lies inside the window (bounds inclusive).
    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        if let Some(start) = self.start {
            if t < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if t > end {
                return false;
            }
        }
        true
    }

    /// The range a scene should animate, given the times actually observed
    /// in the log: `max(start, min) .. min(end, max)`.
    ///
    /// Returns `(0.0, 0.0)` when nothing was observed.
    pub fn effective_range(&self, observed: Option<(f64, f64)>) -> (f64, f64) {
        let Some((min, max)) = observed else {
            return (0.0, 0.0);
        };
        let lo = self.start.map_or(min, |s| s.max(min));
        let hi = self.end.map_or(max, |e| e.min(max));
        (lo, hi)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start, self.end) {
            (None, None) => write!(f, "[-inf, +inf]"),
            (Some(s), None) => write!(f, "[{s}, +inf]"),
            (None, Some(e)) => write!(f, "[-inf, {e}]"),
            (Some(s), Some(e)) => write!(f, "[{s}, {e}]"),
        }
    }
}
