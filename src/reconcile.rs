//! Keeps stored marks inside the document they describe.
//!
//! Lines get deleted while a file is being reviewed, so a mark recorded as `3..=50` may point past
//! the end of a file that now has ten lines. Each render pass clamps every interval to the last
//! valid line and writes the clamped interval back, so the stored state heals itself instead of
//! carrying dead line numbers forward.

use crate::interval::{Interval, IntervalSet};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Outcome of reconciling one file's marks against its current line count.
pub struct Reconciliation {
    /// Intervals after clamping, in set order.
    pub intervals: Vec<Interval>,
    /// How many stored intervals were rewritten.
    pub healed: usize,
}

#[must_use]
/// Clamps `interval` so neither bound lies past the last line of a `line_count`-line document.
///
/// An interval lying entirely beyond the end collapses onto the last line.
pub fn clamp(interval: Interval, line_count: usize) -> Interval {
    let last_line = line_count.max(1) - 1;
    Interval {
        start: interval.start.min(last_line),
        end: interval.end.min(last_line),
    }
}

/// Clamps every interval in `set` and commits the ones that moved.
///
/// Rewritten intervals replace their originals directly; no merging takes place.
pub fn reconcile(set: &mut IntervalSet, line_count: usize) -> Reconciliation {
    let moved: Vec<(Interval, Interval)> = set
        .iter()
        .filter_map(|&stored| {
            let clamped = clamp(stored, line_count);
            (clamped != stored).then_some((stored, clamped))
        })
        .collect();

    for &(stored, clamped) in &moved {
        if set.replace(stored, clamped) {
            log::debug!("Clamped mark {stored} to {clamped} ({line_count} lines)");
        }
    }

    Reconciliation {
        intervals: set.iter().copied().collect(),
        healed: moved.len(),
    }
}

#[cfg(test)]
#[path = "tests/reconcile.rs"]
mod tests;
