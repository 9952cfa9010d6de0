//! Line intervals and the per-file interval set that marks are stored in.
//!
//! An `IntervalSet` holds inclusive, zero-based line ranges. Adding a range absorbs every
//! stored interval that overlaps or touches it, so a mark ending on line 4 and a new mark
//! starting on line 5 become one interval. Removing a range carves it out of whatever it
//! intersects, splitting an interval in two when the removed lines sit strictly inside it.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Inclusive range of zero-based line numbers.
pub struct Interval {
    /// First marked line.
    pub start: usize,
    /// Last marked line (inclusive).
    pub end: usize,
}

impl Interval {
    #[must_use]
    /// Builds an interval from two line numbers given in either order.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    #[must_use]
    /// Interval covering a single line.
    pub fn line(line: usize) -> Self {
        Self {
            start: line,
            end: line,
        }
    }

    #[must_use]
    /// Whether `line` falls inside this interval.
    pub fn contains(&self, line: usize) -> bool {
        self.start <= line && line <= self.end
    }

    #[must_use]
    /// Number of lines covered.
    pub fn line_count(&self) -> usize {
        self.end - self.start + 1
    }

    /// Existing interval `self` gets folded into `incoming` on insert.
    ///
    /// Either the line just before `incoming` lies inside `self`, or the line just before `self`
    /// lies inside `incoming`. An interval starting on the same line as `incoming` satisfies
    /// neither test.
    fn absorbs_into(&self, incoming: &Self) -> bool {
        let before_incoming = incoming
            .start
            .checked_sub(1)
            .is_some_and(|line| self.contains(line));
        let before_self = self
            .start
            .checked_sub(1)
            .is_some_and(|line| incoming.contains(line));
        before_incoming || before_self
    }

    fn intersects(&self, other: &Self) -> bool {
        self.contains(other.start) || other.contains(self.start)
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Canonical collection of marked intervals for one file.
///
/// Intervals are kept sorted by `(start, end)` and structurally equal intervals are stored
/// once, so iteration order is stable across runs.
pub struct IntervalSet {
    intervals: Vec<Interval>,
}

impl IntervalSet {
    #[must_use]
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    /// Rebuilds a set from intervals that were already canonical when stored.
    ///
    /// No merging happens here; the records are only ordered and de-duplicated.
    pub fn from_trusted(intervals: impl IntoIterator<Item = Interval>) -> Self {
        let mut set = Self::new();
        for interval in intervals {
            set.insert(interval);
        }
        set
    }

    /// Marks `range`, merging it with every stored interval it overlaps or touches.
    pub fn add(&mut self, range: Interval) {
        let (candidates, kept): (Vec<Interval>, Vec<Interval>) = self
            .intervals
            .iter()
            .copied()
            .partition(|existing| existing.absorbs_into(&range));

        if candidates.is_empty() {
            self.insert(range);
            return;
        }

        let merged = candidates
            .iter()
            .fold(range, |acc, candidate| Interval {
                start: acc.start.min(candidate.start),
                end: acc.end.max(candidate.end),
            });

        log::trace!("merged {} interval(s) into {merged}", candidates.len());
        self.intervals = kept;
        self.insert(merged);
    }

    /// Unmarks every line of `range`, splitting intervals that extend past it on both sides.
    pub fn remove(&mut self, range: Interval) {
        let (affected, kept): (Vec<Interval>, Vec<Interval>) = self
            .intervals
            .iter()
            .copied()
            .partition(|existing| existing.intersects(&range));

        if affected.is_empty() {
            return;
        }

        self.intervals = kept;
        for existing in affected {
            if existing.start >= range.start && existing.end <= range.end {
                // covered entirely, nothing survives
            } else if existing.start <= range.start && existing.end >= range.end {
                if range.start > existing.start {
                    self.insert(Interval {
                        start: existing.start,
                        end: range.start - 1,
                    });
                }
                if existing.end > range.end {
                    self.insert(Interval {
                        start: range.end + 1,
                        end: existing.end,
                    });
                }
            } else if existing.start <= range.start && existing.end < range.end {
                self.insert(Interval {
                    start: existing.start,
                    end: range.start - 1,
                });
            } else {
                self.insert(Interval {
                    start: range.end + 1,
                    end: existing.end,
                });
            }
        }
    }

    /// Swaps `old` for `new` without merging; returns false when `old` is not stored.
    pub(crate) fn replace(&mut self, old: Interval, new: Interval) -> bool {
        match self.intervals.binary_search(&old) {
            Ok(index) => {
                self.intervals.remove(index);
                self.insert(new);
                true
            }
            Err(_) => false,
        }
    }

    fn insert(&mut self, interval: Interval) {
        if let Err(index) = self.intervals.binary_search(&interval) {
            self.intervals.insert(index, interval);
        }
    }

    /// Drops every interval.
    pub fn clear(&mut self) {
        self.intervals.clear();
    }

    /// Iterates intervals in `(start, end)` order.
    pub fn iter(&self) -> impl Iterator<Item = &Interval> {
        self.intervals.iter()
    }

    #[must_use]
    /// Stored intervals as a slice.
    pub fn as_slice(&self) -> &[Interval] {
        &self.intervals
    }

    #[must_use]
    /// Number of stored intervals.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    #[must_use]
    /// True when nothing in the file is marked.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    #[must_use]
    /// Whether any interval covers `line`.
    pub fn contains_line(&self, line: usize) -> bool {
        self.intervals.iter().any(|interval| interval.contains(line))
    }

    #[must_use]
    /// Total number of marked lines, counting each line once.
    pub fn covered_lines(&self) -> usize {
        let mut total = 0;
        let mut next_uncounted = 0;
        for interval in &self.intervals {
            let start = interval.start.max(next_uncounted);
            if start <= interval.end {
                total += interval.end - start + 1;
                next_uncounted = interval.end + 1;
            }
        }
        total
    }
}

impl<'a> IntoIterator for &'a IntervalSet {
    type Item = &'a Interval;
    type IntoIter = std::slice::Iter<'a, Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}

#[cfg(test)]
#[path = "tests/interval.rs"]
mod tests;
