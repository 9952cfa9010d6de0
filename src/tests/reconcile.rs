use super::{clamp, reconcile};
use crate::interval::{Interval, IntervalSet};

#[test]
fn test_clamp_end_past_document() {
    assert_eq!(clamp(Interval::new(3, 50), 10), Interval::new(3, 9));
}

#[test]
fn test_clamp_leaves_valid_interval() {
    assert_eq!(clamp(Interval::new(3, 9), 10), Interval::new(3, 9));
}

#[test]
fn test_clamp_interval_beyond_end_collapses() {
    assert_eq!(clamp(Interval::new(20, 30), 10), Interval::line(9));
}

#[test]
fn test_clamp_zero_line_document() {
    assert_eq!(clamp(Interval::new(0, 5), 0), Interval::line(0));
}

#[test]
fn test_reconcile_commits_clamped_interval() {
    let mut set = IntervalSet::new();
    set.add(Interval::new(3, 50));

    let result = reconcile(&mut set, 10);

    assert_eq!(result.intervals, vec![Interval::new(3, 9)]);
    assert_eq!(result.healed, 1);
    let stored: Vec<_> = set.iter().copied().collect();
    assert_eq!(stored, vec![Interval::new(3, 9)]);
}

#[test]
fn test_reconcile_without_changes() {
    let mut set = IntervalSet::new();
    set.add(Interval::new(0, 2));
    set.add(Interval::new(5, 7));
    let before = set.clone();

    let result = reconcile(&mut set, 8);

    assert_eq!(result.healed, 0);
    assert_eq!(set, before);
}

#[test]
fn test_reconcile_is_stable_on_second_pass() {
    let mut set = IntervalSet::new();
    set.add(Interval::new(0, 2));
    set.add(Interval::new(6, 40));

    let first = reconcile(&mut set, 5);
    let second = reconcile(&mut set, 5);

    assert_eq!(first.healed, 1);
    assert_eq!(second.healed, 0);
    assert_eq!(first.intervals, second.intervals);
    assert_eq!(second.intervals, vec![Interval::new(0, 2), Interval::line(4)]);
}
