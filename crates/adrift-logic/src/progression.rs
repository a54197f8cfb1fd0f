//! Puzzle ordering, activation, and aggregate completion.
//!
//! The coordinator keeps its entries stable-sorted by designer-assigned
//! order. Activation walks that storage order and wakes the first entry
//! that is neither completed nor already active, so at most the
//! lowest-order incomplete entry is ever active.

/// The slice of entry state that ordering and activation care about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryState {
    pub order: i32,
    pub completed: bool,
    pub active: bool,
}

/// Index of the next entry to activate: the first in storage order that is
/// neither completed nor active. Entries are assumed already sorted.
pub fn next_activation(entries: &[EntryState]) -> Option<usize> {
    entries
        .iter()
        .position(|e| !e.completed && !e.active)
}

/// Arithmetic mean of completion percentages. An empty set reports 0.
pub fn mean_completion(percentages: &[f32]) -> f32 {
    if percentages.is_empty() {
        return 0.0;
    }
    percentages.iter().sum::<f32>() / percentages.len() as f32
}

/// Whether every entry is completed. Vacuously true for an empty set; the
/// coordinator only consults this on completion events, so an empty board
/// never announces itself finished.
pub fn all_complete(entries: &[EntryState]) -> bool {
    entries.iter().all(|e| e.completed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(order: i32, completed: bool, active: bool) -> EntryState {
        EntryState {
            order,
            completed,
            active,
        }
    }

    #[test]
    fn test_activation_picks_first_incomplete_inactive() {
        // [A(complete), B(incomplete, inactive), C(incomplete, inactive)]
        let entries = [
            entry(0, true, false),
            entry(1, false, false),
            entry(2, false, false),
        ];
        assert_eq!(next_activation(&entries), Some(1));
    }

    #[test]
    fn test_activation_skips_active_entries() {
        let entries = [
            entry(0, false, true),
            entry(1, false, false),
        ];
        assert_eq!(next_activation(&entries), Some(1));
    }

    #[test]
    fn test_activation_none_when_exhausted() {
        let entries = [entry(0, true, false), entry(1, false, true)];
        assert_eq!(next_activation(&entries), None);
        assert_eq!(next_activation(&[]), None);
    }

    #[test]
    fn test_stable_sort_preserves_ties() {
        // Two entries share order 1; sorting must keep their input order.
        let mut tagged = vec![
            (entry(2, false, false), "late"),
            (entry(1, false, false), "first-one"),
            (entry(1, false, false), "second-one"),
            (entry(0, false, false), "early"),
        ];
        tagged.sort_by_key(|(e, _)| e.order);
        let names: Vec<_> = tagged.iter().map(|(_, n)| *n).collect();
        assert_eq!(names, ["early", "first-one", "second-one", "late"]);
    }

    #[test]
    fn test_mean_completion() {
        assert_eq!(mean_completion(&[0.0, 50.0, 100.0]), 50.0);
        assert_eq!(mean_completion(&[100.0]), 100.0);
        assert_eq!(mean_completion(&[]), 0.0);
    }

    #[test]
    fn test_all_complete() {
        assert!(all_complete(&[entry(0, true, false), entry(1, true, false)]));
        assert!(!all_complete(&[entry(0, true, false), entry(1, false, false)]));
    }
}
