//! Snapshot change detection.
//!
//! Events are compared by title only: an event present now but not in the
//! previous snapshot was added, one present before but gone now was deleted.
//! Field changes on an event with the same title are not detected.

mod change_kind;
mod change_set;

use std::collections::HashMap;

pub use change_kind::ChangeKind;
pub use change_set::ChangeSet;

/// Something with a title usable as the sync join key.
pub trait Keyed {
    /// Trimmed title. Case-sensitive.
    fn key(&self) -> &str;
}

/// Events indexed by key, in first-seen order. A later duplicate replaces
/// the earlier one's value but keeps its position.
fn index_by_key<T: Keyed>(events: &[T]) -> (Vec<&T>, HashMap<&str, usize>) {
    let mut order: Vec<&T> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for event in events {
        match positions.get(event.key()) {
            Some(&i) => order[i] = event,
            None => {
                positions.insert(event.key(), order.len());
                order.push(event);
            }
        }
    }

    (order, positions)
}

/// Compare the current events against the previous snapshot.
pub fn detect_changes<T: Keyed + Clone>(current: &[T], previous: &[T]) -> ChangeSet<T> {
    let (current_events, current_keys) = index_by_key(current);
    let (previous_events, previous_keys) = index_by_key(previous);

    let added = current_events
        .into_iter()
        .filter(|event| !previous_keys.contains_key(event.key()))
        .cloned()
        .collect();

    let deleted = previous_events
        .into_iter()
        .filter(|event| !current_keys.contains_key(event.key()))
        .cloned()
        .collect();

    ChangeSet { added, deleted }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Titled(&'static str, u32);

    impl Keyed for Titled {
        fn key(&self) -> &str {
            self.0.trim()
        }
    }

    fn titles(events: &[Titled]) -> Vec<&str> {
        events.iter().map(|e| e.0).collect()
    }

    #[test]
    fn test_first_run_everything_is_added() {
        let current = vec![Titled("Dentist", 1), Titled("Standup", 2)];
        let changes = detect_changes(&current, &[]);
        assert_eq!(titles(&changes.added), vec!["Dentist", "Standup"]);
        assert!(changes.deleted.is_empty());
    }

    #[test]
    fn test_added_and_deleted() {
        let previous = vec![Titled("Dentist", 1), Titled("Standup", 2)];
        let current = vec![Titled("Standup", 2), Titled("Lunch", 3)];

        let changes = detect_changes(&current, &previous);
        assert_eq!(titles(&changes.added), vec!["Lunch"]);
        assert_eq!(titles(&changes.deleted), vec!["Dentist"]);
    }

    #[test]
    fn test_unchanged_sets_produce_nothing() {
        let events = vec![Titled("Dentist", 1)];
        assert!(detect_changes(&events, &events).is_empty());
    }

    #[test]
    fn test_titles_are_trimmed_and_case_sensitive() {
        let previous = vec![Titled("Dentist", 1)];
        let current = vec![Titled("  Dentist ", 1), Titled("dentist", 2)];

        let changes = detect_changes(&current, &previous);
        assert_eq!(titles(&changes.added), vec!["dentist"]);
        assert!(changes.deleted.is_empty());
    }

    #[test]
    fn test_duplicate_titles_collapse_to_last() {
        let current = vec![Titled("Standup", 1), Titled("Lunch", 2), Titled("Standup", 3)];
        let changes = detect_changes(&current, &[]);
        assert_eq!(changes.added, vec![Titled("Standup", 3), Titled("Lunch", 2)]);
    }

    #[test]
    fn test_field_changes_are_invisible() {
        let previous = vec![Titled("Dentist", 1)];
        let current = vec![Titled("Dentist", 99)];
        assert!(detect_changes(&current, &previous).is_empty());
    }
}
