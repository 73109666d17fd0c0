//! Order-preserving compaction and the shortest-first survivor policy

use crate::detection::DuplicateSet;

/// Keep every label whose position is not in `duplicates`, in input order.
///
/// The input is left untouched; positions past the end of `labels` are
/// ignored.
pub fn compact<S: Clone>(labels: &[S], duplicates: &DuplicateSet) -> Vec<S> {
    labels
        .iter()
        .enumerate()
        .filter(|(position, _)| !duplicates.contains(position))
        .map(|(_, label)| label.clone())
        .collect()
}

/// Positions of `labels` ordered by character length, shortest first.
///
/// The sort is stable: labels of equal length keep their relative order.
pub fn shortest_first_order<S: AsRef<str>>(labels: &[S]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..labels.len()).collect();
    order.sort_by_key(|&position| labels[position].as_ref().chars().count());
    order
}

/// Copy of `labels` sorted by character length, shortest first.
///
/// Because detection keeps the earlier member of every matching pair,
/// sorting first makes the shortest, usually least decorated, variant of
/// an entity the survivor.
pub fn sort_shortest_first<S: AsRef<str> + Clone>(labels: &[S]) -> Vec<S> {
    shortest_first_order(labels)
        .into_iter()
        .map(|position| labels[position].clone())
        .collect()
}
