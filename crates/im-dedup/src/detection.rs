//! Duplicate detection over ordered label sequences
//!
//! Every pair of positions `(i, j)` with `i < j` is scored; when the score
//! reaches the threshold, the later position `j` is marked. The earlier
//! position is never marked by that pair. Marked positions still take part
//! in later comparisons, so a chain `0 ~ 1 ~ 2` marks both 1 and 2 even if
//! 0 and 2 do not match directly.
//!
//! [`find_duplicate_groups_with`] is the transitive alternative: matching
//! pairs are merged into connected groups and only the earliest position
//! of each group survives.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{DedupError, DedupResult};
use crate::similarity::{SimilarityScorer, TokenSortRatio, MAX_SCORE};

/// Positions (0-based) judged to duplicate an earlier position.
pub type DuplicateSet = BTreeSet<usize>;

/// Score at or above which two labels denote the same entity.
pub const DEFAULT_THRESHOLD: u32 = 50;

/// Minimum input size before the scan is spread across the rayon pool.
#[cfg(feature = "parallel")]
pub const PARALLEL_THRESHOLD: usize = 100;

/// A connected group of matching positions.
///
/// Positions are `u64` rather than `usize` because this record crosses the
/// UniFFI boundary, which has no pointer-sized integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "native", derive(uniffi::Record))]
pub struct DuplicateGroup {
    /// Earliest position in the group; the one that is kept
    pub survivor: u64,
    /// All positions in the group, ascending, survivor included
    pub members: Vec<u64>,
}

impl DuplicateGroup {
    /// Positions in the group other than the survivor.
    pub fn duplicates(&self) -> impl Iterator<Item = usize> + '_ {
        self.members
            .iter()
            .filter(move |&&m| m != self.survivor)
            .map(|&m| m as usize)
    }
}

/// Check that a threshold lies within `0..=100`.
pub fn validate_threshold(threshold: u32) -> DedupResult<()> {
    if threshold > u32::from(MAX_SCORE) {
        return Err(DedupError::InvalidThreshold(threshold));
    }
    Ok(())
}

/// Find duplicate positions using the default token-sort scorer.
///
/// # Examples
/// ```
/// use im_dedup::find_duplicates;
/// let labels = ["Chicago", "chicago", "Boston", "CHICAGO"];
/// let duplicates = find_duplicates(&labels, 50).unwrap();
/// assert_eq!(duplicates.into_iter().collect::<Vec<_>>(), vec![1, 3]);
/// ```
pub fn find_duplicates<S>(labels: &[S], threshold: u32) -> DedupResult<DuplicateSet>
where
    S: AsRef<str> + Sync,
{
    find_duplicates_with(labels, threshold, &TokenSortRatio::default())
}

/// Find duplicate positions with a caller-supplied scorer.
///
/// Fails with [`DedupError::InvalidThreshold`] before scoring anything when
/// the threshold is above 100. An empty input never calls the scorer.
pub fn find_duplicates_with<S, F>(
    labels: &[S],
    threshold: u32,
    scorer: &F,
) -> DedupResult<DuplicateSet>
where
    S: AsRef<str> + Sync,
    F: SimilarityScorer + ?Sized,
{
    validate_threshold(threshold)?;
    if labels.is_empty() {
        return Ok(DuplicateSet::new());
    }

    let duplicates = scan(labels, threshold, scorer);
    debug!(
        labels = labels.len(),
        duplicates = duplicates.len(),
        threshold,
        "pairwise duplicate scan finished"
    );
    Ok(duplicates)
}

/// Whether position `j` matches any earlier position.
///
/// `j` belongs to the duplicate set exactly when this holds, so stopping at
/// the first match yields the same set as scoring every pair. Only that
/// first matching earlier position is traced.
fn matches_earlier<S, F>(labels: &[S], j: usize, threshold: u32, scorer: &F) -> bool
where
    S: AsRef<str>,
    F: SimilarityScorer + ?Sized,
{
    let later = labels[j].as_ref();
    (0..j).any(|i| {
        let score = scorer.score(labels[i].as_ref(), later);
        if u32::from(score) >= threshold {
            trace!(earlier = i, later = j, score, "first matching earlier position");
            true
        } else {
            false
        }
    })
}

fn scan_sequential<S, F>(labels: &[S], threshold: u32, scorer: &F) -> DuplicateSet
where
    S: AsRef<str>,
    F: SimilarityScorer + ?Sized,
{
    (1..labels.len())
        .filter(|&j| matches_earlier(labels, j, threshold, scorer))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn scan<S, F>(labels: &[S], threshold: u32, scorer: &F) -> DuplicateSet
where
    S: AsRef<str> + Sync,
    F: SimilarityScorer + ?Sized,
{
    scan_sequential(labels, threshold, scorer)
}

#[cfg(feature = "parallel")]
fn scan<S, F>(labels: &[S], threshold: u32, scorer: &F) -> DuplicateSet
where
    S: AsRef<str> + Sync,
    F: SimilarityScorer + ?Sized,
{
    use rayon::prelude::*;

    if labels.len() < PARALLEL_THRESHOLD {
        return scan_sequential(labels, threshold, scorer);
    }

    let marked: Vec<usize> = (1..labels.len())
        .into_par_iter()
        .filter(|&j| matches_earlier(labels, j, threshold, scorer))
        .collect();
    marked.into_iter().collect()
}

/// Group matching positions transitively using the default scorer.
pub fn find_duplicate_groups<S>(labels: &[S], threshold: u32) -> DedupResult<Vec<DuplicateGroup>>
where
    S: AsRef<str>,
{
    find_duplicate_groups_with(labels, threshold, &TokenSortRatio::default())
}

/// Group matching positions transitively.
///
/// Returns only groups with more than one member, ordered by survivor.
pub fn find_duplicate_groups_with<S, F>(
    labels: &[S],
    threshold: u32,
    scorer: &F,
) -> DedupResult<Vec<DuplicateGroup>>
where
    S: AsRef<str>,
    F: SimilarityScorer + ?Sized,
{
    validate_threshold(threshold)?;

    let mut sets = DisjointSet::new(labels.len());
    for j in 1..labels.len() {
        for i in 0..j {
            if sets.find(i) == sets.find(j) {
                continue;
            }
            let score = scorer.score(labels[i].as_ref(), labels[j].as_ref());
            if u32::from(score) >= threshold {
                trace!(earlier = i, later = j, score, "merging groups");
                sets.union(i, j);
            }
        }
    }

    let mut members: Vec<Vec<u64>> = vec![Vec::new(); labels.len()];
    for position in 0..labels.len() {
        let root = sets.find(position);
        members[root].push(position as u64);
    }

    let groups: Vec<DuplicateGroup> = members
        .into_iter()
        .filter(|group| group.len() > 1)
        .map(|group| DuplicateGroup {
            survivor: group[0],
            members: group,
        })
        .collect();

    debug!(
        labels = labels.len(),
        groups = groups.len(),
        threshold,
        "transitive grouping finished"
    );
    Ok(groups)
}

/// Flatten groups into the set of non-survivor positions.
pub fn group_duplicates(groups: &[DuplicateGroup]) -> DuplicateSet {
    groups.iter().flat_map(|group| group.duplicates()).collect()
}

/// Union-find whose root is always the smallest member.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return;
        }
        let (keep, absorb) = if root_a < root_b {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        self.parent[absorb] = keep;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn positions(set: &DuplicateSet) -> Vec<usize> {
        set.iter().copied().collect()
    }

    #[test]
    fn test_later_position_is_marked() {
        let labels = ["Chicago", "chicago", "CHICAGO"];
        let duplicates = find_duplicates(&labels, 50).unwrap();
        assert_eq!(positions(&duplicates), vec![1, 2]);
    }

    #[test]
    fn test_unrelated_labels_survive() {
        let labels = ["Apple Inc", "Banana Corp"];
        assert!(find_duplicates(&labels, 50).unwrap().is_empty());
    }

    #[test]
    fn test_marked_positions_still_mark_later_ones() {
        // 0~1 (65) and 1~2 (59), but 0 and 2 only score 36.
        let labels = [
            "Ship to AstraZeneca",
            "AstraZeneca, gmbh Munich",
            "AstraZeneca (use AstraZeneca, gmbh Munich acct 84719482-A)",
        ];
        let duplicates = find_duplicates(&labels, 50).unwrap();
        assert_eq!(positions(&duplicates), vec![1, 2]);
    }

    #[test]
    fn test_invalid_threshold_scores_nothing() {
        let calls = AtomicUsize::new(0);
        let counting = |_: &str, _: &str| {
            calls.fetch_add(1, Ordering::SeqCst);
            100u8
        };
        let labels = ["a", "b", "c"];

        let result = find_duplicates_with(&labels, 101, &counting);
        assert_eq!(result, Err(DedupError::InvalidThreshold(101)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_input_scores_nothing() {
        let calls = AtomicUsize::new(0);
        let counting = |_: &str, _: &str| {
            calls.fetch_add(1, Ordering::SeqCst);
            100u8
        };
        let labels: [&str; 0] = [];

        let duplicates = find_duplicates_with(&labels, 50, &counting).unwrap();
        assert!(duplicates.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_scan_stops_at_first_earlier_match() {
        let calls = AtomicUsize::new(0);
        let counting = |_: &str, _: &str| {
            calls.fetch_add(1, Ordering::SeqCst);
            100u8
        };
        let labels = ["a", "a", "a", "a"];

        let duplicates = find_duplicates_with(&labels, 50, &counting).unwrap();
        assert_eq!(positions(&duplicates), vec![1, 2, 3]);
        // One comparison per later position: each matches position 0.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_threshold_bounds() {
        assert!(validate_threshold(0).is_ok());
        assert!(validate_threshold(100).is_ok());
        assert_eq!(validate_threshold(101), Err(DedupError::InvalidThreshold(101)));
    }

    #[test]
    fn test_zero_threshold_keeps_only_first() {
        let labels = ["Apple Inc", "Banana Corp", "Cherry LLC"];
        let duplicates = find_duplicates(&labels, 0).unwrap();
        assert_eq!(positions(&duplicates), vec![1, 2]);
    }

    #[test]
    fn test_transitive_groups_absorb_bridged_labels() {
        // "Saama" and "Saama Technologies" score 43; both match the third.
        let labels = ["Saama", "Saama Technologies", "SaamaTech, Inc"];

        let pairwise = find_duplicates(&labels, 50).unwrap();
        assert_eq!(positions(&pairwise), vec![2]);

        let groups = find_duplicate_groups(&labels, 50).unwrap();
        assert_eq!(
            groups,
            vec![DuplicateGroup {
                survivor: 0,
                members: vec![0, 1, 2],
            }]
        );
        assert_eq!(positions(&group_duplicates(&groups)), vec![1, 2]);
    }

    #[test]
    fn test_transitive_groups_skip_singletons() {
        let labels = ["Chicago", "Apple Inc", "chicago"];
        let groups = find_duplicate_groups(&labels, 50).unwrap();
        assert_eq!(
            groups,
            vec![DuplicateGroup {
                survivor: 0,
                members: vec![0, 2],
            }]
        );
    }

    #[test]
    fn test_transitive_invalid_threshold() {
        let labels = ["a"];
        assert_eq!(
            find_duplicate_groups(&labels, 250),
            Err(DedupError::InvalidThreshold(250))
        );
    }

    #[cfg(feature = "parallel")]
    fn generated_names(count: usize) -> Vec<String> {
        let stems = ["Saama", "Takeda Pharmaceutical", "AstraZeneca", "Acme", "Globex"];
        let decorations = ["", " Technologies", ", Inc", " - Central Office", " GmbH"];
        (0..count)
            .map(|i| {
                format!(
                    "{}{} {}",
                    stems[i % stems.len()],
                    decorations[(i / stems.len()) % decorations.len()],
                    i
                )
            })
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn all_pairs_duplicates(labels: &[String], threshold: u32) -> DuplicateSet {
        let scorer = TokenSortRatio::default();
        let mut duplicates = DuplicateSet::new();
        for j in 1..labels.len() {
            for i in 0..j {
                if u32::from(scorer.score(&labels[i], &labels[j])) >= threshold {
                    duplicates.insert(j);
                }
            }
        }
        duplicates
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_scan_matches_all_pairs() {
        let counts = [
            PARALLEL_THRESHOLD - 1,
            PARALLEL_THRESHOLD,
            PARALLEL_THRESHOLD + 50,
            257,
        ];
        for count in counts {
            let labels = generated_names(count);
            for threshold in [50, 80] {
                let expected = all_pairs_duplicates(&labels, threshold);
                assert_eq!(
                    find_duplicates(&labels, threshold).unwrap(),
                    expected,
                    "{count} labels at threshold {threshold}"
                );

                let scorer: &dyn SimilarityScorer = &TokenSortRatio::default();
                assert_eq!(
                    find_duplicates_with(&labels, threshold, scorer).unwrap(),
                    expected,
                    "{count} labels at threshold {threshold} through dyn scorer"
                );
            }
        }
    }

    #[test]
    fn test_disjoint_set_keeps_smallest_root() {
        let mut sets = DisjointSet::new(5);
        sets.union(4, 3);
        sets.union(3, 1);
        assert_eq!(sets.find(4), 1);
        assert_eq!(sets.find(3), 1);
        assert_eq!(sets.find(0), 0);
    }
}
