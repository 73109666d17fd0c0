//! Deduplication pipeline orchestration
//!
//! Runs the configured steps in order: optional shortest-first sort,
//! duplicate detection (pairwise or transitive), then compaction. Reported
//! positions always refer to the caller's input order, even when the
//! labels were sorted internally.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compaction::{compact, shortest_first_order};
use crate::config::{ClusterMode, DedupConfig};
use crate::detection::{
    find_duplicate_groups_with, find_duplicates_with, group_duplicates, DuplicateGroup,
};
use crate::error::{DedupError, DedupResult};
use crate::similarity::{SimilarityScorer, TokenSortRatio};

/// Result of a deduplication run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "native", derive(uniffi::Record))]
pub struct DedupOutcome {
    /// One label per entity, in processing order (length order when
    /// `shortest_first` is set, input order otherwise)
    pub survivors: Vec<String>,
    /// Input positions dropped as duplicates, ascending
    pub duplicates: Vec<u64>,
    /// Matching groups in input positions; filled in transitive mode only
    pub groups: Vec<DuplicateGroup>,
}

impl DedupOutcome {
    /// Number of labels removed
    pub fn removed(&self) -> usize {
        self.duplicates.len()
    }
}

/// Configured deduplication pipeline
#[derive(Debug, Clone)]
pub struct Deduplicator<F = TokenSortRatio> {
    config: DedupConfig,
    scorer: F,
}

impl Deduplicator<TokenSortRatio> {
    /// Build a pipeline using the token-sort scorer in the configured
    /// normalization mode.
    pub fn new(config: DedupConfig) -> DedupResult<Self> {
        let scorer = TokenSortRatio::new(config.normalization);
        Self::with_scorer(config, scorer)
    }
}

impl<F: SimilarityScorer> Deduplicator<F> {
    /// Build a pipeline around a custom scorer. The config's
    /// `normalization` setting is left to the scorer.
    pub fn with_scorer(config: DedupConfig, scorer: F) -> DedupResult<Self> {
        config.validate()?;
        Ok(Self { config, scorer })
    }

    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    /// Deduplicate `labels`. The input is not modified.
    pub fn run<S: AsRef<str>>(&self, labels: &[S]) -> DedupResult<DedupOutcome> {
        let order: Vec<usize> = if self.config.shortest_first {
            shortest_first_order(labels)
        } else {
            (0..labels.len()).collect()
        };
        let working: Vec<&str> = order.iter().map(|&p| labels[p].as_ref()).collect();
        let threshold = self.config.threshold;

        let (local_duplicates, local_groups) = match self.config.clustering {
            ClusterMode::Pairwise => (
                find_duplicates_with(&working, threshold, &self.scorer)?,
                Vec::new(),
            ),
            ClusterMode::Transitive => {
                let groups = find_duplicate_groups_with(&working, threshold, &self.scorer)?;
                (group_duplicates(&groups), groups)
            }
        };

        let survivors: Vec<String> = compact(&working, &local_duplicates)
            .into_iter()
            .map(str::to_string)
            .collect();

        let duplicates: BTreeSet<u64> = local_duplicates
            .iter()
            .map(|&p| order[p] as u64)
            .collect();

        let groups = local_groups
            .into_iter()
            .map(|group| {
                let mut members: Vec<u64> = group
                    .members
                    .iter()
                    .map(|&m| order[m as usize] as u64)
                    .collect();
                members.sort_unstable();
                DuplicateGroup {
                    survivor: order[group.survivor as usize] as u64,
                    members,
                }
            })
            .collect();

        debug!(
            input = labels.len(),
            survivors = survivors.len(),
            removed = duplicates.len(),
            threshold,
            "deduplication finished"
        );

        Ok(DedupOutcome {
            survivors,
            duplicates: duplicates.into_iter().collect(),
            groups,
        })
    }
}

/// Drop near-duplicate labels, keeping the earlier label of every matching
/// pair.
///
/// # Examples
/// ```
/// use im_dedup::remove_duplicates;
/// let labels = ["Chicago", "chicago", "Apple Inc", "CHICAGO"];
/// assert_eq!(
///     remove_duplicates(&labels, 50).unwrap(),
///     vec!["Chicago".to_string(), "Apple Inc".to_string()]
/// );
/// ```
pub fn remove_duplicates<S: AsRef<str>>(labels: &[S], threshold: u32) -> DedupResult<Vec<String>> {
    let borrowed: Vec<&str> = labels.iter().map(|label| label.as_ref()).collect();
    let duplicates = find_duplicates_with(&borrowed, threshold, &TokenSortRatio::default())?;
    Ok(compact(&borrowed, &duplicates)
        .into_iter()
        .map(str::to_string)
        .collect())
}

/// Run the configured pipeline over owned labels.
#[cfg_attr(feature = "native", uniffi::export)]
pub fn deduplicate_labels(
    labels: Vec<String>,
    config: DedupConfig,
) -> Result<DedupOutcome, DedupError> {
    Deduplicator::new(config)?.run(&labels)
}
