//! im-dedup: approximate deduplication of short text labels.
//!
//! Labels such as organization names often name the same entity with
//! different spelling, casing, word order, or annotations ("Saama",
//! "SaamaTech, Inc", "Equipment ONLY - Saama Technologies"). This crate
//! collapses them to one representative each:
//!
//! - **Similarity**: [`token_sort_ratio`] scores two labels 0-100 by
//!   contiguous matching blocks over their lowercased, token-sorted forms
//! - **Detection**: [`find_duplicates`] marks every position that matches
//!   an earlier one at or above a threshold
//! - **Compaction**: [`compact`] keeps the unmarked labels in order
//!
//! [`Deduplicator`] runs the three steps from a [`DedupConfig`], optionally
//! sorting shortest-first so the least decorated variant survives.
//!
//! # Example
//!
//! ```
//! use im_dedup::{DedupConfig, Deduplicator};
//!
//! let labels = ["Ship to AstraZeneca", "AstraZeneca, gmbh Munich", "AstraZeneca"];
//! let config = DedupConfig { shortest_first: true, ..DedupConfig::default() };
//! let outcome = Deduplicator::new(config)?.run(&labels)?;
//! assert_eq!(outcome.survivors, vec!["AstraZeneca"]);
//! # Ok::<(), im_dedup::DedupError>(())
//! ```

#[cfg(feature = "native")]
uniffi::setup_scaffolding!();

pub mod compaction;
pub mod config;
pub mod detection;
pub mod error;
#[cfg(feature = "cli")]
pub mod input;
pub mod normalization;
pub mod orchestration;
pub mod similarity;

pub use compaction::{compact, shortest_first_order, sort_shortest_first};
pub use config::{ClusterMode, DedupConfig};
pub use detection::{
    find_duplicate_groups, find_duplicate_groups_with, find_duplicates, find_duplicates_with,
    group_duplicates, validate_threshold, DuplicateGroup, DuplicateSet, DEFAULT_THRESHOLD,
};
pub use error::{DedupError, DedupResult};
pub use normalization::{normalize_label, NormalizationMode};
pub use orchestration::{deduplicate_labels, remove_duplicates, DedupOutcome, Deduplicator};
pub use similarity::{
    matching_characters, ratio, token_sort_ratio, token_sort_ratio_with, SimilarityScorer,
    TokenSortRatio, MAX_SCORE,
};
