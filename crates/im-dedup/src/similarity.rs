//! Similarity scoring for label deduplication
//!
//! Scores are integers in `0..=100`. The underlying measure counts the
//! characters covered by contiguous matching blocks (Ratcliff/Obershelp):
//! find the longest common substring, then recurse on the text to its left
//! and to its right. `score = round(200 * matched / (len_a + len_b))`.
//!
//! This rewards long shared runs rather than single-character edits, and
//! because [`token_sort_ratio`] compares token-sorted labels, reordering
//! words does not lower the score.

use std::collections::HashMap;

use crate::normalization::{normalize_label, NormalizationMode};

/// Highest possible similarity score.
pub const MAX_SCORE: u8 = 100;

/// Scores the similarity of two labels.
///
/// Implementations must be symmetric, return [`MAX_SCORE`] for identical
/// inputs, and stay within `0..=MAX_SCORE`.
pub trait SimilarityScorer: Send + Sync {
    fn score(&self, a: &str, b: &str) -> u8;
}

impl<F> SimilarityScorer for F
where
    F: Fn(&str, &str) -> u8 + Send + Sync,
{
    fn score(&self, a: &str, b: &str) -> u8 {
        self(a, b)
    }
}

/// Token-sort ratio: [`ratio`] over the normalized forms of both labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenSortRatio {
    mode: NormalizationMode,
}

impl TokenSortRatio {
    pub fn new(mode: NormalizationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> NormalizationMode {
        self.mode
    }
}

impl SimilarityScorer for TokenSortRatio {
    fn score(&self, a: &str, b: &str) -> u8 {
        token_sort_ratio_with(a, b, self.mode)
    }
}

/// Similarity of two labels after lowercasing and sorting their tokens.
///
/// # Examples
/// ```
/// use im_dedup::token_sort_ratio;
/// assert_eq!(token_sort_ratio("Saama Technologies", "technologies SAAMA"), 100);
/// assert_eq!(token_sort_ratio("Apple Inc", "Banana Corp"), 20);
/// ```
#[cfg_attr(feature = "native", uniffi::export)]
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    token_sort_ratio_with(a, b, NormalizationMode::Whitespace)
}

/// [`token_sort_ratio`] with an explicit normalization mode.
pub fn token_sort_ratio_with(a: &str, b: &str, mode: NormalizationMode) -> u8 {
    let norm_a = normalize_label(a, mode);
    let norm_b = normalize_label(b, mode);
    ratio(&norm_a, &norm_b)
}

/// Matching-block ratio of two strings as given, without normalization.
pub fn ratio(a: &str, b: &str) -> u8 {
    let total = a.chars().count() + b.chars().count();
    scaled_ratio(matching_characters(a, b), total)
}

/// Total length, in characters, of the matching blocks between two strings.
///
/// Longest-match ties resolve to the earliest position in the first
/// argument, which can make the raw count depend on argument order. The
/// pair is therefore always evaluated in lexicographic order.
pub fn matching_characters(a: &str, b: &str) -> usize {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    let first: Vec<char> = first.chars().collect();
    let second: Vec<char> = second.chars().collect();
    BlockMatcher::new(&first, &second).matched_len()
}

/// `round(200 * matched / total)`, rounding halves to even.
fn scaled_ratio(matched: usize, total: usize) -> u8 {
    if total == 0 {
        return MAX_SCORE;
    }

    let numerator = 200 * matched;
    let quotient = numerator / total;
    let remainder = numerator % total;
    let rounded = match (2 * remainder).cmp(&total) {
        std::cmp::Ordering::Less => quotient,
        std::cmp::Ordering::Greater => quotient + 1,
        std::cmp::Ordering::Equal => quotient + (quotient & 1),
    };

    rounded.min(MAX_SCORE as usize) as u8
}

/// A common run: `a[a..a + size] == b[b..b + size]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block {
    a: usize,
    b: usize,
    size: usize,
}

struct BlockMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of each character in `b`, ascending
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> BlockMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }
        Self { a, b, b2j }
    }

    /// Sum of block sizes over the whole of both sequences.
    fn matched_len(&self) -> usize {
        let mut matched = 0;
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];

        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let block = self.longest_match(alo, ahi, blo, bhi);
            if block.size == 0 {
                continue;
            }
            matched += block.size;

            if alo < block.a && blo < block.b {
                pending.push((alo, block.a, blo, block.b));
            }
            let a_end = block.a + block.size;
            let b_end = block.b + block.size;
            if a_end < ahi && b_end < bhi {
                pending.push((a_end, ahi, b_end, bhi));
            }
        }

        matched
    }

    /// Longest common run within `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// Among equally long runs, the one starting earliest in `a` wins, then
    /// the one starting earliest in `b`.
    fn longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Block {
        let mut best = Block {
            a: alo,
            b: blo,
            size: 0,
        };
        // Length of the run ending at (i - 1, j), keyed by j
        let mut run_ending_at: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut next_runs: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let previous = if j > 0 {
                        run_ending_at.get(&(j - 1)).copied().unwrap_or(0)
                    } else {
                        0
                    };
                    let size = previous + 1;
                    next_runs.insert(j, size);
                    if size > best.size {
                        best = Block {
                            a: i + 1 - size,
                            b: j + 1 - size,
                            size,
                        };
                    }
                }
            }
            run_ending_at = next_runs;
        }

        best
    }
}
