//! Label normalization for similarity comparison
//!
//! A label's normalized form is the lowercase label split on whitespace,
//! with its tokens sorted and rejoined by single spaces. Two labels that
//! differ only in casing, spacing, or word order share a normalized form.

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// How a label is prepared before its tokens are sorted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "native", derive(uniffi::Enum))]
#[serde(rename_all = "snake_case")]
pub enum NormalizationMode {
    /// Lowercase and split on whitespace only. Punctuation stays attached
    /// to its token.
    #[default]
    Whitespace,
    /// Strip diacritics and turn every character that is not an ASCII
    /// letter or digit into whitespace before splitting.
    ///
    /// Accented letters fold to their base letter ("Café" becomes "cafe")
    /// rather than being dropped ("caf") as an ASCII-only filter would.
    /// Non-ASCII characters with no decomposition, such as "ß", become
    /// separators.
    Alphanumeric,
}

/// Compute the normalized form of a label.
///
/// - Optionally strips to ASCII alphanumerics (see [`NormalizationMode`])
/// - Converts to lowercase
/// - Splits into whitespace-delimited tokens
/// - Sorts tokens in ordinal order
/// - Rejoins with a single space
pub fn normalize_label(label: &str, mode: NormalizationMode) -> String {
    sorted_tokens(label, mode).join(" ")
}

/// Lowercased tokens of a label in ordinal order.
pub(crate) fn sorted_tokens(label: &str, mode: NormalizationMode) -> Vec<String> {
    let prepared = match mode {
        NormalizationMode::Whitespace => label.to_lowercase(),
        NormalizationMode::Alphanumeric => strip_to_alphanumeric(label).to_lowercase(),
    };

    let mut tokens: Vec<String> = prepared.split_whitespace().map(str::to_string).collect();
    // String ordering compares UTF-8 bytes, which matches code point order.
    tokens.sort_unstable();
    tokens
}

/// Replace everything but ASCII letters and digits with spaces.
///
/// Text is NFKD-decomposed first so accented letters keep their base
/// letter ("é" becomes "e") instead of splitting the token.
fn strip_to_alphanumeric(label: &str) -> String {
    label
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect()
}
