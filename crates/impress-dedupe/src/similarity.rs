//! Similarity scoring for fuzzy matching
//!
//! All scores are on a 0-100 scale. The default [`Scorer::WeightedRatio`]
//! follows the usual fuzzy "WRatio" policy: plain Indel ratio for strings of
//! similar length, token-based ratios to forgive word order and extra words,
//! and partial (substring) alignment when one string is much longer.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use strsim::{jaro_winkler, normalized_levenshtein};

use crate::normalization::default_process;

/// Scale applied to token-based ratios
const UNBASE_SCALE: f64 = 0.95;

/// String similarity metric used by the fuzzy matcher
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scorer {
    /// Weighted combination of ratio, token and partial ratios
    #[default]
    WeightedRatio,
    /// Normalized Indel similarity
    Ratio,
    /// Normalized Levenshtein similarity
    Levenshtein,
    /// Jaro-Winkler similarity
    JaroWinkler,
}

impl Scorer {
    /// Score two raw strings, preprocessing both with [`default_process`]
    pub fn score(&self, a: &str, b: &str) -> f64 {
        self.score_processed(&default_process(a), &default_process(b))
    }

    /// Score two strings that were already preprocessed.
    ///
    /// An empty string scores 0 against anything, including another empty
    /// string.
    pub fn score_processed(&self, a: &str, b: &str) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        match self {
            Scorer::WeightedRatio => weighted_ratio(a, b),
            Scorer::Ratio => ratio(a, b),
            Scorer::Levenshtein => normalized_levenshtein(a, b) * 100.0,
            Scorer::JaroWinkler => jaro_winkler(a, b) * 100.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scorer::WeightedRatio => "weighted_ratio",
            Scorer::Ratio => "ratio",
            Scorer::Levenshtein => "levenshtein",
            Scorer::JaroWinkler => "jaro_winkler",
        }
    }
}

/// Normalized Indel similarity: `200 * LCS / (len(a) + len(b))`
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    indel_ratio(&a, &b)
}

/// Best ratio of the shorter string against any window of the longer one
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    if a.len() < b.len() {
        partial_ratio_aligned(&a, &b)
    } else if a.len() > b.len() {
        partial_ratio_aligned(&b, &a)
    } else {
        partial_ratio_aligned(&a, &b).max(partial_ratio_aligned(&b, &a))
    }
}

/// Max of the token-sort ratio and the token-set ratio
pub fn token_ratio(a: &str, b: &str) -> f64 {
    let tokens_a = sorted_tokens(a);
    let tokens_b = sorted_tokens(b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let set_a: BTreeSet<&str> = tokens_a.iter().copied().collect();
    let set_b: BTreeSet<&str> = tokens_b.iter().copied().collect();
    let intersection: Vec<&str> = set_a.intersection(&set_b).copied().collect();
    let diff_ab: Vec<&str> = set_a.difference(&set_b).copied().collect();
    let diff_ba: Vec<&str> = set_b.difference(&set_a).copied().collect();

    // one string's words are a subset of the other's
    if !intersection.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 100.0;
    }

    let diff_ab_joined = diff_ab.join(" ");
    let diff_ba_joined = diff_ba.join(" ");
    let ab_len = diff_ab_joined.chars().count();
    let ba_len = diff_ba_joined.chars().count();

    let mut result = ratio(&tokens_a.join(" "), &tokens_b.join(" "));

    let sect_len = intersection.join(" ").chars().count();
    let separator = usize::from(sect_len != 0);
    let sect_ab_len = sect_len + separator + ab_len;
    let sect_ba_len = sect_len + separator + ba_len;

    let dist = indel_distance(
        &diff_ab_joined.chars().collect::<Vec<_>>(),
        &diff_ba_joined.chars().collect::<Vec<_>>(),
    );
    result = result.max(norm_similarity(dist, sect_ab_len + sect_ba_len));

    if sect_len == 0 {
        return result;
    }

    let sect_ab_ratio = norm_similarity(separator + ab_len, sect_len + sect_ab_len);
    let sect_ba_ratio = norm_similarity(separator + ba_len, sect_len + sect_ba_len);
    result.max(sect_ab_ratio).max(sect_ba_ratio)
}

/// Partial ratio over sorted tokens; 100 as soon as any word is shared
pub fn partial_token_ratio(a: &str, b: &str) -> f64 {
    let tokens_a = sorted_tokens(a);
    let tokens_b = sorted_tokens(b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let set_a: BTreeSet<&str> = tokens_a.iter().copied().collect();
    let set_b: BTreeSet<&str> = tokens_b.iter().copied().collect();
    if set_a.intersection(&set_b).next().is_some() {
        return 100.0;
    }

    let diff_ab: Vec<&str> = set_a.difference(&set_b).copied().collect();
    let diff_ba: Vec<&str> = set_b.difference(&set_a).copied().collect();

    let result = partial_ratio(&tokens_a.join(" "), &tokens_b.join(" "));
    // no duplicate tokens means the diffs would give the same strings again
    if tokens_a.len() == diff_ab.len() && tokens_b.len() == diff_ba.len() {
        return result;
    }

    result.max(partial_ratio(&diff_ab.join(" "), &diff_ba.join(" ")))
}

/// Weighted ratio of two preprocessed strings
pub fn weighted_ratio(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    if len_a == 0 || len_b == 0 {
        return 0.0;
    }

    let len_ratio = len_a.max(len_b) as f64 / len_a.min(len_b) as f64;
    let end_ratio = ratio(a, b);

    if len_ratio < 1.5 {
        return end_ratio.max(token_ratio(a, b) * UNBASE_SCALE);
    }

    let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
    let end_ratio = end_ratio.max(partial_ratio(a, b) * partial_scale);
    end_ratio.max(partial_token_ratio(a, b) * UNBASE_SCALE * partial_scale)
}

fn sorted_tokens(s: &str) -> Vec<&str> {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens
}

fn norm_similarity(dist: usize, lensum: usize) -> f64 {
    if lensum == 0 {
        return 100.0;
    }
    100.0 - 100.0 * dist as f64 / lensum as f64
}

fn indel_ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    200.0 * lcs_length(a, b) as f64 / total as f64
}

fn indel_distance(a: &[char], b: &[char]) -> usize {
    a.len() + b.len() - 2 * lcs_length(a, b)
}

/// LCS length using two-row DP
fn lcs_length(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Align `needle` against every window of the at-least-as-long `haystack`.
///
/// Windows whose boundary character does not occur in the needle can never
/// beat their neighbour and are skipped.
fn partial_ratio_aligned(needle: &[char], haystack: &[char]) -> f64 {
    let n = needle.len();
    let m = haystack.len();
    let needle_chars: HashSet<char> = needle.iter().copied().collect();
    let mut best: f64 = 0.0;

    // prefixes shorter than the needle
    for i in 1..n {
        if !needle_chars.contains(&haystack[i - 1]) {
            continue;
        }
        best = best.max(indel_ratio(needle, &haystack[..i]));
        if best >= 100.0 {
            return 100.0;
        }
    }

    // full-length windows
    for i in 0..(m - n) {
        if !needle_chars.contains(&haystack[i + n - 1]) {
            continue;
        }
        best = best.max(indel_ratio(needle, &haystack[i..i + n]));
        if best >= 100.0 {
            return 100.0;
        }
    }

    // suffixes
    for i in (m - n)..m {
        if !needle_chars.contains(&haystack[i]) {
            continue;
        }
        best = best.max(indel_ratio(needle, &haystack[i..]));
        if best >= 100.0 {
            return 100.0;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio() {
        assert_eq!(ratio("machine learning", "machine learning"), 100.0);
        assert_eq!(ratio("abc", "xyz"), 0.0);
        // LCS 3 of total 8
        assert!((ratio("abcd", "abce") - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_lcs_length() {
        let a: Vec<char> = "this is a duplicate title".chars().collect();
        let b: Vec<char> = "this is duplicate title".chars().collect();
        assert_eq!(lcs_length(&a, &b), 23);
        assert_eq!(lcs_length(&a, &[]), 0);
    }

    #[test]
    fn test_partial_ratio() {
        assert_eq!(partial_ratio("duplicate", "this is a duplicate title"), 100.0);
        assert_eq!(partial_ratio("title", "title"), 100.0);
        assert!(partial_ratio("baz", "foo bar") < 70.0);
        assert_eq!(partial_ratio("", "foo"), 0.0);
    }

    #[test]
    fn test_token_ratio_subset() {
        assert_eq!(token_ratio("another duplicate", "and another duplicate"), 100.0);
        assert_eq!(token_ratio("bar foo", "foo bar"), 100.0);
        assert!(token_ratio("this is a duplicate title", "another duplicate") < 75.0);
    }

    #[test]
    fn test_partial_token_ratio_shared_word() {
        assert_eq!(partial_token_ratio("this is unique", "this is a title"), 100.0);
        assert!(partial_token_ratio("foo bar", "baz") < 100.0);
    }

    #[test]
    fn test_weighted_ratio() {
        assert_eq!(weighted_ratio("foo bar", "foo bar"), 100.0);
        // word subset of similar length scores the token-set ratio
        assert!((weighted_ratio("another duplicate", "and another duplicate") - 95.0).abs() < 1e-9);
        // shared words across very different lengths are capped
        assert!(weighted_ratio("this is a duplicate title", "this is unique") < 90.0);
        assert!(weighted_ratio("foo bar", "baz") < 90.0);
    }

    #[test]
    fn test_scorer_preprocesses() {
        let scorer = Scorer::WeightedRatio;
        assert_eq!(scorer.score("FOO BAR", "foo bar"), 100.0);
        assert_eq!(
            scorer.score("this is a duplicate title", "THIS IS A DUPLICATE TITLE!"),
            100.0
        );
        assert!(scorer.score("this is a duplicate title", "this is duplicate title") > 95.0);
    }

    #[test]
    fn test_empty_never_matches() {
        for scorer in [
            Scorer::WeightedRatio,
            Scorer::Ratio,
            Scorer::Levenshtein,
            Scorer::JaroWinkler,
        ] {
            assert_eq!(scorer.score("", ""), 0.0);
            assert_eq!(scorer.score("title", "?!"), 0.0);
        }
    }

    #[test]
    fn test_strsim_scorers() {
        assert_eq!(Scorer::Levenshtein.score("Machine Learning", "machine learning"), 100.0);
        assert!(Scorer::JaroWinkler.score("Smith", "Smyth") > 85.0);
        assert!(Scorer::Levenshtein.score("Smith", "Smyth") < 85.0);
    }

    #[test]
    fn test_scorer_serde_names() {
        let scorer: Scorer = serde_json::from_str("\"jaro_winkler\"").unwrap();
        assert_eq!(scorer, Scorer::JaroWinkler);
        assert_eq!(Scorer::default().as_str(), "weighted_ratio");
    }
}
