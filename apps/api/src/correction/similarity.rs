//! Similarity Gate — bounds the blast radius of a misbehaving oracle reply.
//!
//! A refusal message or an unrelated rewrite scores far below the threshold
//! and is discarded; the cost is that legitimate heavy rewrites are also
//! rejected. The pipeline's contract is light correction only.

use similar::{DiffOp, TextDiff};

/// Minimum normalized similarity for an oracle candidate to be accepted.
/// A ratio exactly at the threshold is accepted.
pub const SIMILARITY_THRESHOLD: f64 = 0.7;

/// Normalized similarity in [0, 1] between two texts:
/// `2 * matches / (len(a) + len(b))` over char-level matching blocks,
/// after collapsing whitespace runs, trimming, and lowercasing both sides.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);

    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }

    let diff = TextDiff::from_chars(a.as_str(), b.as_str());
    let matches: usize = diff
        .ops()
        .iter()
        .filter_map(|op| match op {
            DiffOp::Equal { len, .. } => Some(*len),
            _ => None,
        })
        .sum();

    (2.0 * matches as f64) / total as f64
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_texts_score_one() {
        assert_eq!(similarity_ratio("abc def", "abc def"), 1.0);
    }

    #[test]
    fn test_disjoint_texts_score_zero() {
        assert_eq!(similarity_ratio("abcdefghij", "zzzzzzzzzz"), 0.0);
    }

    #[test]
    fn test_single_char_change_scores_high() {
        // 9 matching chars of 10+10 → 0.9
        let ratio = similarity_ratio("abcdefghij", "abcdefghiX");
        assert!(ratio >= SIMILARITY_THRESHOLD);
        assert!((ratio - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_ratio_exactly_at_threshold_is_accepted() {
        // 7 matching chars of 10+10 → exactly 0.7
        let ratio = similarity_ratio("abcdefghij", "abcdefgxyz");
        assert_eq!(ratio, SIMILARITY_THRESHOLD);
        assert!(ratio >= SIMILARITY_THRESHOLD);
    }

    #[test]
    fn test_ratio_below_threshold_is_rejected() {
        // 6 matching chars of 10+10 → 0.6
        let ratio = similarity_ratio("abcdefghij", "abcdefwxyz");
        assert!(ratio < SIMILARITY_THRESHOLD);
    }

    #[test]
    fn test_whitespace_runs_and_case_are_normalized() {
        assert_eq!(similarity_ratio("  Olá   Mundo ", "olá mundo"), 1.0);
    }

    #[test]
    fn test_both_empty_scores_one() {
        assert_eq!(similarity_ratio("", "   "), 1.0);
    }
}
