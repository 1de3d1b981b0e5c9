//! Lexical similarity matching of candidate domains against the watch-list.
//!
//! Scoring is a partial (substring-tolerant) ratio over the brand labels of
//! both names: the top-level suffix is stripped before comparison so that
//! `.com` vs `.net` noise never affects the score.

use crate::core::SimilarityMatch;

/// Default score required for a candidate to count as a match.
pub const DEFAULT_THRESHOLD: u8 = 85;

/// Compares candidate names against a fixed watch-list.
///
/// Pure and deterministic; holds no I/O resources.
#[derive(Debug, Clone)]
pub struct SimilarityMatcher {
    watch_list: Vec<String>,
    threshold: u8,
}

impl SimilarityMatcher {
    /// Creates a matcher over `watch_list`, returning entries scoring at or
    /// above `threshold` (0-100).
    pub fn new(watch_list: Vec<String>, threshold: u8) -> Self {
        Self {
            watch_list,
            threshold,
        }
    }

    /// Returns every watch-list entry the candidate resembles, in watch-list
    /// order. A candidate may match zero or more entries; there is no cap.
    pub fn matches(&self, candidate: &str) -> Vec<SimilarityMatch> {
        let candidate_label = brand_label(candidate);

        self.watch_list
            .iter()
            .filter_map(|target| {
                let score = partial_ratio(candidate_label, brand_label(target));
                (score >= self.threshold).then(|| SimilarityMatch {
                    target: target.clone(),
                    score,
                })
            })
            .collect()
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }
}

/// The left-most label of a domain name ("paypal" for "paypal.com").
fn brand_label(domain: &str) -> &str {
    domain.split('.').next().unwrap_or(domain)
}

/// Substring-tolerant similarity in the 0-100 range.
///
/// The shorter string is slid across every equally sized window of the longer
/// one and the best normalized Levenshtein similarity wins. Identical strings
/// score 100, full containment scores 100, and the score degrades
/// monotonically with edit distance otherwise.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    if a == b {
        return 100;
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (short, long) = if a_chars.len() <= b_chars.len() {
        (a_chars, b_chars)
    } else {
        (b_chars, a_chars)
    };

    if short.is_empty() {
        return 0;
    }

    let needle: String = short.iter().collect();
    let mut best = 0.0f64;
    for window in long.windows(short.len()) {
        let haystack: String = window.iter().collect();
        best = best.max(strsim::normalized_levenshtein(&needle, &haystack));
        if best == 1.0 {
            break;
        }
    }

    (best * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(watch_list: &[&str], threshold: u8) -> SimilarityMatcher {
        SimilarityMatcher::new(
            watch_list.iter().map(|s| s.to_string()).collect(),
            threshold,
        )
    }

    #[test]
    fn identical_names_score_100() {
        let m = matcher(&["paypal.com"], DEFAULT_THRESHOLD);
        let matches = m.matches("paypal.net");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].target, "paypal.com");
        assert_eq!(matches[0].score, 100);
    }

    #[test]
    fn containment_scores_high() {
        let score = partial_ratio("secure-paypal-login", "paypal");
        assert!(score >= 90, "containment should score high, got {score}");
    }

    #[test]
    fn suffix_does_not_affect_score() {
        assert_eq!(partial_ratio("paypal", "paypal"), 100);
        let m = matcher(&["paypal.org"], DEFAULT_THRESHOLD);
        assert_eq!(m.matches("paypal.biz")[0].score, 100);
    }

    #[test]
    fn score_degrades_with_edit_distance() {
        let one_edit = partial_ratio("paypa1", "paypal");
        let two_edits = partial_ratio("p4ypa1", "paypal");
        assert!(one_edit < 100);
        assert!(two_edits < one_edit);
    }

    #[test]
    fn unrelated_names_do_not_match() {
        let m = matcher(&["paypal.com"], DEFAULT_THRESHOLD);
        assert!(m.matches("totally-unrelated-store.biz").is_empty());
    }

    #[test]
    fn results_follow_watch_list_order() {
        let m = matcher(&["paypal.com", "paypal.co.uk"], DEFAULT_THRESHOLD);
        let matches = m.matches("paypal-support.net");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].target, "paypal.com");
        assert_eq!(matches[1].target, "paypal.co.uk");
    }

    #[test]
    fn lowering_threshold_grows_result_set_monotonically() {
        let watch_list = &["paypal.com", "apple.com", "github.com"];
        let candidate = "paypa1-login.net";
        let mut previous: Vec<String> = Vec::new();
        for threshold in (0..=100).rev() {
            let current: Vec<String> = matcher(watch_list, threshold)
                .matches(candidate)
                .into_iter()
                .map(|m| m.target)
                .collect();
            for target in &previous {
                assert!(
                    current.contains(target),
                    "threshold {threshold} dropped {target}"
                );
            }
            previous = current;
        }
    }

    #[test]
    fn empty_candidate_scores_zero() {
        assert_eq!(partial_ratio("", "paypal"), 0);
        assert_eq!(partial_ratio("", ""), 100);
    }
}
