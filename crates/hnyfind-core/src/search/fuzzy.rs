//! Weighted subsequence matcher.
//!
//! Every query character must appear in the candidate, in order and ignoring
//! case and Latin diacritics. Among the possible alignments the matcher greedily prefers
//! characters that earn a bonus (adjacent to the previous match, after a
//! separator, or at a camel-case hump), and every candidate character that
//! does not take part in the match costs a small penalty.

use unicode_normalization::char::{decompose_canonical, is_combining_mark};

/// Scoring weights. Bonuses are positive, penalties negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    /// Matched character directly follows the previous matched character
    pub adjacency_bonus: f64,
    /// Matched character follows `_` or a space, or starts the candidate
    pub separator_bonus: f64,
    /// Matched uppercase character follows a lowercase one
    pub camel_bonus: f64,
    /// Per skipped character before the first match
    pub leading_letter_penalty: f64,
    /// Floor for the total leading letter penalty
    pub max_leading_letter_penalty: f64,
    /// Per unmatched character anywhere else
    pub unmatched_letter_penalty: f64,
    /// Compare base letters only, so `e` matches `é`
    pub fold_diacritics: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            adjacency_bonus: 10.0,
            separator_bonus: 10.0,
            camel_bonus: 10.0,
            leading_letter_penalty: -0.1,
            max_leading_letter_penalty: -3.0,
            unmatched_letter_penalty: -0.5,
            fold_diacritics: true,
        }
    }
}

/// Base letter of `c`: the first char of its canonical decomposition
fn strip_diacritic(c: char) -> char {
    let mut base = None;
    decompose_canonical(c, |d| {
        base.get_or_insert(d);
    });
    base.unwrap_or(c)
}

fn is_separator(c: char) -> bool {
    c == '_' || c == ' '
}

impl MatchOptions {
    /// Lowercased comparison form of `c`. `None` for a combining mark that
    /// diacritic folding drops.
    fn fold(&self, c: char) -> Option<char> {
        let c = if self.fold_diacritics {
            if is_combining_mark(c) {
                return None;
            }
            strip_diacritic(c)
        } else {
            c
        };
        Some(c.to_lowercase().next().unwrap_or(c))
    }

    /// Score `candidate` against `query`. `None` if `query` is not a
    /// case-insensitive subsequence of `candidate`.
    pub fn score(&self, candidate: &str, query: &str) -> Option<f64> {
        let pattern: Vec<char> = query.chars().filter_map(|c| self.fold(c)).collect();

        let mut score = 0.0;
        let mut pattern_idx = 0;
        // Best candidate character seen for the pending pattern position:
        // (folded char, bonus it would earn)
        let mut best: Option<(char, f64)> = None;
        let mut prev_matched = false;
        let mut prev_lower = false;
        let mut prev_separator = true;

        let folded = candidate
            .chars()
            .filter_map(|c| self.fold(c).map(|lower| (c, lower)));
        for (idx, (c, lower)) in folded.enumerate() {
            let pattern_char = pattern.get(pattern_idx).copied();

            let next_match = pattern_char == Some(lower);
            let rematch = matches!(best, Some((b, _)) if b == lower);
            let advanced = next_match && best.is_some();
            let pattern_repeat = matches!((best, pattern_char), (Some((b, _)), Some(p)) if b == p);

            if advanced || pattern_repeat {
                if let Some((_, bonus)) = best.take() {
                    score += bonus;
                }
            }

            if next_match || rematch {
                if pattern_idx == 0 {
                    score += (idx as f64 * self.leading_letter_penalty)
                        .max(self.max_leading_letter_penalty);
                }

                let mut bonus = 0.0;
                if prev_matched {
                    bonus += self.adjacency_bonus;
                }
                if prev_separator {
                    bonus += self.separator_bonus;
                }
                if prev_lower && c.is_uppercase() {
                    bonus += self.camel_bonus;
                }

                if next_match {
                    pattern_idx += 1;
                }

                let best_bonus = best.map_or(0.0, |(_, b)| b);
                if bonus >= best_bonus {
                    // The previous best is now skipped
                    if best.is_some() {
                        score += self.unmatched_letter_penalty;
                    }
                    best = Some((lower, bonus));
                }
                prev_matched = true;
            } else {
                score += self.unmatched_letter_penalty;
                prev_matched = false;
            }

            prev_lower = c.is_lowercase();
            prev_separator = is_separator(c);
        }

        if let Some((_, bonus)) = best {
            score += bonus;
        }

        (pattern_idx == pattern.len()).then_some(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(candidate: &str, query: &str) -> Option<f64> {
        MatchOptions::default().score(candidate, query)
    }

    #[test]
    fn test_non_subsequence_rejected() {
        assert_eq!(score("Checkout Latency", "cherr"), None);
        assert_eq!(score("prod", "prods"), None);
        assert_eq!(score("", "a"), None);
    }

    #[test]
    fn test_case_insensitive() {
        assert!(score("PROD TRACES", "prod").is_some());
        assert_eq!(score("Prod", "prod"), score("prod", "PROD"));
    }

    #[test]
    fn test_contiguous_beats_scattered() {
        let contiguous = score("Checkout Errors", "err").unwrap();
        let scattered = score("Export Reader", "err").unwrap();
        assert!(contiguous > scattered, "{contiguous} <= {scattered}");
    }

    #[test]
    fn test_exact_prefix_beats_late_match() {
        let early = score("api", "api").unwrap();
        let late = score("backend-api", "api").unwrap();
        assert!(early > late);
    }

    #[test]
    fn test_leading_penalty_is_capped() {
        let options = MatchOptions {
            adjacency_bonus: 0.0,
            separator_bonus: 0.0,
            camel_bonus: 0.0,
            unmatched_letter_penalty: 0.0,
            ..MatchOptions::default()
        };
        let near = options.score("xxxa", "a").unwrap();
        let far = options.score(&format!("{}a", "x".repeat(100)), "a").unwrap();
        assert!((near - -0.3).abs() < 1e-9);
        assert!((far - -3.0).abs() < 1e-9);
    }

    #[test]
    fn test_camel_case_bonus() {
        let hump = score("checkoutErrors", "ce").unwrap();
        let flat = score("checkouterrors", "ce").unwrap();
        assert!(hump > flat);
    }

    #[test]
    fn test_diacritics_ignored() {
        assert!(score("Pagos México", "mexico").is_some());
        assert!(score("Pagos Mexico", "méxico").is_some());
        assert_eq!(score("café", "cafe"), score("cafe", "cafe"));
        // Decomposed form: the combining accent is not an unmatched letter
        assert_eq!(score("cafe\u{301}", "cafe"), score("cafe", "cafe"));
    }

    #[test]
    fn test_diacritic_folding_can_be_disabled() {
        let strict = MatchOptions {
            fold_diacritics: false,
            ..MatchOptions::default()
        };
        assert_eq!(strict.score("Pagos México", "mexico"), None);
        assert!(strict.score("Pagos México", "méxico").is_some());
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert!(score("anything", "").is_some());
    }
}
