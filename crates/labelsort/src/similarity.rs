//! Similarity ratios for the approximate matching tier.
//!
//! The default metric is the Ratcliff/Obershelp "gestalt" ratio: the number of
//! characters covered by recursively found longest common blocks, doubled and
//! divided by the combined length. The alternatives are backed by `strsim`.

use std::fmt;
use std::str::FromStr;

use crate::error::UnknownMetric;

/// Metric used to score a candidate against a corpus entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SimilarityMetric {
    /// Matching-blocks ratio `2*M/T` (close-match style).
    #[default]
    Gestalt,
    NormalizedLevenshtein,
    JaroWinkler,
    SorensenDice, // bigram dice coefficient
}

impl SimilarityMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimilarityMetric::Gestalt => "gestalt",
            SimilarityMetric::NormalizedLevenshtein => "levenshtein",
            SimilarityMetric::JaroWinkler => "jaro-winkler",
            SimilarityMetric::SorensenDice => "sorensen-dice",
        }
    }
}

impl fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimilarityMetric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "gestalt" | "ratcliff" | "ratio" => Ok(SimilarityMetric::Gestalt),
            "levenshtein" | "normalized-levenshtein" => Ok(SimilarityMetric::NormalizedLevenshtein),
            "jaro-winkler" | "jarowinkler" => Ok(SimilarityMetric::JaroWinkler),
            "sorensen-dice" | "dice" => Ok(SimilarityMetric::SorensenDice),
            _ => Err(UnknownMetric(s.to_string())),
        }
    }
}

/// Compute a similarity score in [0.0, 1.0] (higher is more similar).
///
/// The matcher passes the corpus entry as `a` and the candidate as `b`.
pub fn score(metric: SimilarityMetric, a: &str, b: &str) -> f64 {
    match metric {
        SimilarityMetric::Gestalt => gestalt_ratio(a, b),
        SimilarityMetric::NormalizedLevenshtein => strsim::normalized_levenshtein(a, b),
        SimilarityMetric::JaroWinkler => strsim::jaro_winkler(a, b),
        SimilarityMetric::SorensenDice => strsim::sorensen_dice(a, b),
    }
}

/// Ratcliff/Obershelp ratio over characters. Two empty strings score 1.0.
pub fn gestalt_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_block(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }
    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]` as `(i, j, len)`.
/// Among equally long blocks the one starting earliest in `a`, then `b`, wins.
fn longest_block(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let width = bhi - blo + 1;
    let mut best = (alo, blo, 0);
    // prev[x + 1] = length of the block ending at a[i - 1], b[blo + x]
    let mut prev = vec![0usize; width];
    let mut cur = vec![0usize; width];
    for i in alo..ahi {
        cur.iter_mut().for_each(|v| *v = 0);
        for j in blo..bhi {
            if a[i] == b[j] {
                let k = prev[j - blo] + 1;
                cur[j - blo + 1] = k;
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn gestalt_known_values() {
        // "abcd" vs "bcde": block "bcd" -> 2*3/8
        assert!(close(gestalt_ratio("abcd", "bcde"), 0.75));
        assert!(close(gestalt_ratio("same", "same"), 1.0));
        assert!(close(gestalt_ratio("abc", "xyz"), 0.0));
        assert!(close(gestalt_ratio("", ""), 1.0));
        assert!(close(gestalt_ratio("abc", ""), 0.0));
    }

    #[test]
    fn gestalt_recurses_on_both_sides() {
        // blocks "cd" then "a" -> 2*3/8
        assert!(close(gestalt_ratio("abcd", "axcd"), 0.75));
        assert!(close(gestalt_ratio("qabxcd", "abycdf"), 2.0 * 4.0 / 12.0));
    }

    #[test]
    fn gestalt_depends_on_argument_order() {
        // longest-block ties resolve by position in `a`
        assert!(close(gestalt_ratio("mxsynomabtin", "misinformation"), 18.0 / 26.0));
        assert!(close(gestalt_ratio("misinformation", "mxsynomabtin"), 8.0 / 26.0));
        assert!(close(gestalt_ratio("mdelyfthft", "model theft"), 12.0 / 21.0));
        assert!(close(gestalt_ratio("model theft", "mdelyfthft"), 16.0 / 21.0));
    }

    #[test]
    fn misspelling_clears_default_threshold() {
        let s = score(
            SimilarityMetric::Gestalt,
            "vector and embedding weaknesses",
            "vectr and embeding weakneses",
        );
        assert!(s >= 0.6, "score {s}");
    }

    #[test]
    fn strsim_metrics_are_bounded() {
        for m in [
            SimilarityMetric::NormalizedLevenshtein,
            SimilarityMetric::JaroWinkler,
            SimilarityMetric::SorensenDice,
        ] {
            let s = score(m, "excessive agency", "excesive agncy");
            assert!((0.0..=1.0).contains(&s), "{m}: {s}");
            assert!(close(score(m, "prompt", "prompt"), 1.0));
        }
    }

    #[test]
    fn metric_names_parse() {
        assert_eq!("gestalt".parse::<SimilarityMetric>(), Ok(SimilarityMetric::Gestalt));
        assert_eq!("Jaro_Winkler".parse::<SimilarityMetric>(), Ok(SimilarityMetric::JaroWinkler));
        assert_eq!("levenshtein".parse::<SimilarityMetric>(), Ok(SimilarityMetric::NormalizedLevenshtein));
        assert_eq!("dice".parse::<SimilarityMetric>(), Ok(SimilarityMetric::SorensenDice));
        assert!("cosine".parse::<SimilarityMetric>().is_err());
        for m in [
            SimilarityMetric::Gestalt,
            SimilarityMetric::NormalizedLevenshtein,
            SimilarityMetric::JaroWinkler,
            SimilarityMetric::SorensenDice,
        ] {
            assert_eq!(m.as_str().parse::<SimilarityMetric>(), Ok(m));
        }
    }
}
