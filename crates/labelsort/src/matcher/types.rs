use std::fmt;

use crate::similarity::SimilarityMetric;

/// Threshold the approximate tier must reach by default.
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// One level of the escalating match policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Exact,
    Containment,
    Approximate,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::Exact => "exact",
            Tier::Containment => "containment",
            Tier::Approximate => "approximate",
        };
        f.write_str(s)
    }
}

/// Corpus index found by a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierMatch {
    pub index: usize,
    pub tier: Tier,
}

/// Tuning knobs for the approximate tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    /// Minimum score (inclusive) for an approximate match.
    pub threshold: f64,
    pub metric: SimilarityMetric,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            metric: SimilarityMetric::default(),
        }
    }
}
