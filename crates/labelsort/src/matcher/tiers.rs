//! Match strategies, one per tier. Every strategy scans the corpus in index
//! order and reports the lowest qualifying index.

use super::types::Tier;
use crate::similarity::{SimilarityMetric, score};

/// A single tier of the matcher over an already normalized corpus.
pub trait MatchStrategy: Send + Sync {
    fn tier(&self) -> Tier;
    /// `candidate` is normalized. Only the exact tier is asked about an
    /// empty candidate.
    fn find(&self, candidate: &str, corpus: &[String]) -> Option<usize>;
}

pub struct ExactTier;

impl MatchStrategy for ExactTier {
    fn tier(&self) -> Tier {
        Tier::Exact
    }

    fn find(&self, candidate: &str, corpus: &[String]) -> Option<usize> {
        corpus.iter().position(|entry| entry == candidate)
    }
}

/// Either side contained in the other. Empty entries are skipped since the
/// empty string is contained in everything.
pub struct ContainmentTier;

impl MatchStrategy for ContainmentTier {
    fn tier(&self) -> Tier {
        Tier::Containment
    }

    fn find(&self, candidate: &str, corpus: &[String]) -> Option<usize> {
        corpus.iter().position(|entry| {
            !entry.is_empty() && (entry.contains(candidate) || candidate.contains(entry.as_str()))
        })
    }
}

/// Best similarity score at or above `threshold`. The corpus entry is the
/// first argument of the metric, the candidate the second; gestalt is not
/// symmetric.
pub struct ApproximateTier {
    pub metric: SimilarityMetric,
    pub threshold: f64,
}

impl MatchStrategy for ApproximateTier {
    fn tier(&self) -> Tier {
        Tier::Approximate
    }

    fn find(&self, candidate: &str, corpus: &[String]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, entry) in corpus.iter().enumerate() {
            let s = score(self.metric, entry, candidate);
            if s < self.threshold {
                continue;
            }
            // strictly greater keeps the first of equal scores
            match best {
                Some((_, bs)) if s <= bs => {}
                _ => best = Some((i, s)),
            }
        }
        if let Some((i, s)) = best {
            tracing::trace!(
                "approximate tier: '{}' ~ '{}' score={:.3} ({})",
                candidate,
                corpus[i],
                s,
                self.metric
            );
        }
        best.map(|(i, _)| i)
    }
}
