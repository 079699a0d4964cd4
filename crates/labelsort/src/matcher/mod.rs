//! Three-tier matcher: exact, then containment, then approximate.
//!
//! The candidate is a raw label and is normalized once; the corpus is expected
//! to be normalized already. Tiers are tried in order and the first hit wins.

pub mod tiers;
pub mod types;

pub use tiers::*;
pub use types::*;

use crate::normalize::normalize;

/// Ordered list of tiers built from [`MatchOptions`].
pub struct Matcher {
    strategies: Vec<Box<dyn MatchStrategy>>,
}

impl Matcher {
    pub fn new(opts: MatchOptions) -> Self {
        let strategies: Vec<Box<dyn MatchStrategy>> = vec![
            Box::new(ExactTier),
            Box::new(ContainmentTier),
            Box::new(ApproximateTier {
                metric: opts.metric,
                threshold: opts.threshold,
            }),
        ];
        Self { strategies }
    }

    /// Find the corpus index best matching `candidate`, with the tier that
    /// produced it. `None` is an expected outcome, not an error.
    ///
    /// A candidate that normalizes to empty only matches an empty entry, on
    /// the exact tier.
    pub fn best_match(&self, candidate: &str, corpus: &[String]) -> Option<TierMatch> {
        let needle = normalize(candidate);
        if needle.is_empty() {
            tracing::debug!("candidate '{}' normalizes to empty; exact tier only", candidate);
            return ExactTier.find(&needle, corpus).map(|index| TierMatch {
                index,
                tier: Tier::Exact,
            });
        }
        self.strategies.iter().find_map(|s| {
            s.find(&needle, corpus).map(|index| TierMatch {
                index,
                tier: s.tier(),
            })
        })
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(MatchOptions::default())
    }
}

/// Best corpus index for `candidate` using the default options.
pub fn best_match(candidate: &str, corpus: &[String]) -> Option<usize> {
    Matcher::default()
        .best_match(candidate, corpus)
        .map(|m| m.index)
}
