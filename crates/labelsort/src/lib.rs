//! Restore the canonical order of a shuffled, noisy list of labels.
//!
//! The core is [`resolve`]: normalize the shuffled items once, match each
//! canonical label through the exact, containment and approximate tiers,
//! retry unmatched labels token by token, and fill whatever is left with the
//! unused indices. The `client` and `cycle` modules carry the fetch/submit glue.

pub mod canonical;
pub mod client;
pub mod config;
pub mod cycle;
pub mod error;
pub mod matcher;
pub mod normalize;
pub mod resolver;
pub mod similarity;

pub use canonical::CanonicalList;
pub use error::{ChallengeError, ValidationError};
pub use matcher::{MatchOptions, Matcher, Tier, best_match};
pub use normalize::normalize;
pub use resolver::{MatchSource, Resolution, Resolver, resolve};
pub use similarity::SimilarityMetric;
