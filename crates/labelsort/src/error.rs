//! Error types for the resolver core and the challenge transport.

use thiserror::Error;

/// Structural violations rejected before any matching happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("length mismatch: {canonical} canonical label(s) but {items} item(s)")]
    LengthMismatch { canonical: usize, items: usize },
}

/// Unrecognized similarity metric name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown similarity metric '{0}' (expected gestalt, levenshtein, jaro-winkler or sorensen-dice)")]
pub struct UnknownMetric(pub String);

/// Failures of the fetch/submit glue. Never produced by the core.
#[derive(Debug, Error)]
pub enum ChallengeError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed challenge response: {0}")]
    MalformedResponse(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
