//! One fetch → resolve → submit run with latency bookkeeping.

use std::time::{Duration, Instant};

use crate::canonical::CanonicalList;
use crate::client::{ChallengeClient, SubmitOutcome};
use crate::error::ChallengeError;
use crate::resolver::{Resolution, Resolver};

/// Wall-clock latency of each stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleTimings {
    pub fetch: Duration,
    pub resolve: Duration,
    pub submit: Duration,
    pub total: Duration,
}

/// Everything produced by one cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub items: Vec<String>,
    pub ordered: Vec<usize>,
    pub resolution: Resolution,
    /// `None` for dry runs.
    pub outcome: Option<SubmitOutcome>,
    pub timings: CycleTimings,
}

/// Fetch once, resolve, and submit once (unless `dry_run`).
pub async fn run_cycle(
    client: &dyn ChallengeClient,
    resolver: &Resolver,
    canonical: &CanonicalList,
    dry_run: bool,
) -> Result<CycleReport, ChallengeError> {
    let start = Instant::now();

    let challenge = client.fetch().await?;
    let fetched = Instant::now();
    tracing::info!(
        "fetched {} item(s) in {} ms",
        challenge.items.len(),
        (fetched - start).as_millis()
    );

    let resolution = resolver.resolve_detailed(canonical.labels(), &challenge.items)?;
    let ordered = resolution.ordered();
    let resolved = Instant::now();
    tracing::info!(
        "resolved order {:?} ({} filled) in {} us",
        ordered,
        resolution.filled(),
        (resolved - fetched).as_micros()
    );

    let outcome = if dry_run {
        tracing::info!("dry run; skipping submit");
        None
    } else {
        let outcome = client.submit(&ordered, &challenge.token).await?;
        if outcome.is_success() {
            tracing::info!("submit accepted (status={})", outcome.status);
        } else {
            tracing::warn!("submit returned status {}: {}", outcome.status, outcome.body);
        }
        Some(outcome)
    };
    let done = Instant::now();

    let timings = CycleTimings {
        fetch: fetched - start,
        resolve: resolved - fetched,
        submit: done - resolved,
        total: done - start,
    };
    tracing::info!("cycle finished in {} ms", timings.total.as_millis());

    Ok(CycleReport {
        items: challenge.items,
        ordered,
        resolution,
        outcome,
        timings,
    })
}
