// src/checker/runner.rs
// =============================================================================
// Checks a whole batch of link records concurrently.
//
// How it works:
// 1. Each record becomes a future: validate the URL, then probe it
// 2. buffer_unordered(N) keeps at most N of those futures in flight
// 3. Results come back in completion order (not input order)
// 4. The loop consuming the stream owns the progress counter, bumps it once
//    per record and hands the event to the sink
//
// Each probe runs in its own tokio task. If a probe panics, only that task
// dies; we see a JoinError and report the record as an internal failure.
// =============================================================================

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::http::Probe;
use super::outcome::{FailureKind, ProbeOutcome};
use super::uri;
use crate::record::LinkRecord;
use crate::report::ResultSink;

/// Limits for a batch run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// How many probes may be in flight at once (at least 1)
    pub max_concurrency: usize,
    /// Timeout applied to each probe
    pub timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 50,
            timeout: Duration::from_secs(3),
        }
    }
}

/// `(completed, total)` attached to every event.
///
/// `completed` counts records finished so far, not the record's input position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressPosition {
    pub completed: usize,
    pub total: usize,
}

/// One finished record, as handed to a `ResultSink`.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeEvent {
    pub position: ProgressPosition,
    pub outcome: ProbeOutcome,
    pub record: LinkRecord,
}

/// Totals for a finished (or cancelled) run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub completed: usize,
    pub ok: usize,
    pub http_errors: usize,
    pub malformed: usize,
    pub network_failures: usize,
    /// Records never started because the run was cancelled
    pub cancelled: usize,
}

impl RunSummary {
    fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    fn tally(&mut self, outcome: &ProbeOutcome) {
        self.completed += 1;
        match outcome {
            ProbeOutcome::Success { .. } => self.ok += 1,
            ProbeOutcome::HttpError { .. } => self.http_errors += 1,
            ProbeOutcome::MalformedUrl { .. } => self.malformed += 1,
            ProbeOutcome::NetworkFailure { .. } => self.network_failures += 1,
        }
    }

    pub fn broken(&self) -> usize {
        self.http_errors + self.malformed + self.network_failures
    }
}

/// Runs checks for a batch of records. Holds no state between runs.
pub struct CheckRunner {
    prober: Arc<dyn Probe>,
    config: RunnerConfig,
}

impl CheckRunner {
    pub fn new(prober: Arc<dyn Probe>, config: RunnerConfig) -> Self {
        Self { prober, config }
    }

    /// Checks every record exactly once and reports each outcome to `sink`.
    ///
    /// Returns when all records are done, or, after `cancel` fires, when the
    /// probes already in flight are done. Records that were never started are
    /// counted in `RunSummary::cancelled` and produce no event.
    pub async fn run<S>(
        &self,
        records: Vec<LinkRecord>,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> RunSummary
    where
        S: ResultSink + ?Sized,
    {
        let total = records.len();
        let mut summary = RunSummary::new(total);

        let checks = records.into_iter().map(|record| {
            let prober = Arc::clone(&self.prober);
            let timeout = self.config.timeout;
            let cancel = cancel.clone();
            async move {
                // Futures are only polled once a slot frees up, so this is
                // the point where a new probe would be issued
                if cancel.is_cancelled() {
                    return None;
                }
                let outcome = check_record(prober, record.raw_url(), timeout).await;
                Some((record, outcome))
            }
        });

        let mut results = stream::iter(checks).buffer_unordered(self.config.max_concurrency.max(1));

        while let Some(result) = results.next().await {
            let Some((record, outcome)) = result else {
                summary.cancelled += 1;
                continue;
            };

            summary.tally(&outcome);
            let event = OutcomeEvent {
                position: ProgressPosition {
                    completed: summary.completed,
                    total,
                },
                outcome,
                record,
            };
            sink.record(&event);
        }

        debug!(
            "Run finished: {} completed, {} cancelled",
            summary.completed, summary.cancelled
        );
        summary
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why is the counter a plain usize and not an AtomicUsize?
//    - buffer_unordered yields finished futures one at a time to the loop
//      in run(), and only that loop touches the counter
//    - So each record bumps it exactly once and the event carries the value
//      it produced, even though the probes themselves run in parallel
//
// 2. Why tokio::spawn around a single probe?
//    - A panic inside a spawned task is caught by tokio and shows up as a
//      JoinError on the handle, instead of unwinding through the runner
//    - It also lets probes run on other worker threads
//
// 3. What happens on Ctrl+C?
//    - Futures that have not started see the cancelled token and return None
//    - Futures already probing finish normally (bounded by the timeout)
// -----------------------------------------------------------------------------

// Validates and probes one URL. Never fails: every path ends in an outcome.
async fn check_record(prober: Arc<dyn Probe>, raw_url: &str, timeout: Duration) -> ProbeOutcome {
    let target = match uri::validate(raw_url) {
        Ok(target) => target,
        Err(e) => {
            return ProbeOutcome::MalformedUrl {
                reason: e.to_string(),
            }
        }
    };

    let task = tokio::spawn(async move { prober.probe(&target, timeout).await });

    match task.await {
        Ok(outcome) => outcome,
        Err(e) => {
            let message = if e.is_panic() {
                "probe panicked".to_string()
            } else {
                format!("probe task ended early: {}", e)
            };
            ProbeOutcome::NetworkFailure {
                kind: FailureKind::Internal,
                message,
            }
        }
    }
}
