// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - uri: Validates the stored URL before anything touches the network
// - http: Makes the HEAD request and classifies what came back
// - outcome: The per-record result type
// - runner: Fans a batch of records out to concurrent probes
//
// This file is the module root; it re-exports the public API so callers can
// write `checker::CheckRunner` instead of `checker::runner::CheckRunner`.
// =============================================================================

mod http;
mod outcome;
mod runner;
mod uri;

pub use http::{HttpProber, ProberConfig};
pub use outcome::{ProbeOutcome, SuccessPolicy};
pub use runner::{CheckRunner, OutcomeEvent, RunSummary, RunnerConfig};

// Only needed to build events by hand in the report tests
#[cfg(test)]
pub use outcome::FailureKind;
#[cfg(test)]
pub use runner::ProgressPosition;
