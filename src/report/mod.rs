// src/report/mod.rs
// =============================================================================
// Where check results go.
//
// The runner hands every finished record to a ResultSink. Sinks:
// - log: tracing events, severity depends on the outcome
// - json: one JSON object per line on stdout (--json)
// =============================================================================

mod json;
mod log;

pub use json::JsonLinesSink;
pub use log::LogSink;

use crate::checker::OutcomeEvent;

/// Consumes one event per checked record.
///
/// Called from a single place in the runner, in completion order.
pub trait ResultSink {
    fn record(&mut self, event: &OutcomeEvent);
}

/// Sends every event to several sinks, in order.
#[derive(Default)]
pub struct Fanout {
    sinks: Vec<Box<dyn ResultSink>>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl ResultSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl ResultSink for Fanout {
    fn record(&mut self, event: &OutcomeEvent) {
        for sink in &mut self.sinks {
            sink.record(event);
        }
    }
}
