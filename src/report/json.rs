// src/report/json.rs
// Writes each event as one JSON line, e.g.
// {"position":{"completed":1,"total":3},"outcome":{"status":"success","status_code":200},"record":{...}}

use std::io::Write;
use tracing::warn;

use super::ResultSink;
use crate::checker::OutcomeEvent;

pub struct JsonLinesSink<W: Write> {
    out: W,
    failed: bool,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, failed: false }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn write_event(&mut self, event: &OutcomeEvent) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.out, event)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

impl<W: Write> ResultSink for JsonLinesSink<W> {
    fn record(&mut self, event: &OutcomeEvent) {
        // Broken pipe etc: say so once, keep checking
        if let Err(e) = self.write_event(event) {
            if !self.failed {
                warn!("Could not write JSON output: {}", e);
                self.failed = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{FailureKind, ProbeOutcome, ProgressPosition};
    use crate::record::LinkRecord;

    #[test]
    fn test_writes_one_line_per_event() {
        let mut sink = JsonLinesSink::new(Vec::new());
        for completed in 1..=2 {
            sink.record(&OutcomeEvent {
                position: ProgressPosition { completed, total: 2 },
                outcome: ProbeOutcome::NetworkFailure {
                    kind: FailureKind::Dns,
                    message: "dns error".to_string(),
                },
                record: LinkRecord::new(9, 3, "Quiz", Some("https://nope.invalid".to_string()))
                    .unwrap(),
            });
        }

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["position"]["completed"], 1);
        assert_eq!(first["outcome"]["status"], "network_failure");
        assert_eq!(first["outcome"]["kind"], "dns");
        assert_eq!(first["record"]["url"], "https://nope.invalid");
        assert_eq!(first["record"]["owner_id"], 3);
    }
}
