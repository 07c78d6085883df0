// src/report/log.rs
// =============================================================================
// Reports outcomes as log lines.
//
// Line format (kept from the original Moodle audit logs so old and new logs
// can be grepped the same way):
//
//   [000012/000345] [OK] [R 000045] [C 000123] Week 3 reading
//   [000013/000345] [404 Not Found] [R 000046] [C 000123] Lecture slides
//
// Severity:
// - Success        -> INFO
// - MalformedUrl   -> WARN, plus a link to the owning course
// - HttpError      -> ERROR, plus a link to the owning course
// - NetworkFailure -> ERROR, plus a link to the owning course
// =============================================================================

use tracing::{error, info, warn};

use super::ResultSink;
use crate::checker::{OutcomeEvent, ProbeOutcome};

/// Placeholder replaced by the owner id in the remediation template.
pub const OWNER_PLACEHOLDER: &str = "{owner}";

pub struct LogSink {
    owner_url_template: String,
}

impl LogSink {
    pub fn new(owner_url_template: impl Into<String>) -> Self {
        Self {
            owner_url_template: owner_url_template.into(),
        }
    }

    fn remediation_url(&self, owner_id: i64) -> String {
        self.owner_url_template
            .replace(OWNER_PLACEHOLDER, &owner_id.to_string())
    }
}

impl ResultSink for LogSink {
    fn record(&mut self, event: &OutcomeEvent) {
        let line = format_line(event);
        let owner_id = event.record.owner_id();

        match &event.outcome {
            ProbeOutcome::Success { .. } => info!("{}", line),
            ProbeOutcome::MalformedUrl { reason } => {
                warn!("{} ({}: {:?})", line, reason, event.record.raw_url());
                warn!("{}", self.remediation_url(owner_id));
            }
            ProbeOutcome::HttpError { .. } => {
                error!("{}", line);
                warn!("{}", self.remediation_url(owner_id));
            }
            ProbeOutcome::NetworkFailure { message, .. } => {
                error!("{} ({})", line, message);
                warn!("{}", self.remediation_url(owner_id));
            }
        }
    }
}

fn format_line(event: &OutcomeEvent) -> String {
    format!(
        "[{:06}/{:06}] [{}] [R {:06}] [C {:06}] {}",
        event.position.completed,
        event.position.total,
        event.outcome.label(),
        event.record.id(),
        event.record.owner_id(),
        event.record.name(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{FailureKind, ProgressPosition};
    use crate::record::LinkRecord;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    fn event(outcome: ProbeOutcome) -> OutcomeEvent {
        OutcomeEvent {
            position: ProgressPosition { completed: 12, total: 345 },
            outcome,
            record: LinkRecord::new(45, 123, "Week 3 reading", Some("https://x.example".to_string()))
                .unwrap(),
        }
    }

    #[test]
    fn test_format_success_line() {
        let line = format_line(&event(ProbeOutcome::Success { status_code: 200 }));
        assert_eq!(line, "[000012/000345] [OK] [R 000045] [C 000123] Week 3 reading");
    }

    #[test]
    fn test_format_error_line() {
        let line = format_line(&event(ProbeOutcome::HttpError {
            status_code: 404,
            reason: "Not Found".to_string(),
        }));
        assert!(line.contains("[404 Not Found]"));
    }

    #[test]
    fn test_remediation_url() {
        let sink = LogSink::new("https://moodle.example.com/course/view.php?id={owner}");
        assert_eq!(
            sink.remediation_url(123),
            "https://moodle.example.com/course/view.php?id=123"
        );
    }

    // Collects (level, message) for every event it sees
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<(Level, String)>>>);

    struct MessageVisitor(String);

    impl Visit for MessageVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{:?}", value);
            }
        }
    }

    impl<S: Subscriber> Layer<S> for Captured {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = MessageVisitor(String::new());
            event.record(&mut visitor);
            self.0
                .lock()
                .unwrap()
                .push((*event.metadata().level(), visitor.0));
        }
    }

    fn capture(outcome: ProbeOutcome) -> Vec<(Level, String)> {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::registry().with(captured.clone());
        let mut sink = LogSink::new("https://lms.example/course/{owner}");

        tracing::subscriber::with_default(subscriber, || sink.record(&event(outcome)));

        let lines = captured.0.lock().unwrap().clone();
        lines
    }

    const COURSE_LINK: &str = "https://lms.example/course/123";

    #[test]
    fn test_success_is_info_without_link() {
        let lines = capture(ProbeOutcome::Success { status_code: 200 });
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, Level::INFO);
        assert!(lines[0].1.contains("[OK]"));
    }

    #[test]
    fn test_http_error_is_error_then_link() {
        let lines = capture(ProbeOutcome::HttpError {
            status_code: 404,
            reason: "Not Found".to_string(),
        });
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].0, Level::ERROR);
        assert!(lines[0].1.contains("[404 Not Found]"));
        assert_eq!(lines[1], (Level::WARN, COURSE_LINK.to_string()));
    }

    #[test]
    fn test_malformed_is_warn_then_link() {
        let lines = capture(ProbeOutcome::MalformedUrl {
            reason: "invalid URL".to_string(),
        });
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].0, Level::WARN);
        assert!(lines[0].1.contains("[MalformedUrl]"));
        assert_eq!(lines[1], (Level::WARN, COURSE_LINK.to_string()));
    }

    #[test]
    fn test_network_failure_is_error_then_link() {
        let lines = capture(ProbeOutcome::NetworkFailure {
            kind: FailureKind::Timeout,
            message: "operation timed out".to_string(),
        });
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].0, Level::ERROR);
        assert!(lines[0].1.contains("[Timeout]"));
        assert!(lines[0].1.contains("operation timed out"));
        assert_eq!(lines[1], (Level::WARN, COURSE_LINK.to_string()));
    }
}
