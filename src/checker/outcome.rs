// src/checker/outcome.rs
// =============================================================================
// The classified result of checking one link.
//
// Every record gets exactly one ProbeOutcome per run. Failures are values
// here, never errors: a 404 or a timeout is information for the operator,
// not a fault in the checker.
// =============================================================================

use reqwest::StatusCode;
use serde::Serialize;
use std::fmt;

// Result of checking one link.
//
// #[serde(tag = "status")] makes the variant name a field in the JSON output,
// e.g. {"status":"http_error","status_code":404,"reason":"Not Found"}
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// The endpoint answered with a success status
    Success { status_code: u16 },
    /// The endpoint answered, but not with a success status
    HttpError { status_code: u16, reason: String },
    /// The stored URL could not be parsed
    MalformedUrl { reason: String },
    /// No response was received (timeout, DNS, TLS, refused connection...)
    NetworkFailure { kind: FailureKind, message: String },
}

impl ProbeOutcome {
    /// Short label used in log lines, e.g. `OK`, `404 Not Found`, `Timeout`.
    pub fn label(&self) -> String {
        match self {
            ProbeOutcome::Success { status_code } => {
                if *status_code == 200 {
                    "OK".to_string()
                } else {
                    status_code.to_string()
                }
            }
            ProbeOutcome::HttpError { status_code, reason } if reason.is_empty() => {
                status_code.to_string()
            }
            ProbeOutcome::HttpError { status_code, reason } => {
                format!("{} {}", status_code, reason)
            }
            ProbeOutcome::MalformedUrl { .. } => "MalformedUrl".to_string(),
            ProbeOutcome::NetworkFailure { kind, .. } => kind.to_string(),
        }
    }

    /// Builds the outcome for a received status under the given policy.
    pub fn from_status(status: StatusCode, policy: SuccessPolicy) -> Self {
        if policy.accepts(status) {
            ProbeOutcome::Success {
                status_code: status.as_u16(),
            }
        } else {
            ProbeOutcome::HttpError {
                status_code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            }
        }
    }
}

/// Why no HTTP response was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    Dns,
    Connect,
    Tls,
    TooManyRedirects,
    Other,
    /// The check itself crashed; caught at the per-record boundary
    Internal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Timeout => "Timeout",
            FailureKind::Dns => "DnsError",
            FailureKind::Connect => "ConnectError",
            FailureKind::Tls => "TlsError",
            FailureKind::TooManyRedirects => "TooManyRedirects",
            FailureKind::Other => "NetworkError",
            FailureKind::Internal => "InternalError",
        };
        f.write_str(s)
    }
}

/// Which received statuses count as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuccessPolicy {
    /// Any 2xx status
    #[default]
    Any2xx,
    /// Only 200 OK
    ExactOk,
}

impl SuccessPolicy {
    pub fn accepts(self, status: StatusCode) -> bool {
        match self {
            SuccessPolicy::Any2xx => status.is_success(),
            SuccessPolicy::ExactOk => status == StatusCode::OK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_any_2xx() {
        assert!(SuccessPolicy::Any2xx.accepts(StatusCode::OK));
        assert!(SuccessPolicy::Any2xx.accepts(StatusCode::NO_CONTENT));
        assert!(!SuccessPolicy::Any2xx.accepts(StatusCode::MOVED_PERMANENTLY));
        assert!(!SuccessPolicy::Any2xx.accepts(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_policy_exact_ok() {
        assert!(SuccessPolicy::ExactOk.accepts(StatusCode::OK));
        assert!(!SuccessPolicy::ExactOk.accepts(StatusCode::NO_CONTENT));
    }

    #[test]
    fn test_from_status_not_found() {
        let outcome = ProbeOutcome::from_status(StatusCode::NOT_FOUND, SuccessPolicy::Any2xx);
        assert_eq!(
            outcome,
            ProbeOutcome::HttpError {
                status_code: 404,
                reason: "Not Found".to_string()
            }
        );
        assert_eq!(outcome.label(), "404 Not Found");
    }

    #[test]
    fn test_labels() {
        assert_eq!(ProbeOutcome::Success { status_code: 200 }.label(), "OK");
        assert_eq!(ProbeOutcome::Success { status_code: 204 }.label(), "204");
        let timeout = ProbeOutcome::NetworkFailure {
            kind: FailureKind::Timeout,
            message: String::new(),
        };
        assert_eq!(timeout.label(), "Timeout");
    }

    #[test]
    fn test_json_shape() {
        let outcome = ProbeOutcome::HttpError {
            status_code: 500,
            reason: "Internal Server Error".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "http_error");
        assert_eq!(json["status_code"], 500);
    }
}
