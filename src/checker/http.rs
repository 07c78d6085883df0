// src/checker/http.rs
// =============================================================================
// This module checks whether a URL is reachable with a single HTTP request.
//
// Key functionality:
// - Makes HTTP HEAD requests (lightweight, no body download)
// - Applies a per-request timeout (3 seconds by default)
// - Classifies the status code, or the reason no response came back
//
// One reqwest Client is built at startup and shared by every probe. It keeps
// its own connection pool; nothing about it is changed per request, so many
// probes can use it at the same time.
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use std::error::Error as _;
use std::time::Duration;
use tracing::debug;

use super::outcome::{FailureKind, ProbeOutcome, SuccessPolicy};
use super::uri::ValidatedTarget;

/// Something that can check a single validated target.
///
/// The runner only talks to this trait, so tests can swap in fakes.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, target: &ValidatedTarget, timeout: Duration) -> ProbeOutcome;
}

// Settings for the shared HTTP client
#[derive(Debug, Clone)]
pub struct ProberConfig {
    pub max_redirects: usize,
    pub success_policy: SuccessPolicy,
    pub user_agent: String,
}

impl Default for ProberConfig {
    fn default() -> Self {
        Self {
            max_redirects: 10,
            success_policy: SuccessPolicy::default(),
            user_agent: concat!("linkcheck/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Probes targets with HEAD requests over a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
    policy: SuccessPolicy,
}

impl HttpProber {
    pub fn new(config: &ProberConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self {
            client,
            policy: config.success_policy,
        })
    }
}

#[async_trait]
impl Probe for HttpProber {
    async fn probe(&self, target: &ValidatedTarget, timeout: Duration) -> ProbeOutcome {
        let result = self
            .client
            .head(target.as_url().clone())
            .timeout(timeout)
            .send()
            .await;

        match result {
            Ok(response) => ProbeOutcome::from_status(response.status(), self.policy),
            Err(e) => {
                debug!("HEAD {} failed: {}", target, describe(&e));
                categorize_error(&e)
            }
        }
    }
}

// Works out why a request produced no response.
//
// reqwest only exposes a few predicates (is_timeout, is_connect, ...), so for
// DNS and TLS we look at the text of the whole error chain.
fn categorize_error(error: &reqwest::Error) -> ProbeOutcome {
    let chain = describe(error);
    let lower = chain.to_lowercase();

    let kind = if error.is_timeout() {
        FailureKind::Timeout
    } else if error.is_redirect() {
        FailureKind::TooManyRedirects
    } else if lower.contains("dns") || lower.contains("failed to lookup address") {
        FailureKind::Dns
    } else if lower.contains("certificate") || lower.contains("tls") || lower.contains("ssl") {
        FailureKind::Tls
    } else if error.is_connect() {
        FailureKind::Connect
    } else {
        FailureKind::Other
    };

    ProbeOutcome::NetworkFailure {
        kind,
        message: chain,
    }
}

// Joins an error and all of its sources into one line
fn describe(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    message
}
