// src/checker/uri.rs
// =============================================================================
// Turns a raw URL string into something the prober can request.
//
// Validation happens at check time, not when the record is built: a bad URL
// is reported as a MalformedUrl outcome for that one record.
//
// We use the `url` crate (WHATWG URL parsing). Only absolute http/https URLs
// are accepted, since those are the only schemes reqwest can dispatch.
// =============================================================================

use std::fmt;
use thiserror::Error;
use url::Url;

/// A well-formed absolute http(s) URL, ready to probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTarget(Url);

impl ValidatedTarget {
    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for ValidatedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a raw URL was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MalformedUrl {
    #[error("URL is empty")]
    Empty,
    #[error("invalid URL: {0}")]
    Syntax(String),
    #[error("unsupported scheme '{0}'")]
    UnsupportedScheme(String),
    #[error("URL has no host")]
    MissingHost,
}

// Parses and checks a raw URL. Pure; never panics.
//
// Examples:
//   "https://example.com/a" -> Ok
//   "example.com"           -> Err(Syntax)   (no scheme)
//   "mailto:a@b.c"          -> Err(UnsupportedScheme)
pub fn validate(raw: &str) -> Result<ValidatedTarget, MalformedUrl> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MalformedUrl::Empty);
    }

    let url = Url::parse(trimmed).map_err(|e| MalformedUrl::Syntax(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(MalformedUrl::UnsupportedScheme(other.to_string())),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(MalformedUrl::MissingHost);
    }

    Ok(ValidatedTarget(url))
}
