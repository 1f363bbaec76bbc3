//! # Insight Advisor
//!
//! The dashboard shows a one-line tip next to the vault ("Arc AI Advisor").
//! Where that text comes from is somebody else's problem: a hosted model, a
//! rules table, a constant. The engine only knows the [`InsightAdvisor`]
//! capability and promises one thing about it: whatever the advisor does
//! (fail, hang, answer with nothing) the caller still gets a string, and
//! vault state is never involved.
//!
//! [`advise`] is the only entry point callers should use. It applies the
//! timeout and swaps in the fixed fallback copy.

mod rules;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ADVISORY_EMPTY_FALLBACK, ADVISORY_FALLBACK};

pub use rules::RuleBasedAdvisor;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Ways an advisor can let us down. Never escapes [`advise`].
#[derive(Debug, Error)]
pub enum AdvisoryError {
    /// The backing service errored or is unreachable.
    #[error("advisory unavailable: {0}")]
    Unavailable(String),

    /// The service answered, but with nothing to show.
    #[error("advisor returned an empty response")]
    EmptyResponse,
}

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// Supplies a short, human-readable tip for the current vault position.
#[async_trait]
pub trait InsightAdvisor: Send + Sync {
    /// `vault_balance` is micro-USDC, `points` micro-points.
    async fn fetch_advisory(&self, vault_balance: u64, points: u64)
        -> Result<String, AdvisoryError>;
}

/// Always answers with the same text.
#[derive(Clone, Debug)]
pub struct StaticAdvisor {
    text: String,
}

impl StaticAdvisor {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl InsightAdvisor for StaticAdvisor {
    async fn fetch_advisory(&self, _vault_balance: u64, _points: u64) -> Result<String, AdvisoryError> {
        Ok(self.text.clone())
    }
}

// ---------------------------------------------------------------------------
// Fallback-absorbing wrapper
// ---------------------------------------------------------------------------

/// Where the text of an [`Advisory`] came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisorySource {
    Advisor,
    Fallback,
}

/// Text ready to show, plus its provenance for metrics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    pub text: String,
    pub source: AdvisorySource,
}

impl Advisory {
    fn fallback(text: &str) -> Self {
        Self {
            text: text.to_string(),
            source: AdvisorySource::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == AdvisorySource::Fallback
    }
}

/// Asks `advisor` for a tip, waiting at most `timeout`.
///
/// Errors and timeouts yield [`ADVISORY_FALLBACK`]; blank answers yield
/// [`ADVISORY_EMPTY_FALLBACK`]. This function cannot fail.
pub async fn advise(
    advisor: &dyn InsightAdvisor,
    vault_balance: u64,
    points: u64,
    timeout: Duration,
) -> Advisory {
    match tokio::time::timeout(timeout, advisor.fetch_advisory(vault_balance, points)).await {
        Ok(Ok(text)) if text.trim().is_empty() => {
            tracing::debug!("advisor returned blank text, using fallback");
            Advisory::fallback(ADVISORY_EMPTY_FALLBACK)
        }
        Ok(Ok(text)) => Advisory {
            text: text.trim().to_string(),
            source: AdvisorySource::Advisor,
        },
        Ok(Err(AdvisoryError::EmptyResponse)) => {
            tracing::debug!("advisor returned no text, using fallback");
            Advisory::fallback(ADVISORY_EMPTY_FALLBACK)
        }
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "advisory failed, using fallback");
            Advisory::fallback(ADVISORY_FALLBACK)
        }
        Err(_) => {
            let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            tracing::warn!(timeout_ms, "advisory timed out");
            Advisory::fallback(ADVISORY_FALLBACK)
        }
    }
}
