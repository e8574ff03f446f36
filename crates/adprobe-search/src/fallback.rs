//! Ordered fallback strategies for best-effort page chores such as
//! dismissing a cookie banner.
//!
//! Strategies are tried in order until one applies. "Nothing to do" and
//! "every strategy broke" stay distinct in both the return value and the logs.

use std::future::Future;

use futures::future::BoxFuture;

/// Result of a single strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    /// The strategy found its target and handled it.
    Applied,
    /// The strategy's target is not on the page.
    NotApplicable,
    /// The target was found but handling it failed.
    Failed(String),
}

/// Result of a whole fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackOutcome {
    Applied { strategy: String },
    NotApplicable,
    /// `(strategy, reason)` for every strategy that failed.
    Failed { failures: Vec<(String, String)> },
}

impl FallbackOutcome {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, FallbackOutcome::Failed { .. })
    }
}

/// A named, not-yet-started attempt. The future is only polled if every
/// earlier strategy in the chain did not apply.
pub struct Strategy<'a> {
    name: String,
    attempt: BoxFuture<'a, StrategyOutcome>,
}

impl<'a> Strategy<'a> {
    pub fn new<F>(name: impl Into<String>, attempt: F) -> Self
    where
        F: Future<Output = StrategyOutcome> + Send + 'a,
    {
        Self {
            name: name.into(),
            attempt: Box::pin(attempt),
        }
    }
}

/// Runs `strategies` in order, stopping at the first that applies.
pub async fn run_fallbacks(operation: &str, strategies: Vec<Strategy<'_>>) -> FallbackOutcome {
    let mut failures = Vec::new();

    for Strategy { name, attempt } in strategies {
        match attempt.await {
            StrategyOutcome::Applied => {
                tracing::info!(operation, strategy = %name, "fallback strategy applied");
                return FallbackOutcome::Applied { strategy: name };
            }
            StrategyOutcome::NotApplicable => {
                tracing::debug!(operation, strategy = %name, "fallback strategy not applicable");
            }
            StrategyOutcome::Failed(reason) => {
                tracing::warn!(operation, strategy = %name, reason = %reason, "fallback strategy failed");
                failures.push((name, reason));
            }
        }
    }

    if failures.is_empty() {
        tracing::info!(operation, "nothing to handle");
        FallbackOutcome::NotApplicable
    } else {
        tracing::warn!(
            operation,
            failed = failures.len(),
            "no fallback strategy applied and at least one failed"
        );
        FallbackOutcome::Failed { failures }
    }
}
