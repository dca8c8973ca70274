//! Bounded, fixed-delay retry of one page step.
//!
//! Sites recover from flaky hydration by waiting a moment, clearing any error
//! overlay and sometimes reloading. That loop lives here once instead of in
//! every adapter step.

use std::time::Duration;

use futures::future::BoxFuture;

use crate::browser::PageSession;
use crate::error::BrowserError;
use crate::recovery::RecoveryHandler;

/// How often and how patiently a step is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPolicy {
    /// Total attempts including the first. `0` is treated as `1`.
    pub max_attempts: u32,
    /// Fixed pause between attempts (no backoff).
    pub delay: Duration,
    /// Reload the page between attempts to force re-hydration.
    pub reload_between: bool,
}

impl StepPolicy {
    #[must_use]
    pub const fn new(max_attempts: u32, delay_ms: u64) -> Self {
        Self {
            max_attempts,
            delay: Duration::from_millis(delay_ms),
            reload_between: false,
        }
    }

    #[must_use]
    pub const fn with_reload(mut self) -> Self {
        self.reload_between = true;
        self
    }
}

/// What happened across all attempts of one step.
#[derive(Debug)]
pub struct StepRun<T> {
    pub attempts: u32,
    /// Display form of every failed attempt, in order.
    pub failures: Vec<String>,
    pub outcome: Result<T, BrowserError>,
}

/// Runs `op` until it succeeds or `policy.max_attempts` is exhausted.
///
/// After each failed attempt that will be retried: log at `warn`, let
/// `recovery` clear any overlay, reload when the policy asks for it, then
/// sleep `policy.delay`. A failed reload is logged and does not count as an
/// attempt.
pub async fn retry_step<T, F>(
    page: &mut dyn PageSession,
    recovery: &RecoveryHandler,
    policy: StepPolicy,
    step: &str,
    mut op: F,
) -> StepRun<T>
where
    F: for<'p> FnMut(&'p mut dyn PageSession) -> BoxFuture<'p, Result<T, BrowserError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut failures = Vec::new();
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let err = match op(&mut *page).await {
            Ok(value) => {
                return StepRun {
                    attempts: attempt,
                    failures,
                    outcome: Ok(value),
                }
            }
            Err(err) => err,
        };
        failures.push(err.to_string());

        if attempt >= max_attempts {
            return StepRun {
                attempts: attempt,
                failures,
                outcome: Err(err),
            };
        }

        tracing::warn!(
            step,
            attempt,
            max_attempts,
            error = %err,
            "step failed, retrying"
        );

        recovery.dismiss(&mut *page).await;
        if policy.reload_between {
            if let Err(e) = page.reload().await {
                tracing::debug!(step, error = %e, "reload between attempts failed");
            }
        }
        tokio::time::sleep(policy.delay).await;
    }
}

#[cfg(test)]
#[path = "retry_test.rs"]
mod tests;
