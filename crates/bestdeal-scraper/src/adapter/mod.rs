//! Site adapters: the per-platform scrape capability consumed by the
//! orchestrator.

mod session;
mod steps;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bestdeal_core::{AppConfig, ErrorKind, Product};

use crate::browser::BrowserLauncher;
use crate::error::ScrapeFailure;
use crate::normalize::normalize_record;
use crate::sites::SiteProfile;

pub use session::{ScrapeSession, SessionReport, State};

/// One platform's scrape capability.
///
/// Implementations must be safe to call concurrently from several pool
/// workers; each call owns whatever browser resources it uses.
#[async_trait]
pub trait ProductScraper: Send + Sync {
    /// Runs one search for `query` delivered to `location`.
    ///
    /// `Ok(vec![])` is a genuine "nothing found" answer, distinct from a failure.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeFailure`] carrying the [`ErrorKind`] of the step that
    /// could not be completed.
    async fn scrape(&self, location: &str, query: &str) -> Result<Vec<Product>, ScrapeFailure>;
}

/// Timing and recovery knobs shared by every browser adapter.
#[derive(Debug, Clone)]
pub struct AdapterSettings {
    pub element_timeout: Duration,
    pub typing_pace: Duration,
    pub recovery_max_clicks: u32,
    pub recovery_settle: Duration,
    pub empty_results_is_error: bool,
}

impl AdapterSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            element_timeout: Duration::from_secs(config.element_timeout_secs),
            typing_pace: Duration::from_millis(config.typing_delay_ms),
            recovery_max_clicks: config.recovery_max_clicks,
            recovery_settle: Duration::from_millis(config.recovery_settle_ms),
            empty_results_is_error: config.empty_results_is_error,
        }
    }
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            element_timeout: Duration::from_secs(25),
            typing_pace: Duration::from_millis(40),
            recovery_max_clicks: 5,
            recovery_settle: Duration::from_secs(2),
            empty_results_is_error: false,
        }
    }
}

/// Drives a [`SiteProfile`] through a fresh browser page per call.
pub struct BrowserAdapter {
    profile: &'static SiteProfile,
    launcher: Arc<dyn BrowserLauncher>,
    settings: AdapterSettings,
}

impl BrowserAdapter {
    #[must_use]
    pub fn new(
        profile: &'static SiteProfile,
        launcher: Arc<dyn BrowserLauncher>,
        settings: AdapterSettings,
    ) -> Self {
        Self {
            profile,
            launcher,
            settings,
        }
    }

    #[must_use]
    pub fn profile(&self) -> &'static SiteProfile {
        self.profile
    }
}

#[async_trait]
impl ProductScraper for BrowserAdapter {
    async fn scrape(&self, location: &str, query: &str) -> Result<Vec<Product>, ScrapeFailure> {
        let page = self.launcher.open().await.map_err(|e| {
            ScrapeFailure::new(
                ErrorKind::UnrecoverableAdapterError,
                format!("browser launch failed: {e}"),
            )
        })?;

        let report = ScrapeSession::new(page, self.profile, &self.settings, location, query)
            .run()
            .await;
        into_products(report, self.profile.name)
    }
}

fn into_products(report: SessionReport, source: &str) -> Result<Vec<Product>, ScrapeFailure> {
    match report.state {
        State::Extracted => Ok(report
            .records
            .iter()
            .map(|record| normalize_record(record, source))
            .collect()),
        State::Failed(kind) => {
            let message = report
                .error_log
                .last()
                .cloned()
                .unwrap_or_else(|| format!("session ended in {kind}"));
            Err(ScrapeFailure::new(kind, message))
        }
        other => Err(ScrapeFailure::new(
            ErrorKind::UnrecoverableAdapterError,
            format!("session stopped in non-terminal state {other:?}"),
        )),
    }
}

#[cfg(test)]
#[path = "adapter_test.rs"]
mod tests;
