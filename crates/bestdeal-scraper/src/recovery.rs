//! Dismissal of transient error overlays such as a "Try Again" banner.

use std::time::Duration;

use crate::browser::{Locator, PageSession};

/// Clicks a site's retry control until it disappears or `max_clicks` is hit.
///
/// Safe to call at any point of any adapter: when the control is absent the
/// call returns immediately, and a page error while probing counts as "no
/// overlay". It only acts on the page, never on session state.
#[derive(Debug, Clone)]
pub struct RecoveryHandler {
    control: Locator,
    max_clicks: u32,
    settle: Duration,
}

impl RecoveryHandler {
    #[must_use]
    pub fn new(control: Locator, max_clicks: u32, settle: Duration) -> Self {
        Self {
            control,
            max_clicks,
            settle,
        }
    }

    /// Returns how many times the control was clicked.
    pub async fn dismiss(&self, page: &mut dyn PageSession) -> u32 {
        let mut clicks = 0;
        while clicks < self.max_clicks {
            match page.count(&self.control).await {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(control = %self.control, error = %e, "overlay probe failed");
                    break;
                }
            }
            if let Err(e) = page.click(&self.control, 0).await {
                tracing::debug!(control = %self.control, error = %e, "overlay click failed");
                break;
            }
            clicks += 1;
            tracing::warn!(control = %self.control, clicks, "dismissed transient overlay");
            tokio::time::sleep(self.settle).await;
        }
        clicks
    }
}
