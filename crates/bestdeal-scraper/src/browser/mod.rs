//! The page operations a site adapter is allowed to perform.
//!
//! Adapters drive a [`PageSession`] and never see the underlying driver, so
//! the state machine can be exercised against a scripted page in tests and
//! against Chromium in production.

mod chromium;
mod script;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::BrowserError;

pub use chromium::ChromiumLauncher;

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Identifies a set of elements on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Every element matching a CSS selector, in document order.
    Css(&'static str),
    /// Innermost elements matching `css` whose text contains `text`.
    CssWithText {
        css: &'static str,
        text: &'static str,
    },
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Css(css) => write!(f, "`{css}`"),
            Locator::CssWithText { css, text } => write!(f, "`{css}` containing {text:?}"),
        }
    }
}

/// Where a field's value is read from once its element is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// Rendered text of the element, trimmed.
    Text,
    /// Value of the named attribute, e.g. `src` or `href`.
    Attribute(&'static str),
}

/// One browser tab owned by exactly one scrape session.
#[async_trait]
pub trait PageSession: Send {
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError>;

    async fn title(&mut self) -> Result<String, BrowserError>;

    async fn reload(&mut self) -> Result<(), BrowserError>;

    /// Number of elements currently matching `locator`.
    async fn count(&mut self, locator: &Locator) -> Result<usize, BrowserError>;

    /// Visible text of the `index`-th match, or `None` if there is no such element.
    async fn text(&mut self, locator: &Locator, index: usize)
        -> Result<Option<String>, BrowserError>;

    async fn click(&mut self, locator: &Locator, index: usize) -> Result<(), BrowserError>;

    /// Focuses the first match, clears it, and types `text` one character at
    /// a time with `pace` between keystrokes.
    async fn type_text(
        &mut self,
        locator: &Locator,
        text: &str,
        pace: Duration,
    ) -> Result<(), BrowserError>;

    async fn press_enter(&mut self, locator: &Locator) -> Result<(), BrowserError>;

    /// Scrolls to the end of the document and returns the new document height.
    async fn scroll_to_bottom(&mut self) -> Result<u64, BrowserError>;

    /// Reads a value from the first element matching `child` inside the
    /// `index`-th element matching `container`.
    ///
    /// `Ok(None)` means the child does not exist in that container.
    async fn child_value(
        &mut self,
        container: &Locator,
        index: usize,
        child: &Locator,
        source: ValueSource,
    ) -> Result<Option<String>, BrowserError>;

    /// Polls until at least one element matches `locator` and returns the
    /// match count.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Timeout`] if nothing matched within `timeout`.
    async fn wait_for(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<usize, BrowserError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let found = self.count(locator).await?;
            if found > 0 {
                return Ok(found);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(BrowserError::Timeout {
                    locator: locator.to_string(),
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                });
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
    }

    /// Releases the page and its browser. Calling it again is a no-op.
    async fn close(&mut self) -> Result<(), BrowserError>;
}

/// Opens a fresh, unshared [`PageSession`] per scrape session.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn open(&self) -> Result<Box<dyn PageSession>, BrowserError>;
}
