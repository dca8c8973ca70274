//! Chromium backend over the DevTools protocol.

use std::time::Duration;

use async_trait::async_trait;
use bestdeal_core::BrowserSettings;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use super::{script, BrowserLauncher, Locator, PageSession, ValueSource};
use crate::error::BrowserError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Launches one Chromium process per session, or opens a fresh tab on a
/// remote browser when a DevTools URL is configured.
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    settings: BrowserSettings,
}

impl ChromiumLauncher {
    #[must_use]
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    fn config(&self) -> Result<BrowserConfig, BrowserError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(REQUEST_TIMEOUT)
            .window_size(1920, 1080)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-notifications")
            .arg("--disable-infobars")
            .arg("--disable-blink-features=AutomationControlled");
        if !self.settings.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.settings.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(BrowserError::Launch)
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn open(&self) -> Result<Box<dyn PageSession>, BrowserError> {
        let owns_process = self.settings.remote_url.is_none();
        let (browser, mut handler) = match &self.settings.remote_url {
            Some(url) => {
                tracing::debug!("connecting to remote browser");
                Browser::connect(url)
                    .await
                    .map_err(|e| BrowserError::Launch(e.to_string()))?
            }
            None => Browser::launch(self.config()?)
                .await
                .map_err(|e| BrowserError::Launch(e.to_string()))?,
        };

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(BrowserError::Launch(e.to_string()));
            }
        };
        if let Err(e) = page.set_user_agent(self.settings.user_agent.clone()).await {
            handler_task.abort();
            return Err(BrowserError::Launch(e.to_string()));
        }

        Ok(Box::new(ChromiumPage {
            page: Some(page),
            browser: Some(browser),
            handler_task,
            owns_process,
        }))
    }
}

/// One tab plus the browser it lives in. Dropping it without calling
/// [`PageSession::close`] still stops the event handler, and a launched
/// browser process is killed when its `Browser` is dropped.
struct ChromiumPage {
    page: Option<Page>,
    browser: Option<Browser>,
    handler_task: JoinHandle<()>,
    owns_process: bool,
}

impl ChromiumPage {
    fn page(&self) -> Result<&Page, BrowserError> {
        self.page.as_ref().ok_or(BrowserError::Closed)
    }

    async fn eval<T: serde::de::DeserializeOwned>(&self, js: String) -> Result<T, BrowserError> {
        self.page()?
            .evaluate(js)
            .await?
            .into_value::<T>()
            .map_err(|e| BrowserError::Script(e.to_string()))
    }

    /// Resolves a locator to a CDP element handle by tagging it in-page.
    async fn element(
        &self,
        locator: &Locator,
        index: usize,
        clear: bool,
    ) -> Result<Element, BrowserError> {
        let found: bool = self.eval(script::mark(locator, index, clear)).await?;
        if !found {
            return Err(BrowserError::ElementNotFound(locator.to_string()));
        }
        Ok(self
            .page()?
            .find_element(format!("[{}]", script::MARK_ATTRIBUTE))
            .await?)
    }
}

#[async_trait]
impl PageSession for ChromiumPage {
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        self.page()?
            .goto(url)
            .await
            .map_err(|e| BrowserError::Navigation {
                url: url.to_owned(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn title(&mut self) -> Result<String, BrowserError> {
        Ok(self.page()?.get_title().await?.unwrap_or_default())
    }

    async fn reload(&mut self) -> Result<(), BrowserError> {
        self.page()?.reload().await?;
        Ok(())
    }

    async fn count(&mut self, locator: &Locator) -> Result<usize, BrowserError> {
        self.eval(script::count(locator)).await
    }

    async fn text(
        &mut self,
        locator: &Locator,
        index: usize,
    ) -> Result<Option<String>, BrowserError> {
        self.eval(script::text(locator, index)).await
    }

    async fn click(&mut self, locator: &Locator, index: usize) -> Result<(), BrowserError> {
        let clicked: bool = self.eval(script::click(locator, index)).await?;
        if clicked {
            Ok(())
        } else {
            Err(BrowserError::ElementNotFound(locator.to_string()))
        }
    }

    async fn type_text(
        &mut self,
        locator: &Locator,
        text: &str,
        pace: Duration,
    ) -> Result<(), BrowserError> {
        let element = self.element(locator, 0, true).await?;
        element.click().await?;
        if pace.is_zero() {
            element.type_str(text).await?;
            return Ok(());
        }
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            element.type_str(ch.encode_utf8(&mut buf)).await?;
            tokio::time::sleep(pace).await;
        }
        Ok(())
    }

    async fn press_enter(&mut self, locator: &Locator) -> Result<(), BrowserError> {
        let element = self.element(locator, 0, false).await?;
        element.press_key("Enter").await?;
        Ok(())
    }

    async fn scroll_to_bottom(&mut self) -> Result<u64, BrowserError> {
        self.eval(script::SCROLL_TO_BOTTOM.to_owned()).await
    }

    async fn child_value(
        &mut self,
        container: &Locator,
        index: usize,
        child: &Locator,
        source: ValueSource,
    ) -> Result<Option<String>, BrowserError> {
        self.eval(script::child_value(container, index, child, source))
            .await
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        let mut first_err = None;
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                first_err = Some(BrowserError::from(e));
            }
        }
        if let Some(mut browser) = self.browser.take() {
            if self.owns_process {
                if let Err(e) = browser.close().await {
                    first_err.get_or_insert(BrowserError::from(e));
                }
                if let Err(e) = browser.wait().await {
                    first_err.get_or_insert(BrowserError::Protocol(e.to_string()));
                }
            }
        }
        self.handler_task.abort();
        first_err.map_or(Ok(()), Err)
    }
}

impl Drop for ChromiumPage {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;

    use super::*;

    fn settings() -> BrowserSettings {
        BrowserSettings {
            headless: true,
            chrome_executable: Some("/usr/bin/chromium".into()),
            remote_url: None,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) bestdeal-test".to_owned(),
        }
    }

    #[test]
    fn configured_user_agent_converts_to_override_params() {
        let params: SetUserAgentOverrideParams = settings().user_agent.into();
        assert_eq!(params.user_agent, settings().user_agent);
        assert!(params.accept_language.is_none());
    }

    #[test]
    fn explicit_executable_builds_config_without_discovery() {
        let launcher = ChromiumLauncher::new(settings());
        assert!(launcher.config().is_ok());
    }
}
