//! Scripted in-memory page for state machine tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::browser::{Locator, PageSession, ValueSource};
use crate::error::BrowserError;

#[derive(Debug, Default)]
pub(crate) struct PageScript {
    pub title: String,
    /// Number of upcoming `goto` calls that fail.
    pub goto_failures: u32,
    /// Steady-state match counts.
    pub counts: HashMap<Locator, usize>,
    /// Counts returned (front first) before falling back to `counts`.
    pub count_sequence: HashMap<Locator, VecDeque<usize>>,
    /// Locators whose count fails as if the page had gone away.
    pub broken_counts: HashSet<Locator>,
    pub texts: HashMap<Locator, Vec<String>>,
    /// Locators whose clicks always fail.
    pub broken_clicks: HashSet<Locator>,
    /// Locators whose typing fails.
    pub broken_inputs: HashSet<Locator>,
    /// Child values keyed by container index and child locator.
    pub children: HashMap<(usize, Locator), String>,
    /// Child lookups that raise a page error instead of returning a value.
    pub broken_children: HashSet<(usize, Locator)>,
    /// Heights returned by successive `scroll_to_bottom` calls; the last one repeats.
    pub scroll_heights: VecDeque<u64>,
    /// Remaining overlay appearances for a recovery control.
    pub overlays: HashMap<Locator, usize>,
    pub events: Vec<String>,
    pub closed: u32,
}

/// Cloneable handle: the session owns one clone, the test keeps another.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedPage(Arc<Mutex<PageScript>>);

impl ScriptedPage {
    pub fn new(title: &str) -> Self {
        let page = Self::default();
        page.script().title = title.to_owned();
        page
    }

    pub fn script(&self) -> MutexGuard<'_, PageScript> {
        self.0.lock().unwrap()
    }

    pub fn with_count(self, locator: Locator, count: usize) -> Self {
        self.script().counts.insert(locator, count);
        self
    }

    pub fn with_texts(self, locator: Locator, texts: &[&str]) -> Self {
        self.script()
            .texts
            .insert(locator, texts.iter().map(|t| (*t).to_owned()).collect());
        self.with_count(locator, texts.len())
    }

    pub fn with_child(self, index: usize, child: Locator, value: &str) -> Self {
        self.script().children.insert((index, child), value.to_owned());
        self
    }

    pub fn events(&self) -> Vec<String> {
        self.script().events.clone()
    }

    pub fn count_events(&self, prefix: &str) -> usize {
        self.script()
            .events
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }

    fn log(&self, event: String) {
        self.script().events.push(event);
    }
}

#[async_trait]
impl PageSession for ScriptedPage {
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        self.log(format!("goto {url}"));
        let mut script = self.script();
        if script.goto_failures > 0 {
            script.goto_failures -= 1;
            return Err(BrowserError::Navigation {
                url: url.to_owned(),
                reason: "net::ERR_CONNECTION_RESET".to_owned(),
            });
        }
        Ok(())
    }

    async fn title(&mut self) -> Result<String, BrowserError> {
        Ok(self.script().title.clone())
    }

    async fn reload(&mut self) -> Result<(), BrowserError> {
        self.log("reload".to_owned());
        Ok(())
    }

    async fn count(&mut self, locator: &Locator) -> Result<usize, BrowserError> {
        let mut script = self.script();
        if script.broken_counts.contains(locator) {
            return Err(BrowserError::Closed);
        }
        if let Some(remaining) = script.overlays.get(locator) {
            return Ok(*remaining);
        }
        if let Some(next) = script
            .count_sequence
            .get_mut(locator)
            .and_then(VecDeque::pop_front)
        {
            return Ok(next);
        }
        Ok(script.counts.get(locator).copied().unwrap_or(0))
    }

    async fn text(
        &mut self,
        locator: &Locator,
        index: usize,
    ) -> Result<Option<String>, BrowserError> {
        Ok(self
            .script()
            .texts
            .get(locator)
            .and_then(|texts| texts.get(index).cloned()))
    }

    async fn click(&mut self, locator: &Locator, index: usize) -> Result<(), BrowserError> {
        self.log(format!("click {locator}#{index}"));
        let mut script = self.script();
        if let Some(remaining) = script.overlays.get_mut(locator) {
            *remaining = remaining.saturating_sub(1);
            return Ok(());
        }
        if script.broken_clicks.contains(locator) {
            return Err(BrowserError::ElementNotFound(locator.to_string()));
        }
        Ok(())
    }

    async fn type_text(
        &mut self,
        locator: &Locator,
        text: &str,
        _pace: Duration,
    ) -> Result<(), BrowserError> {
        self.log(format!("type {locator} {text}"));
        if self.script().broken_inputs.contains(locator) {
            return Err(BrowserError::ElementNotFound(locator.to_string()));
        }
        Ok(())
    }

    async fn press_enter(&mut self, locator: &Locator) -> Result<(), BrowserError> {
        self.log(format!("enter {locator}"));
        Ok(())
    }

    async fn scroll_to_bottom(&mut self) -> Result<u64, BrowserError> {
        self.log("scroll".to_owned());
        let mut script = self.script();
        let height = if script.scroll_heights.len() > 1 {
            script.scroll_heights.pop_front()
        } else {
            script.scroll_heights.front().copied()
        };
        Ok(height.unwrap_or(0))
    }

    async fn child_value(
        &mut self,
        _container: &Locator,
        index: usize,
        child: &Locator,
        _source: ValueSource,
    ) -> Result<Option<String>, BrowserError> {
        let script = self.script();
        if script.broken_children.contains(&(index, *child)) {
            return Err(BrowserError::Script("stale element".to_owned()));
        }
        Ok(script.children.get(&(index, *child)).cloned())
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.log("close".to_owned());
        self.script().closed += 1;
        Ok(())
    }
}

pub(crate) mod shop {
    //! A small fictional storefront profile with instant retries.

    use bestdeal_core::Field;

    use super::ScriptedPage;
    use crate::browser::Locator;
    use crate::retry::StepPolicy;
    use crate::sites::{FieldSpec, LocationFlow, ResultsFlow, SearchFlow, SiteProfile};

    pub const OVERLAY: Locator = Locator::CssWithText {
        css: "button",
        text: "Try Again",
    };
    pub const OPEN_LOCATION: Locator = Locator::Css("button.location");
    pub const ADDRESS: Locator = Locator::Css("input.address");
    pub const SUGGESTIONS: Locator = Locator::Css("li.suggestion");
    pub const CONFIRM: Locator = Locator::Css("button.confirm");
    pub const SEARCH_OPEN: Locator = Locator::Css("a.search");
    pub const QUERY: Locator = Locator::Css("input.query");
    pub const CARDS: Locator = Locator::Css("div.card");
    pub const NAME: Locator = Locator::Css("h3");
    pub const PRICE: Locator = Locator::Css("span.price");
    pub const MRP: Locator = Locator::Css("span.mrp");
    pub const ETA: Locator = Locator::Css("span.eta");

    pub static SHOP: SiteProfile = SiteProfile {
        key: "shop",
        name: "Shop",
        url: "https://shop.test/",
        title_keyword: "shop",
        overlay: OVERLAY,
        navigation: StepPolicy::new(3, 1000),
        click: StepPolicy::new(2, 100),
        location: LocationFlow {
            open: &[OPEN_LOCATION],
            input: ADDRESS,
            suggestions: SUGGESTIONS,
            confirm: Some(CONFIRM),
            policy: StepPolicy::new(2, 500).with_reload(),
        },
        search: SearchFlow {
            open: Some(SEARCH_OPEN),
            input: QUERY,
            open_policy: StepPolicy::new(2, 500),
            submit_policy: StepPolicy::new(1, 0),
        },
        results: ResultsFlow {
            cards: CARDS,
            policy: StepPolicy::new(4, 2000).with_reload(),
            scroll: None,
        },
        fields: &[
            FieldSpec::text(Field::Name, NAME),
            FieldSpec::text(Field::Price, PRICE),
            FieldSpec::text(Field::Mrp, MRP),
            FieldSpec::text(Field::DeliveryTime, ETA),
        ],
        paced_typing: true,
        enabled_by_default: false,
    };

    /// A page on which every step of [`SHOP`] succeeds first time, with two cards.
    pub fn ready_page() -> ScriptedPage {
        ScriptedPage::new("Shop | Groceries in minutes")
            .with_count(OPEN_LOCATION, 1)
            .with_count(ADDRESS, 1)
            .with_texts(SUGGESTIONS, &["Mumbai Central", "Bengaluru Palace Road"])
            .with_count(CONFIRM, 1)
            .with_count(SEARCH_OPEN, 1)
            .with_count(QUERY, 1)
            .with_count(CARDS, 2)
            .with_child(0, NAME, "Onion")
            .with_child(0, PRICE, "₹45")
            .with_child(0, ETA, "12 mins")
            .with_child(1, NAME, "Red Onion")
            .with_child(1, PRICE, "₹60")
            .with_child(1, MRP, "₹75")
    }
}
