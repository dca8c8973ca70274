//! Per-platform data that parameterizes the generic adapter state machine.
//!
//! Selectors change whenever a platform redesigns its markup; when a site
//! breaks, its profile file is normally the only thing that needs editing.

mod bigbasket;
mod blinkit;
mod flipkart_minutes;
mod instamart;
mod zepto;

use std::time::Duration;

use bestdeal_core::Field;

use crate::browser::{Locator, ValueSource};
use crate::retry::StepPolicy;

pub use bigbasket::BIGBASKET;
pub use blinkit::BLINKIT;
pub use flipkart_minutes::FLIPKART_MINUTES;
pub use instamart::INSTAMART;
pub use zepto::ZEPTO;

/// Every shipped profile, in registry order.
pub static ALL: [&SiteProfile; 5] = [&ZEPTO, &BLINKIT, &INSTAMART, &FLIPKART_MINUTES, &BIGBASKET];

/// Looks up a profile by its config key, case-insensitively.
#[must_use]
pub fn by_key(key: &str) -> Option<&'static SiteProfile> {
    ALL.iter()
        .copied()
        .find(|profile| profile.key.eq_ignore_ascii_case(key.trim()))
}

#[derive(Debug)]
pub struct SiteProfile {
    /// Config key, e.g. `"flipkart_minutes"`.
    pub key: &'static str,
    /// Source name reported in results, e.g. `"Flipkart Minutes"`.
    pub name: &'static str,
    pub url: &'static str,
    /// Case-insensitive substring the page title must contain after load.
    pub title_keyword: &'static str,
    /// The site's retryable error control.
    pub overlay: Locator,
    pub navigation: StepPolicy,
    /// Bound for individual clicks inside a step.
    pub click: StepPolicy,
    pub location: LocationFlow,
    pub search: SearchFlow,
    pub results: ResultsFlow,
    pub fields: &'static [FieldSpec],
    /// Type location and query one character at a time.
    pub paced_typing: bool,
    pub enabled_by_default: bool,
}

#[derive(Debug)]
pub struct LocationFlow {
    /// Controls clicked in order before the address input is usable.
    pub open: &'static [Locator],
    pub input: Locator,
    pub suggestions: Locator,
    pub confirm: Option<Locator>,
    pub policy: StepPolicy,
}

#[derive(Debug)]
pub struct SearchFlow {
    /// Control that reveals the query input; `None` when it is always visible.
    pub open: Option<Locator>,
    pub input: Locator,
    pub open_policy: StepPolicy,
    pub submit_policy: StepPolicy,
}

#[derive(Debug)]
pub struct ResultsFlow {
    pub cards: Locator,
    /// Polling bound for the result grid.
    pub policy: StepPolicy,
    /// Lazy-loading sites are scrolled until the page stops growing.
    pub scroll: Option<ScrollToEnd>,
}

#[derive(Debug, Clone, Copy)]
pub struct ScrollToEnd {
    pub max_rounds: u32,
    pub pause: Duration,
}

/// Where one product attribute lives inside a result card.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: Field,
    pub locator: Locator,
    pub source: ValueSource,
}

impl FieldSpec {
    #[must_use]
    pub const fn text(field: Field, locator: Locator) -> Self {
        Self {
            field,
            locator,
            source: ValueSource::Text,
        }
    }

    #[must_use]
    pub const fn attr(field: Field, locator: Locator, name: &'static str) -> Self {
        Self {
            field,
            locator,
            source: ValueSource::Attribute(name),
        }
    }
}

/// The "Try Again" banner most platforms show on a failed client-side fetch.
pub(crate) const TRY_AGAIN: Locator = Locator::CssWithText {
    css: "button",
    text: "Try Again",
};
