use std::time::Duration;

use bestdeal_core::Field;

use super::{FieldSpec, LocationFlow, ResultsFlow, ScrollToEnd, SearchFlow, SiteProfile, TRY_AGAIN};
use crate::browser::Locator;
use crate::retry::StepPolicy;

pub static FLIPKART_MINUTES: SiteProfile = SiteProfile {
    key: "flipkart_minutes",
    name: "Flipkart Minutes",
    url: "https://www.flipkart.com/flipkart-minutes-store?marketplace=HYPERLOCAL",
    title_keyword: "flipkart",
    overlay: TRY_AGAIN,
    navigation: StepPolicy::new(2, 2000),
    click: StepPolicy::new(3, 1000),
    location: LocationFlow {
        open: &[Locator::CssWithText {
            css: "div",
            text: "Enter location manually",
        }],
        input: Locator::Css("input#search"),
        suggestions: Locator::Css("ul > li[class*='_']"),
        confirm: Some(Locator::Css("input[type='submit'][value='Confirm']")),
        policy: StepPolicy::new(2, 2000),
    },
    search: SearchFlow {
        open: None,
        input: Locator::Css("input.Pke_EE[placeholder*='Search in Flipkart Minutes']"),
        open_policy: StepPolicy::new(2, 2000),
        submit_policy: StepPolicy::new(2, 2000),
    },
    results: ResultsFlow {
        cards: Locator::Css("div.VPqDeq div[style*='padding: 16px']"),
        policy: StepPolicy::new(3, 2000),
        scroll: Some(ScrollToEnd {
            max_rounds: 30,
            pause: Duration::from_millis(1500),
        }),
    },
    fields: &[
        FieldSpec::text(Field::Name, Locator::Css("a")),
        FieldSpec::text(Field::Price, Locator::CssWithText { css: "div", text: "₹" }),
        FieldSpec::text(Field::Discount, Locator::CssWithText { css: "*", text: "%" }),
        FieldSpec::attr(Field::ImageUrl, Locator::Css("img"), "src"),
        FieldSpec::attr(Field::ProductUrl, Locator::Css("a"), "href"),
    ],
    paced_typing: true,
    enabled_by_default: false,
};
