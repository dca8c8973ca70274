use bestdeal_core::Field;

use super::{FieldSpec, LocationFlow, ResultsFlow, SearchFlow, SiteProfile, TRY_AGAIN};
use crate::browser::Locator;
use crate::retry::StepPolicy;

pub static BLINKIT: SiteProfile = SiteProfile {
    key: "blinkit",
    name: "Blinkit",
    url: "https://blinkit.com/",
    title_keyword: "blinkit",
    overlay: TRY_AGAIN,
    navigation: StepPolicy::new(3, 2000),
    click: StepPolicy::new(3, 1000),
    location: LocationFlow {
        // the locality input is on the landing page itself
        open: &[],
        input: Locator::Css("input[name='select-locality']"),
        suggestions: Locator::Css("div.LocationSearchList__LocationListContainer-sc-93rfr7-0 > div"),
        confirm: None,
        policy: StepPolicy::new(2, 3000).with_reload(),
    },
    search: SearchFlow {
        open: Some(Locator::Css("a.SearchBar__Button-sc-16lps2d-4")),
        input: Locator::Css("input.SearchBarContainer__Input-sc-hl8pft-3"),
        open_policy: StepPolicy::new(2, 3000).with_reload(),
        submit_policy: StepPolicy::new(2, 3000),
    },
    results: ResultsFlow {
        cards: Locator::Css("div[style*='grid-template-columns: repeat(12, 1fr)'] > div"),
        policy: StepPolicy::new(9, 2000).with_reload(),
        scroll: None,
    },
    fields: &[
        FieldSpec::text(Field::Name, Locator::Css("div.tw-font-semibold")),
        FieldSpec::text(Field::Pack, Locator::CssWithText { css: "div", text: "g" }),
        FieldSpec::text(Field::Price, Locator::CssWithText { css: "div", text: "₹" }),
        FieldSpec::text(Field::Mrp, Locator::Css("div[class*='tw-line-through']")),
        FieldSpec::text(Field::Discount, Locator::CssWithText { css: "div", text: "%OFF" }),
        FieldSpec::text(Field::DeliveryTime, Locator::CssWithText { css: "div", text: "mins" }),
        FieldSpec::attr(Field::ImageUrl, Locator::Css("img"), "src"),
    ],
    paced_typing: true,
    enabled_by_default: true,
};
