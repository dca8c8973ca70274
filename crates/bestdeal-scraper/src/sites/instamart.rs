use bestdeal_core::Field;

use super::{FieldSpec, LocationFlow, ResultsFlow, SearchFlow, SiteProfile};
use crate::browser::Locator;
use crate::retry::StepPolicy;

pub static INSTAMART: SiteProfile = SiteProfile {
    key: "instamart",
    name: "Instamart",
    url: "https://www.swiggy.com/instamart",
    title_keyword: "instamart",
    overlay: Locator::Css("div[data-testid='error-button'] button"),
    navigation: StepPolicy::new(3, 2000),
    click: StepPolicy::new(3, 1000),
    location: LocationFlow {
        open: &[
            Locator::Css("div[data-testid='DEFAULT_ADDRESS_CONTAINER']"),
            Locator::Css("div[data-testid='search-location']"),
        ],
        input: Locator::Css("input[placeholder*='Search for area']"),
        suggestions: Locator::Css("div._11n32"),
        confirm: Some(Locator::CssWithText {
            css: "button",
            text: "Confirm Location",
        }),
        policy: StepPolicy::new(3, 4000).with_reload(),
    },
    search: SearchFlow {
        open: Some(Locator::Css("div._1AaZg")),
        input: Locator::Css("input[data-testid='search-page-header-search-bar-input']"),
        open_policy: StepPolicy::new(3, 3000).with_reload(),
        submit_policy: StepPolicy::new(1, 0),
    },
    results: ResultsFlow {
        cards: Locator::Css("div[data-testid='item-collection-card-full']"),
        policy: StepPolicy::new(15, 2000),
        scroll: None,
    },
    fields: &[
        FieldSpec::text(Field::Name, Locator::Css("div.sc-gEvEer.bvSpbA")),
        FieldSpec::text(Field::Description, Locator::Css("div.sc-gEvEer.diZRny")),
        FieldSpec::text(Field::Pack, Locator::Css("div.sc-gEvEer.bCqPoH")),
        FieldSpec::text(Field::Price, Locator::Css("div.sc-gEvEer.iQcBUp")),
        FieldSpec::text(Field::Mrp, Locator::Css("div.sc-gEvEer.fULQHN")),
        FieldSpec::text(
            Field::Discount,
            Locator::Css("div[data-testid='item-offer-label-discount-text']"),
        ),
        FieldSpec::text(Field::DeliveryTime, Locator::Css("div._2zIRo div")),
        FieldSpec::attr(Field::ImageUrl, Locator::Css("img._16I1D"), "src"),
    ],
    paced_typing: true,
    enabled_by_default: true,
};
