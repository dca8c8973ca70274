use bestdeal_core::Field;

use super::{FieldSpec, LocationFlow, ResultsFlow, SearchFlow, SiteProfile, TRY_AGAIN};
use crate::browser::Locator;
use crate::retry::StepPolicy;

pub static BIGBASKET: SiteProfile = SiteProfile {
    key: "bigbasket",
    name: "BigBasket",
    url: "https://www.bigbasket.com/",
    title_keyword: "bigbasket",
    overlay: TRY_AGAIN,
    navigation: StepPolicy::new(2, 2000),
    click: StepPolicy::new(3, 1000),
    location: LocationFlow {
        open: &[Locator::CssWithText {
            css: "button",
            text: "Select Location",
        }],
        input: Locator::Css("input[placeholder='Search for area or street name']"),
        suggestions: Locator::Css("li.AddressDropdown___StyledMenuItem-sc-i4k67t-7"),
        confirm: None,
        policy: StepPolicy::new(1, 0),
    },
    search: SearchFlow {
        open: None,
        input: Locator::Css("input[placeholder*='Search for Products']"),
        open_policy: StepPolicy::new(2, 3000),
        submit_policy: StepPolicy::new(1, 0),
    },
    results: ResultsFlow {
        cards: Locator::Css("ul.grid-cols-9 > li"),
        policy: StepPolicy::new(5, 2000),
        scroll: None,
    },
    fields: &[
        FieldSpec::text(Field::Name, Locator::Css("h3.block")),
        FieldSpec::text(Field::Brand, Locator::Css("span.BrandName___StyledLabel2-sc-hssfrl-1")),
        FieldSpec::text(Field::Pack, Locator::Css("span.Label-sc-15v1nk5-0.gJxZPQ.truncate")),
        FieldSpec::text(Field::Price, Locator::Css("span.Pricing___StyledLabel-sc-pldi2d-1")),
        FieldSpec::text(Field::Mrp, Locator::Css("span.Pricing___StyledLabel2-sc-pldi2d-2")),
        FieldSpec::text(Field::Discount, Locator::CssWithText { css: "span", text: "% OFF" }),
        FieldSpec::attr(Field::ImageUrl, Locator::Css("img"), "src"),
        FieldSpec::attr(Field::ProductUrl, Locator::Css("a"), "href"),
    ],
    paced_typing: false,
    enabled_by_default: false,
};
