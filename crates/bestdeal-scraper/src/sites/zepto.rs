use bestdeal_core::Field;

use super::{FieldSpec, LocationFlow, ResultsFlow, SearchFlow, SiteProfile, TRY_AGAIN};
use crate::browser::Locator;
use crate::retry::StepPolicy;

const CARDS: Locator = Locator::Css("div[data-marketplace='super_saver'] a");

pub static ZEPTO: SiteProfile = SiteProfile {
    key: "zepto",
    name: "Zepto",
    url: "https://www.zepto.com/",
    title_keyword: "zepto",
    overlay: TRY_AGAIN,
    navigation: StepPolicy::new(3, 2000),
    click: StepPolicy::new(3, 1000),
    location: LocationFlow {
        open: &[Locator::Css("button[aria-label='Select Location']")],
        input: Locator::Css("input[placeholder='Search a new address']"),
        suggestions: Locator::Css("div[data-testid='address-search-item']"),
        confirm: Some(Locator::Css("button[data-testid='location-confirm-btn']")),
        policy: StepPolicy::new(2, 3000).with_reload(),
    },
    search: SearchFlow {
        open: Some(Locator::Css("a[data-testid='search-bar-icon']")),
        input: Locator::Css("input[placeholder*='Search for over']"),
        open_policy: StepPolicy::new(2, 3000).with_reload(),
        submit_policy: StepPolicy::new(2, 3000),
    },
    results: ResultsFlow {
        cards: CARDS,
        policy: StepPolicy::new(11, 2000).with_reload(),
        scroll: None,
    },
    fields: &[
        FieldSpec::text(Field::Name, Locator::Css("[data-slot-id='ProductName']")),
        FieldSpec::text(Field::Price, Locator::Css("span.cptQT7")),
        FieldSpec::text(Field::Mrp, Locator::Css("span.cx3iWL")),
        FieldSpec::text(Field::Discount, Locator::Css(".cYCsFo")),
        FieldSpec::text(Field::Pack, Locator::Css("[data-slot-id='PackSize']")),
        FieldSpec::text(Field::DeliveryTime, Locator::Css("[data-slot-id='EtaInformation']")),
        FieldSpec::attr(Field::ImageUrl, Locator::Css("img"), "src"),
    ],
    paced_typing: true,
    enabled_by_default: true,
};
