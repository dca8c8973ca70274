//! Conversion from scraped card text to the canonical [`Product`].
//!
//! Number parsing is delegated to [`crate::parse`]; this module decides which
//! raw fields map to which product attributes and what "absent" means.

use bestdeal_core::{Field, Product, RawProductRecord};

use crate::parse::{parse_discount, parse_eta_minutes, parse_price};

/// Normalizes one raw record scraped from `source`.
///
/// Pure and infallible: every field is interpreted independently and a field
/// that is missing or unreadable becomes `None` rather than failing the
/// record. A present-but-unparseable delivery time becomes
/// [`bestdeal_core::UNKNOWN_ETA_MINUTES`]; a missing one stays `None`.
#[must_use]
pub fn normalize_record(record: &RawProductRecord, source: &str) -> Product {
    Product {
        name: record.get(Field::Name).map(str::trim).unwrap_or_default().to_owned(),
        brand: text(record, Field::Brand),
        pack: text(record, Field::Pack),
        description: text(record, Field::Description),
        price: record.get(Field::Price).and_then(parse_price),
        mrp: record.get(Field::Mrp).and_then(parse_price),
        discount_percent: record.get(Field::Discount).and_then(parse_discount),
        eta_minutes: record.get(Field::DeliveryTime).map(parse_eta_minutes),
        image_url: text(record, Field::ImageUrl),
        product_url: text(record, Field::ProductUrl),
        source: source.to_owned(),
    }
}

/// Trimmed text of `field`, with empty text treated as absent.
fn text(record: &RawProductRecord, field: Field) -> Option<String> {
    record
        .get(field)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
