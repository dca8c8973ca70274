use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// ETA reported for a product whose delivery time text could not be parsed.
///
/// Large enough that sorting by ETA puts unknowns last.
pub const UNKNOWN_ETA_MINUTES: u32 = 9999;

/// The attributes a site adapter may extract from one result card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Brand,
    Pack,
    Description,
    Price,
    Mrp,
    Discount,
    DeliveryTime,
    ImageUrl,
    ProductUrl,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Name,
        Field::Brand,
        Field::Pack,
        Field::Description,
        Field::Price,
        Field::Mrp,
        Field::Discount,
        Field::DeliveryTime,
        Field::ImageUrl,
        Field::ProductUrl,
    ];

    /// Key under which this field is stored in a [`RawProductRecord`].
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Brand => "brand",
            Field::Pack => "pack",
            Field::Description => "description",
            Field::Price => "price",
            Field::Mrp => "mrp",
            Field::Discount => "discount",
            Field::DeliveryTime => "delivery_time",
            Field::ImageUrl => "image_url",
            Field::ProductUrl => "product_url",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Field values exactly as scraped from one result card.
///
/// A key that is present with an empty value means the site defines the field
/// but it could not be read from this card. A missing key means the site does
/// not expose the field at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawProductRecord(BTreeMap<String, String>);

impl RawProductRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field, value: impl Into<String>) {
        self.0.insert(field.key().to_owned(), value.into());
    }

    #[must_use]
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(field.key()).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(field.key())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A product listing normalized for comparison across delivery platforms.
///
/// Every optional field distinguishes "absent" from zero: a product with no
/// parseable MRP has `mrp: None`, never `Some(0)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub brand: Option<String>,
    /// Pack size or weight as displayed, e.g. `"500 g"` or `"1 kg"`.
    pub pack: Option<String>,
    pub description: Option<String>,
    /// Selling price in rupees. Never negative.
    pub price: Option<Decimal>,
    /// Printed maximum retail price. Never negative.
    pub mrp: Option<Decimal>,
    /// Always within `0..=100` when present.
    pub discount_percent: Option<Decimal>,
    /// Delivery ETA in minutes; [`UNKNOWN_ETA_MINUTES`] when the site showed
    /// an ETA that could not be parsed, `None` when the site shows none.
    pub eta_minutes: Option<u32>,
    pub image_url: Option<String>,
    pub product_url: Option<String>,
    /// Name of the source the listing came from, e.g. `"Zepto"`.
    pub source: String,
}

impl Product {
    /// Returns `true` if the MRP is strictly higher than the selling price.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        matches!((self.price, self.mrp), (Some(price), Some(mrp)) if mrp > price)
    }
}

/// Renders a normalized product back into the raw text a site would show, so
/// the record normalizes to the same product again.
impl From<&Product> for RawProductRecord {
    fn from(product: &Product) -> Self {
        let mut record = RawProductRecord::new().with(Field::Name, product.name.clone());
        let text_fields = [
            (Field::Brand, &product.brand),
            (Field::Pack, &product.pack),
            (Field::Description, &product.description),
            (Field::ImageUrl, &product.image_url),
            (Field::ProductUrl, &product.product_url),
        ];
        for (field, value) in text_fields {
            if let Some(value) = value {
                record.insert(field, value.clone());
            }
        }
        if let Some(price) = product.price {
            record.insert(Field::Price, format!("₹{price}"));
        }
        if let Some(mrp) = product.mrp {
            record.insert(Field::Mrp, format!("₹{mrp}"));
        }
        if let Some(discount) = product.discount_percent {
            record.insert(Field::Discount, format!("{discount}% OFF"));
        }
        if let Some(eta) = product.eta_minutes {
            record.insert(Field::DeliveryTime, format!("{eta} mins"));
        }
        record
    }
}
