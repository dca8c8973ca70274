//! Caller-to-delivery-location resolution for searches that omit a location.

mod error;
mod resolver;
mod types;

pub use error::GeoError;
pub use resolver::{GeoEndpoints, GeoLocationResolver, LocationResolver, UNKNOWN_LOCATION};
