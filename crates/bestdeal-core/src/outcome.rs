//! Per-source outcomes and the aggregate result of one search.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::products::Product;

/// Terminal failure kinds for a single source's scrape session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The platform page could not be opened or never passed the identity check.
    NavigationFailed,
    /// The delivery location could not be entered, picked, or confirmed.
    LocationSetFailed,
    /// The search surface never became interactive.
    SearchUnavailable,
    /// The query could not be typed or submitted.
    QuerySubmitFailed,
    /// No result cards appeared within the polling bound. Soft by default:
    /// only reported when empty results are configured to count as errors.
    NoResultsOrTimeout,
    /// Anything else, including a browser that failed to launch or an adapter
    /// that panicked.
    UnrecoverableAdapterError,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NavigationFailed => "NavigationFailed",
            ErrorKind::LocationSetFailed => "LocationSetFailed",
            ErrorKind::SearchUnavailable => "SearchUnavailable",
            ErrorKind::QuerySubmitFailed => "QuerySubmitFailed",
            ErrorKind::NoResultsOrTimeout => "NoResultsOrTimeout",
            ErrorKind::UnrecoverableAdapterError => "UnrecoverableAdapterError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one source produced for one request.
///
/// `products` empty with `error: None` is a genuine "no results" answer and is
/// distinct from a failure. When `error` is set, `products` is always empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeOutcome {
    pub source: String,
    pub products: Vec<Product>,
    pub error: Option<ErrorKind>,
    /// Human-readable cause of `error`, e.g. the last browser error seen.
    pub error_detail: Option<String>,
    pub elapsed_ms: u64,
}

impl ScrapeOutcome {
    #[must_use]
    pub fn success(source: impl Into<String>, products: Vec<Product>, elapsed_ms: u64) -> Self {
        Self {
            source: source.into(),
            products,
            error: None,
            error_detail: None,
            elapsed_ms,
        }
    }

    #[must_use]
    pub fn failure(
        source: impl Into<String>,
        kind: ErrorKind,
        detail: impl Into<String>,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            source: source.into(),
            products: Vec::new(),
            error: Some(kind),
            error_detail: Some(detail.into()),
            elapsed_ms,
        }
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// The single artifact returned for a search: one outcome per configured source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub request_id: Uuid,
    pub query: String,
    pub location_used: String,
    /// Keyed by source name; always holds exactly one entry per registered source.
    pub results: BTreeMap<String, ScrapeOutcome>,
    pub completed_at: DateTime<Utc>,
}

impl AggregateResult {
    /// Total number of products across every source.
    #[must_use]
    pub fn total_products(&self) -> usize {
        self.results.values().map(|o| o.products.len()).sum()
    }

    /// Names of sources whose session ended in an error, in name order.
    #[must_use]
    pub fn failed_sources(&self) -> Vec<&str> {
        self.results
            .values()
            .filter(|o| o.is_failure())
            .map(|o| o.source.as_str())
            .collect()
    }

    /// Iterates every product from every source.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.results.values().flat_map(|o| o.products.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(source: &str) -> Product {
        Product {
            name: "Onion".to_owned(),
            brand: None,
            pack: None,
            description: None,
            price: None,
            mrp: None,
            discount_percent: None,
            eta_minutes: None,
            image_url: None,
            product_url: None,
            source: source.to_owned(),
        }
    }

    #[test]
    fn failure_outcome_has_no_products() {
        let outcome = ScrapeOutcome::failure("Blinkit", ErrorKind::NavigationFailed, "timeout", 10);
        assert!(outcome.is_failure());
        assert!(outcome.products.is_empty());
        assert_eq!(outcome.error_detail.as_deref(), Some("timeout"));
    }

    #[test]
    fn empty_success_is_not_a_failure() {
        let outcome = ScrapeOutcome::success("Zepto", Vec::new(), 5);
        assert!(!outcome.is_failure());
        assert!(outcome.products.is_empty());
    }

    #[test]
    fn aggregate_helpers_count_and_list_failures() {
        let mut results = BTreeMap::new();
        results.insert(
            "A".to_owned(),
            ScrapeOutcome::success("A", vec![product("A"), product("A")], 1),
        );
        results.insert(
            "B".to_owned(),
            ScrapeOutcome::failure("B", ErrorKind::SearchUnavailable, "gone", 1),
        );
        let aggregate = AggregateResult {
            request_id: Uuid::new_v4(),
            query: "onion".to_owned(),
            location_used: "Bengaluru".to_owned(),
            results,
            completed_at: Utc::now(),
        };
        assert_eq!(aggregate.total_products(), 2);
        assert_eq!(aggregate.failed_sources(), vec!["B"]);
        assert_eq!(aggregate.products().count(), 2);
    }

    #[test]
    fn error_kind_serializes_by_name() {
        let json = serde_json::to_value(ErrorKind::QuerySubmitFailed).unwrap();
        assert_eq!(json, "QuerySubmitFailed");
        assert_eq!(ErrorKind::QuerySubmitFailed.to_string(), "QuerySubmitFailed");
    }
}
