use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bestdeal_core::{ErrorKind, Product, SearchRequest};
use bestdeal_scraper::{Orchestrator, ProductScraper, ScrapeFailure, Source, SourceRegistry};
use rust_decimal::Decimal;

fn product(name: &str, source: &str, price: i64) -> Product {
    Product {
        name: name.to_owned(),
        brand: None,
        pack: None,
        description: None,
        price: Some(Decimal::from(price)),
        mrp: None,
        discount_percent: None,
        eta_minutes: Some(10),
        image_url: None,
        product_url: None,
        source: source.to_owned(),
    }
}

/// Answers every call with the same result.
struct Fixed(Result<Vec<Product>, ScrapeFailure>);

#[async_trait]
impl ProductScraper for Fixed {
    async fn scrape(&self, _location: &str, _query: &str) -> Result<Vec<Product>, ScrapeFailure> {
        self.0.clone()
    }
}

struct Panics;

#[async_trait]
impl ProductScraper for Panics {
    async fn scrape(&self, _location: &str, _query: &str) -> Result<Vec<Product>, ScrapeFailure> {
        panic!("selector exploded");
    }
}

/// Sleeps for `work` and records how many calls overlap.
struct Slow {
    work: Duration,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

#[async_trait]
impl ProductScraper for Slow {
    async fn scrape(&self, _location: &str, _query: &str) -> Result<Vec<Product>, ScrapeFailure> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.work).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(Vec::new())
    }
}

/// Echoes the request back as a product name.
struct Echo;

#[async_trait]
impl ProductScraper for Echo {
    async fn scrape(&self, location: &str, query: &str) -> Result<Vec<Product>, ScrapeFailure> {
        Ok(vec![product(&format!("{query}@{location}"), "Echo", 1)])
    }
}

fn source(name: &str, adapter: impl ProductScraper + 'static) -> Source {
    Source::new(name, Arc::new(adapter))
}

fn onion_in_bengaluru() -> SearchRequest {
    SearchRequest::new("onion", "Bengaluru").unwrap()
}

#[tokio::test]
async fn mixed_outcomes_are_reported_per_source() {
    let five: Vec<Product> = (1..=5).map(|i| product(&format!("Onion {i}"), "A", i * 10)).collect();
    let registry = SourceRegistry::new(vec![
        source("A", Fixed(Ok(five))),
        source(
            "B",
            Fixed(Err(ScrapeFailure::new(
                ErrorKind::NavigationFailed,
                "load_page attempt 3: timed out",
            ))),
        ),
        source("C", Fixed(Ok(Vec::new()))),
    ])
    .unwrap();

    let result = Orchestrator::new(registry, 4).run(&onion_in_bengaluru()).await;

    assert_eq!(result.query, "onion");
    assert_eq!(result.location_used, "Bengaluru");
    assert_eq!(result.results.len(), 3);

    let a = &result.results["A"];
    assert_eq!(a.products.len(), 5);
    assert_eq!(a.error, None);

    let b = &result.results["B"];
    assert!(b.products.is_empty());
    assert_eq!(b.error, Some(ErrorKind::NavigationFailed));
    assert_eq!(b.error_detail.as_deref(), Some("load_page attempt 3: timed out"));

    let c = &result.results["C"];
    assert!(c.products.is_empty());
    assert_eq!(c.error, None);

    assert_eq!(result.total_products(), 5);
    assert_eq!(result.failed_sources(), vec!["B"]);
}

#[tokio::test]
async fn every_source_failing_still_produces_a_result() {
    let failing = |kind| Fixed(Err(ScrapeFailure::new(kind, "gone")));
    let registry = SourceRegistry::new(vec![
        source("Zepto", failing(ErrorKind::LocationSetFailed)),
        source("Blinkit", failing(ErrorKind::SearchUnavailable)),
        source("Instamart", failing(ErrorKind::QuerySubmitFailed)),
    ])
    .unwrap();

    let result = Orchestrator::new(registry, 2).run(&onion_in_bengaluru()).await;

    assert_eq!(result.results.len(), 3);
    assert_eq!(result.failed_sources().len(), 3);
    assert_eq!(result.results["Blinkit"].error, Some(ErrorKind::SearchUnavailable));
}

#[tokio::test]
async fn panicking_adapter_is_isolated() {
    let registry = SourceRegistry::new(vec![
        source("Broken", Panics),
        source("Fine", Fixed(Ok(vec![product("Onion", "Fine", 40)]))),
    ])
    .unwrap();

    let result = Orchestrator::new(registry, 1).run(&onion_in_bengaluru()).await;

    let broken = &result.results["Broken"];
    assert_eq!(broken.error, Some(ErrorKind::UnrecoverableAdapterError));
    assert!(broken.products.is_empty());
    assert!(
        broken
            .error_detail
            .as_deref()
            .is_some_and(|d| d.contains("selector exploded")),
        "{:?}",
        broken.error_detail
    );
    assert_eq!(result.results["Fine"].products.len(), 1);
    assert_eq!(result.results["Fine"].error, None);
}

#[tokio::test]
async fn adapters_receive_the_request() {
    let registry = SourceRegistry::new(vec![source("Echo", Echo)]).unwrap();
    let result = Orchestrator::new(registry, 4).run(&onion_in_bengaluru()).await;
    assert_eq!(result.results["Echo"].products[0].name, "onion@Bengaluru");
}

#[tokio::test(start_paused = true)]
async fn pool_bounds_concurrency_and_wall_clock() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let sources = (0..6)
        .map(|i| {
            source(
                &format!("S{i}"),
                Slow {
                    work: Duration::from_secs(10),
                    in_flight: Arc::clone(&in_flight),
                    peak: Arc::clone(&peak),
                },
            )
        })
        .collect();
    let registry = SourceRegistry::new(sources).unwrap();

    let started = tokio::time::Instant::now();
    let result = Orchestrator::new(registry, 2).run(&onion_in_bengaluru()).await;
    let elapsed = started.elapsed();

    assert_eq!(result.results.len(), 6);
    assert_eq!(peak.load(Ordering::SeqCst), 2);
    assert_eq!(in_flight.load(Ordering::SeqCst), 0);
    // ceil(6 / 2) rounds of 10s each
    assert!(elapsed >= Duration::from_secs(30), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(31), "{elapsed:?}");
    assert!(result.results.values().all(|o| o.elapsed_ms >= 10_000));
}

#[tokio::test]
async fn zero_pool_size_still_runs_everything() {
    let registry = SourceRegistry::new(vec![
        source("A", Fixed(Ok(Vec::new()))),
        source("B", Fixed(Ok(Vec::new()))),
    ])
    .unwrap();
    let orchestrator = Orchestrator::new(registry, 0);
    assert_eq!(orchestrator.pool_size(), 1);

    let result = orchestrator.run(&onion_in_bengaluru()).await;
    assert_eq!(result.results.len(), 2);
}

#[tokio::test]
async fn each_run_gets_a_fresh_request_id() {
    let registry = SourceRegistry::new(vec![source("A", Fixed(Ok(Vec::new())))]).unwrap();
    let orchestrator = Orchestrator::new(registry, 1);
    let first = orchestrator.run(&onion_in_bengaluru()).await;
    let second = orchestrator.run(&onion_in_bengaluru()).await;
    assert_ne!(first.request_id, second.request_id);
}
