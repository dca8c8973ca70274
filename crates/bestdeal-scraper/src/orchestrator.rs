//! Fan-out of one search to every registered source, and fan-in of their
//! outcomes into a single [`AggregateResult`].

use std::collections::BTreeMap;
use std::sync::Arc;

use bestdeal_core::{AggregateResult, ErrorKind, ScrapeOutcome, SearchRequest};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio::task::JoinError;
use tokio::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::registry::{Source, SourceRegistry};

/// Runs every source of a registry for each request under a bounded pool.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    registry: Arc<SourceRegistry>,
    pool_size: usize,
}

impl Orchestrator {
    /// `pool_size` is the most sessions in flight at once; `0` is treated as `1`.
    #[must_use]
    pub fn new(registry: SourceRegistry, pool_size: usize) -> Self {
        Self {
            registry: Arc::new(registry),
            pool_size: pool_size.max(1),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    #[must_use]
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Scrapes every source and waits for all of them.
    ///
    /// Never fails: each source's failure, including a panic inside its
    /// adapter, is recorded in that source's outcome. The result always holds
    /// exactly one entry per registered source.
    pub async fn run(&self, request: &SearchRequest) -> AggregateResult {
        let request_id = Uuid::new_v4();
        tracing::info!(
            %request_id,
            query = request.query(),
            location = request.location(),
            sources = self.registry.len(),
            pool_size = self.pool_size,
            "starting search"
        );

        let results: BTreeMap<String, ScrapeOutcome> = stream::iter(self.registry.iter().cloned())
            .map(|source| {
                run_source(
                    source,
                    request.query().to_owned(),
                    request.location().to_owned(),
                    request_id,
                )
            })
            .buffer_unordered(self.pool_size)
            .map(|outcome| (outcome.source.clone(), outcome))
            .collect()
            .await;

        let aggregate = AggregateResult {
            request_id,
            query: request.query().to_owned(),
            location_used: request.location().to_owned(),
            results,
            completed_at: Utc::now(),
        };

        let failed = aggregate.failed_sources();
        if failed.is_empty() {
            tracing::info!(%request_id, products = aggregate.total_products(), "search complete");
        } else {
            tracing::warn!(
                %request_id,
                products = aggregate.total_products(),
                failed = ?failed,
                "search complete with failed sources"
            );
        }
        aggregate
    }
}

/// One source's session on its own task, so a panic surfaces as a
/// [`JoinError`] instead of unwinding into the join.
async fn run_source(source: Source, query: String, location: String, request_id: Uuid) -> ScrapeOutcome {
    let span = tracing::info_span!("scrape_session", source = %source.name, %request_id);
    let started = Instant::now();

    let adapter = Arc::clone(&source.adapter);
    let joined = tokio::spawn(
        async move { adapter.scrape(&location, &query).await }.instrument(span.clone()),
    )
    .await;

    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let outcome = match joined {
        Ok(Ok(products)) => ScrapeOutcome::success(source.name, products, elapsed_ms),
        Ok(Err(failure)) => {
            ScrapeOutcome::failure(source.name, failure.kind, failure.message, elapsed_ms)
        }
        Err(join_error) => ScrapeOutcome::failure(
            source.name,
            ErrorKind::UnrecoverableAdapterError,
            join_failure_detail(join_error),
            elapsed_ms,
        ),
    };

    span.in_scope(|| match outcome.error {
        None => tracing::info!(products = outcome.products.len(), elapsed_ms, "source finished"),
        Some(kind) => tracing::warn!(
            kind = %kind,
            detail = outcome.error_detail.as_deref().unwrap_or_default(),
            elapsed_ms,
            "source failed"
        ),
    });
    outcome
}

fn join_failure_detail(err: JoinError) -> String {
    if !err.is_panic() {
        return format!("session task did not complete: {err}");
    }
    let payload = err.into_panic();
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned());
    format!("adapter panicked: {message}")
}
