//! Command handlers for the CLI.
//!
//! Results go to stdout; everything else is logged to stderr.

use std::sync::Arc;

use bestdeal_core::{AppConfig, SearchRequest};
use bestdeal_geo::{GeoLocationResolver, LocationResolver};
use bestdeal_scraper::{sites, ChromiumLauncher, Orchestrator, SourceRegistry};

/// Replaces the configured sources when `--sources` was given.
pub(crate) fn with_source_override(mut config: AppConfig, sources: Option<Vec<String>>) -> AppConfig {
    if let Some(keys) = sources {
        let keys: Vec<String> = keys
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        if !keys.is_empty() {
            config.sources = keys;
        }
    }
    config
}

/// Runs one search across every configured source and prints the
/// aggregate result as pretty JSON.
///
/// # Errors
///
/// Returns an error if the query is blank, a configured source key is
/// unknown, or the result cannot be serialized. Per-source scrape failures
/// are reported inside the result, not as errors.
pub(crate) async fn run_search(
    config: &AppConfig,
    query: &str,
    location: Option<&str>,
) -> anyhow::Result<()> {
    let location = match location.map(str::trim).filter(|l| !l.is_empty()) {
        Some(location) => location.to_owned(),
        None => {
            let resolver = GeoLocationResolver::new(config.geo_timeout_secs)?;
            let resolved = resolver.resolve(None).await;
            tracing::info!(location = %resolved, "no location given, using geolocation");
            resolved
        }
    };
    let request = SearchRequest::new(query, location)?;

    let launcher = Arc::new(ChromiumLauncher::new(config.browser.clone()));
    let registry = SourceRegistry::from_config(config, launcher)?;
    let orchestrator = Orchestrator::new(registry, config.worker_pool_size);

    let result = orchestrator.run(&request).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Prints the location resolved for `ip` (or this machine's public IP).
///
/// # Errors
///
/// Returns an error only if the HTTP client cannot be built.
pub(crate) async fn run_locate(config: &AppConfig, ip: Option<&str>) -> anyhow::Result<()> {
    let resolver = GeoLocationResolver::new(config.geo_timeout_secs)?;
    println!("{}", resolver.resolve(ip).await);
    Ok(())
}

/// One line per known site: key, display name, and whether it runs.
pub(crate) fn source_lines(config: &AppConfig) -> Vec<String> {
    sites::ALL
        .iter()
        .map(|profile| {
            let enabled = config.sources.iter().any(|k| k == profile.key);
            format!(
                "{:<18} {:<18} {}",
                profile.key,
                profile.name,
                if enabled { "enabled" } else { "disabled" }
            )
        })
        .collect()
}

pub(crate) fn run_sources(config: &AppConfig) {
    for line in source_lines(config) {
        println!("{line}");
    }
}
