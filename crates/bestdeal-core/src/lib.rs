mod app_config;
mod config;
mod error;
mod outcome;
mod products;
mod request;

pub use app_config::{AppConfig, BrowserSettings, Environment};
pub use config::{build_app_config, load_app_config, load_app_config_from_env, DEFAULT_SOURCES};
pub use error::{ConfigError, CoreError};
pub use outcome::{AggregateResult, ErrorKind, ScrapeOutcome};
pub use products::{Field, Product, RawProductRecord, UNKNOWN_ETA_MINUTES};
pub use request::SearchRequest;
