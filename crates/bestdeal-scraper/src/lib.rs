pub mod adapter;
pub mod browser;
pub mod error;
pub mod normalize;
pub mod orchestrator;
mod parse;
pub mod recovery;
pub mod registry;
pub mod retry;
pub mod sites;
#[cfg(test)]
mod testing;

pub use adapter::{AdapterSettings, BrowserAdapter, ProductScraper, ScrapeSession, SessionReport, State};
pub use browser::{BrowserLauncher, ChromiumLauncher, Locator, PageSession, ValueSource};
pub use error::{BrowserError, RegistryError, ScrapeFailure};
pub use normalize::normalize_record;
pub use orchestrator::Orchestrator;
pub use recovery::RecoveryHandler;
pub use registry::{Source, SourceRegistry};
pub use retry::{retry_step, StepPolicy, StepRun};
pub use sites::SiteProfile;
