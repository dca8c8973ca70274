//! The process-wide, read-only set of sources a search fans out to.

use std::collections::HashSet;
use std::sync::Arc;

use bestdeal_core::AppConfig;

use crate::adapter::{AdapterSettings, BrowserAdapter, ProductScraper};
use crate::browser::BrowserLauncher;
use crate::error::RegistryError;
use crate::sites;

/// A named scrape capability.
#[derive(Clone)]
pub struct Source {
    pub name: String,
    pub adapter: Arc<dyn ProductScraper>,
}

impl Source {
    #[must_use]
    pub fn new(name: impl Into<String>, adapter: Arc<dyn ProductScraper>) -> Self {
        Self {
            name: name.into(),
            adapter,
        }
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Registered sources in insertion order. Names are unique, so every search
/// yields exactly one outcome per entry.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: Vec<Source>,
}

impl SourceRegistry {
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateSource`] if two sources share a name.
    pub fn new(sources: Vec<Source>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::with_capacity(sources.len());
        for source in &sources {
            if !seen.insert(source.name.as_str()) {
                return Err(RegistryError::DuplicateSource(source.name.clone()));
            }
        }
        Ok(Self { sources })
    }

    /// Builds one [`BrowserAdapter`] per site key in `config.sources`, all
    /// sharing `launcher`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownSource`] for a key with no site
    /// profile, [`RegistryError::Empty`] if no keys are configured, and
    /// [`RegistryError::DuplicateSource`] if two keys name the same site.
    pub fn from_config(
        config: &AppConfig,
        launcher: Arc<dyn BrowserLauncher>,
    ) -> Result<Self, RegistryError> {
        if config.sources.is_empty() {
            return Err(RegistryError::Empty);
        }
        let settings = AdapterSettings::from_config(config);
        let sources = config
            .sources
            .iter()
            .map(|key| {
                let profile =
                    sites::by_key(key).ok_or_else(|| RegistryError::UnknownSource(key.clone()))?;
                let adapter =
                    BrowserAdapter::new(profile, Arc::clone(&launcher), settings.clone());
                Ok(Source::new(profile.name, Arc::new(adapter)))
            })
            .collect::<Result<Vec<_>, RegistryError>>()?;
        Self::new(sources)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter()
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name.as_str()).collect()
    }
}
