use serde::Serialize;

use crate::error::CoreError;

/// One incoming search: what to look for and where to deliver it.
///
/// Both fields are trimmed on construction. The query must be non-empty; the
/// location may be any text the delivery platforms accept in their address
/// search (an explicit location, or whatever the geolocation lookup produced).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    query: String,
    location: String,
}

impl SearchRequest {
    /// Builds a request from raw caller input.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyQuery`] if `query` is empty or whitespace.
    pub fn new(query: impl Into<String>, location: impl Into<String>) -> Result<Self, CoreError> {
        let query = query.into().trim().to_owned();
        if query.is_empty() {
            return Err(CoreError::EmptyQuery);
        }
        let location = location.into().trim().to_owned();
        Ok(Self { query, location })
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }
}
