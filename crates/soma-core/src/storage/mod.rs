//! Storage access layer for check-in persistence.
//!
//! Supabase is reached over its REST interface; this module is the only
//! place that knows the collection layout and the credential headers the
//! API expects. All storage operations go through the repositories here,
//! keeping the HTTP handlers free of storage details.

use url::Url;

pub mod checkins;

use crate::error::{Result, StoreError};

/// Container for repository instances providing unified storage access.
///
/// Construction is cheap: it reuses a pooled `reqwest::Client` and only
/// resolves the collection URLs, so a `Storage` can be built per request
/// from the process-wide client and the current credentials.
#[derive(Debug, Clone)]
pub struct Storage {
    /// Repository for check-in rows.
    pub checkins: checkins::Repository,
}

impl Storage {
    /// Connects the repositories to a Supabase project.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Endpoint` if `base_url` is not a valid base
    /// URL for the REST interface.
    pub fn connect(http: reqwest::Client, base_url: &str, service_role_key: &str) -> Result<Self> {
        let base =
            Url::parse(base_url).map_err(|e| StoreError::Endpoint(format!("{base_url}: {e}")))?;

        Ok(Self {
            checkins: checkins::Repository::new(http, &base, service_role_key.to_string())?,
        })
    }

    /// Performs a lightweight reachability check against the store.
    ///
    /// Used by the readiness probe. Issues a metadata-only request so the
    /// check stays cheap enough to call frequently.
    ///
    /// # Errors
    ///
    /// Returns the underlying `StoreError` if the store is unreachable or
    /// rejects the credentials.
    pub async fn health_check(&self) -> Result<()> {
        self.checkins.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_rejects_invalid_base_url() {
        let result = Storage::connect(reqwest::Client::new(), "not a url", "key");
        assert!(matches!(result, Err(StoreError::Endpoint(_))));
    }

    #[test]
    fn connect_accepts_project_url() {
        let result =
            Storage::connect(reqwest::Client::new(), "https://project.supabase.co", "key");
        assert!(result.is_ok());
    }
}
