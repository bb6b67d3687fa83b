//! HTTP API for the Soma check-in service.
//!
//! Exposes the two check-in endpoints plus health probes, and owns the
//! request-scoped plumbing around them: configuration, `initData`
//! validation, and the mapping of typed failures to HTTP responses.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod crypto;
pub mod error;
pub mod handlers;
pub mod server;

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use soma_core::Storage;

pub use config::{Config, Credentials};
pub use error::ApiError;
pub use server::{create_router, start_server};

/// Shared per-process state handed to every handler.
///
/// Configuration is loaded once at startup and never reloaded. The HTTP
/// client is pooled and reused for every storage call; per-request
/// `Storage` handles borrow it.
#[derive(Clone)]
pub struct AppState {
    /// Process configuration, immutable after startup.
    pub config: Arc<Config>,
    http: reqwest::Client,
}

impl AppState {
    /// Builds the state, constructing the pooled storage HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be configured.
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .user_agent(concat!("soma-api/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build storage HTTP client")?;

        Ok(Self { config: Arc::new(config), http })
    }

    /// Resolves the request's collaborators: verified credentials and a
    /// storage handle bound to them.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotConfigured` naming every absent required
    /// variable, or `ApiError::Storage` if the configured endpoint URL is
    /// unusable.
    pub fn collaborators(&self) -> std::result::Result<(Credentials<'_>, Storage), ApiError> {
        let credentials = self.config.credentials().map_err(ApiError::NotConfigured)?;
        let storage = Storage::connect(
            self.http.clone(),
            credentials.supabase_url,
            credentials.service_role_key,
        )?;

        Ok((credentials, storage))
    }
}
