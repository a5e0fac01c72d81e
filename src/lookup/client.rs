// Library Manager - Circulation tracking for small libraries
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! HTTP client for ISBN metadata lookup
//!
//! Wraps `reqwest::Client` with a bounded timeout and a fixed User-Agent.
//!
//! Two entry points:
//! - [`IsbnLookupClient::fetch`] returns `Result` and surfaces every failure
//! - [`IsbnLookupClient::lookup`] is what the catalog calls; failures are logged
//!   and collapse into `None`

use crate::error::{LibraryError, Result};
use crate::lookup::volumes::{BookMetadata, VolumesResponse};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Volumes endpoint queried when no other base URL is configured
pub const DEFAULT_LOOKUP_URL: &str = "https://www.googleapis.com/books/v1/volumes";

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Configuration for IsbnLookupClient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LOOKUP_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("library-core/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl LookupConfig {
    pub fn builder() -> LookupConfigBuilder {
        LookupConfigBuilder::new()
    }
}

/// Builder for LookupConfig
#[derive(Debug)]
pub struct LookupConfigBuilder {
    config: LookupConfig,
}

impl LookupConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: LookupConfig::default(),
        }
    }

    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> LookupConfig {
        self.config
    }
}

impl Default for LookupConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the remote volumes endpoint
#[derive(Debug, Clone)]
pub struct IsbnLookupClient {
    client: Client,
    base_url: Url,
    config: LookupConfig,
}

impl IsbnLookupClient {
    /// Create a client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(LookupConfig::default())
    }

    /// Create a client with custom configuration
    ///
    /// # Errors
    /// Returns error if the base URL doesn't parse or the HTTP client cannot be built
    pub fn with_config(config: LookupConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            LibraryError::InvalidConfiguration(format!("Invalid lookup URL '{}': {}", config.base_url, e))
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| LibraryError::InvalidConfiguration(format!("Invalid user agent: {}", e)))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Full request URL for an ISBN (`{base}?q=isbn:{isbn}`)
    pub fn volume_url(&self, isbn: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("q", &format!("isbn:{}", normalize_isbn(isbn)));
        url
    }

    /// Query the remote catalog, surfacing every failure
    ///
    /// `Ok(None)` means the catalog answered but had no match.
    pub async fn fetch(&self, isbn: &str) -> Result<Option<BookMetadata>> {
        if normalize_isbn(isbn).is_empty() {
            return Ok(None);
        }

        let url = self.volume_url(isbn);
        tracing::debug!(%url, "Looking up ISBN");

        let response = self.client.get(url).send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                format!("timed out after {:?}", self.config.timeout)
            } else {
                e.to_string()
            };
            LibraryError::transport(reason, None)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LibraryError::transport(
                format!("unexpected status {}", status),
                Some(status.as_u16()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LibraryError::transport(e.to_string(), Some(status.as_u16())))?;

        let parsed: VolumesResponse = serde_json::from_str(&body)
            .map_err(|e| LibraryError::InvalidApiResponse(e.to_string()))?;

        Ok(parsed.into_metadata())
    }

    /// Best-effort lookup: `None` for no match and for any failure
    pub async fn lookup(&self, isbn: &str) -> Option<BookMetadata> {
        match self.fetch(isbn).await {
            Ok(Some(metadata)) => Some(metadata),
            Ok(None) => {
                tracing::info!(isbn, "No remote data for ISBN");
                None
            }
            Err(e) => {
                tracing::warn!(isbn, error = %e, "ISBN lookup failed");
                None
            }
        }
    }
}

/// Strip the separators people type into ISBNs ("978-0-441-17271-9")
pub fn normalize_isbn(isbn: &str) -> String {
    isbn.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}
