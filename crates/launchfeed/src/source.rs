//! Upstream launch sources.
//!
//! [`LaunchSource`] is the seam between pagination bookkeeping and the network.
//! [`HttpLaunchSource`] talks to the real query endpoint; tests substitute
//! scripted sources.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, trace};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::launch::{Launch, PageMeta, QueryRequest, QueryResponse};

/// A request for one page of launches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub limit: u32,
}

impl PageRequest {
    /// Create a new page request.
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// The first page at the given size.
    #[must_use]
    pub fn first(limit: u32) -> Self {
        Self::new(1, limit)
    }
}

impl std::fmt::Display for PageRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "page {} (limit {})", self.page, self.limit)
    }
}

/// One page of launches as delivered by a source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Launches in upstream order.
    pub items: Vec<Launch>,
    /// Upstream paging metadata, if reported.
    pub meta: PageMeta,
}

impl Page {
    /// Create a page without metadata.
    #[must_use]
    pub fn new(items: Vec<Launch>) -> Self {
        Self {
            items,
            meta: PageMeta::default(),
        }
    }

    /// Number of launches on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the page carries no launches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<QueryResponse> for Page {
    fn from(response: QueryResponse) -> Self {
        Self {
            items: response.docs,
            meta: response.meta,
        }
    }
}

/// Something that can serve pages of launches.
#[async_trait::async_trait]
pub trait LaunchSource: Send + Sync {
    /// Fetch one page.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be retrieved or decoded.
    async fn fetch_page(&self, request: PageRequest) -> Result<Page>;
}

/// Launch source backed by the upstream HTTP query endpoint.
#[derive(Debug, Clone)]
pub struct HttpLaunchSource {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpLaunchSource {
    /// Create a source for the given endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            timeout,
        }
    }

    /// Create a source from loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api.endpoint.clone(), config.request_timeout())
    }

    /// The endpoint this source posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl LaunchSource for HttpLaunchSource {
    async fn fetch_page(&self, request: PageRequest) -> Result<Page> {
        debug!(
            page = request.page,
            limit = request.limit,
            endpoint = %self.endpoint,
            "Requesting launch page"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(&QueryRequest::page(request.page, request.limit))
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        trace!(
            page = request.page,
            status = status.as_u16(),
            bytes = body.len(),
            "Received launch page"
        );

        if !status.is_success() {
            return Err(Error::status(status.as_u16(), request.page, &body));
        }

        let decoded: QueryResponse = serde_json::from_str(&body)
            .map_err(|e| Error::decode(request.page, e.to_string()))?;

        Ok(decoded.into())
    }
}
