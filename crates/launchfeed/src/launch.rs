//! Launch records and the upstream query wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A single launch as returned by the upstream query endpoint.
///
/// Only the fields the listing displays are decoded; everything else in the
/// upstream document is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Launch {
    /// Upstream identifier.
    pub id: String,

    /// Mission name.
    pub name: String,

    /// Launch date and time in UTC.
    pub date_utc: DateTime<Utc>,

    /// Free-text mission details.
    #[serde(default)]
    pub details: Option<String>,

    /// Launch outcome; `None` for launches without a recorded outcome.
    #[serde(default)]
    pub success: Option<bool>,

    /// Media links.
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: Links,
}

/// Media links attached to a launch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    /// Mission patch images.
    #[serde(default, deserialize_with = "null_as_default")]
    pub patch: Patch,
}

/// Mission patch image URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    /// Small patch image.
    #[serde(default)]
    pub small: Option<String>,

    /// Large patch image.
    #[serde(default)]
    pub large: Option<String>,
}

/// Decode an explicit `null` the same way as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Launch {
    /// Whether the launch is styled as a success. Unknown outcomes are not.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success.unwrap_or(false)
    }

    /// The small patch image URL, if any.
    #[must_use]
    pub fn patch_url(&self) -> Option<&str> {
        self.links.patch.small.as_deref()
    }

    /// Mission details, empty when absent.
    #[must_use]
    pub fn details(&self) -> &str {
        self.details.as_deref().unwrap_or_default()
    }
}

/// Body of a POST to the query endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Paging options.
    pub options: QueryOptions,
}

/// Paging options understood by the query endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Page size.
    pub limit: u32,
    /// 1-based page number.
    pub page: u32,
}

impl QueryRequest {
    /// Build a request for one page.
    #[must_use]
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            options: QueryOptions { limit, page },
        }
    }
}

/// A page of results from the query endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Launches on this page, in upstream order.
    pub docs: Vec<Launch>,

    /// Paging metadata, decoded when present.
    #[serde(flatten)]
    pub meta: PageMeta,
}

/// Paging metadata reported alongside `docs`.
///
/// Kept for diagnostics only; pagination never depends on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Total number of matching launches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_docs: Option<u64>,

    /// Total number of pages at the requested size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,

    /// Whether the upstream reports a following page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_next_page: Option<bool>,
}
