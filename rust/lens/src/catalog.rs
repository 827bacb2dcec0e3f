//! Third-party IP asset catalog search.
//!
//! A key-authenticated JSON API that lives alongside the image search server.
//! Search sessions do not use it.

use serde::{Deserialize, Serialize};

use super::{
    error::{Error, Result},
    http::{HttpClient, handle_response},
};

/// Default catalog API base URL (staging).
pub const DEFAULT_CATALOG_BASE_URL: &str = "https://staging-api.storyprotocol.net";

/// Path of the catalog search endpoint.
pub const CATALOG_SEARCH_PATH: &str = "/api/v4/search";

/// Default page size.
pub const DEFAULT_LIMIT: u32 = 20;

const API_KEY_HEADER: &str = "X-Api-Key";

/// Catalog search service.
pub struct CatalogService<'a> {
    http: &'a HttpClient,
    base_url: &'a str,
    api_key: Option<&'a str>,
}

impl<'a> CatalogService<'a> {
    pub(crate) fn new(http: &'a HttpClient, base_url: &'a str, api_key: Option<&'a str>) -> Self {
        Self {
            http,
            base_url,
            api_key,
        }
    }

    /// Searches the catalog.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let request = CatalogSearchRequest::new("dragon NFT");
    /// let response = client.catalog().search(&request).await?;
    /// println!("{} matches", response.data.len());
    /// ```
    pub async fn search(&self, request: &CatalogSearchRequest) -> Result<CatalogSearchResponse> {
        let api_key = self
            .api_key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("catalog api_key must be non-empty".to_string()))?;

        let url = format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            CATALOG_SEARCH_PATH
        );

        let response = self
            .http
            .inner()
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(request)
            .send()
            .await?;

        handle_response(response).await
    }
}

// ==================== Request/Response Types ====================

/// Request for catalog search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSearchRequest {
    /// Media type filter, e.g. `image`.
    #[serde(default = "default_media_type")]
    pub media_type: String,

    /// Page window.
    #[serde(default)]
    pub pagination: Pagination,

    /// Free-text query.
    pub query: String,
}

impl CatalogSearchRequest {
    /// Creates an image search for `query` with the default page window.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            media_type: default_media_type(),
            pagination: Pagination::default(),
            query: query.into(),
        }
    }
}

fn default_media_type() -> String {
    "image".to_string()
}

/// Page window for catalog search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Response from catalog search.
///
/// Matches are kept as raw JSON; their shape belongs to the catalog provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSearchResponse {
    #[serde(default)]
    pub data: Vec<serde_json::Value>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
