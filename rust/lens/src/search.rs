//! Similarity search service.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{
    error::{Error, Result},
    http::HttpClient,
    types::{Candidate, QueryImage, SearchResponse},
};

/// Path of the vector search endpoint.
pub const SEARCH_PATH: &str = "/search-vector";

/// The collaborator that turns a query image into ranked candidates.
///
/// Implementations return candidates in significance order; callers never
/// re-sort them.
#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, image: &QueryImage) -> Result<Vec<Candidate>>;
}

#[async_trait::async_trait]
impl<T: SearchBackend + ?Sized> SearchBackend for Arc<T> {
    async fn search(&self, image: &QueryImage) -> Result<Vec<Candidate>> {
        (**self).search(image).await
    }
}

/// Search service backed by the image search server.
pub struct SearchService {
    http: Arc<HttpClient>,
    n_results: Option<u32>,
}

#[derive(Serialize)]
struct SearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    n_results: Option<u32>,
}

/// Response of the server health check.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub message: String,
}

impl SearchService {
    pub(crate) fn new(http: Arc<HttpClient>, n_results: Option<u32>) -> Self {
        Self { http, n_results }
    }

    /// Uploads the query image and returns the full server response.
    pub async fn search_raw(&self, image: &QueryImage) -> Result<SearchResponse> {
        if !image.is_image() {
            return Err(Error::InvalidMediaType {
                media_type: image.media_type.clone(),
            });
        }
        let params = SearchParams {
            n_results: self.n_results,
        };
        self.http.upload_image(SEARCH_PATH, image, &params).await
    }

    /// Checks that the search server is up.
    pub async fn health(&self) -> Result<HealthResponse> {
        self.http.get("/").await
    }
}

#[async_trait::async_trait]
impl SearchBackend for SearchService {
    async fn search(&self, image: &QueryImage) -> Result<Vec<Candidate>> {
        let resp = self.search_raw(image).await?;
        tracing::debug!(
            query = %resp.query_filename,
            results = resp.results.len(),
            "iplens: search returned"
        );
        Ok(resp.results)
    }
}
