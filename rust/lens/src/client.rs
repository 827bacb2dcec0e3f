//! Image search API client.

use std::sync::Arc;
use std::time::Duration;

use super::{
    assets::AssetUrls,
    catalog::{CatalogService, DEFAULT_CATALOG_BASE_URL},
    error::{Error, Result},
    http::HttpClient,
    search::SearchService,
};

/// Default search server base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Image search API client.
///
/// # Example
///
/// ```rust,ignore
/// use iplens::{Client, QueryImage, SearchSession};
///
/// let client = Client::builder().base_url("http://localhost:8000").build()?;
/// let mut session = SearchSession::new();
/// session.select_image(QueryImage::from_bytes("q.png", bytes, "image/png"));
/// let results = session.submit(&client.search()).await?;
/// ```
pub struct Client {
    http: Arc<HttpClient>,
    config: ClientConfig,
    assets: AssetUrls,
}

#[derive(Clone)]
struct ClientConfig {
    base_url: String,
    n_results: Option<u32>,
    catalog_base_url: String,
    catalog_api_key: Option<String>,
}

impl Client {
    /// Creates a client for the default local server.
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    /// Creates a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Returns the similarity search service.
    pub fn search(&self) -> SearchService {
        SearchService::new(self.http.clone(), self.config.n_results)
    }

    /// Returns the catalog search service.
    pub fn catalog(&self) -> CatalogService<'_> {
        CatalogService::new(
            &self.http,
            &self.config.catalog_base_url,
            self.config.catalog_api_key.as_deref(),
        )
    }

    /// Returns the asset URL resolver.
    pub fn assets(&self) -> &AssetUrls {
        &self.assets
    }
}

/// Builder for creating an image search client.
pub struct ClientBuilder {
    base_url: String,
    asset_base_url: Option<String>,
    timeout: Duration,
    n_results: Option<u32>,
    catalog_base_url: String,
    catalog_api_key: Option<String>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Creates a new client builder.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            asset_base_url: None,
            timeout: DEFAULT_TIMEOUT,
            n_results: None,
            catalog_base_url: DEFAULT_CATALOG_BASE_URL.to_string(),
            catalog_api_key: None,
        }
    }

    /// Sets the search server base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets where asset images are served from. Defaults to the base URL.
    pub fn asset_base_url(mut self, url: impl Into<String>) -> Self {
        self.asset_base_url = Some(url.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets how many neighbors the server should return.
    pub fn n_results(mut self, n: u32) -> Self {
        self.n_results = Some(n);
        self
    }

    /// Sets the catalog API base URL.
    pub fn catalog_base_url(mut self, url: impl Into<String>) -> Self {
        self.catalog_base_url = url.into();
        self
    }

    /// Sets the catalog API key.
    pub fn catalog_api_key(mut self, key: impl Into<String>) -> Self {
        self.catalog_api_key = Some(key.into());
        self
    }

    /// Builds the client.
    pub fn build(self) -> Result<Client> {
        if self.base_url.is_empty() {
            return Err(Error::Config("base_url must be non-empty".to_string()));
        }
        if self.n_results == Some(0) {
            return Err(Error::Config("n_results must be positive".to_string()));
        }

        let assets = AssetUrls::new(self.asset_base_url.as_deref().unwrap_or(&self.base_url))?;
        let http = HttpClient::new(self.base_url.clone(), self.timeout)?;

        Ok(Client {
            http: Arc::new(http),
            config: ClientConfig {
                base_url: self.base_url,
                n_results: self.n_results,
                catalog_base_url: self.catalog_base_url,
                catalog_api_key: self.catalog_api_key,
            },
            assets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::UrlResolver;

    #[test]
    fn test_defaults() {
        let client = Client::new().unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(
            client.assets().resolve("a.png"),
            "http://localhost:8000/assets/a.png"
        );
    }

    #[test]
    fn test_asset_base_override() {
        let client = Client::builder()
            .base_url("http://search:8000")
            .asset_base_url("https://cdn.example.com")
            .build()
            .unwrap();
        assert_eq!(
            client.assets().resolve("a.png"),
            "https://cdn.example.com/assets/a.png"
        );
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            Client::builder().base_url("").build(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Client::builder().n_results(0).build(),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_catalog_requires_key() {
        let client = Client::new().unwrap();
        let err = client
            .catalog()
            .search(&crate::catalog::CatalogSearchRequest::new("dragon"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
