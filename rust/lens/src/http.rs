//! HTTP client implementation for the search server.

use std::time::Duration;

use reqwest::{
    Client as ReqwestClient, Response,
    header::{HeaderMap, HeaderValue, USER_AGENT},
    multipart,
};
use serde::{Serialize, de::DeserializeOwned};

use super::{
    error::{Error, Result},
    types::{ErrorBody, QueryImage},
};

const USER_AGENT_VALUE: &str = "iplens-rust/0.1";

/// HTTP client for the search server.
pub struct HttpClient {
    client: ReqwestClient,
    base_url: String,
}

impl HttpClient {
    /// Creates a new HTTP client.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = ReqwestClient::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Returns the base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the underlying reqwest client.
    pub(crate) fn inner(&self) -> &ReqwestClient {
        &self.client
    }

    /// Performs a GET request and decodes the JSON body.
    pub async fn get<R>(&self, path: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().await?;
        handle_response(response).await
    }

    /// Uploads the query image as the `file` part of a multipart form.
    pub async fn upload_image<Q, R>(&self, path: &str, image: &QueryImage, query: &Q) -> Result<R>
    where
        Q: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);

        let part = multipart::Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.media_type)
            .map_err(|_| Error::InvalidMediaType {
                media_type: image.media_type.clone(),
            })?;
        let form = multipart::Form::new().part("file", part);

        tracing::debug!(url = %url, bytes = image.bytes.len(), "iplens: uploading query image");

        let response = self
            .client
            .post(&url)
            .query(query)
            .multipart(form)
            .send()
            .await?;

        handle_response(response).await
    }
}

/// Decodes a JSON body, turning non-success statuses into server errors.
pub(crate) async fn handle_response<R>(response: Response) -> Result<R>
where
    R: DeserializeOwned,
{
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        return Err(parse_error(
            &body,
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
        ));
    }

    serde_json::from_slice(&body).map_err(Error::from)
}

/// Parses an error response body.
///
/// Prefers the `detail` field, then the raw body text, then the status text.
pub(crate) fn parse_error(body: &[u8], http_status: u16, status_text: &str) -> Error {
    if let Ok(err) = serde_json::from_slice::<ErrorBody>(body) {
        if let Some(detail) = err.detail_text() {
            return Error::server(http_status, detail);
        }
        return Error::server(http_status, status_text);
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        Error::server(http_status, status_text)
    } else {
        Error::server(http_status, text)
    }
}
