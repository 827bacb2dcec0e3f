//! Common types for image search.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Default file name sent with a query whose origin has no name.
pub const DEFAULT_QUERY_FILE_NAME: &str = "query";

/// Arbitrary key/value metadata attached to an indexed asset.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

// ==================== Query Image ====================

/// The image a user submits as the search key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryImage {
    /// Raw file payload.
    pub bytes: Vec<u8>,
    /// Declared media type, e.g. `image/png`.
    pub media_type: String,
    /// Declared byte size.
    pub size: u64,
    /// Display-ready representation, usually a data URI.
    pub display_url: String,
    /// Original file name, sent with the multipart upload.
    pub file_name: String,
}

impl QueryImage {
    /// Creates a query image from the values an input adapter collected.
    pub fn new(
        bytes: Vec<u8>,
        media_type: impl Into<String>,
        size: u64,
        display_url: impl Into<String>,
    ) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
            size,
            display_url: display_url.into(),
            file_name: DEFAULT_QUERY_FILE_NAME.to_string(),
        }
    }

    /// Creates a query image from a file payload, deriving size and a
    /// base64 data URI for display.
    pub fn from_bytes(
        file_name: impl Into<String>,
        bytes: Vec<u8>,
        media_type: impl Into<String>,
    ) -> Self {
        let media_type = media_type.into();
        let display_url = data_url(&media_type, &bytes);
        Self {
            size: bytes.len() as u64,
            bytes,
            media_type,
            display_url,
            file_name: file_name.into(),
        }
    }

    /// Sets the file name reported to the search endpoint.
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    /// Returns true if the declared media type is an image type.
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

/// Encodes a payload as a `data:` URI.
pub fn data_url(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, STANDARD.encode(bytes))
}

// ==================== Candidate ====================

/// One item returned by the similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Identifier, unique within one result set.
    pub id: String,
    /// Raw distance to the query; lower is more similar.
    pub distance: f64,
    /// Asset metadata; may carry a `filename`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub metadata: Metadata,
}

impl Candidate {
    /// Creates a candidate without metadata.
    pub fn new(id: impl Into<String>, distance: f64) -> Self {
        Self {
            id: id.into(),
            distance,
            metadata: Metadata::new(),
        }
    }

    /// Adds a `filename` metadata entry.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.metadata
            .insert("filename".to_string(), serde_json::Value::String(filename.into()));
        self
    }

    /// Returns the `filename` metadata entry when it is a non-empty string.
    pub fn filename(&self) -> Option<&str> {
        self.metadata
            .get("filename")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Returns the name used to look up the candidate's image.
    pub fn asset_name(&self) -> &str {
        self.filename().unwrap_or(&self.id)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Metadata, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Metadata>::deserialize(deserializer)?.unwrap_or_default())
}

// ==================== Wire Types ====================

/// Response body of the search endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub query_filename: String,
    #[serde(default)]
    pub results: Vec<Candidate>,
    #[serde(default)]
    pub status: String,
}

/// Error body returned by the search server.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Returns the detail as text; structured details are rendered as JSON.
    pub fn detail_text(&self) -> Option<String> {
        match &self.detail {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) if s.is_empty() => None,
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}
