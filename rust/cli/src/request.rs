//! Request file loading.
//!
//! Catalog queries can be kept in YAML or JSON files and passed with `-f`.

use std::fs;
use std::io;
use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Error type for request loading.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("failed to read request file: {0}")]
    Read(#[from] io::Error),
    #[error("invalid YAML request: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON request: {0}")]
    Json(#[from] serde_json::Error),
    #[error("request file is neither YAML nor JSON")]
    UnknownFormat,
}

/// Request file format, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
    Guess,
}

impl Format {
    fn of(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("yaml" | "yml") => Format::Yaml,
            Some("json") => Format::Json,
            _ => Format::Guess,
        }
    }
}

/// Loads a request from a YAML or JSON file.
pub fn load_request<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, RequestError> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    parse_request(&data, path)
}

/// Parses request data; files without a known extension are tried as JSON, then YAML.
pub fn parse_request<T: DeserializeOwned>(data: &[u8], path: &Path) -> Result<T, RequestError> {
    match Format::of(path) {
        Format::Yaml => Ok(serde_yaml::from_slice(data)?),
        Format::Json => Ok(serde_json::from_slice(data)?),
        Format::Guess => serde_json::from_slice(data)
            .or_else(|_| serde_yaml::from_slice(data))
            .map_err(|_| RequestError::UnknownFormat),
    }
}
