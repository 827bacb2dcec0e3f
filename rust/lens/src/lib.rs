//! Image similarity search sessions for Rust.
//!
//! This crate turns a query image into a ranked list of visually similar
//! assets from a remote vector index, and derives pairwise similarity scores
//! for the candidates it returns.

mod assets;
mod catalog;
mod client;
mod comparison;
mod error;
pub mod http;
mod score;
mod search;
mod session;
mod types;

pub use assets::{ASSETS_PATH, AssetUrls, UrlResolver};
pub use catalog::{
    CATALOG_SEARCH_PATH, CatalogSearchRequest, CatalogSearchResponse, CatalogService,
    DEFAULT_CATALOG_BASE_URL, Pagination,
};
pub use client::{Client, ClientBuilder, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use comparison::{ComparisonSelection, ComparisonView};
pub use error::{Error, Result};
pub use score::{DistanceAnomaly, MAX_DISTANCE, SimilarityScore};
pub use search::{HealthResponse, SEARCH_PATH, SearchBackend, SearchService};
pub use session::{Completion, PendingSearch, SearchSession, SessionState};
pub use types::{Candidate, Metadata, QueryImage, SearchResponse, data_url};
