//! CLI utilities for iplens.
//!
//! Context-based configuration, output formatting and request-file loading
//! shared by the `iplens` command.

pub mod config;
pub mod output;
pub mod request;

pub use config::{Config, Context, load_config, mask_api_key};
pub use output::{Output, OutputFormat, print_verbose};
pub use request::{RequestError, load_request};
