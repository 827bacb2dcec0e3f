//! Helpers shared by the commands.

use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use serde::Serialize;
use url::Url;

use iplens::{Client, QueryImage};
use iplens_cli::{Config, Context, Output, OutputFormat, load_config};

use crate::Cli;

/// Application name used for the config directory.
pub const APP_NAME: &str = "iplens";

/// Loads the CLI configuration.
pub fn get_config(cli: &Cli) -> anyhow::Result<Config> {
    load_config(APP_NAME, cli.config.as_deref())
}

/// Resolves the context to use.
///
/// A context named with `-c` must exist; without one, the current context is
/// used, falling back to defaults when none is configured.
pub fn get_context(cli: &Cli) -> anyhow::Result<Context> {
    let cfg = get_config(cli)?;
    match cli.context.as_deref() {
        Some(name) => cfg
            .resolve_context(Some(name))
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("context '{}' not found", name)),
        None => Ok(cfg.current().cloned().unwrap_or_default()),
    }
}

/// Builds an API client from a context.
pub fn create_client(ctx: &Context) -> anyhow::Result<Client> {
    let mut builder = Client::builder();
    if !ctx.base_url.is_empty() {
        builder = builder.base_url(&ctx.base_url);
    }
    if !ctx.asset_base_url.is_empty() {
        builder = builder.asset_base_url(&ctx.asset_base_url);
    }
    if ctx.timeout > 0 {
        builder = builder.timeout(Duration::from_secs(ctx.timeout));
    }
    if ctx.n_results > 0 {
        builder = builder.n_results(ctx.n_results);
    }
    if !ctx.catalog_base_url.is_empty() {
        builder = builder.catalog_base_url(&ctx.catalog_base_url);
    }
    if !ctx.catalog_api_key.is_empty() {
        builder = builder.catalog_api_key(&ctx.catalog_api_key);
    }
    Ok(builder.build()?)
}

/// Reads an image file into a query image, guessing its media type from the extension.
///
/// The display URL points at the file itself (`file://` URL for absolute
/// paths, the path as given otherwise), so printed results stay small.
pub fn load_query_image(path: &Path) -> anyhow::Result<QueryImage> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let media_type = mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream");
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "query".to_string());
    let display_url = std::path::absolute(path)
        .ok()
        .and_then(|abs| Url::from_file_path(abs).ok())
        .map(String::from)
        .unwrap_or_else(|| path.display().to_string());
    let size = bytes.len() as u64;
    Ok(QueryImage::new(bytes, media_type, size, display_url).with_file_name(file_name))
}

/// Writes a result in the requested format.
pub fn output_result<T: Serialize>(value: &T, file: Option<&str>, json: bool) -> anyhow::Result<()> {
    Output::new(OutputFormat::from_json_flag(json), file.map(str::to_string)).write(value)
}

/// Prints a success message to stderr.
pub fn print_success(message: &str) {
    eprintln!("✓ {}", message);
}

/// Prints a verbose message if enabled.
pub fn print_verbose(cli: &Cli, message: &str) {
    iplens_cli::print_verbose(cli.verbose, message);
}
