//! Catalog search command.

use clap::Args;

use iplens::CatalogSearchRequest;
use iplens_cli::load_request;

use super::{create_client, get_context, output_result, print_success, print_verbose};
use crate::Cli;

/// Search the IP asset catalog.
///
/// The request can be given as a YAML/JSON file with `-f`, or built from
/// flags. Flags override values from the file.
#[derive(Args)]
pub struct CatalogCommand {
    /// Request file (YAML or JSON)
    #[arg(short = 'f', long = "file")]
    file: Option<String>,

    /// Free-text query
    #[arg(short = 'q', long)]
    query: Option<String>,

    /// Media type filter
    #[arg(long)]
    media_type: Option<String>,

    /// Page size
    #[arg(long)]
    limit: Option<u32>,

    /// Page offset
    #[arg(long)]
    offset: Option<u32>,
}

impl CatalogCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let req = self.request()?;
        let ctx = get_context(cli)?;

        print_verbose(cli, &format!("Query: {}", req.query));
        print_verbose(
            cli,
            &format!("Page: limit={} offset={}", req.pagination.limit, req.pagination.offset),
        );

        let client = create_client(&ctx)?;
        let resp = client.catalog().search(&req).await?;

        print_success(&format!("Found {} catalog match(es)", resp.data.len()));
        output_result(&resp, cli.output.as_deref(), cli.json)
    }

    fn request(&self) -> anyhow::Result<CatalogSearchRequest> {
        let mut req = match &self.file {
            Some(path) => load_request::<CatalogSearchRequest>(path)?,
            None => CatalogSearchRequest::new(""),
        };
        if let Some(query) = &self.query {
            req.query = query.clone();
        }
        if let Some(media_type) = &self.media_type {
            req.media_type = media_type.clone();
        }
        if let Some(limit) = self.limit {
            req.pagination.limit = limit;
        }
        if let Some(offset) = self.offset {
            req.pagination.offset = offset;
        }
        if req.query.is_empty() {
            anyhow::bail!("a query is required (use --query or -f)");
        }
        Ok(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cmd() -> CatalogCommand {
        CatalogCommand {
            file: None,
            query: None,
            media_type: None,
            limit: None,
            offset: None,
        }
    }

    #[test]
    fn test_request_from_flags() {
        let req = CatalogCommand {
            query: Some("dragon NFT".into()),
            limit: Some(5),
            ..cmd()
        }
        .request()
        .unwrap();
        assert_eq!(req.query, "dragon NFT");
        assert_eq!(req.media_type, "image");
        assert_eq!(req.pagination.limit, 5);
        assert_eq!(req.pagination.offset, 0);
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(file, "query: cats\npagination:\n  limit: 50\n  offset: 10").unwrap();

        let req = CatalogCommand {
            file: Some(file.path().to_string_lossy().into_owned()),
            offset: Some(0),
            ..cmd()
        }
        .request()
        .unwrap();
        assert_eq!(req.query, "cats");
        assert_eq!(req.pagination.limit, 50);
        assert_eq!(req.pagination.offset, 0);
    }

    #[test]
    fn test_query_required() {
        assert!(cmd().request().is_err());
    }
}
