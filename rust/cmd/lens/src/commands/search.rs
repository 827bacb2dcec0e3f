//! Similarity search command.

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;

use iplens::{Client, SearchSession, SimilarityScore, UrlResolver};

use super::{
    create_client, get_context, load_query_image, output_result, print_success, print_verbose,
};
use crate::Cli;

/// Search the index for images similar to IMAGE.
#[derive(Args)]
pub struct SearchCommand {
    /// Query image file
    image: PathBuf,
}

/// One ranked search result.
#[derive(Serialize)]
struct ResultRow {
    rank: usize,
    id: String,
    score: SimilarityScore,
    display_url: String,
}

#[derive(Serialize)]
struct SearchReport {
    query: String,
    media_type: String,
    results: Vec<ResultRow>,
}

impl SearchCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let (client, session) = run_search(cli, &self.image).await?;

        let results: Vec<ResultRow> = session
            .results()
            .iter()
            .enumerate()
            .map(|(i, c)| ResultRow {
                rank: i + 1,
                id: c.id.clone(),
                score: SimilarityScore::from_distance(c.distance),
                display_url: client.assets().resolve(c.asset_name()),
            })
            .collect();

        print_success(&format!("Found {} similar asset(s)", results.len()));

        let query = session.query().map(|q| (q.file_name.clone(), q.media_type.clone()));
        let (query, media_type) = query.unwrap_or_default();
        let report = SearchReport {
            query,
            media_type,
            results,
        };
        output_result(&report, cli.output.as_deref(), cli.json)
    }
}

/// Selects `image` as the query of a fresh session and submits it.
pub(crate) async fn run_search(cli: &Cli, image: &Path) -> anyhow::Result<(Client, SearchSession)> {
    let ctx = get_context(cli)?;
    let client = create_client(&ctx)?;

    let query = load_query_image(image)?;
    print_verbose(cli, &format!("Server: {}", client.base_url()));
    print_verbose(
        cli,
        &format!("Query: {} ({}, {} bytes)", query.file_name, query.media_type, query.size),
    );

    let mut session = SearchSession::new();
    session.select_image(query);
    session.submit(&client.search()).await?;

    Ok((client, session))
}
