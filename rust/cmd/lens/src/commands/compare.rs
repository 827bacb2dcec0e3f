//! Pairwise comparison command.

use std::path::PathBuf;

use clap::Args;

use super::{output_result, print_success, search::run_search};
use crate::Cli;

/// Search with IMAGE, then compare it with candidate ID.
#[derive(Args)]
pub struct CompareCommand {
    /// Query image file
    image: PathBuf,

    /// Candidate identifier from the search results
    id: String,
}

impl CompareCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let (client, mut session) = run_search(cli, &self.image).await?;

        let selection = session.select_candidate(&self.id, client.assets())?;

        match selection.score.anomaly() {
            Some(anomaly) => eprintln!(
                "! Similarity score {} is out of range ({})",
                selection.score, anomaly
            ),
            None => print_success(&format!("Similarity score: {}", selection.score)),
        }

        output_result(selection, cli.output.as_deref(), cli.json)
    }
}
