//! Server health check command.

use clap::Args;

use super::{create_client, get_context, output_result, print_verbose};
use crate::Cli;

/// Check that the search server is up.
#[derive(Args)]
pub struct HealthCommand {}

impl HealthCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = get_context(cli)?;
        let client = create_client(&ctx)?;
        print_verbose(cli, &format!("Server: {}", client.base_url()));

        let resp = client.search().health().await?;
        output_result(&resp, cli.output.as_deref(), cli.json)
    }
}
