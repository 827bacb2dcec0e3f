//! Configuration management commands.

use clap::{Args, Subcommand};

use iplens::DEFAULT_BASE_URL;
use iplens_cli::{Context as CliContext, mask_api_key};

use super::{get_config, output_result, print_success};
use crate::Cli;

/// Manage CLI configuration.
///
/// Contexts allow you to manage multiple search servers,
/// similar to kubectl's context management.
///
/// Configuration is stored in ~/.iplens/iplens/config.yaml
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Add a new context
    #[command(name = "add-context")]
    AddContext {
        /// Context name
        name: String,
        /// Search server base URL
        #[arg(long)]
        base_url: Option<String>,
        /// Base URL asset images are served from
        #[arg(long)]
        asset_base_url: Option<String>,
        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Number of neighbors to request
        #[arg(long)]
        n_results: Option<u32>,
        /// Catalog API key
        #[arg(long)]
        catalog_api_key: Option<String>,
        /// Catalog API base URL
        #[arg(long)]
        catalog_base_url: Option<String>,
    },
    /// Delete a context
    #[command(name = "delete-context")]
    DeleteContext {
        /// Context name
        name: String,
    },
    /// Set the current context
    #[command(name = "use-context")]
    UseContext {
        /// Context name
        name: String,
    },
    /// Display the current context
    #[command(name = "get-context")]
    GetContext,
    /// List all contexts
    #[command(name = "list-contexts", alias = "get-contexts")]
    ListContexts,
    /// View the current configuration
    View,
}

impl ConfigCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            ConfigSubcommand::AddContext {
                name,
                base_url,
                asset_base_url,
                timeout,
                n_results,
                catalog_api_key,
                catalog_base_url,
            } => {
                let mut cfg = get_config(cli)?;

                let ctx = CliContext {
                    base_url: base_url.clone().unwrap_or_default(),
                    asset_base_url: asset_base_url.clone().unwrap_or_default(),
                    timeout: timeout.unwrap_or(0),
                    n_results: n_results.unwrap_or(0),
                    catalog_api_key: catalog_api_key.clone().unwrap_or_default(),
                    catalog_base_url: catalog_base_url.clone().unwrap_or_default(),
                    ..Default::default()
                };

                cfg.add_context(name, ctx)?;
                print_success(&format!("Context \"{}\" added successfully", name));
                Ok(())
            }

            ConfigSubcommand::DeleteContext { name } => {
                let mut cfg = get_config(cli)?;
                cfg.delete_context(name)?;
                print_success(&format!("Context \"{}\" deleted", name));
                Ok(())
            }

            ConfigSubcommand::UseContext { name } => {
                let mut cfg = get_config(cli)?;
                cfg.use_context(name)?;
                print_success(&format!("Switched to context \"{}\"", name));
                Ok(())
            }

            ConfigSubcommand::GetContext => {
                let cfg = get_config(cli)?;
                if cfg.current_context.is_empty() {
                    println!("No current context set");
                } else {
                    println!("{}", cfg.current_context);
                }
                Ok(())
            }

            ConfigSubcommand::ListContexts => {
                let cfg = get_config(cli)?;

                if cfg.contexts.is_empty() {
                    println!("No contexts configured");
                    return Ok(());
                }

                println!("{:<8} {:<20} {:<30} {}", "CURRENT", "NAME", "BASE_URL", "CATALOG_KEY");

                for name in cfg.list_contexts() {
                    let Some(ctx) = cfg.contexts.get(name) else {
                        continue;
                    };
                    let current = if name == cfg.current_context { "*" } else { "" };
                    let base_url = if ctx.base_url.is_empty() {
                        DEFAULT_BASE_URL
                    } else {
                        &ctx.base_url
                    };
                    let key = if ctx.catalog_api_key.is_empty() {
                        "-".to_string()
                    } else {
                        mask_api_key(&ctx.catalog_api_key)
                    };
                    println!("{:<8} {:<20} {:<30} {}", current, name, base_url, key);
                }
                Ok(())
            }

            ConfigSubcommand::View => {
                let cfg = get_config(cli)?;
                let mut masked = cfg.clone();
                for ctx in masked.contexts.values_mut() {
                    if !ctx.catalog_api_key.is_empty() {
                        ctx.catalog_api_key = mask_api_key(&ctx.catalog_api_key);
                    }
                }
                eprintln!("# {}", cfg.path().display());
                output_result(&masked, cli.output.as_deref(), cli.json)
            }
        }
    }
}
