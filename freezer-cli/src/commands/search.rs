//! `freezer search`: free-text sample search.

use clap::Args;

use crate::cli::GlobalFlags;
use crate::commands::print_samples;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search terms; every term must match
    #[arg(required = true, num_args = 1..)]
    pub terms: Vec<String>,

    /// Output format: table, json or yaml
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

pub async fn execute(args: SearchArgs, global: &GlobalFlags) -> anyhow::Result<()> {
    let inventory = global.open_inventory().await?;
    let query = args.terms.join(" ");
    let found = inventory.search(&query);
    tracing::debug!(query = %query, hits = found.len(), "Search finished");
    print_samples(found, &inventory, &args.format)
}
