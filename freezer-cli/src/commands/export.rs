//! `freezer export`: dump the inventory as JSON, YAML or CSV.
//!
//! JSON and YAML carry the full snapshot (every box and every sample, with
//! status). CSV carries one row per active sample.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, ValueEnum};
use freezer::Inventory;

use crate::cli::GlobalFlags;
use crate::formatter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Yaml,
    Csv,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
    pub format: ExportFormat,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn execute(args: ExportArgs, global: &GlobalFlags) -> anyhow::Result<()> {
    let inventory = global.open_inventory().await?;
    let rendered = render(&inventory, args.format)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), format = ?args.format, "Exported inventory");
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

fn render(inventory: &Inventory, format: ExportFormat) -> anyhow::Result<String> {
    match format {
        ExportFormat::Json => {
            let snapshot = inventory.snapshot(chrono::Utc::now());
            Ok(formatter::format_json(&snapshot)? + "\n")
        }
        ExportFormat::Yaml => formatter::format_yaml(&inventory.snapshot(chrono::Utc::now())),
        ExportFormat::Csv => formatter::format_csv(&inventory.export_rows()),
    }
}
