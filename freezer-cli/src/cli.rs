//! CLI definition and argument parsing for freezer-cli.
//! This module contains the main CLI structure, subcommands, global flags,
//! and the helpers that turn user input into inventory ids and cells.

use std::path::PathBuf;

use anyhow::{anyhow, bail};
use clap::{Args, Parser, Subcommand};
use freezer::{BoxId, FreezerOptions, Inventory, SampleId, SampleStatus};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "freezer", author, version, about = "Freezer sample inventory")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalFlags,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
#[non_exhaustive]
pub enum Commands {
    /// Create, list, show and remove boxes
    Box(crate::commands::boxes::BoxArgs),

    /// Add, edit, move, copy and archive samples
    Sample(crate::commands::sample::SampleArgs),

    /// Search samples by name, notes, solvent, coating or box name
    Search(crate::commands::search::SearchArgs),

    /// Export the whole inventory
    Export(crate::commands::export::ExportArgs),

    /// Generate shell completion scripts
    #[command(hide = true)]
    Completion(crate::commands::completion::CompletionArgs),
}

// ============================================================================
// GLOBAL FLAGS
// ============================================================================

#[derive(Args, Debug, Clone)]
pub struct GlobalFlags {
    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    /// Freezer home directory
    #[arg(long, global = true, env = "FREEZER_HOME")]
    pub home: Option<PathBuf>,

    /// Owner whose inventory is used
    #[arg(long, global = true, env = "FREEZER_OWNER")]
    pub owner: Option<String>,
}

impl GlobalFlags {
    /// Options from `config.json` in the home directory, overridden by flags.
    pub fn options(&self) -> FreezerOptions {
        let home_dir = self
            .home
            .clone()
            .unwrap_or_else(|| FreezerOptions::default().home_dir);

        let mut options = crate::config::load_config(&home_dir);
        if let Some(owner) = &self.owner {
            options.owner = Some(owner.clone());
        }
        options
    }

    /// Open the database and load the owner's inventory.
    pub async fn open_inventory(&self) -> anyhow::Result<Inventory> {
        let options = self.options();
        freezer::open_inventory(&options).await.map_err(Into::into)
    }
}

// ============================================================================
// LOOKUP HELPERS
// ============================================================================

/// Convert a 1-based cell number typed by the user to a grid index.
pub fn cell_index(position: u32) -> anyhow::Result<u32> {
    position
        .checked_sub(1)
        .ok_or_else(|| anyhow!("positions start at 1"))
}

/// Resolve a box by id or name.
pub fn resolve_box(inventory: &Inventory, key: &str) -> anyhow::Result<BoxId> {
    inventory
        .find_box(key)
        .map(|b| b.id.clone())
        .ok_or_else(|| anyhow!("no such box: {}", key))
}

/// Resolve a sample by id, or by sample number when exactly one live sample
/// carries it.
pub fn resolve_sample(inventory: &Inventory, key: &str) -> anyhow::Result<SampleId> {
    let id = SampleId::new(key);
    if inventory.get_sample(&id).is_some() {
        return Ok(id);
    }

    let mut matches = inventory
        .samples()
        .values()
        .filter(|s| s.status != SampleStatus::Deleted && s.details.sample_number == key);
    match (matches.next(), matches.next()) {
        (Some(sample), None) => Ok(sample.id.clone()),
        (Some(_), Some(_)) => bail!("sample number '{}' is ambiguous; use the sample id", key),
        (None, _) => bail!("no such sample: {}", key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_cell_index_is_one_based() {
        assert_eq!(cell_index(1).unwrap(), 0);
        assert_eq!(cell_index(100).unwrap(), 99);
        assert!(cell_index(0).is_err());
    }

    #[test]
    fn test_owner_flag_overrides_config() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("config.json"), r#"{"owner": "alice"}"#).unwrap();

        let flags = GlobalFlags {
            debug: false,
            home: Some(temp_dir.path().to_path_buf()),
            owner: None,
        };
        assert_eq!(flags.options().owner_id().as_str(), "alice");

        let flags = GlobalFlags {
            owner: Some("bob".into()),
            ..flags
        };
        let options = flags.options();
        assert_eq!(options.owner_id().as_str(), "bob");
        assert_eq!(options.home_dir, temp_dir.path());
    }

    #[test]
    fn test_global_flags_parse() {
        let cli = Cli::try_parse_from([
            "freezer", "--owner", "carol", "--debug", "search", "nayf4",
        ])
        .unwrap();
        assert!(cli.global.debug);
        assert_eq!(cli.global.owner.as_deref(), Some("carol"));
        assert!(matches!(cli.command, Commands::Search(_)));
    }
}
