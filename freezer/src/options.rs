//! Configuration for freezer.

use std::path::PathBuf;

use dirs::home_dir;
use serde::{Deserialize, Serialize};

use crate::model::OwnerId;

const DB_DIR: &str = "db";
const DB_FILE: &str = "freezer.db";
const DEFAULT_OWNER: &str = "local";

/// What a swap does when only one of its two writes succeeds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapFailurePolicy {
    /// When one write landed, apply both new locations to the cache anyway and
    /// report the failure. The store and the cache may disagree until the next
    /// reload. When neither landed the cache is left alone.
    #[default]
    FailOpen,
    /// Leave the cache untouched and try to write the successful side back
    /// to where it was.
    Strict,
}

/// Behaviour switches for an [`crate::Inventory`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryOptions {
    #[serde(default)]
    pub swap_failure_policy: SwapFailurePolicy,

    /// Refuse to create a sample in a cell that already holds an active one.
    ///
    /// Default: true
    #[serde(default = "default_reject_occupied_create")]
    pub reject_occupied_create: bool,
}

fn default_reject_occupied_create() -> bool {
    true
}

impl Default for InventoryOptions {
    fn default() -> Self {
        Self {
            swap_failure_policy: SwapFailurePolicy::default(),
            reject_occupied_create: default_reject_occupied_create(),
        }
    }
}

/// Top-level options: where data lives, whose data it is, and how the
/// inventory behaves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreezerOptions {
    /// Directory holding `config.json` and the database.
    ///
    /// Default: `~/.freezer`
    #[serde(default = "default_home_dir")]
    pub home_dir: PathBuf,

    /// Owner whose boxes and samples are loaded.
    #[serde(default)]
    pub owner: Option<String>,

    #[serde(default)]
    pub inventory: InventoryOptions,
}

fn default_home_dir() -> PathBuf {
    let mut path = home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".freezer");
    path
}

impl Default for FreezerOptions {
    fn default() -> Self {
        Self {
            home_dir: default_home_dir(),
            owner: None,
            inventory: InventoryOptions::default(),
        }
    }
}

impl FreezerOptions {
    pub fn database_path(&self) -> PathBuf {
        self.home_dir.join(DB_DIR).join(DB_FILE)
    }

    /// Configured owner, or `local` when none is set.
    pub fn owner_id(&self) -> OwnerId {
        let owner = self
            .owner
            .as_deref()
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .unwrap_or(DEFAULT_OWNER);
        OwnerId::new(owner)
    }
}
