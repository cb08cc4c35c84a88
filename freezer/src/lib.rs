//! Freezer: an inventory of samples stored in grid boxes.
//!
//! The [`Inventory`] caches one owner's boxes and samples and writes every
//! change through an [`InventoryStore`]. [`SqliteStore`] is the durable
//! store; [`MemoryStore`] backs tests.

pub mod db;
pub mod export;
pub mod inventory;
pub mod model;
pub mod options;
pub mod placement;
pub mod search;
pub mod store;

use std::sync::Arc;

pub use db::{Database, SqliteStore};
pub use export::{ExportRow, InventorySnapshot};
pub use freezer_shared::errors::{FreezerError, FreezerResult};
pub use inventory::{CONTAINER_FULL, Inventory, Occupancy, Selection};
pub use model::{
    BoxId, BoxLayout, FreezerBox, Location, NewBox, NewSample, OwnerId, Sample, SampleDetails,
    SampleId, SamplePatch, SampleStatus,
};
pub use options::{FreezerOptions, InventoryOptions, SwapFailurePolicy};
pub use store::{InventoryStore, MemoryStore};

/// Open the SQLite database under `options.home_dir` and load the configured
/// owner's inventory from it.
pub async fn open_inventory(options: &FreezerOptions) -> FreezerResult<Inventory> {
    let path = options.database_path();
    tracing::debug!(path = %path.display(), "Opening inventory database");
    let db = Database::open(&path)?;

    let store: Arc<dyn InventoryStore> = Arc::new(SqliteStore::new(db));
    let mut inventory = Inventory::new(store, options.inventory.clone());
    inventory.load_all(&options.owner_id()).await?;
    Ok(inventory)
}
