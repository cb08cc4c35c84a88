//! Durable store contract.
//!
//! The inventory talks to persistence only through [`InventoryStore`]. Two
//! implementations ship with the crate: [`crate::db::SqliteStore`] for real
//! use and [`MemoryStore`] for tests and embedding.

mod memory;
pub mod rows;

use async_trait::async_trait;
use freezer_shared::errors::FreezerResult;

use crate::model::{BoxId, OwnerId, SampleId};

pub use memory::{MemoryStore, StoreOp};
pub use rows::{BoxRow, NewBoxRow, NewSampleRow, SampleRow, SampleRowPatch};

/// Owner-scoped CRUD over box and sample rows.
///
/// Every method may fail with [`freezer_shared::FreezerError::Store`] or
/// [`freezer_shared::FreezerError::Database`]. Callers treat failures as
/// final for that call; implementations must not retry internally.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn list_boxes(&self, owner: &OwnerId) -> FreezerResult<Vec<BoxRow>>;

    async fn list_samples(&self, owner: &OwnerId) -> FreezerResult<Vec<SampleRow>>;

    /// Insert a box, assigning `id` and `created_at`.
    async fn create_box(&self, row: NewBoxRow) -> FreezerResult<BoxRow>;

    /// Remove the box record and mark every sample still placed in it as
    /// `deleted`. Samples are never physically removed.
    async fn delete_box(&self, id: &BoxId) -> FreezerResult<()>;

    /// Insert a sample, assigning `id` and `created_at`.
    async fn create_sample(&self, row: NewSampleRow) -> FreezerResult<SampleRow>;

    /// Write the `Some` columns of `patch`.
    async fn update_sample(&self, id: &SampleId, patch: SampleRowPatch) -> FreezerResult<()>;
}
