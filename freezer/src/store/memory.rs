//! In-process store.
//!
//! Keeps rows in insertion order behind a `parking_lot::Mutex`. Faults can be
//! injected per operation so callers can exercise their failure paths.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use freezer_shared::errors::{FreezerError, FreezerResult};
use parking_lot::Mutex;
use ulid::Generator;

use super::InventoryStore;
use super::rows::{BoxRow, NewBoxRow, NewSampleRow, SampleRow, SampleRowPatch};
use crate::model::{BoxId, OwnerId, SampleId, SampleStatus};

/// Store operations, used to target injected faults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreOp {
    ListBoxes,
    ListSamples,
    CreateBox,
    DeleteBox,
    CreateSample,
    UpdateSample,
}

struct MemoryInner {
    boxes: Vec<BoxRow>,
    samples: Vec<SampleRow>,
    ids: Generator,
    next_failure: HashMap<StoreOp, String>,
    failing_samples: HashSet<String>,
    writes: usize,
}

impl Default for MemoryInner {
    fn default() -> Self {
        Self {
            boxes: Vec::new(),
            samples: Vec::new(),
            ids: Generator::new(),
            next_failure: HashMap::new(),
            failing_samples: HashSet::new(),
            writes: 0,
        }
    }
}

impl MemoryInner {
    fn next_id(&mut self) -> FreezerResult<String> {
        self.ids
            .generate()
            .map(|id| id.to_string())
            .map_err(|e| FreezerError::Internal(format!("id generation failed: {}", e)))
    }

    /// Consume a pending fault for `op`.
    fn check(&mut self, op: StoreOp) -> FreezerResult<()> {
        match self.next_failure.remove(&op) {
            Some(reason) => Err(FreezerError::Store(reason)),
            None => Ok(()),
        }
    }
}

/// Rows held in memory; contents vanish with the value.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next call of `op` with a store error carrying `reason`.
    pub fn fail_next(&self, op: StoreOp, reason: impl Into<String>) {
        self.inner.lock().next_failure.insert(op, reason.into());
    }

    /// Fail every update of `id` until [`MemoryStore::clear_faults`].
    pub fn fail_updates_of(&self, id: &SampleId) {
        self.inner.lock().failing_samples.insert(id.to_string());
    }

    pub fn clear_faults(&self) {
        let mut inner = self.inner.lock();
        inner.next_failure.clear();
        inner.failing_samples.clear();
    }

    /// Number of writes that changed the store so far.
    pub fn write_count(&self) -> usize {
        self.inner.lock().writes
    }

    pub fn sample_row(&self, id: &SampleId) -> Option<SampleRow> {
        self.inner
            .lock()
            .samples
            .iter()
            .find(|r| r.id == id.as_str())
            .cloned()
    }

    pub fn box_rows(&self) -> Vec<BoxRow> {
        self.inner.lock().boxes.clone()
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn list_boxes(&self, owner: &OwnerId) -> FreezerResult<Vec<BoxRow>> {
        let mut inner = self.inner.lock();
        inner.check(StoreOp::ListBoxes)?;
        Ok(inner
            .boxes
            .iter()
            .filter(|r| r.user_id == owner.as_str())
            .cloned()
            .collect())
    }

    async fn list_samples(&self, owner: &OwnerId) -> FreezerResult<Vec<SampleRow>> {
        let mut inner = self.inner.lock();
        inner.check(StoreOp::ListSamples)?;
        Ok(inner
            .samples
            .iter()
            .filter(|r| r.user_id == owner.as_str())
            .cloned()
            .collect())
    }

    async fn create_box(&self, row: NewBoxRow) -> FreezerResult<BoxRow> {
        let mut inner = self.inner.lock();
        inner.check(StoreOp::CreateBox)?;
        let stored = BoxRow {
            id: inner.next_id()?,
            name: row.name,
            description: row.description,
            layout: row.layout,
            user_id: row.user_id,
            created_at: Utc::now().to_rfc3339(),
        };
        inner.boxes.push(stored.clone());
        inner.writes += 1;
        Ok(stored)
    }

    async fn delete_box(&self, id: &BoxId) -> FreezerResult<()> {
        let mut inner = self.inner.lock();
        inner.check(StoreOp::DeleteBox)?;
        inner.boxes.retain(|r| r.id != id.as_str());
        let active = SampleStatus::Active.as_str();
        for row in inner
            .samples
            .iter_mut()
            .filter(|r| r.box_id.as_deref() == Some(id.as_str()) && r.status == active)
        {
            row.status = SampleStatus::Deleted.as_str().to_string();
        }
        inner.writes += 1;
        Ok(())
    }

    async fn create_sample(&self, row: NewSampleRow) -> FreezerResult<SampleRow> {
        let mut inner = self.inner.lock();
        inner.check(StoreOp::CreateSample)?;
        let id = inner.next_id()?;
        let stored = row.into_row(id, Utc::now().to_rfc3339());
        inner.samples.push(stored.clone());
        inner.writes += 1;
        Ok(stored)
    }

    async fn update_sample(&self, id: &SampleId, patch: SampleRowPatch) -> FreezerResult<()> {
        let mut inner = self.inner.lock();
        if inner.failing_samples.contains(id.as_str()) {
            return Err(FreezerError::Store(format!("update of sample {} rejected", id)));
        }
        inner.check(StoreOp::UpdateSample)?;
        let row = inner
            .samples
            .iter_mut()
            .find(|r| r.id == id.as_str())
            .ok_or_else(|| FreezerError::NotFound(format!("sample {}", id)))?;
        row.apply(&patch);
        inner.writes += 1;
        Ok(())
    }
}
