//! The inventory: one owner's boxes and samples, cached in memory and kept in
//! step with an [`InventoryStore`].
//!
//! Every mutating call validates first, writes to the store, and only then
//! touches the cache. A failed call leaves the cache as it was and keeps the
//! error message in [`Inventory::last_error`] until [`Inventory::clear_error`].
//! The one exception is a swap whose two writes disagree; see
//! [`SwapFailurePolicy`].
//!
//! Calls take `&mut self`, so a session runs one operation at a time.

mod views;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use freezer_shared::errors::{FreezerError, FreezerResult};

use crate::model::{
    BoxId, FreezerBox, Location, NewBox, NewSample, OwnerId, Sample, SampleId, SamplePatch,
    SampleStatus, is_valid_position,
};
use crate::options::{InventoryOptions, SwapFailurePolicy};
use crate::placement::{MoveDecision, decide_move, first_fit_position};
use crate::search;
use crate::store::{InventoryStore, NewBoxRow, NewSampleRow, SampleRowPatch};

pub use views::Occupancy;

/// Message recorded when a copy finds no free cell.
pub const CONTAINER_FULL: &str = "container full";

/// What the user is looking at.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    Box(BoxId),
    /// The archived-samples view.
    Trash,
}

pub struct Inventory {
    store: Arc<dyn InventoryStore>,
    options: InventoryOptions,
    owner: Option<OwnerId>,
    boxes: BTreeMap<BoxId, FreezerBox>,
    samples: BTreeMap<SampleId, Sample>,
    selection: Selection,
    last_error: Option<String>,
}

impl Inventory {
    pub fn new(store: Arc<dyn InventoryStore>, options: InventoryOptions) -> Self {
        Self {
            store,
            options,
            owner: None,
            boxes: BTreeMap::new(),
            samples: BTreeMap::new(),
            selection: Selection::None,
            last_error: None,
        }
    }

    fn record<T>(&mut self, result: FreezerResult<T>) -> FreezerResult<T> {
        if let Err(e) = &result {
            if e.is_store_failure() {
                tracing::warn!(error = %e, "Store call failed");
            } else {
                tracing::debug!(error = %e, "Inventory operation rejected");
            }
            self.last_error = Some(e.to_string());
        }
        result
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    fn require_owner(&self) -> FreezerResult<OwnerId> {
        self.owner.clone().ok_or_else(|| {
            FreezerError::InvalidState("no owner loaded; call load_all first".into())
        })
    }

    fn require_sample(&self, id: &SampleId) -> FreezerResult<&Sample> {
        self.samples
            .get(id)
            .ok_or_else(|| FreezerError::NotFound(format!("sample {}", id)))
    }

    fn require_box(&self, id: &BoxId) -> FreezerResult<&FreezerBox> {
        self.boxes
            .get(id)
            .ok_or_else(|| FreezerError::NotFound(format!("box {}", id)))
    }

    /// Check that `location` names a known box and a cell inside its grid.
    fn validate_cell(&self, location: &Location) -> FreezerResult<()> {
        let target = self.require_box(&location.box_id)?;
        if !is_valid_position(target.layout, location.position) {
            return Err(FreezerError::Validation(format!(
                "position {} is outside the {} grid of box '{}'",
                location.position, target.layout, target.name
            )));
        }
        Ok(())
    }

    fn set_location(&mut self, id: &SampleId, location: Location) {
        if let Some(sample) = self.samples.get_mut(id) {
            sample.location = Some(location);
        }
    }

    // ========================================================================
    // Loading and selection
    // ========================================================================

    /// Replace the cache with `owner`'s boxes and samples from the store.
    ///
    /// Selects the first box, if any. On failure the previous cache is kept.
    pub async fn load_all(&mut self, owner: &OwnerId) -> FreezerResult<()> {
        self.last_error = None;
        let result = self.fetch(owner).await;
        let (boxes, samples) = self.record(result)?;

        self.selection = boxes
            .keys()
            .next()
            .cloned()
            .map_or(Selection::None, Selection::Box);
        tracing::info!(
            owner = %owner,
            boxes = boxes.len(),
            samples = samples.len(),
            "Loaded inventory"
        );
        self.boxes = boxes;
        self.samples = samples;
        self.owner = Some(owner.clone());
        Ok(())
    }

    async fn fetch(
        &self,
        owner: &OwnerId,
    ) -> FreezerResult<(BTreeMap<BoxId, FreezerBox>, BTreeMap<SampleId, Sample>)> {
        let (box_rows, sample_rows) = futures::try_join!(
            self.store.list_boxes(owner),
            self.store.list_samples(owner)
        )?;

        let boxes = box_rows
            .into_iter()
            .map(|row| FreezerBox::try_from(row).map(|b| (b.id.clone(), b)))
            .collect::<FreezerResult<BTreeMap<_, _>>>()?;
        let samples = sample_rows
            .into_iter()
            .map(|row| Sample::try_from(row).map(|s| (s.id.clone(), s)))
            .collect::<FreezerResult<BTreeMap<_, _>>>()?;
        Ok((boxes, samples))
    }

    /// Point the selection at a box, the trash, or nothing.
    pub fn set_current_selection(&mut self, selection: Selection) -> FreezerResult<()> {
        if let Selection::Box(id) = &selection {
            let result = self.require_box(id).map(|_| ());
            self.record(result)?;
        }
        self.selection = selection;
        Ok(())
    }

    // ========================================================================
    // Boxes
    // ========================================================================

    /// Create a default 10x10 box named `name`.
    pub async fn create_box(&mut self, name: &str, owner: &OwnerId) -> FreezerResult<FreezerBox> {
        self.create_box_with(NewBox::new(name), owner).await
    }

    pub async fn create_box_with(
        &mut self,
        new_box: NewBox,
        owner: &OwnerId,
    ) -> FreezerResult<FreezerBox> {
        let result = self.try_create_box(new_box, owner).await;
        self.record(result)
    }

    async fn try_create_box(&mut self, new_box: NewBox, owner: &OwnerId) -> FreezerResult<FreezerBox> {
        let new_box = new_box.validated()?;
        let row = self.store.create_box(NewBoxRow::new(&new_box, owner)).await?;
        let created = FreezerBox::try_from(row)?;

        self.boxes.insert(created.id.clone(), created.clone());
        if self.selection == Selection::None {
            self.selection = Selection::Box(created.id.clone());
        }
        if self.owner.is_none() {
            self.owner = Some(owner.clone());
        }
        tracing::info!(box_id = %created.id, name = %created.name, layout = %created.layout, "Created box");
        Ok(created)
    }

    /// Delete a box. Its active samples become `deleted`.
    pub async fn delete_box(&mut self, box_id: &BoxId) -> FreezerResult<()> {
        let result = self.try_delete_box(box_id).await;
        self.record(result)
    }

    async fn try_delete_box(&mut self, box_id: &BoxId) -> FreezerResult<()> {
        self.require_box(box_id)?;
        self.store.delete_box(box_id).await?;

        self.boxes.remove(box_id);
        let mut cascaded = 0usize;
        for sample in self.samples.values_mut().filter(|s| s.is_active_in(box_id)) {
            sample.status = SampleStatus::Deleted;
            cascaded += 1;
        }
        if matches!(&self.selection, Selection::Box(id) if id == box_id) {
            self.selection = Selection::None;
        }
        tracing::info!(box_id = %box_id, cascaded, "Deleted box");
        Ok(())
    }

    // ========================================================================
    // Samples
    // ========================================================================

    /// Create an active sample at `new_sample.location`.
    ///
    /// Unless `reject_occupied_create` is off, an occupied cell is rejected.
    pub async fn create_sample(&mut self, new_sample: NewSample) -> FreezerResult<Sample> {
        let result = self.try_create_sample(new_sample).await;
        self.record(result)
    }

    async fn try_create_sample(&mut self, new_sample: NewSample) -> FreezerResult<Sample> {
        let owner = self.require_owner()?;
        new_sample.details.validate()?;
        let location = &new_sample.location;
        self.validate_cell(location)?;
        if self.options.reject_occupied_create
            && let Some(occupant) = self.sample_at(&location.box_id, location.position)
        {
            return Err(FreezerError::Validation(format!(
                "position {} is already occupied by sample {}",
                location.position, occupant.details.sample_number
            )));
        }

        let row = self
            .store
            .create_sample(NewSampleRow::active(&new_sample, &owner))
            .await?;
        let created = Sample::try_from(row)?;

        self.samples.insert(created.id.clone(), created.clone());
        tracing::info!(
            sample_id = %created.id,
            box_id = %new_sample.location.box_id,
            position = new_sample.location.position,
            "Created sample"
        );
        Ok(created)
    }

    /// Write the fields of `patch` that differ from the cached sample.
    ///
    /// Unknown ids are ignored.
    pub async fn update_sample(&mut self, id: &SampleId, patch: SamplePatch) -> FreezerResult<()> {
        let result = self.try_update_sample(id, patch).await;
        self.record(result)
    }

    async fn try_update_sample(&mut self, id: &SampleId, patch: SamplePatch) -> FreezerResult<()> {
        let Some(current) = self.samples.get(id) else {
            tracing::debug!(sample_id = %id, "Update of unknown sample ignored");
            return Ok(());
        };
        if current.status == SampleStatus::Deleted {
            return Err(FreezerError::InvalidState(format!(
                "sample {} was deleted with its box",
                id
            )));
        }
        patch.validate()?;
        let changes = patch.changes_against(&current.details);
        if changes.is_empty() {
            return Ok(());
        }

        self.store
            .update_sample(id, SampleRowPatch::from(&changes))
            .await?;
        if let Some(sample) = self.samples.get_mut(id) {
            changes.apply_to(&mut sample.details);
        }
        tracing::info!(sample_id = %id, "Updated sample");
        Ok(())
    }

    /// Take a sample out of its box. Archiving an archived sample does nothing.
    pub async fn archive_sample(&mut self, id: &SampleId) -> FreezerResult<()> {
        let result = self.try_archive_sample(id).await;
        self.record(result)
    }

    async fn try_archive_sample(&mut self, id: &SampleId) -> FreezerResult<()> {
        let status = self.require_sample(id)?.status;
        if status == SampleStatus::Archived {
            tracing::debug!(sample_id = %id, "Sample already archived");
            return Ok(());
        }
        if !status.can_transition_to(SampleStatus::Archived) {
            return Err(FreezerError::InvalidState(format!(
                "sample {} is {} and cannot be archived",
                id, status
            )));
        }

        self.store.update_sample(id, SampleRowPatch::archive()).await?;
        if let Some(sample) = self.samples.get_mut(id) {
            sample.status = SampleStatus::Archived;
            sample.location = None;
        }
        tracing::info!(sample_id = %id, "Archived sample");
        Ok(())
    }

    /// Put an active sample at `(target_box, target_position)`, swapping with
    /// whatever active sample is there.
    pub async fn move_sample(
        &mut self,
        id: &SampleId,
        target_box: &BoxId,
        target_position: u32,
    ) -> FreezerResult<()> {
        let result = self.try_move_sample(id, target_box, target_position).await;
        self.record(result)
    }

    async fn try_move_sample(
        &mut self,
        id: &SampleId,
        target_box: &BoxId,
        target_position: u32,
    ) -> FreezerResult<()> {
        let source = self.require_sample(id)?;
        if !source.is_active() {
            return Err(FreezerError::InvalidState(format!(
                "only active samples can be moved; sample {} is {}",
                id, source.status
            )));
        }
        let target = Location::new(target_box.clone(), target_position);
        self.validate_cell(&target)?;

        let decision = decide_move(&self.occupant_ids(target_box), source, target)?;
        tracing::debug!(?decision, "Resolved move");

        match decision {
            MoveDecision::Relocate { sample, to } => {
                if self.samples.get(&sample).and_then(|s| s.location.as_ref()) == Some(&to) {
                    return Ok(());
                }
                self.store
                    .update_sample(&sample, SampleRowPatch::relocate(&to))
                    .await?;
                tracing::info!(sample_id = %sample, box_id = %to.box_id, position = to.position, "Moved sample");
                self.set_location(&sample, to);
                Ok(())
            }
            MoveDecision::Swap {
                sample,
                to,
                occupant,
                occupant_to,
            } => self.swap(sample, to, occupant, occupant_to).await,
        }
    }

    /// Issue both swap writes concurrently. There is no atomicity across the
    /// two; a half-applied swap is handled per [`SwapFailurePolicy`].
    async fn swap(
        &mut self,
        sample: SampleId,
        to: Location,
        occupant: SampleId,
        occupant_to: Location,
    ) -> FreezerResult<()> {
        let (occupant_write, sample_write) = futures::join!(
            self.store
                .update_sample(&occupant, SampleRowPatch::relocate(&occupant_to)),
            self.store
                .update_sample(&sample, SampleRowPatch::relocate(&to)),
        );

        // The side that did land, and where it has to go back to.
        let (error, landed) = match (occupant_write, sample_write) {
            (Ok(()), Ok(())) => {
                tracing::info!(sample_id = %sample, occupant_id = %occupant, "Swapped samples");
                self.set_location(&occupant, occupant_to);
                self.set_location(&sample, to);
                return Ok(());
            }
            (Err(e), Ok(())) => (e, Some((sample.clone(), occupant_to.clone()))),
            (Ok(()), Err(e)) => (e, Some((occupant.clone(), to.clone()))),
            (Err(e), Err(_)) => (e, None),
        };

        match self.options.swap_failure_policy {
            SwapFailurePolicy::FailOpen if landed.is_some() => {
                tracing::warn!(
                    sample_id = %sample,
                    occupant_id = %occupant,
                    error = %error,
                    "Swap write failed; cache updated for both samples"
                );
                self.set_location(&occupant, occupant_to);
                self.set_location(&sample, to);
            }
            SwapFailurePolicy::FailOpen => {
                tracing::warn!(sample_id = %sample, occupant_id = %occupant, error = %error, "Both swap writes failed");
            }
            SwapFailurePolicy::Strict => {
                if let Some((id, previous)) = landed
                    && let Err(revert) = self
                        .store
                        .update_sample(&id, SampleRowPatch::relocate(&previous))
                        .await
                {
                    tracing::warn!(sample_id = %id, error = %revert, "Could not revert half-applied swap");
                }
            }
        }
        Err(error)
    }

    /// Duplicate an active sample into the lowest free cell of its box.
    ///
    /// A full box records [`CONTAINER_FULL`] and writes nothing.
    pub async fn copy_sample(&mut self, id: &SampleId) -> FreezerResult<Sample> {
        let result = self.try_copy_sample(id).await;
        self.record(result)
    }

    async fn try_copy_sample(&mut self, id: &SampleId) -> FreezerResult<Sample> {
        let owner = self.require_owner()?;
        let source = self.require_sample(id)?;
        let box_id = match (&source.status, &source.location) {
            (SampleStatus::Active, Some(location)) => location.box_id.clone(),
            _ => {
                return Err(FreezerError::InvalidState(format!(
                    "only active samples can be copied; sample {} is {}",
                    id, source.status
                )));
            }
        };
        let capacity = self.require_box(&box_id)?.capacity();

        let occupied: BTreeSet<u32> = self
            .samples
            .values()
            .filter(|s| s.is_active_in(&box_id))
            .filter_map(Sample::position)
            .collect();
        let position = first_fit_position(&occupied, capacity)
            .ok_or_else(|| FreezerError::Capacity(CONTAINER_FULL.into()))?;

        let new_sample = NewSample {
            location: Location::new(box_id, position),
            details: source.details.clone(),
        };
        let row = self
            .store
            .create_sample(NewSampleRow::active(&new_sample, &owner))
            .await?;
        let created = Sample::try_from(row)?;

        self.samples.insert(created.id.clone(), created.clone());
        tracing::info!(source_id = %id, sample_id = %created.id, position, "Copied sample");
        Ok(created)
    }

    // ========================================================================
    // Query
    // ========================================================================

    /// Non-deleted samples matching every token of `query`.
    pub fn search(&self, query: &str) -> Vec<&Sample> {
        search::search(self.samples.values(), &self.boxes, query)
    }
}
