//! Read-only views over the inventory cache.

use std::collections::BTreeMap;

use crate::model::{BoxId, FreezerBox, OwnerId, Sample, SampleId, SampleStatus};
use crate::options::InventoryOptions;

use super::{Inventory, Selection};

/// How full a box is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Occupancy {
    pub used: u32,
    pub capacity: u32,
}

impl Occupancy {
    pub fn free(&self) -> u32 {
        self.capacity.saturating_sub(self.used)
    }

    pub fn is_full(&self) -> bool {
        self.used >= self.capacity
    }
}

impl Inventory {
    pub fn boxes(&self) -> &BTreeMap<BoxId, FreezerBox> {
        &self.boxes
    }

    pub fn samples(&self) -> &BTreeMap<SampleId, Sample> {
        &self.samples
    }

    pub fn get_box(&self, id: &BoxId) -> Option<&FreezerBox> {
        self.boxes.get(id)
    }

    pub fn get_sample(&self, id: &SampleId) -> Option<&Sample> {
        self.samples.get(id)
    }

    pub fn owner(&self) -> Option<&OwnerId> {
        self.owner.as_ref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn options(&self) -> &InventoryOptions {
        &self.options
    }

    /// Message of the most recent failed operation.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Look a box up by id, then by exact name.
    pub fn find_box(&self, key: &str) -> Option<&FreezerBox> {
        self.boxes
            .get(&BoxId::new(key))
            .or_else(|| self.boxes.values().find(|b| b.name == key))
    }

    /// Active samples of a box keyed by position.
    pub fn box_occupants(&self, box_id: &BoxId) -> BTreeMap<u32, &Sample> {
        self.samples
            .values()
            .filter(|s| s.is_active_in(box_id))
            .filter_map(|s| s.position().map(|p| (p, s)))
            .collect()
    }

    pub(crate) fn occupant_ids(&self, box_id: &BoxId) -> BTreeMap<u32, SampleId> {
        self.box_occupants(box_id)
            .into_iter()
            .map(|(p, s)| (p, s.id.clone()))
            .collect()
    }

    pub fn sample_at(&self, box_id: &BoxId, position: u32) -> Option<&Sample> {
        self.samples
            .values()
            .find(|s| s.is_active_in(box_id) && s.position() == Some(position))
    }

    pub fn occupancy(&self, box_id: &BoxId) -> Option<Occupancy> {
        let target = self.boxes.get(box_id)?;
        let used = self
            .samples
            .values()
            .filter(|s| s.is_active_in(box_id))
            .count() as u32;
        Some(Occupancy {
            used,
            capacity: target.capacity(),
        })
    }

    pub fn active_samples(&self) -> impl Iterator<Item = &Sample> {
        self.samples.values().filter(|s| s.is_active())
    }

    /// The trash view.
    pub fn archived_samples(&self) -> impl Iterator<Item = &Sample> {
        self.samples
            .values()
            .filter(|s| s.status == SampleStatus::Archived)
    }
}
