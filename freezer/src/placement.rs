//! Placement decisions for move and copy.
//!
//! Pure functions over occupancy snapshots; no I/O and no access to the
//! inventory cache.

use std::collections::{BTreeMap, BTreeSet};

use freezer_shared::errors::{FreezerError, FreezerResult};

use crate::model::{Location, Sample, SampleId};

/// What a move into a cell requires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveDecision {
    /// Target cell is free (or already holds the sample): write one location.
    Relocate { sample: SampleId, to: Location },
    /// Target cell holds another active sample: the two exchange locations.
    Swap {
        sample: SampleId,
        to: Location,
        occupant: SampleId,
        occupant_to: Location,
    },
}

impl MoveDecision {
    pub fn is_swap(&self) -> bool {
        matches!(self, MoveDecision::Swap { .. })
    }
}

/// Decide how to put `source` at `target`.
///
/// `occupants` maps position to the active sample in the target box.
pub fn decide_move(
    occupants: &BTreeMap<u32, SampleId>,
    source: &Sample,
    target: Location,
) -> FreezerResult<MoveDecision> {
    match occupants.get(&target.position) {
        Some(occupant) if *occupant != source.id => {
            let from = source.location.clone().ok_or_else(|| {
                FreezerError::InvalidState(format!(
                    "sample {} has no position to swap into",
                    source.id
                ))
            })?;
            Ok(MoveDecision::Swap {
                sample: source.id.clone(),
                to: target,
                occupant: occupant.clone(),
                occupant_to: from,
            })
        }
        _ => Ok(MoveDecision::Relocate {
            sample: source.id.clone(),
            to: target,
        }),
    }
}

/// Lowest position in `[0, capacity)` not in `occupied`.
pub fn first_fit_position(occupied: &BTreeSet<u32>, capacity: u32) -> Option<u32> {
    (0..capacity).find(|position| !occupied.contains(position))
}
