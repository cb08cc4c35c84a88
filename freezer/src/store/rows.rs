//! Row shapes exchanged with a durable store, and their mapping onto the
//! entity model.
//!
//! Rows mirror the table columns (`snake_case`, `user_id`, RFC 3339
//! timestamps, `-1` position sentinel). Nothing outside this module reshapes
//! fields by hand.

use chrono::{DateTime, Utc};
use freezer_shared::errors::{FreezerError, FreezerResult};
use serde::{Deserialize, Serialize};

use crate::model::{
    BoxId, FreezerBox, Location, NewBox, NewSample, OwnerId, Sample, SampleDetails, SampleId,
    SamplePatch, SampleStatus,
};

/// Position stored for samples without a cell.
pub const NO_POSITION: i64 = -1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub layout: String,
    pub user_id: String,
    pub created_at: String,
}

/// Box row before the store assigns `id` and `created_at`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewBoxRow {
    pub name: String,
    pub description: Option<String>,
    pub layout: String,
    pub user_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleRow {
    pub id: String,
    pub box_id: Option<String>,
    pub position: i64,
    pub sample_number: String,
    pub name: String,
    pub size: Option<String>,
    pub coating: String,
    pub solvent: String,
    pub molar_conc: Option<f64>,
    pub mass_conc: Option<f64>,
    pub notes: Option<String>,
    pub status: String,
    pub user_id: String,
    pub created_at: String,
}

/// Sample row before the store assigns `id` and `created_at`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewSampleRow {
    pub box_id: Option<String>,
    pub position: i64,
    pub sample_number: String,
    pub name: String,
    pub size: Option<String>,
    pub coating: String,
    pub solvent: String,
    pub molar_conc: Option<f64>,
    pub mass_conc: Option<f64>,
    pub notes: Option<String>,
    pub status: String,
    pub user_id: String,
}

/// Column subset for a sample update. Only `Some` columns are written;
/// nullable columns use `Some(None)` to write NULL.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleRowPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_id: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solvent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub molar_conc: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass_conc: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

// ============================================================================
// Row -> entity
// ============================================================================

fn parse_timestamp(raw: &str) -> FreezerResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| FreezerError::Metadata(format!("bad timestamp '{}': {}", raw, e)))
}

impl TryFrom<BoxRow> for FreezerBox {
    type Error = FreezerError;

    fn try_from(row: BoxRow) -> FreezerResult<Self> {
        Ok(FreezerBox {
            layout: row.layout.parse()?,
            created_at: parse_timestamp(&row.created_at)?,
            id: BoxId::from(row.id),
            name: row.name,
            description: row.description,
        })
    }
}

impl TryFrom<SampleRow> for Sample {
    type Error = FreezerError;

    fn try_from(row: SampleRow) -> FreezerResult<Self> {
        let location = match (row.box_id, u32::try_from(row.position)) {
            (Some(box_id), Ok(position)) if !box_id.is_empty() => {
                Some(Location::new(BoxId::from(box_id), position))
            }
            _ => None,
        };
        let status: SampleStatus = row.status.parse()?;
        if status == SampleStatus::Active && location.is_none() {
            return Err(FreezerError::Metadata(format!(
                "active sample {} has no box position",
                row.id
            )));
        }

        Ok(Sample {
            id: SampleId::from(row.id),
            location,
            details: SampleDetails {
                sample_number: row.sample_number,
                name: row.name,
                size: row.size,
                coating: row.coating,
                solvent: row.solvent,
                molar_conc: row.molar_conc,
                mass_conc: row.mass_conc,
                notes: row.notes,
            },
            status,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

// ============================================================================
// Entity -> row
// ============================================================================

fn location_columns(location: Option<&Location>) -> (Option<String>, i64) {
    match location {
        Some(l) => (Some(l.box_id.to_string()), i64::from(l.position)),
        None => (None, NO_POSITION),
    }
}

impl NewBoxRow {
    pub fn new(new_box: &NewBox, owner: &OwnerId) -> Self {
        Self {
            name: new_box.name.clone(),
            description: new_box.description.clone(),
            layout: new_box.layout.as_str().to_string(),
            user_id: owner.to_string(),
        }
    }
}

impl BoxRow {
    pub fn from_box(entity: &FreezerBox, owner: &OwnerId) -> Self {
        Self {
            id: entity.id.to_string(),
            name: entity.name.clone(),
            description: entity.description.clone(),
            layout: entity.layout.as_str().to_string(),
            user_id: owner.to_string(),
            created_at: entity.created_at.to_rfc3339(),
        }
    }
}

impl NewSampleRow {
    /// Row for a freshly placed, active sample.
    pub fn active(new_sample: &NewSample, owner: &OwnerId) -> Self {
        let (box_id, position) = location_columns(Some(&new_sample.location));
        let d = &new_sample.details;
        Self {
            box_id,
            position,
            sample_number: d.sample_number.clone(),
            name: d.name.clone(),
            size: d.size.clone(),
            coating: d.coating.clone(),
            solvent: d.solvent.clone(),
            molar_conc: d.molar_conc,
            mass_conc: d.mass_conc,
            notes: d.notes.clone(),
            status: SampleStatus::Active.as_str().to_string(),
            user_id: owner.to_string(),
        }
    }

    /// Attach store-assigned identity.
    pub fn into_row(self, id: String, created_at: String) -> SampleRow {
        SampleRow {
            id,
            box_id: self.box_id,
            position: self.position,
            sample_number: self.sample_number,
            name: self.name,
            size: self.size,
            coating: self.coating,
            solvent: self.solvent,
            molar_conc: self.molar_conc,
            mass_conc: self.mass_conc,
            notes: self.notes,
            status: self.status,
            user_id: self.user_id,
            created_at,
        }
    }
}

impl SampleRow {
    pub fn from_sample(sample: &Sample, owner: &OwnerId) -> Self {
        let (box_id, position) = location_columns(sample.location.as_ref());
        let d = &sample.details;
        Self {
            id: sample.id.to_string(),
            box_id,
            position,
            sample_number: d.sample_number.clone(),
            name: d.name.clone(),
            size: d.size.clone(),
            coating: d.coating.clone(),
            solvent: d.solvent.clone(),
            molar_conc: d.molar_conc,
            mass_conc: d.mass_conc,
            notes: d.notes.clone(),
            status: sample.status.as_str().to_string(),
            user_id: owner.to_string(),
            created_at: sample.created_at.to_rfc3339(),
        }
    }

    /// Apply the `Some` columns of `patch` in place.
    pub fn apply(&mut self, patch: &SampleRowPatch) {
        if let Some(v) = &patch.box_id {
            self.box_id = v.clone();
        }
        if let Some(v) = patch.position {
            self.position = v;
        }
        if let Some(v) = &patch.sample_number {
            self.sample_number = v.clone();
        }
        if let Some(v) = &patch.name {
            self.name = v.clone();
        }
        if let Some(v) = &patch.size {
            self.size = v.clone();
        }
        if let Some(v) = &patch.coating {
            self.coating = v.clone();
        }
        if let Some(v) = &patch.solvent {
            self.solvent = v.clone();
        }
        if let Some(v) = patch.molar_conc {
            self.molar_conc = v;
        }
        if let Some(v) = patch.mass_conc {
            self.mass_conc = v;
        }
        if let Some(v) = &patch.notes {
            self.notes = v.clone();
        }
        if let Some(v) = &patch.status {
            self.status = v.clone();
        }
    }
}

impl SampleRowPatch {
    /// Move into a cell.
    pub fn relocate(location: &Location) -> Self {
        let (box_id, position) = location_columns(Some(location));
        Self {
            box_id: Some(box_id),
            position: Some(position),
            ..Self::default()
        }
    }

    /// Take out of its box and mark archived.
    pub fn archive() -> Self {
        Self {
            box_id: Some(None),
            position: Some(NO_POSITION),
            status: Some(SampleStatus::Archived.as_str().to_string()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<&SamplePatch> for SampleRowPatch {
    fn from(patch: &SamplePatch) -> Self {
        Self {
            sample_number: patch.sample_number.clone(),
            name: patch.name.clone(),
            size: patch.size.clone(),
            coating: patch.coating.clone(),
            solvent: patch.solvent.clone(),
            molar_conc: patch.molar_conc,
            mass_conc: patch.mass_conc,
            notes: patch.notes.clone(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoxLayout;

    fn sample_row() -> SampleRow {
        SampleRow {
            id: "01S".into(),
            box_id: Some("01B".into()),
            position: 7,
            sample_number: "S1".into(),
            name: "NaYF4".into(),
            size: Some("20nm".into()),
            coating: "Oleic acid (OA)".into(),
            solvent: "Cyclohexane".into(),
            molar_conc: Some(0.1),
            mass_conc: None,
            notes: None,
            status: "active".into(),
            user_id: "alice".into(),
            created_at: "2026-03-01T10:00:00+00:00".into(),
        }
    }

    #[test]
    fn test_box_row_maps_layout_and_time() {
        let row = BoxRow {
            id: "01B".into(),
            name: "A1".into(),
            description: None,
            layout: "9x9".into(),
            user_id: "alice".into(),
            created_at: "2026-03-01T10:00:00Z".into(),
        };
        let b = FreezerBox::try_from(row.clone()).unwrap();
        assert_eq!(b.layout, BoxLayout::Grid9x9);
        assert_eq!(b.id.as_str(), "01B");

        let back = BoxRow::from_box(&b, &OwnerId::new("alice"));
        assert_eq!(back.layout, "9x9");
        assert_eq!(back.name, row.name);
    }

    #[test]
    fn test_sample_row_to_entity_and_back() {
        let sample = Sample::try_from(sample_row()).unwrap();
        assert_eq!(sample.position(), Some(7));
        assert_eq!(sample.box_id().map(BoxId::as_str), Some("01B"));
        assert_eq!(sample.details.molar_conc, Some(0.1));

        let row = SampleRow::from_sample(&sample, &OwnerId::new("alice"));
        assert_eq!(row, sample_row());
    }

    #[test]
    fn test_archived_row_has_no_location() {
        let row = SampleRow {
            box_id: None,
            position: NO_POSITION,
            status: "archived".into(),
            ..sample_row()
        };
        let sample = Sample::try_from(row).unwrap();
        assert_eq!(sample.location, None);
        assert_eq!(sample.status, SampleStatus::Archived);

        let back = SampleRow::from_sample(&sample, &OwnerId::new("alice"));
        assert_eq!(back.box_id, None);
        assert_eq!(back.position, NO_POSITION);
    }

    #[test]
    fn test_empty_box_id_means_unplaced() {
        let row = SampleRow {
            box_id: Some(String::new()),
            status: "archived".into(),
            ..sample_row()
        };
        assert_eq!(Sample::try_from(row).unwrap().location, None);
    }

    #[test]
    fn test_active_row_without_position_is_rejected() {
        let row = SampleRow {
            position: NO_POSITION,
            ..sample_row()
        };
        assert!(matches!(
            Sample::try_from(row),
            Err(FreezerError::Metadata(_))
        ));
    }

    #[test]
    fn test_bad_timestamp_is_metadata_error() {
        let row = SampleRow {
            created_at: "yesterday".into(),
            ..sample_row()
        };
        assert!(matches!(
            Sample::try_from(row),
            Err(FreezerError::Metadata(_))
        ));
    }

    #[test]
    fn test_patch_serializes_only_set_columns() {
        let patch = SampleRowPatch::relocate(&Location::new(BoxId::new("01B"), 3));
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"box_id": "01B", "position": 3}));

        let archive = serde_json::to_value(SampleRowPatch::archive()).unwrap();
        assert_eq!(
            archive,
            serde_json::json!({"box_id": null, "position": -1, "status": "archived"})
        );
    }

    #[test]
    fn test_apply_patch_to_row() {
        let mut row = sample_row();
        row.apply(&SampleRowPatch::archive());
        assert_eq!(row.box_id, None);
        assert_eq!(row.position, NO_POSITION);
        assert_eq!(row.status, "archived");
        assert_eq!(row.name, "NaYF4");
    }

    #[test]
    fn test_descriptive_patch_maps_columns() {
        let patch = SamplePatch {
            notes: Some(None),
            mass_conc: Some(Some(2.5)),
            ..SamplePatch::default()
        };
        let row_patch = SampleRowPatch::from(&patch);
        assert_eq!(row_patch.notes, Some(None));
        assert_eq!(row_patch.mass_conc, Some(Some(2.5)));
        assert_eq!(row_patch.box_id, None);
        assert!(!row_patch.is_empty());
    }
}
