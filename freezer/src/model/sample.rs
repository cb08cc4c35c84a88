use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use freezer_shared::errors::{FreezerError, FreezerResult};
use serde::{Deserialize, Serialize, Serializer};

use super::{BoxId, SampleId};
use crate::store::rows::NO_POSITION;

/// Curated surface coatings. Free text is accepted as well.
pub const COATING_OPTIONS: &[&str] = &["Oleic acid (OA)", "Other"];

/// Curated solvents. Free text is accepted as well.
pub const SOLVENT_OPTIONS: &[&str] = &["Cyclohexane", "Methanol", "Water", "Toluene", "DMSO", "Other"];

/// Sample lifecycle.
///
/// Transitions are one-way: `Active -> Archived` by user action and
/// `Active -> Deleted` when the owning box is deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleStatus {
    Active,
    Archived,
    Deleted,
}

impl SampleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SampleStatus::Active => "active",
            SampleStatus::Archived => "archived",
            SampleStatus::Deleted => "deleted",
        }
    }

    pub fn can_transition_to(self, next: SampleStatus) -> bool {
        matches!(
            (self, next),
            (SampleStatus::Active, SampleStatus::Archived)
                | (SampleStatus::Active, SampleStatus::Deleted)
        )
    }
}

impl fmt::Display for SampleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SampleStatus {
    type Err = FreezerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SampleStatus::Active),
            "archived" => Ok(SampleStatus::Archived),
            "deleted" => Ok(SampleStatus::Deleted),
            other => Err(FreezerError::Metadata(format!(
                "unknown sample status '{}'",
                other
            ))),
        }
    }
}

/// A cell in a specific box.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub box_id: BoxId,
    pub position: u32,
}

impl Location {
    pub fn new(box_id: BoxId, position: u32) -> Self {
        Self { box_id, position }
    }
}

/// Descriptive metadata carried by a sample and copied verbatim by a copy.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleDetails {
    pub sample_number: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    pub coating: String,
    pub solvent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub molar_conc: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mass_conc: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SampleDetails {
    pub fn new(sample_number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            sample_number: sample_number.into(),
            name: name.into(),
            coating: COATING_OPTIONS[0].to_string(),
            solvent: SOLVENT_OPTIONS[0].to_string(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> FreezerResult<()> {
        require("sample number", &self.sample_number)?;
        require("sample name", &self.name)?;
        require("coating", &self.coating)?;
        require("solvent", &self.solvent)
    }
}

fn require(field: &str, value: &str) -> FreezerResult<()> {
    if value.trim().is_empty() {
        return Err(FreezerError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// A tracked physical item.
///
/// Serializes flat in camelCase. A sample without a location is written with
/// `boxId: null` and `position: -1`, the same shape the store keeps.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub id: SampleId,
    /// Present for active samples. Cleared on archive; kept as last known
    /// placement for deleted samples.
    pub location: Option<Location>,
    pub details: SampleDetails,
    pub status: SampleStatus,
    pub created_at: DateTime<Utc>,
}

impl Serialize for Sample {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Flat<'a> {
            id: &'a SampleId,
            box_id: Option<&'a BoxId>,
            position: i64,
            #[serde(flatten)]
            details: &'a SampleDetails,
            status: SampleStatus,
            created_at: &'a DateTime<Utc>,
        }

        Flat {
            id: &self.id,
            box_id: self.box_id(),
            position: self.position().map_or(NO_POSITION, i64::from),
            details: &self.details,
            status: self.status,
            created_at: &self.created_at,
        }
        .serialize(serializer)
    }
}

impl Sample {
    pub fn is_active(&self) -> bool {
        self.status == SampleStatus::Active
    }

    pub fn box_id(&self) -> Option<&BoxId> {
        self.location.as_ref().map(|l| &l.box_id)
    }

    pub fn position(&self) -> Option<u32> {
        self.location.as_ref().map(|l| l.position)
    }

    /// Active and placed in `box_id`.
    pub fn is_active_in(&self, box_id: &BoxId) -> bool {
        self.is_active() && self.box_id() == Some(box_id)
    }
}

/// Input for creating a sample in a given cell.
#[derive(Clone, Debug, PartialEq)]
pub struct NewSample {
    pub location: Location,
    pub details: SampleDetails,
}

/// Partial update of descriptive fields.
///
/// `None` leaves a field untouched. Nullable fields use `Some(None)` to clear.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SamplePatch {
    pub sample_number: Option<String>,
    pub name: Option<String>,
    pub size: Option<Option<String>>,
    pub coating: Option<String>,
    pub solvent: Option<String>,
    pub molar_conc: Option<Option<f64>>,
    pub mass_conc: Option<Option<f64>>,
    pub notes: Option<Option<String>>,
}

impl SamplePatch {
    pub fn is_empty(&self) -> bool {
        *self == SamplePatch::default()
    }

    pub fn validate(&self) -> FreezerResult<()> {
        if let Some(v) = &self.sample_number {
            require("sample number", v)?;
        }
        if let Some(v) = &self.name {
            require("sample name", v)?;
        }
        if let Some(v) = &self.coating {
            require("coating", v)?;
        }
        if let Some(v) = &self.solvent {
            require("solvent", v)?;
        }
        Ok(())
    }

    /// Keep only the fields whose value differs from `current`.
    pub fn changes_against(&self, current: &SampleDetails) -> SamplePatch {
        fn diff<T: Clone + PartialEq>(new: &Option<T>, old: &T) -> Option<T> {
            new.as_ref().filter(|v| *v != old).cloned()
        }

        SamplePatch {
            sample_number: diff(&self.sample_number, &current.sample_number),
            name: diff(&self.name, &current.name),
            size: diff(&self.size, &current.size),
            coating: diff(&self.coating, &current.coating),
            solvent: diff(&self.solvent, &current.solvent),
            molar_conc: diff(&self.molar_conc, &current.molar_conc),
            mass_conc: diff(&self.mass_conc, &current.mass_conc),
            notes: diff(&self.notes, &current.notes),
        }
    }

    pub fn apply_to(&self, details: &mut SampleDetails) {
        if let Some(v) = &self.sample_number {
            details.sample_number = v.clone();
        }
        if let Some(v) = &self.name {
            details.name = v.clone();
        }
        if let Some(v) = &self.size {
            details.size = v.clone();
        }
        if let Some(v) = &self.coating {
            details.coating = v.clone();
        }
        if let Some(v) = &self.solvent {
            details.solvent = v.clone();
        }
        if let Some(v) = self.molar_conc {
            details.molar_conc = v;
        }
        if let Some(v) = self.mass_conc {
            details.mass_conc = v;
        }
        if let Some(v) = &self.notes {
            details.notes = v.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> SampleDetails {
        SampleDetails {
            size: Some("20nm".into()),
            notes: Some("batch 3".into()),
            ..SampleDetails::new("S1", "NaYF4")
        }
    }

    #[test]
    fn test_status_transitions() {
        use SampleStatus::*;
        assert!(Active.can_transition_to(Archived));
        assert!(Active.can_transition_to(Deleted));
        assert!(!Archived.can_transition_to(Active));
        assert!(!Archived.can_transition_to(Deleted));
        assert!(!Deleted.can_transition_to(Active));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("archived".parse::<SampleStatus>().unwrap(), SampleStatus::Archived);
        assert!(matches!(
            "trashed".parse::<SampleStatus>(),
            Err(FreezerError::Metadata(_))
        ));
    }

    #[test]
    fn test_details_defaults_to_curated_options() {
        let d = SampleDetails::new("S1", "NaYF4");
        assert_eq!(d.coating, "Oleic acid (OA)");
        assert_eq!(d.solvent, "Cyclohexane");
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_details_require_number_and_name() {
        let err = SampleDetails::new(" ", "NaYF4").validate().unwrap_err();
        assert!(err.to_string().contains("sample number"));
        let err = SampleDetails::new("S1", "").validate().unwrap_err();
        assert!(err.to_string().contains("sample name"));
    }

    #[test]
    fn test_patch_changes_against_drops_unchanged() {
        let patch = SamplePatch {
            name: Some("NaYF4".into()),
            notes: Some(Some("batch 4".into())),
            size: Some(None),
            ..SamplePatch::default()
        };
        let changes = patch.changes_against(&details());
        assert_eq!(changes.name, None);
        assert_eq!(changes.notes, Some(Some("batch 4".into())));
        assert_eq!(changes.size, Some(None));
    }

    #[test]
    fn test_patch_apply_clears_nullable() {
        let mut d = details();
        SamplePatch {
            size: Some(None),
            molar_conc: Some(Some(0.5)),
            ..SamplePatch::default()
        }
        .apply_to(&mut d);
        assert_eq!(d.size, None);
        assert_eq!(d.molar_conc, Some(0.5));
        assert_eq!(d.notes.as_deref(), Some("batch 3"));
    }

    #[test]
    fn test_patch_rejects_blank_name() {
        let patch = SamplePatch {
            name: Some("  ".into()),
            ..SamplePatch::default()
        };
        assert!(patch.validate().is_err());
        assert!(SamplePatch::default().is_empty());
    }

    #[test]
    fn test_sample_serializes_flat_camel_case() {
        let sample = Sample {
            id: SampleId::new("s1"),
            location: Some(Location::new(BoxId::new("b1"), 4)),
            details: details(),
            status: SampleStatus::Active,
            created_at: DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        let v = serde_json::to_value(&sample).unwrap();
        assert_eq!(v["boxId"], "b1");
        assert_eq!(v["position"], 4);
        assert_eq!(v["sampleNumber"], "S1");
        assert_eq!(v["status"], "active");
    }

    #[test]
    fn test_unplaced_sample_serializes_sentinel_position() {
        let sample = Sample {
            id: SampleId::new("s2"),
            location: None,
            details: details(),
            status: SampleStatus::Archived,
            created_at: DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        let v = serde_json::to_value(&sample).unwrap();
        assert!(v["boxId"].is_null());
        assert_eq!(v["position"], -1);
        assert_eq!(v["status"], "archived");
        assert_eq!(v["createdAt"], "2026-01-02T03:04:05Z");
    }
}
