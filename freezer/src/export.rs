//! Whole-inventory snapshots and flat export rows.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::inventory::Inventory;
use crate::model::{BoxId, FreezerBox, Sample, SampleId};

/// Everything the inventory holds, stamped with the export time.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySnapshot<'a> {
    pub export_date: DateTime<Utc>,
    pub boxes: Vec<&'a FreezerBox>,
    pub samples: Vec<&'a Sample>,
}

/// One active sample flattened for spreadsheets.
///
/// `position` is 1-based.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExportRow {
    #[serde(rename = "Sample number")]
    pub sample_number: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Size")]
    pub size: String,
    #[serde(rename = "Coating")]
    pub coating: String,
    #[serde(rename = "Solvent")]
    pub solvent: String,
    #[serde(rename = "Theoretical concentration")]
    pub molar_conc: Option<f64>,
    #[serde(rename = "Actual concentration")]
    pub mass_conc: Option<f64>,
    #[serde(rename = "Container")]
    pub container: String,
    #[serde(rename = "Position")]
    pub position: u32,
    #[serde(rename = "Notes")]
    pub notes: String,
    #[serde(rename = "Created")]
    pub created: String,
}

impl ExportRow {
    fn from_sample(sample: &Sample, boxes: &BTreeMap<BoxId, FreezerBox>) -> Option<Self> {
        let location = sample.location.as_ref()?;
        let container = boxes
            .get(&location.box_id)
            .map_or_else(|| location.box_id.to_string(), |b| b.name.clone());
        let details = &sample.details;

        Some(Self {
            sample_number: details.sample_number.clone(),
            name: details.name.clone(),
            size: details.size.clone().unwrap_or_default(),
            coating: details.coating.clone(),
            solvent: details.solvent.clone(),
            molar_conc: details.molar_conc,
            mass_conc: details.mass_conc,
            container,
            position: location.position + 1,
            notes: details.notes.clone().unwrap_or_default(),
            created: sample
                .created_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        })
    }
}

fn values<'a, K, V>(map: &'a BTreeMap<K, V>) -> Vec<&'a V> {
    map.values().collect()
}

impl Inventory {
    /// Boxes and samples of every status, in creation order.
    pub fn snapshot(&self, export_date: DateTime<Utc>) -> InventorySnapshot<'_> {
        InventorySnapshot {
            export_date,
            boxes: values(self.boxes()),
            samples: values(self.samples()),
        }
    }

    /// Active samples, grouped by box in box creation order and by position
    /// within a box.
    pub fn export_rows(&self) -> Vec<ExportRow> {
        let mut placed: Vec<(&BoxId, u32, &SampleId)> = self
            .active_samples()
            .filter_map(|s| s.location.as_ref().map(|l| (&l.box_id, l.position, &s.id)))
            .collect();
        placed.sort();

        placed
            .into_iter()
            .filter_map(|(_, _, id)| self.get_sample(id))
            .filter_map(|s| ExportRow::from_sample(s, self.boxes()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoxLayout, Location, SampleDetails, SampleStatus};

    fn boxes() -> BTreeMap<BoxId, FreezerBox> {
        let b = FreezerBox {
            id: BoxId::new("b1"),
            name: "Rack A".into(),
            description: None,
            layout: BoxLayout::Grid9x9,
            created_at: Utc::now(),
        };
        BTreeMap::from([(b.id.clone(), b)])
    }

    fn placed(position: u32) -> Sample {
        Sample {
            id: SampleId::new("s1"),
            location: Some(Location::new(BoxId::new("b1"), position)),
            details: SampleDetails {
                size: Some("20 nm".into()),
                molar_conc: Some(0.5),
                ..SampleDetails::new("S-001", "NaYF4")
            },
            status: SampleStatus::Active,
            created_at: DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    #[test]
    fn test_row_position_is_one_based() {
        let row = ExportRow::from_sample(&placed(0), &boxes()).unwrap();
        assert_eq!(row.position, 1);
        assert_eq!(row.container, "Rack A");
        assert_eq!(row.size, "20 nm");
        assert_eq!(row.notes, "");
        assert_eq!(row.created, "2026-01-02T03:04:05Z");
    }

    #[test]
    fn test_unplaced_sample_has_no_row() {
        let mut sample = placed(3);
        sample.location = None;
        assert!(ExportRow::from_sample(&sample, &boxes()).is_none());
    }

    #[test]
    fn test_unknown_box_falls_back_to_id() {
        let row = ExportRow::from_sample(&placed(3), &BTreeMap::new()).unwrap();
        assert_eq!(row.container, "b1");
    }

    #[test]
    fn test_row_serializes_with_column_headers() {
        let row = ExportRow::from_sample(&placed(0), &boxes()).unwrap();
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["Sample number"], "S-001");
        assert_eq!(json["Theoretical concentration"], 0.5);
        assert!(json["Actual concentration"].is_null());
    }
}
