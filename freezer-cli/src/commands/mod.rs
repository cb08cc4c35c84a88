pub mod boxes;
pub mod completion;
pub mod export;
pub mod sample;
pub mod search;

use std::io::Write;

use freezer::{FreezerBox, Inventory, Sample};
use serde::Serialize;
use tabled::Tabled;

use crate::formatter;

/// One sample as listed by `sample ls`, `sample trash` and `search`.
#[derive(Debug, Serialize, Tabled)]
pub struct SamplePresenter {
    #[serde(rename = "Id")]
    #[tabled(rename = "ID")]
    pub id: String,
    #[serde(rename = "Number")]
    #[tabled(rename = "NUMBER")]
    pub number: String,
    #[serde(rename = "Name")]
    #[tabled(rename = "NAME")]
    pub name: String,
    #[serde(rename = "Box")]
    #[tabled(rename = "BOX")]
    pub container: String,
    #[serde(rename = "Position")]
    #[tabled(rename = "POS")]
    pub position: String,
    #[serde(rename = "Coating")]
    #[tabled(rename = "COATING")]
    pub coating: String,
    #[serde(rename = "Solvent")]
    #[tabled(rename = "SOLVENT")]
    pub solvent: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "STATUS")]
    pub status: String,
    #[serde(rename = "Created")]
    #[tabled(rename = "CREATED")]
    pub created: String,
}

impl SamplePresenter {
    pub fn new(sample: &Sample, inventory: &Inventory) -> Self {
        let container = sample
            .box_id()
            .map(|id| {
                inventory
                    .get_box(id)
                    .map_or_else(|| id.to_string(), |b: &FreezerBox| b.name.clone())
            })
            .unwrap_or_default();

        Self {
            id: sample.id.to_string(),
            number: sample.details.sample_number.clone(),
            name: sample.details.name.clone(),
            container,
            position: sample
                .position()
                .map(|p| (p + 1).to_string())
                .unwrap_or_default(),
            coating: sample.details.coating.clone(),
            solvent: sample.details.solvent.clone(),
            status: sample.status.to_string(),
            created: formatter::format_time(&sample.created_at),
        }
    }
}

/// Print samples in `format`.
pub fn print_samples<'a>(
    samples: impl IntoIterator<Item = &'a Sample>,
    inventory: &Inventory,
    format: &str,
) -> anyhow::Result<()> {
    let format = formatter::OutputFormat::from_str(format)?;
    let presenters: Vec<SamplePresenter> = samples
        .into_iter()
        .map(|s| SamplePresenter::new(s, inventory))
        .collect();

    let mut stdout = std::io::stdout().lock();
    formatter::print_output(&mut stdout, &presenters, format, |w, rows| {
        writeln!(w, "{}", formatter::create_table(rows))?;
        Ok(())
    })
}
