//! `freezer box`: create, list, show and remove boxes.

use std::io::Write;

use clap::{Args, Subcommand};
use freezer::{BoxLayout, FreezerBox, Inventory, NewBox};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{GlobalFlags, resolve_box};
use crate::formatter::{self, OutputFormat};

#[derive(Args, Debug)]
pub struct BoxArgs {
    #[command(subcommand)]
    pub command: BoxCommand,
}

#[derive(Subcommand, Debug)]
pub enum BoxCommand {
    /// Create a box and print its id
    Create {
        /// Box name
        name: String,

        /// Grid layout: 10x10 or 9x9
        #[arg(long, default_value = "10x10")]
        layout: BoxLayout,

        /// Free-text description
        #[arg(long)]
        description: Option<String>,
    },

    /// List boxes
    #[command(visible_alias = "list")]
    Ls {
        /// Output format: table, json or yaml
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Show the grid of a box
    Show {
        /// Box id or name
        #[arg(value_name = "BOX")]
        target: String,
    },

    /// Remove a box; its samples are marked deleted
    Rm {
        /// Box id or name
        #[arg(value_name = "BOX")]
        target: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct BoxPresenter {
    #[serde(rename = "Id")]
    #[tabled(rename = "ID")]
    id: String,
    #[serde(rename = "Name")]
    #[tabled(rename = "NAME")]
    name: String,
    #[serde(rename = "Layout")]
    #[tabled(rename = "LAYOUT")]
    layout: String,
    #[serde(rename = "Used")]
    #[tabled(rename = "USED")]
    used: String,
    #[serde(rename = "Created")]
    #[tabled(rename = "CREATED")]
    created: String,
}

impl BoxPresenter {
    fn new(entity: &FreezerBox, inventory: &Inventory) -> Self {
        let used = inventory
            .occupancy(&entity.id)
            .map(|o| format!("{}/{}", o.used, o.capacity))
            .unwrap_or_default();
        Self {
            id: entity.id.to_string(),
            name: entity.name.clone(),
            layout: entity.layout.to_string(),
            used,
            created: formatter::format_time(&entity.created_at),
        }
    }
}

pub async fn execute(args: BoxArgs, global: &GlobalFlags) -> anyhow::Result<()> {
    let mut inventory = global.open_inventory().await?;

    match args.command {
        BoxCommand::Create {
            name,
            layout,
            description,
        } => {
            let mut new_box = NewBox::new(name).with_layout(layout);
            if let Some(description) = description {
                new_box = new_box.with_description(description);
            }
            let owner = global.options().owner_id();
            let created = inventory.create_box_with(new_box, &owner).await?;
            println!("{}", created.id);
        }
        BoxCommand::Ls { format } => {
            let format = OutputFormat::from_str(&format)?;
            let presenters: Vec<BoxPresenter> = inventory
                .boxes()
                .values()
                .map(|b| BoxPresenter::new(b, &inventory))
                .collect();
            let mut stdout = std::io::stdout().lock();
            formatter::print_output(&mut stdout, &presenters, format, |w, rows| {
                writeln!(w, "{}", formatter::create_table(rows))?;
                Ok(())
            })?;
        }
        BoxCommand::Show { target } => {
            let box_id = resolve_box(&inventory, &target)?;
            let rows = grid_rows(&inventory, &box_id);
            println!("{}", formatter::create_grid(rows));
        }
        BoxCommand::Rm { target } => {
            let box_id = resolve_box(&inventory, &target)?;
            inventory.delete_box(&box_id).await?;
            println!("{}", box_id);
        }
    }

    Ok(())
}

/// Header row of column numbers, then one row per grid row labelled with the
/// 1-based number of its first cell.
fn grid_rows(inventory: &Inventory, box_id: &freezer::BoxId) -> Vec<Vec<String>> {
    let Some(entity) = inventory.get_box(box_id) else {
        return Vec::new();
    };
    let columns = entity.layout.columns();
    let occupants = inventory.box_occupants(box_id);

    let mut rows = Vec::new();
    rows.push(
        std::iter::once(String::new())
            .chain((1..=columns).map(|c| c.to_string()))
            .collect(),
    );
    for row in 0..entity.capacity() / columns {
        let start = row * columns;
        let mut cells = vec![(start + 1).to_string()];
        cells.extend((start..start + columns).map(|position| {
            occupants
                .get(&position)
                .map_or_else(|| ".".to_string(), |s| s.details.sample_number.clone())
        }));
        rows.push(cells);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(subcommand)]
        command: BoxCommand,
    }

    #[test]
    fn test_create_parses_layout() {
        let parsed = Wrapper::try_parse_from(["box", "create", "Rack", "--layout", "9x9"]).unwrap();
        match parsed.command {
            BoxCommand::Create { name, layout, .. } => {
                assert_eq!(name, "Rack");
                assert_eq!(layout, BoxLayout::Grid9x9);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_create_rejects_unknown_layout() {
        assert!(Wrapper::try_parse_from(["box", "create", "Rack", "--layout", "8x8"]).is_err());
    }
}
