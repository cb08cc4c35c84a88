//! `freezer sample`: add, edit, archive, move, copy and list samples.

use clap::{Args, Subcommand};
use freezer::{Location, NewSample, SampleDetails, SamplePatch};

use crate::cli::{GlobalFlags, cell_index, resolve_box, resolve_sample};
use crate::commands::print_samples;

#[derive(Args, Debug)]
pub struct SampleArgs {
    #[command(subcommand)]
    pub command: SampleCommand,
}

/// Descriptive fields shared by `add` and `edit`.
#[derive(Args, Debug, Clone, Default)]
pub struct DetailFlags {
    /// Lab sample number
    #[arg(long)]
    pub number: Option<String>,

    /// Sample name
    #[arg(long)]
    pub name: Option<String>,

    /// Particle size; pass an empty value to clear
    #[arg(long)]
    pub size: Option<String>,

    /// Surface coating
    #[arg(long)]
    pub coating: Option<String>,

    /// Solvent
    #[arg(long)]
    pub solvent: Option<String>,

    /// Theoretical (molar) concentration
    #[arg(long)]
    pub molar_conc: Option<f64>,

    /// Actual (mass) concentration
    #[arg(long)]
    pub mass_conc: Option<f64>,

    /// Notes; pass an empty value to clear
    #[arg(long)]
    pub notes: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl DetailFlags {
    fn into_details(self) -> anyhow::Result<SampleDetails> {
        let (Some(number), Some(name)) = (self.number.clone(), self.name.clone()) else {
            anyhow::bail!("--number and --name are required");
        };
        let mut details = SampleDetails::new(number, name);
        if let Some(coating) = self.coating {
            details.coating = coating;
        }
        if let Some(solvent) = self.solvent {
            details.solvent = solvent;
        }
        details.size = non_blank(self.size);
        details.notes = non_blank(self.notes);
        details.molar_conc = self.molar_conc;
        details.mass_conc = self.mass_conc;
        Ok(details)
    }

    fn into_patch(self) -> SamplePatch {
        SamplePatch {
            sample_number: self.number,
            name: self.name,
            size: self.size.map(|v| non_blank(Some(v))),
            coating: self.coating,
            solvent: self.solvent,
            molar_conc: self.molar_conc.map(Some),
            mass_conc: self.mass_conc.map(Some),
            notes: self.notes.map(|v| non_blank(Some(v))),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum SampleCommand {
    /// Add a sample to a box cell and print its id
    Add {
        /// Box id or name
        #[arg(value_name = "BOX")]
        target: String,

        /// Cell number, starting at 1
        position: u32,

        #[command(flatten)]
        details: DetailFlags,
    },

    /// Change descriptive fields of a sample
    Edit {
        /// Sample id or number
        sample: String,

        #[command(flatten)]
        details: DetailFlags,
    },

    /// Take a sample out of its box
    Archive {
        /// Sample id or number
        sample: String,
    },

    /// Move a sample; an occupied cell swaps the two samples
    Mv {
        /// Sample id or number
        sample: String,

        /// Target box id or name
        #[arg(value_name = "BOX")]
        target: String,

        /// Target cell number, starting at 1
        position: u32,
    },

    /// Copy a sample into the first free cell of its box and print the new id
    Cp {
        /// Sample id or number
        sample: String,
    },

    /// List active samples
    #[command(visible_alias = "list")]
    Ls {
        /// Only samples in this box (id or name)
        #[arg(long = "box", value_name = "BOX")]
        target: Option<String>,

        /// Output format: table, json or yaml
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// List archived samples
    Trash {
        /// Output format: table, json or yaml
        #[arg(short, long, default_value = "table")]
        format: String,
    },
}

pub async fn execute(args: SampleArgs, global: &GlobalFlags) -> anyhow::Result<()> {
    let mut inventory = global.open_inventory().await?;

    match args.command {
        SampleCommand::Add {
            target,
            position,
            details,
        } => {
            let box_id = resolve_box(&inventory, &target)?;
            let new_sample = NewSample {
                location: Location::new(box_id, cell_index(position)?),
                details: details.into_details()?,
            };
            let created = inventory.create_sample(new_sample).await?;
            println!("{}", created.id);
        }
        SampleCommand::Edit { sample, details } => {
            let id = resolve_sample(&inventory, &sample)?;
            let patch = details.into_patch();
            if patch.is_empty() {
                anyhow::bail!("nothing to change");
            }
            inventory.update_sample(&id, patch).await?;
            println!("{}", id);
        }
        SampleCommand::Archive { sample } => {
            let id = resolve_sample(&inventory, &sample)?;
            inventory.archive_sample(&id).await?;
            println!("{}", id);
        }
        SampleCommand::Mv {
            sample,
            target,
            position,
        } => {
            let id = resolve_sample(&inventory, &sample)?;
            let box_id = resolve_box(&inventory, &target)?;
            inventory
                .move_sample(&id, &box_id, cell_index(position)?)
                .await?;
            println!("{}", id);
        }
        SampleCommand::Cp { sample } => {
            let id = resolve_sample(&inventory, &sample)?;
            let copy = inventory.copy_sample(&id).await?;
            println!("{}", copy.id);
        }
        SampleCommand::Ls { target, format } => match target {
            Some(target) => {
                let box_id = resolve_box(&inventory, &target)?;
                let occupants = inventory.box_occupants(&box_id);
                print_samples(occupants.into_values(), &inventory, &format)?;
            }
            None => print_samples(inventory.active_samples(), &inventory, &format)?,
        },
        SampleCommand::Trash { format } => {
            print_samples(inventory.archived_samples(), &inventory, &format)?;
        }
    }

    Ok(())
}
