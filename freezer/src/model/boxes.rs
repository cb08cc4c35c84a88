use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use freezer_shared::errors::{FreezerError, FreezerResult};
use serde::{Deserialize, Serialize};

use super::BoxId;

/// Grid shape of a box. Positions run row-major from 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoxLayout {
    #[default]
    #[serde(rename = "10x10")]
    Grid10x10,
    #[serde(rename = "9x9")]
    Grid9x9,
}

impl BoxLayout {
    pub const fn columns(self) -> u32 {
        match self {
            BoxLayout::Grid10x10 => 10,
            BoxLayout::Grid9x9 => 9,
        }
    }

    /// Number of cells in the grid.
    pub const fn capacity(self) -> u32 {
        self.columns() * self.columns()
    }

    pub const fn is_valid_position(self, position: u32) -> bool {
        position < self.capacity()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BoxLayout::Grid10x10 => "10x10",
            BoxLayout::Grid9x9 => "9x9",
        }
    }
}

impl fmt::Display for BoxLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoxLayout {
    type Err = FreezerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "10x10" => Ok(BoxLayout::Grid10x10),
            "9x9" => Ok(BoxLayout::Grid9x9),
            other => Err(FreezerError::Validation(format!(
                "unknown box layout '{}', expected 10x10 or 9x9",
                other
            ))),
        }
    }
}

/// A fixed-capacity grid container.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreezerBox {
    pub id: BoxId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub layout: BoxLayout,
    pub created_at: DateTime<Utc>,
}

impl FreezerBox {
    pub fn capacity(&self) -> u32 {
        self.layout.capacity()
    }
}

/// Input for creating a box.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewBox {
    pub name: String,
    pub description: Option<String>,
    pub layout: BoxLayout,
}

impl NewBox {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_layout(mut self, layout: BoxLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Trim the name and blank description, rejecting an empty name.
    pub fn validated(self) -> FreezerResult<Self> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(FreezerError::Validation("box name must not be empty".into()));
        }
        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        Ok(Self {
            name,
            description,
            layout: self.layout,
        })
    }
}
