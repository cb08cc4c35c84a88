//! Entity model for boxes and samples.
//!
//! Pure data plus structural checks. Anything that touches the store or the
//! in-memory cache lives in [`crate::inventory`].

mod boxes;
mod sample;

pub use boxes::{BoxLayout, FreezerBox, NewBox};
pub use sample::{
    COATING_OPTIONS, Location, NewSample, SOLVENT_OPTIONS, Sample, SampleDetails, SamplePatch,
    SampleStatus,
};

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id!(
    /// Store-assigned box identifier, unique within an owner.
    BoxId
);
string_id!(
    /// Store-assigned sample identifier, unique within an owner.
    SampleId
);
string_id!(
    /// The user that owns a set of boxes and samples.
    OwnerId
);

/// True when `position` addresses a cell of a box with `layout`.
pub fn is_valid_position(layout: BoxLayout, position: u32) -> bool {
    layout.is_valid_position(position)
}
