//! Types shared between the freezer library and its front ends.

pub mod errors;

pub use errors::{FreezerError, FreezerResult};
