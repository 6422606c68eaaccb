//! Shared value types for the cellpack viewer.
//!
//! Identifiers, spatial transforms and colours used by every other crate.

mod color;
mod types;

pub use color::{Color, ColorParseError};
pub use types::{InstanceId, Transform};
