//! Developer tooling: pack inspector and frame timing.
//!
//! # Invariants
//! - Tools only read the pack session.

mod inspector;
mod timer;

pub use inspector::{CellInfo, PackInspector, PackSummary};
pub use timer::FrameTimer;

pub fn crate_info() -> &'static str {
    "cellpack-tools v0.1.0"
}
