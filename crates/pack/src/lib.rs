//! Pack layout: places clones of one cell on a regular 3D lattice.
//!
//! # Invariants
//! - A built collection holds exactly `x * y * z` instances with unique
//!   lattice coordinates, in x-major, z-minor order.
//! - Instances share one [`CellTemplate`]; only transforms are per instance.
//! - A failed regeneration never touches the current collection.

pub mod error;
pub mod grid;
pub mod session;

pub use error::{Axis, DimensionIssue, PackError};
pub use grid::{
    CellInstance, CellTemplate, GridExtents, InstanceCollection, LatticeCoord, MAX_CELLS,
    MAX_EXTENT, PACK_OFFSET_Y, PREVIEW_Y, SPACING_XZ, SPACING_Y, build_grid, build_grid_with,
};
pub use session::PackSession;

pub fn crate_info() -> &'static str {
    "cellpack-pack v0.1.0"
}
