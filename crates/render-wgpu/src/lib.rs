//! wgpu render backend for the pack viewer.
//!
//! Renders the floor grid and axes helpers plus every cell of the pack as
//! instances of one shared mesh and texture. The camera orbits a target
//! point with damped mouse controls.
//!
//! # Invariants
//! - Renderer never mutates the pack session.
//! - Instance data is uploaded once per draw-list change, before the frame's
//!   pass is recorded, so a frame never mixes two packs.

mod camera;
mod gpu;
mod helpers;
mod shaders;

pub use camera::OrbitCamera;
pub use gpu::CellRenderer;
