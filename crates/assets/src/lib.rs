//! Cell assets: model import, procedural geometry, and the gradient texture.
//!
//! Assets are identified by content-addressed hashes. The renderer consumes
//! a [`ModelAsset`] by value, never by raw file path.
//!
//! # Invariants
//! - A successfully loaded model always has at least one triangle.
//! - The same file bytes always produce the same [`AssetId`].

mod gltf_import;
mod mesh;
mod texture;

pub use gltf_import::load_cell_model;
pub use mesh::{Bounds, CellMesh};
pub use texture::{CELL_TEXTURE_SIZE, GradientStop, RadialGradient, TextureImage};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Radius of the procedural cylindrical cell, sized to the 0.8 lattice pitch.
pub const PROCEDURAL_CELL_RADIUS: f32 = 0.36;
/// Height of the procedural cell, sized to the 1.8 vertical pitch.
pub const PROCEDURAL_CELL_HEIGHT: f32 = 1.7;
pub const PROCEDURAL_CELL_SEGMENTS: u32 = 32;

/// Content-addressed asset ID computed from the asset data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub u64);

impl AssetId {
    /// First eight bytes of the SHA-256 digest of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        Self(u64::from_le_bytes(head))
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("glTF parse error: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("missing binary chunk for buffer {0}")]
    MissingBlob(usize),
    #[error("unsupported buffer uri: {0}")]
    UnsupportedUri(String),
    #[error("buffer {index} is {actual} bytes, expected at least {expected}")]
    ShortBuffer {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("model {0} contains no triangle geometry")]
    Empty(String),
}

/// A loaded (or generated) cell model: one merged triangle mesh.
#[derive(Debug, Clone)]
pub struct ModelAsset {
    pub id: AssetId,
    pub name: String,
    pub mesh: CellMesh,
}

impl ModelAsset {
    /// Built-in cylindrical cell, used when no model file is available.
    pub fn procedural_cell() -> Self {
        let mesh = CellMesh::cylinder(
            PROCEDURAL_CELL_RADIUS,
            PROCEDURAL_CELL_HEIGHT,
            PROCEDURAL_CELL_SEGMENTS,
        );
        let mut key = Vec::with_capacity(12);
        key.extend_from_slice(&PROCEDURAL_CELL_RADIUS.to_le_bytes());
        key.extend_from_slice(&PROCEDURAL_CELL_HEIGHT.to_le_bytes());
        key.extend_from_slice(&PROCEDURAL_CELL_SEGMENTS.to_le_bytes());
        Self {
            id: AssetId::from_bytes(&key),
            name: "procedural_cylinder".into(),
            mesh,
        }
    }
}

pub fn crate_info() -> &'static str {
    "cellpack-assets v0.1.0"
}
