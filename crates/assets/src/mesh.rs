use glam::{Mat3, Mat4, Vec3};
use std::collections::BTreeSet;
use std::f32::consts::TAU;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Grow to include `p`.
    pub fn include(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Smallest box containing every point, or `None` for no points.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for p in iter {
            bounds.include(p);
        }
        Some(bounds)
    }
}

/// Indexed triangle mesh for one cell.
///
/// Attribute arrays are parallel: `positions[i]`, `normals[i]` and `uvs[i]`
/// describe vertex `i`. Every three entries of `indices` form a triangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl CellMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.positions.iter().copied().map(Vec3::from))
    }

    /// Append `other` with `transform` baked into its positions and normals.
    pub fn append_transformed(&mut self, other: &CellMesh, transform: Mat4) {
        let base = self.positions.len() as u32;
        let normal_matrix = Mat3::from_mat4(transform).inverse().transpose();
        let mirrored = transform.determinant() < 0.0;

        self.positions.extend(
            other
                .positions
                .iter()
                .map(|p| transform.transform_point3(Vec3::from(*p)).to_array()),
        );
        self.normals.extend(other.normals.iter().map(|n| {
            (normal_matrix * Vec3::from(*n))
                .normalize_or_zero()
                .to_array()
        }));
        self.uvs.extend_from_slice(&other.uvs);

        for tri in other.indices.chunks_exact(3) {
            if mirrored {
                self.indices
                    .extend_from_slice(&[base + tri[0], base + tri[2], base + tri[1]]);
            } else {
                self.indices
                    .extend_from_slice(&[base + tri[0], base + tri[1], base + tri[2]]);
            }
        }
    }

    /// Replace normals with area-weighted face normals.
    pub fn recompute_normals(&mut self) {
        let mut acc = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(self.positions[i as usize]));
            let face = (b - a).cross(c - a);
            for &i in tri {
                acc[i as usize] += face;
            }
        }
        self.normals = acc
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
            .collect();
    }

    /// Unique undirected edges as a line-list index buffer.
    pub fn edge_indices(&self) -> Vec<u32> {
        let mut edges = BTreeSet::new();
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                edges.insert((a.min(b), a.max(b)));
            }
        }
        edges.into_iter().flat_map(|(a, b)| [a, b]).collect()
    }

    /// Closed cylinder centred on the origin with its axis along +Y.
    ///
    /// Side walls wrap the texture horizontally; the caps map it planar so
    /// the radial gradient sits centred on each terminal.
    pub fn cylinder(radius: f32, height: f32, segments: u32) -> Self {
        let segments = segments.max(3);
        let half = height * 0.5;
        let mut mesh = Self::new();

        // Side: segments + 1 columns so the seam gets its own uvs.
        for i in 0..=segments {
            let u = i as f32 / segments as f32;
            let (sin, cos) = (u * TAU).sin_cos();
            let normal = [cos, 0.0, sin];
            mesh.positions.push([radius * cos, -half, radius * sin]);
            mesh.normals.push(normal);
            mesh.uvs.push([u, 1.0]);
            mesh.positions.push([radius * cos, half, radius * sin]);
            mesh.normals.push(normal);
            mesh.uvs.push([u, 0.0]);
        }
        for i in 0..segments {
            let bottom = i * 2;
            let top = bottom + 1;
            let next_bottom = bottom + 2;
            let next_top = bottom + 3;
            mesh.indices
                .extend_from_slice(&[bottom, top, next_bottom, next_bottom, top, next_top]);
        }

        for (y, normal_y) in [(half, 1.0_f32), (-half, -1.0)] {
            let center = mesh.positions.len() as u32;
            mesh.positions.push([0.0, y, 0.0]);
            mesh.normals.push([0.0, normal_y, 0.0]);
            mesh.uvs.push([0.5, 0.5]);
            for i in 0..segments {
                let (sin, cos) = (i as f32 / segments as f32 * TAU).sin_cos();
                mesh.positions.push([radius * cos, y, radius * sin]);
                mesh.normals.push([0.0, normal_y, 0.0]);
                mesh.uvs.push([0.5 + 0.5 * cos, 0.5 + 0.5 * sin]);
            }
            for i in 0..segments {
                let a = center + 1 + i;
                let b = center + 1 + (i + 1) % segments;
                if normal_y > 0.0 {
                    mesh.indices.extend_from_slice(&[center, b, a]);
                } else {
                    mesh.indices.extend_from_slice(&[center, a, b]);
                }
            }
        }

        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> CellMesh {
        CellMesh {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            uvs: vec![[0.0, 0.0]; 3],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn cylinder_bounds() {
        let mesh = CellMesh::cylinder(0.5, 2.0, 16);
        let b = mesh.bounds().unwrap();
        assert!((b.min.y + 1.0).abs() < 1e-6);
        assert!((b.max.y - 1.0).abs() < 1e-6);
        assert!((b.max.x - 0.5).abs() < 1e-5);
        assert!(b.center().length() < 1e-5);
    }

    #[test]
    fn cylinder_counts() {
        let mesh = CellMesh::cylinder(0.5, 1.0, 8);
        // 8 quads on the side, 8 triangles per cap
        assert_eq!(mesh.triangle_count(), 8 * 2 + 8 * 2);
        assert_eq!(mesh.normals.len(), mesh.positions.len());
        assert_eq!(mesh.uvs.len(), mesh.positions.len());
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn cylinder_clamps_segments() {
        let mesh = CellMesh::cylinder(1.0, 1.0, 1);
        assert_eq!(mesh.triangle_count(), 3 * 2 + 3 * 2);
    }

    #[test]
    fn top_cap_faces_up() {
        let mesh = CellMesh::cylinder(1.0, 1.0, 8);
        let mut recomputed = mesh.clone();
        recomputed.recompute_normals();
        // the cap centre vertex only touches cap triangles
        let top_center = (9 * 2) as usize;
        assert!(recomputed.normals[top_center][1] > 0.99);
    }

    #[test]
    fn edges_are_unique() {
        let mut mesh = triangle();
        mesh.positions.push([1.0, 1.0, 0.0]);
        mesh.normals.push([0.0, 0.0, 1.0]);
        mesh.uvs.push([0.0, 0.0]);
        mesh.indices.extend_from_slice(&[1, 3, 2]);
        // two triangles sharing edge 1-2: 5 unique edges
        assert_eq!(mesh.edge_indices().len(), 10);
    }

    #[test]
    fn append_transformed_offsets_indices() {
        let mut merged = CellMesh::new();
        merged.append_transformed(&triangle(), Mat4::IDENTITY);
        merged.append_transformed(&triangle(), Mat4::from_translation(Vec3::Y * 2.0));
        assert_eq!(merged.vertex_count(), 6);
        assert_eq!(&merged.indices[3..], &[3, 4, 5]);
        assert_eq!(merged.positions[3], [0.0, 2.0, 0.0]);
    }

    #[test]
    fn mirrored_transform_flips_winding() {
        let mut merged = CellMesh::new();
        merged.append_transformed(&triangle(), Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0)));
        assert_eq!(merged.indices, vec![0, 2, 1]);
    }

    #[test]
    fn recompute_normals_for_flat_triangle() {
        let mut mesh = triangle();
        mesh.normals.clear();
        mesh.recompute_normals();
        assert_eq!(mesh.normals, vec![[0.0, 0.0, 1.0]; 3]);
    }

    #[test]
    fn empty_mesh_has_no_bounds() {
        assert!(CellMesh::new().bounds().is_none());
        assert!(CellMesh::new().is_empty());
    }
}
