use cellpack_assets::Bounds;
use cellpack_common::InstanceId;
use cellpack_pack::{LatticeCoord, PackSession};

/// Pack inspector for developer tooling.
///
/// Read-only queries against a pack session for the side panel and the CLI.
pub struct PackInspector;

impl PackInspector {
    /// Produce a summary of the session's current pack.
    pub fn summary(session: &PackSession) -> PackSummary {
        let pack = session.collection();
        PackSummary {
            template: session.template().name.clone(),
            generation: session.generation(),
            extents: pack.map(|p| [p.extents().x(), p.extents().y(), p.extents().z()]),
            instance_count: session.instances().len(),
            flipped_count: pack.map_or(0, |p| p.flipped_count()),
            bounds: pack.and_then(|p| p.origin_bounds()),
        }
    }

    /// Look up the cell placed at a lattice coordinate.
    pub fn inspect_cell(session: &PackSession, coord: LatticeCoord) -> Option<CellInfo> {
        session
            .instances()
            .iter()
            .find(|c| c.coord == coord)
            .map(|c| {
                let p = c.transform.position;
                CellInfo {
                    id: c.id,
                    coord: c.coord,
                    position: [p.x, p.y, p.z],
                    flipped: c.flipped,
                }
            })
    }

    /// All instance ids in generation order.
    pub fn list_cells(session: &PackSession) -> Vec<InstanceId> {
        session.instances().iter().map(|c| c.id).collect()
    }
}

/// Summary of a pack session for the inspector.
#[derive(Debug, Clone)]
pub struct PackSummary {
    pub template: String,
    pub generation: u64,
    /// `None` until a pack has been generated.
    pub extents: Option<[u32; 3]>,
    pub instance_count: usize,
    pub flipped_count: usize,
    /// Bounds of the instance origins in pack-local space.
    pub bounds: Option<Bounds>,
}

impl std::fmt::Display for PackSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Pack: template={} generation={}", self.template, self.generation)?;
        match self.extents {
            Some([x, y, z]) => write!(f, " extents={x}x{y}x{z}")?,
            None => write!(f, " extents=none")?,
        }
        write!(
            f,
            " cells={} flipped={}",
            self.instance_count, self.flipped_count
        )?;
        if let Some(b) = &self.bounds {
            let s = b.size();
            write!(f, " span=({:.2}, {:.2}, {:.2})", s.x, s.y, s.z)?;
        }
        Ok(())
    }
}

/// Detailed info about a single placed cell.
#[derive(Debug, Clone)]
pub struct CellInfo {
    pub id: InstanceId,
    pub coord: LatticeCoord,
    pub position: [f32; 3],
    pub flipped: bool,
}

impl std::fmt::Display for CellInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cell [{}] ({}, {}, {}) pos=({:.2}, {:.2}, {:.2}){}",
            self.id.short(),
            self.coord.x,
            self.coord.y,
            self.coord.z,
            self.position[0],
            self.position[1],
            self.position[2],
            if self.flipped { " flipped" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellpack_assets::ModelAsset;
    use cellpack_pack::CellTemplate;

    fn session() -> PackSession {
        PackSession::new(CellTemplate::from_model(ModelAsset::procedural_cell()))
    }

    #[test]
    fn summary_empty_session() {
        let summary = PackInspector::summary(&session());
        assert_eq!(summary.generation, 0);
        assert_eq!(summary.instance_count, 0);
        assert!(summary.extents.is_none());
        assert!(summary.bounds.is_none());
    }

    #[test]
    fn summary_with_pack() {
        let mut s = session();
        s.regenerate(2, 3, 4).unwrap();
        let summary = PackInspector::summary(&s);
        assert_eq!(summary.generation, 1);
        assert_eq!(summary.extents, Some([2, 3, 4]));
        assert_eq!(summary.instance_count, 24);
        // z = 2 and z = 4 rows are flipped
        assert_eq!(summary.flipped_count, 12);
        let size = summary.bounds.unwrap().size();
        assert!((size.x - 0.8).abs() < 1e-5);
        assert!((size.y - 3.6).abs() < 1e-5);
        assert!((size.z - 2.4).abs() < 1e-5);
    }

    #[test]
    fn inspect_cell_found() {
        let mut s = session();
        s.regenerate(1, 1, 2).unwrap();
        let info = PackInspector::inspect_cell(&s, LatticeCoord::new(1, 1, 2)).unwrap();
        assert!(info.flipped);
        assert_eq!(info.position, [0.0, 1.8, 0.8]);
    }

    #[test]
    fn inspect_cell_not_found() {
        let mut s = session();
        s.regenerate(1, 1, 1).unwrap();
        assert!(PackInspector::inspect_cell(&s, LatticeCoord::new(5, 5, 5)).is_none());
    }

    #[test]
    fn list_cells_in_order() {
        let mut s = session();
        s.regenerate(2, 2, 2).unwrap();
        let ids = PackInspector::list_cells(&s);
        assert_eq!(ids.len(), 8);
        assert_eq!(ids[0], s.instances()[0].id);
    }

    #[test]
    fn summary_display() {
        let mut s = session();
        s.regenerate(2, 1, 1).unwrap();
        let text = format!("{}", PackInspector::summary(&s));
        assert!(text.contains("extents=2x1x1"));
        assert!(text.contains("cells=2"));
    }
}
