use crate::error::{Axis, DimensionIssue, PackError};
use cellpack_assets::{AssetId, Bounds, CellMesh, ModelAsset};
use cellpack_common::{InstanceId, Transform};
use glam::{Quat, Vec3};
use std::f32::consts::PI;
use std::sync::Arc;

/// Lattice pitch along X and Z.
pub const SPACING_XZ: f32 = 0.8;
/// Lattice pitch along Y.
pub const SPACING_Y: f32 = 1.8;
/// Vertical offset of the whole pack group when drawn.
pub const PACK_OFFSET_Y: f32 = -0.95;
/// Height of the standalone preview cell.
pub const PREVIEW_Y: f32 = 0.85;
/// Largest accepted extent on any single axis.
pub const MAX_EXTENT: u32 = 100;
/// Largest accepted total cell count.
pub const MAX_CELLS: u64 = 100_000;

/// The single cell every instance in a pack refers to.
#[derive(Debug, Clone)]
pub struct CellTemplate {
    pub asset: AssetId,
    pub name: String,
    pub mesh: CellMesh,
}

impl CellTemplate {
    pub fn from_model(model: ModelAsset) -> Self {
        Self {
            asset: model.id,
            name: model.name,
            mesh: model.mesh,
        }
    }
}

/// 1-based integer position of a cell in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LatticeCoord {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl LatticeCoord {
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Spatial position within the pack group. The first cell along each
    /// horizontal axis sits at 0.
    pub fn position(&self) -> Vec3 {
        Vec3::new(
            self.x as f32 * SPACING_XZ - SPACING_XZ,
            self.y as f32 * SPACING_Y,
            self.z as f32 * SPACING_XZ - SPACING_XZ,
        )
    }

    /// Even rows along Z are turned over, alternating cell polarity.
    pub fn is_flipped(&self) -> bool {
        self.z % 2 == 0 && self.z > 1
    }

    pub fn transform(&self) -> Transform {
        let rotation = if self.is_flipped() {
            Quat::from_rotation_x(PI)
        } else {
            Quat::IDENTITY
        };
        Transform {
            position: self.position(),
            rotation,
            ..Transform::default()
        }
    }
}

/// Validated grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridExtents {
    x: u32,
    y: u32,
    z: u32,
}

impl GridExtents {
    /// Validate three extents: each in `1..=MAX_EXTENT`, product at most `MAX_CELLS`.
    pub fn new(x: i64, y: i64, z: i64) -> Result<Self, PackError> {
        let extents = Self {
            x: check_extent(Axis::X, x)?,
            y: check_extent(Axis::Y, y)?,
            z: check_extent(Axis::Z, z)?,
        };
        let requested = extents.cell_count() as u64;
        if requested > MAX_CELLS {
            return Err(PackError::TooManyCells {
                requested,
                max: MAX_CELLS,
            });
        }
        Ok(extents)
    }

    /// Parse text-field input. Anything that is not a whole number is
    /// rejected rather than treated as zero.
    pub fn parse(x: &str, y: &str, z: &str) -> Result<Self, PackError> {
        Self::new(
            parse_extent(Axis::X, x)?,
            parse_extent(Axis::Y, y)?,
            parse_extent(Axis::Z, z)?,
        )
    }

    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn y(&self) -> u32 {
        self.y
    }

    pub fn z(&self) -> u32 {
        self.z
    }

    pub fn cell_count(&self) -> usize {
        self.x as usize * self.y as usize * self.z as usize
    }

    /// Every lattice coordinate, x outermost and z innermost.
    pub fn coords(&self) -> impl Iterator<Item = LatticeCoord> + use<> {
        let Self { x: nx, y: ny, z: nz } = *self;
        (1..=nx).flat_map(move |x| {
            (1..=ny).flat_map(move |y| (1..=nz).map(move |z| LatticeCoord::new(x, y, z)))
        })
    }
}

impl std::fmt::Display for GridExtents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}

fn check_extent(axis: Axis, value: i64) -> Result<u32, PackError> {
    if value < 1 {
        return Err(PackError::dimension(axis, value, DimensionIssue::NotPositive));
    }
    if value > MAX_EXTENT as i64 {
        return Err(PackError::dimension(
            axis,
            value,
            DimensionIssue::TooLarge { max: MAX_EXTENT },
        ));
    }
    Ok(value as u32)
}

fn parse_extent(axis: Axis, text: &str) -> Result<i64, PackError> {
    let trimmed = text.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Ok(value);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if !value.is_finite() => {
            Err(PackError::dimension(axis, trimmed, DimensionIssue::NotFinite))
        }
        Ok(value) if value.fract() != 0.0 => {
            Err(PackError::dimension(axis, trimmed, DimensionIssue::NotInteger))
        }
        // Range is checked here so the error carries the text as typed.
        Ok(value) if value < 1.0 => {
            Err(PackError::dimension(axis, trimmed, DimensionIssue::NotPositive))
        }
        Ok(value) if value > MAX_EXTENT as f64 => Err(PackError::dimension(
            axis,
            trimmed,
            DimensionIssue::TooLarge { max: MAX_EXTENT },
        )),
        // Whole-valued floats like "2.0".
        Ok(value) => Ok(value as i64),
        Err(_) => Err(PackError::dimension(axis, trimmed, DimensionIssue::NotANumber)),
    }
}

/// One placed cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellInstance {
    pub id: InstanceId,
    pub coord: LatticeCoord,
    pub transform: Transform,
    pub flipped: bool,
}

/// Every cell of one generated pack, in generation order.
#[derive(Debug, Clone)]
pub struct InstanceCollection {
    template: Arc<CellTemplate>,
    extents: GridExtents,
    instances: Vec<CellInstance>,
}

impl InstanceCollection {
    pub fn template(&self) -> &Arc<CellTemplate> {
        &self.template
    }

    pub fn extents(&self) -> GridExtents {
        self.extents
    }

    pub fn instances(&self) -> &[CellInstance] {
        &self.instances
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CellInstance> {
        self.instances.iter()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn flipped_count(&self) -> usize {
        self.instances.iter().filter(|i| i.flipped).count()
    }

    /// Bounds of the instance origins (not of the cell geometry).
    pub fn origin_bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.instances.iter().map(|i| i.transform.position))
    }
}

impl<'a> IntoIterator for &'a InstanceCollection {
    type Item = &'a CellInstance;
    type IntoIter = std::slice::Iter<'a, CellInstance>;

    fn into_iter(self) -> Self::IntoIter {
        self.instances.iter()
    }
}

/// Validate the inputs and lay out `count_x * count_y * count_z` cells.
pub fn build_grid(
    template: Option<&Arc<CellTemplate>>,
    count_x: i64,
    count_y: i64,
    count_z: i64,
) -> Result<InstanceCollection, PackError> {
    let template = template.ok_or(PackError::MissingTemplate)?;
    let extents = GridExtents::new(count_x, count_y, count_z)?;
    Ok(build_grid_with(template, extents))
}

/// Lay out a grid for already-validated extents.
pub fn build_grid_with(template: &Arc<CellTemplate>, extents: GridExtents) -> InstanceCollection {
    let mut instances = Vec::with_capacity(extents.cell_count());
    for coord in extents.coords() {
        instances.push(CellInstance {
            id: InstanceId::new(),
            coord,
            transform: coord.transform(),
            flipped: coord.is_flipped(),
        });
    }
    InstanceCollection {
        template: Arc::clone(template),
        extents,
        instances,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn template() -> Arc<CellTemplate> {
        Arc::new(CellTemplate::from_model(ModelAsset::procedural_cell()))
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn count_matches_extents() {
        let t = template();
        for x in 1..=4 {
            for y in 1..=4 {
                for z in 1..=4 {
                    let pack = build_grid(Some(&t), x, y, z).unwrap();
                    assert_eq!(pack.len(), (x * y * z) as usize);
                }
            }
        }
    }

    #[test]
    fn coordinates_unique_and_in_range() {
        let pack = build_grid(Some(&template()), 3, 2, 4).unwrap();
        let coords: HashSet<LatticeCoord> = pack.iter().map(|i| i.coord).collect();
        assert_eq!(coords.len(), 24);
        for c in &coords {
            assert!((1..=3).contains(&c.x));
            assert!((1..=2).contains(&c.y));
            assert!((1..=4).contains(&c.z));
        }
    }

    #[test]
    fn first_cell_position() {
        let pack = build_grid(Some(&template()), 1, 1, 1).unwrap();
        let first = &pack.instances()[0];
        assert_eq!(first.coord, LatticeCoord::new(1, 1, 1));
        assert!(approx(first.transform.position, Vec3::new(0.0, 1.8, 0.0)));
    }

    #[test]
    fn position_formula() {
        let c = LatticeCoord::new(3, 2, 4);
        assert!(approx(c.position(), Vec3::new(1.6, 3.6, 2.4)));
    }

    #[test]
    fn iteration_order_is_x_major() {
        let pack = build_grid(Some(&template()), 2, 2, 2).unwrap();
        let order: Vec<(u32, u32, u32)> = pack
            .iter()
            .map(|i| (i.coord.x, i.coord.y, i.coord.z))
            .collect();
        assert_eq!(
            order,
            vec![
                (1, 1, 1),
                (1, 1, 2),
                (1, 2, 1),
                (1, 2, 2),
                (2, 1, 1),
                (2, 1, 2),
                (2, 2, 1),
                (2, 2, 2),
            ]
        );
    }

    #[test]
    fn even_z_rows_are_flipped() {
        let pack = build_grid(Some(&template()), 2, 2, 3).unwrap();
        for inst in &pack {
            let expect_flip = inst.coord.z == 2;
            assert_eq!(inst.flipped, expect_flip);
            if expect_flip {
                let up = inst.transform.rotation * Vec3::Y;
                assert!(approx(up, Vec3::NEG_Y));
            } else {
                assert_eq!(inst.transform.rotation, Quat::IDENTITY);
            }
        }
    }

    #[test]
    fn z_four_is_flipped_z_one_is_not() {
        assert!(LatticeCoord::new(1, 1, 4).is_flipped());
        assert!(!LatticeCoord::new(1, 1, 1).is_flipped());
        assert!(!LatticeCoord::new(1, 1, 5).is_flipped());
    }

    #[test]
    fn two_one_three_scenario() {
        let pack = build_grid(Some(&template()), 2, 1, 3).unwrap();
        assert_eq!(pack.len(), 6);
        assert_eq!(pack.flipped_count(), 2);
        assert!(pack.iter().filter(|i| i.flipped).all(|i| i.coord.z == 2));
    }

    #[test]
    fn same_shape_different_identity() {
        let t = template();
        let a = build_grid(Some(&t), 3, 2, 2).unwrap();
        let b = build_grid(Some(&t), 3, 2, 2).unwrap();
        for (ia, ib) in a.iter().zip(b.iter()) {
            assert_eq!(ia.transform, ib.transform);
            assert_eq!(ia.flipped, ib.flipped);
            assert_ne!(ia.id, ib.id);
        }
    }

    #[test]
    fn instances_share_the_template() {
        let t = template();
        let pack = build_grid(Some(&t), 2, 2, 2).unwrap();
        assert!(Arc::ptr_eq(pack.template(), &t));
    }

    #[test]
    fn non_positive_extents_rejected() {
        let t = template();
        for (x, y, z) in [(0, 2, 2), (-1, 2, 2), (2, 0, 2), (2, 2, -5)] {
            let err = build_grid(Some(&t), x, y, z).unwrap_err();
            assert!(matches!(
                err,
                PackError::InvalidDimension {
                    issue: DimensionIssue::NotPositive,
                    ..
                }
            ));
        }
    }

    #[test]
    fn missing_template_rejected() {
        let err = build_grid(None, 1, 1, 1).unwrap_err();
        assert_eq!(err, PackError::MissingTemplate);
        assert!(err.is_invalid_dimension());
    }

    #[test]
    fn oversized_extents_rejected() {
        let err = GridExtents::new(MAX_EXTENT as i64 + 1, 1, 1).unwrap_err();
        assert!(matches!(
            err,
            PackError::InvalidDimension {
                axis: Axis::X,
                issue: DimensionIssue::TooLarge { .. },
                ..
            }
        ));
        let err = GridExtents::new(100, 100, 100).unwrap_err();
        assert!(matches!(err, PackError::TooManyCells { requested: 1_000_000, .. }));
    }

    #[test]
    fn parse_accepts_whole_numbers() {
        let e = GridExtents::parse(" 2", "3 ", "2.0").unwrap();
        assert_eq!((e.x(), e.y(), e.z()), (2, 3, 2));
        assert_eq!(e.to_string(), "2x3x2");
    }

    #[test]
    fn parse_rejects_non_numbers() {
        let cases = [
            ("abc", DimensionIssue::NotANumber),
            ("", DimensionIssue::NotANumber),
            ("1.5", DimensionIssue::NotInteger),
            ("NaN", DimensionIssue::NotFinite),
            ("inf", DimensionIssue::NotFinite),
            ("0", DimensionIssue::NotPositive),
        ];
        for (text, expected) in cases {
            match GridExtents::parse("1", text, "1") {
                Err(PackError::InvalidDimension { axis, issue, .. }) => {
                    assert_eq!(axis, Axis::Y);
                    assert_eq!(issue, expected, "input {text:?}");
                }
                other => panic!("expected rejection of {text:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn parse_reports_out_of_range_text_as_typed() {
        let err = GridExtents::parse("1e30", "1", "1").unwrap_err();
        assert_eq!(
            err,
            PackError::InvalidDimension {
                axis: Axis::X,
                value: "1e30".into(),
                issue: DimensionIssue::TooLarge { max: MAX_EXTENT },
            }
        );
        assert!(err.to_string().contains("\"1e30\""));

        let err = GridExtents::parse("1", "-5e20", "1").unwrap_err();
        assert!(matches!(
            err,
            PackError::InvalidDimension {
                issue: DimensionIssue::NotPositive,
                ref value,
                ..
            } if value == "-5e20"
        ));
    }

    #[test]
    fn origin_bounds_span_the_lattice() {
        let pack = build_grid(Some(&template()), 2, 1, 3).unwrap();
        let b = pack.origin_bounds().unwrap();
        assert!(approx(b.min, Vec3::new(0.0, 1.8, 0.0)));
        assert!(approx(b.max, Vec3::new(0.8, 1.8, 1.6)));
    }
}
