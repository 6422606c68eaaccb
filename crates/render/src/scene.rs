use cellpack_common::Color;
use cellpack_pack::{PACK_OFFSET_Y, PREVIEW_Y, PackSession};
use glam::{Mat4, Vec3};

/// Clear colour of the viewport before the user picks one.
pub const DEFAULT_BACKGROUND: Color = Color {
    r: 0x18 as f32 / 255.0,
    g: 0x14 as f32 / 255.0,
    b: 0x2c as f32 / 255.0,
    a: 1.0,
};

/// Side length of the floor grid helper.
pub const GRID_SIZE: f32 = 10.0;
/// Number of cells along each side of the floor grid helper.
pub const GRID_DIVISIONS: u32 = 10;
/// Length of each axis line.
pub const AXES_LENGTH: f32 = 5.0;

/// User-adjustable scene parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneSettings {
    pub background: Color,
    pub wireframe: bool,
    /// Off: flat textured cells. On: ambient + directional shading.
    pub lighting: bool,
    pub show_helpers: bool,
    pub show_preview: bool,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            background: DEFAULT_BACKGROUND,
            wireframe: false,
            lighting: false,
            show_helpers: true,
            show_preview: true,
        }
    }
}

/// Fixed scene lighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLights {
    pub ambient_color: Color,
    pub ambient_intensity: f32,
    pub directional_color: Color,
    pub directional_intensity: f32,
    /// The directional light shines from here towards the origin.
    pub directional_position: Vec3,
}

impl Default for SceneLights {
    fn default() -> Self {
        Self {
            ambient_color: Color::from_rgb8(0xfe, 0xfe, 0xfe),
            ambient_intensity: 0.5,
            directional_color: Color::WHITE,
            directional_intensity: 2.0,
            directional_position: Vec3::new(0.0, 10.0, 0.0),
        }
    }
}

impl SceneLights {
    /// Unit vector pointing from the scene towards the directional light.
    pub fn light_direction(&self) -> Vec3 {
        self.directional_position.try_normalize().unwrap_or(Vec3::Y)
    }
}

/// Model matrices for every cell to draw this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawList {
    /// Session generation the list was derived from.
    pub generation: u64,
    /// Whether `instances[0]` is the preview cell.
    pub has_preview: bool,
    pub instances: Vec<Mat4>,
}

impl DrawList {
    /// Changes whenever the instance data needs re-uploading.
    pub fn key(&self) -> (u64, bool) {
        (self.generation, self.has_preview)
    }

    pub fn pack_instances(&self) -> &[Mat4] {
        if self.has_preview {
            &self.instances[1..]
        } else {
            &self.instances
        }
    }
}

/// Parent transform of the pack group.
pub fn pack_group_matrix() -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, PACK_OFFSET_Y, 0.0))
}

/// Transform of the standalone preview cell.
pub fn preview_matrix() -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, PREVIEW_Y, 0.0))
}

/// Derive the frame's draw list from the session.
pub fn pack_draw_list(session: &PackSession, settings: &SceneSettings) -> DrawList {
    let group = pack_group_matrix();
    let cells = session.instances();
    let mut instances = Vec::with_capacity(cells.len() + 1);
    if settings.show_preview {
        instances.push(preview_matrix());
    }
    instances.extend(cells.iter().map(|c| group * c.transform.matrix()));
    tracing::debug!(
        "draw list for generation {}: {} instances",
        session.generation(),
        instances.len()
    );
    DrawList {
        generation: session.generation(),
        has_preview: settings.show_preview,
        instances,
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
    fn default_background() {
        assert_eq!(SceneSettings::default().background.to_hex(), "#18142c");
    }

    #[test]
    fn preview_only_before_generation() {
        let list = pack_draw_list(&session(), &SceneSettings::default());
        assert_eq!(list.instances.len(), 1);
        assert!(list.pack_instances().is_empty());
    }

    #[test]
    fn pack_group_is_offset() {
        let mut s = session();
        s.regenerate(1, 1, 1).unwrap();
        let settings = SceneSettings {
            show_preview: false,
            ..SceneSettings::default()
        };
        let list = pack_draw_list(&s, &settings);
        assert_eq!(list.instances.len(), 1);
        let origin = list.instances[0].transform_point3(Vec3::ZERO);
        // first cell lands exactly where the preview cell sits
        assert!((origin - Vec3::new(0.0, PREVIEW_Y, 0.0)).length() < 1e-5);
    }

    #[test]
    fn key_tracks_generation_and_preview() {
        let mut s = session();
        let a = pack_draw_list(&s, &SceneSettings::default()).key();
        s.regenerate(2, 2, 2).unwrap();
        let b = pack_draw_list(&s, &SceneSettings::default()).key();
        assert_ne!(a, b);
        let no_preview = SceneSettings {
            show_preview: false,
            ..SceneSettings::default()
        };
        assert_ne!(b, pack_draw_list(&s, &no_preview).key());
    }

    #[test]
    fn light_points_down_from_above() {
        let lights = SceneLights::default();
        assert_eq!(lights.light_direction(), Vec3::Y);
        assert_eq!(lights.ambient_color.to_hex(), "#fefefe");
    }
}
