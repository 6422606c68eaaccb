use crate::scene::{SceneSettings, pack_draw_list};
use cellpack_pack::PackSession;
use glam::Vec3;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(1.0, 1.0, 10.0),
            target: Vec3::ZERO,
            fov_degrees: 75.0,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the pack session, scene settings and a view, then
/// produces output. It never mutates the session.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(
        &self,
        session: &PackSession,
        settings: &SceneSettings,
        view: &RenderView,
    ) -> Self::Output;
}

/// Text renderer for the CLI and tests.
///
/// Lists every cell of the pack with its lattice coordinate, world position
/// and orientation.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    /// Stop listing cells after this many; `None` lists all.
    pub max_rows: Option<usize>,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_rows(max_rows: usize) -> Self {
        Self {
            max_rows: Some(max_rows),
        }
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, session: &PackSession, settings: &SceneSettings, view: &RenderView) -> String {
        let list = pack_draw_list(session, settings);
        let template = session.template();
        let mut out = String::new();

        out.push_str(&format!(
            "=== Pack (generation={}, template={} [{}]) ===\n",
            session.generation(),
            template.name,
            template.asset
        ));
        match session.collection() {
            Some(pack) => out.push_str(&format!(
                "Extents: {}  Cells: {}  Flipped: {}\n",
                pack.extents(),
                pack.len(),
                pack.flipped_count()
            )),
            None => out.push_str("Extents: none  Cells: 0\n"),
        }
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}\n",
            view.eye.x, view.eye.y, view.eye.z, view.target.x, view.target.y, view.target.z,
            view.fov_degrees
        ));
        out.push_str(&format!(
            "Background: {}  Wireframe: {}  Lighting: {}\n",
            settings.background, settings.wireframe, settings.lighting
        ));

        let limit = self.max_rows.unwrap_or(usize::MAX);
        for (cell, model) in session
            .instances()
            .iter()
            .zip(list.pack_instances())
            .take(limit)
        {
            let p = model.transform_point3(Vec3::ZERO);
            out.push_str(&format!(
                "  [{}] ({}, {}, {}) pos=({:.2}, {:.2}, {:.2}){}\n",
                cell.id.short(),
                cell.coord.x,
                cell.coord.y,
                cell.coord.z,
                p.x,
                p.y,
                p.z,
                if cell.flipped { " flipped" } else { "" }
            ));
        }
        let hidden = session.instances().len().saturating_sub(limit);
        if hidden > 0 {
            out.push_str(&format!("  ... {hidden} more\n"));
        }

        out
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
    fn debug_renderer_empty_session() {
        let output =
            DebugTextRenderer::new().render(&session(), &SceneSettings::default(), &RenderView::default());
        assert!(output.contains("generation=0"));
        assert!(output.contains("Cells: 0"));
        assert!(output.contains("#18142c"));
    }

    #[test]
    fn debug_renderer_lists_cells() {
        let mut s = session();
        s.regenerate(2, 1, 3).unwrap();
        let output =
            DebugTextRenderer::new().render(&s, &SceneSettings::default(), &RenderView::default());
        assert!(output.contains("Extents: 2x1x3  Cells: 6  Flipped: 2"));
        assert_eq!(output.matches("pos=").count(), 6);
        assert_eq!(output.matches(" flipped").count(), 2);
        // (1,1,1) sits at 1.8 - 0.95 in world space
        assert!(output.contains("(1, 1, 1) pos=(0.00, 0.85, 0.00)"));
    }

    #[test]
    fn debug_renderer_truncates() {
        let mut s = session();
        s.regenerate(3, 3, 3).unwrap();
        let output = DebugTextRenderer::with_max_rows(5).render(
            &s,
            &SceneSettings::default(),
            &RenderView::default(),
        );
        assert_eq!(output.matches("pos=").count(), 5);
        assert!(output.contains("... 22 more"));
    }

    #[test]
    fn debug_renderer_lines_are_terminated() {
        let mut s = session();
        s.regenerate(1, 1, 2).unwrap();
        let output =
            DebugTextRenderer::new().render(&s, &SceneSettings::default(), &RenderView::default());
        // header, extents, camera, background, two cells
        assert_eq!(output.lines().count(), 6);
        assert!(output.ends_with(" flipped\n"));
    }

    #[test]
    fn render_view_default() {
        let view = RenderView::default();
        assert_eq!(view.fov_degrees, 75.0);
        assert_eq!(view.target, Vec3::ZERO);
    }
}
