//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers cannot mutate the pack session.
//! - Render state derives from the session, the scene settings and the view.
//!
//! The GPU backend lives in `cellpack-render-wgpu`; the debug text renderer
//! here serves the CLI and tests through the same trait.

mod renderer;
mod scene;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use scene::{
    AXES_LENGTH, DEFAULT_BACKGROUND, DrawList, GRID_DIVISIONS, GRID_SIZE, SceneLights,
    SceneSettings, pack_draw_list, pack_group_matrix, preview_matrix,
};

pub fn crate_info() -> &'static str {
    "cellpack-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
