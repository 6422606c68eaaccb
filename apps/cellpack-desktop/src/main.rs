use anyhow::{Context, Result};
use cellpack_assets::{ModelAsset, TextureImage, load_cell_model};
use cellpack_common::Color;
use cellpack_input::{Action, DimensionInputs};
use cellpack_pack::{CellTemplate, PackSession};
use cellpack_render::{SceneLights, SceneSettings, pack_draw_list};
use cellpack_render_wgpu::{CellRenderer, OrbitCamera};
use cellpack_tools::{FrameTimer, PackInspector};
use clap::Parser;
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "cellpack-desktop", about = "Battery pack 3D viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Cell model (glTF or GLB)
    #[arg(long, default_value = "modelm.glb")]
    model: PathBuf,

    /// Use the built-in cylinder cell instead of loading a model
    #[arg(long)]
    procedural: bool,

    /// Initial dimension fields as X,Y,Z
    #[arg(long)]
    dims: Option<String>,
}

fn load_template(cli: &Cli) -> Result<CellTemplate> {
    let model = if cli.procedural {
        ModelAsset::procedural_cell()
    } else {
        load_cell_model(&cli.model)
            .with_context(|| format!("loading cell model {}", cli.model.display()))?
    };
    Ok(CellTemplate::from_model(model))
}

/// Pixels of wheel travel per zoom step for touchpads.
const PIXELS_PER_ZOOM_STEP: f32 = 50.0;

/// Application state.
struct AppState {
    /// `None` when the cell model failed to load; generation is disabled.
    session: Option<PackSession>,
    load_error: Option<String>,
    camera: OrbitCamera,
    settings: SceneSettings,
    lights: SceneLights,
    inputs: DimensionInputs,
    generate_error: Option<String>,
    status: String,
    show_panel: bool,
    frames: FrameTimer,
    // Input state
    orbiting: bool,
    panning: bool,
    viewport_height: f32,
    last_frame: Instant,
}

impl AppState {
    fn new(template: Result<CellTemplate>, inputs: DimensionInputs) -> Self {
        let (session, load_error) = match template {
            Ok(template) => (Some(PackSession::new(template)), None),
            Err(e) => {
                tracing::error!("{e:#}");
                (None, Some(format!("{e:#}")))
            }
        };

        Self {
            session,
            load_error,
            camera: OrbitCamera::default(),
            settings: SceneSettings::default(),
            lights: SceneLights::default(),
            inputs,
            generate_error: None,
            status: String::from("No pack generated"),
            show_panel: true,
            frames: FrameTimer::default(),
            orbiting: false,
            panning: false,
            viewport_height: 720.0,
            last_frame: Instant::now(),
        }
    }

    fn dispatch(&mut self, action: Action) {
        match action {
            Action::Generate => self.generate(),
            Action::SetBackground(color) => self.settings.background = color,
            Action::SetWireframe(on) => self.settings.wireframe = on,
            Action::SetLighting(on) => self.settings.lighting = on,
            Action::SetHelpers(on) => self.settings.show_helpers = on,
            Action::ResetCamera => self.camera.reset(),
            Action::TogglePanel => self.show_panel = !self.show_panel,
        }
    }

    fn generate(&mut self) {
        let Some(session) = &mut self.session else {
            self.generate_error = Some("no cell model loaded".into());
            return;
        };
        let [x, y, z] = self.inputs.fields();
        match session.regenerate_from_text(x, y, z) {
            Ok(pack) => {
                self.status = format!("{} cells ({})", pack.len(), pack.extents());
                self.generate_error = None;
            }
            Err(e) => self.generate_error = Some(e.to_string()),
        }
    }

    fn update(&mut self) {
        let now = Instant::now();
        self.frames.record(now - self.last_frame);
        self.last_frame = now;
        self.camera.update();
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::F1 => self.dispatch(Action::TogglePanel),
            KeyCode::Home => self.dispatch(Action::ResetCamera),
            _ => {}
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_panel {
            return;
        }

        let mut actions = Vec::new();

        egui::SidePanel::right("pack_panel")
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Battery Pack");
                ui.separator();

                if let Some(err) = &self.load_error {
                    ui.colored_label(egui::Color32::LIGHT_RED, err.as_str());
                    ui.separator();
                }

                for (label, field) in [
                    ("x", &mut self.inputs.x),
                    ("y", &mut self.inputs.y),
                    ("z", &mut self.inputs.z),
                ] {
                    ui.horizontal(|ui| {
                        ui.label(label);
                        ui.add(egui::TextEdit::singleline(field).desired_width(80.0));
                    });
                }

                let generate = ui.add_enabled(self.session.is_some(), egui::Button::new("Generate"));
                if generate.clicked() {
                    actions.push(Action::Generate);
                }
                if let Some(err) = &self.generate_error {
                    ui.colored_label(egui::Color32::LIGHT_RED, err.as_str());
                }
                ui.label(self.status.as_str());

                ui.separator();
                egui::CollapsingHeader::new("Background Color")
                    .default_open(true)
                    .show(ui, |ui| {
                        let mut rgb = self.settings.background.to_rgb8();
                        if egui::color_picker::color_edit_button_srgb(ui, &mut rgb).changed() {
                            let [r, g, b] = rgb;
                            actions.push(Action::SetBackground(Color::from_rgb8(r, g, b)));
                        }

                        let mut wireframe = self.settings.wireframe;
                        if ui.checkbox(&mut wireframe, "Wireframe").changed() {
                            actions.push(Action::SetWireframe(wireframe));
                        }
                        let mut lighting = self.settings.lighting;
                        if ui.checkbox(&mut lighting, "Lighting").changed() {
                            actions.push(Action::SetLighting(lighting));
                        }
                        let mut helpers = self.settings.show_helpers;
                        if ui.checkbox(&mut helpers, "Grid & axes").changed() {
                            actions.push(Action::SetHelpers(helpers));
                        }
                    });

                if ui.button("Reset Camera (Home)").clicked() {
                    actions.push(Action::ResetCamera);
                }

                ui.separator();
                let fps = self.frames.fps();
                let ms = if fps > 0.0 { 1000.0 / fps } else { 0.0 };
                ui.label(format!("FPS: {fps:.0} ({ms:.1} ms)"));
                if let Some(session) = &self.session {
                    ui.small(PackInspector::summary(session).to_string());
                }

                ui.separator();
                ui.small("F1: Toggle Panel | LMB: Orbit | RMB: Pan | Wheel: Zoom");
            });

        for action in actions {
            self.dispatch(action);
        }
    }
}

/// GPU and UI resources created once the window exists.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: CellRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(
        event_loop: &ActiveEventLoop,
        egui_ctx: &EguiContext,
        session: Option<&PackSession>,
    ) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Battery Pack Viewer")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("find adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("cellpack_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let empty = cellpack_assets::CellMesh::new();
        let mesh = session.map_or(&empty, |s| &s.template().mesh);
        let renderer = CellRenderer::new(
            &device,
            &queue,
            surface_format,
            size.width,
            size.height,
            mesh,
            &TextureImage::cell_texture(),
        );

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn redraw(&mut self) {
        self.state.update();

        let Some(gpu) = &mut self.gpu else {
            return;
        };

        // Upload before the pass is recorded so a frame never mixes two packs.
        if let Some(session) = &self.state.session {
            let key = (session.generation(), self.state.settings.show_preview);
            if gpu.renderer.uploaded_key() != Some(key) {
                let list = pack_draw_list(session, &self.state.settings);
                gpu.renderer.upload_instances(&gpu.device, &gpu.queue, &list);
            }
        }

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.renderer.render(
            &gpu.device,
            &gpu.queue,
            &view,
            &self.state.camera,
            &self.state.settings,
            &self.state.lights,
        );

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });

        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match Gpu::new(event_loop, &self.egui_ctx, self.state.session.as_ref()) {
            Ok(gpu) => {
                self.state.camera.aspect = gpu.aspect();
                self.state.viewport_height = gpu.config.height as f32;
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialize GPU: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size);
                    self.state.camera.aspect = gpu.aspect();
                    self.state.viewport_height = gpu.config.height as f32;
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                self.state.handle_key(key);
            }
            WindowEvent::MouseInput {
                button,
                state: btn_state,
                ..
            } => {
                let pressed = btn_state == ElementState::Pressed;
                // Drags that start over the panel belong to egui.
                if pressed && self.egui_ctx.wants_pointer_input() {
                    return;
                }
                match button {
                    MouseButton::Left => self.state.orbiting = pressed,
                    MouseButton::Right => self.state.panning = pressed,
                    _ => {}
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_ZOOM_STEP,
                };
                self.state.camera.zoom(steps);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            let (dx, dy) = (delta.0 as f32, delta.1 as f32);
            if self.state.orbiting {
                self.state.camera.rotate(dx, dy);
            } else if self.state.panning {
                self.state
                    .camera
                    .pan(dx, dy, self.state.viewport_height);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("cellpack-desktop starting");

    let inputs = cli
        .dims
        .as_deref()
        .map(DimensionInputs::from_csv)
        .unwrap_or_default();
    let state = AppState::new(load_template(&cli), inputs);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(state);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        let template = CellTemplate::from_model(ModelAsset::procedural_cell());
        AppState::new(Ok(template), DimensionInputs::default())
    }

    #[test]
    fn generate_builds_from_fields() {
        let mut app = state();
        app.inputs = DimensionInputs::from_csv("2,1,3");
        app.dispatch(Action::Generate);
        let session = app.session.as_ref().unwrap();
        assert_eq!(session.instances().len(), 6);
        assert!(app.generate_error.is_none());
        assert!(app.status.contains("6 cells"));
    }

    #[test]
    fn invalid_fields_keep_pack_and_show_error() {
        let mut app = state();
        app.dispatch(Action::Generate);
        app.inputs.y = "abc".into();
        app.dispatch(Action::Generate);
        assert!(app.generate_error.is_some());
        assert_eq!(app.session.as_ref().unwrap().instances().len(), 1);
    }

    #[test]
    fn missing_model_disables_generation() {
        let mut app = AppState::new(
            Err(anyhow::anyhow!("loading cell model modelm.glb")),
            DimensionInputs::default(),
        );
        assert!(app.load_error.is_some());
        app.dispatch(Action::Generate);
        assert_eq!(app.generate_error.as_deref(), Some("no cell model loaded"));
    }

    #[test]
    fn scene_actions_update_settings() {
        let mut app = state();
        let bg = Color::from_hex("#ff0000").unwrap();
        app.dispatch(Action::SetBackground(bg));
        app.dispatch(Action::SetWireframe(true));
        app.dispatch(Action::SetLighting(true));
        app.dispatch(Action::SetHelpers(false));
        app.dispatch(Action::TogglePanel);
        assert_eq!(app.settings.background, bg);
        assert!(app.settings.wireframe);
        assert!(app.settings.lighting);
        assert!(!app.settings.show_helpers);
        assert!(!app.show_panel);
    }
}
