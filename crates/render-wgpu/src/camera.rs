use cellpack_render::RenderView;
use glam::{Mat4, Vec3};

const MIN_POLAR: f32 = 0.01;
const MAX_POLAR: f32 = std::f32::consts::PI - 0.01;
const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 500.0;

/// Orbit camera around a target point with damped rotation and panning.
///
/// Mouse input accumulates into pending deltas; each `update()` applies a
/// `damping` fraction of what is pending, so motion eases out after the
/// pointer stops. Camera state lives outside the pack session.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    /// Azimuth around +Y, measured from +Z towards +X.
    pub azimuth: f32,
    /// Polar angle from +Y.
    pub polar: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Fraction of pending motion applied per update; 0 or 1 disables easing.
    pub damping: f32,
    /// Radians per pixel of drag.
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pending_azimuth: f32,
    pending_polar: f32,
    pending_pan: Vec3,
    home: (Vec3, Vec3),
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::looking_at(Vec3::new(1.0, 1.0, 10.0), Vec3::ZERO)
    }
}

impl OrbitCamera {
    /// Camera at `eye` orbiting `target`.
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        let mut camera = Self {
            target,
            distance: 1.0,
            azimuth: 0.0,
            polar: std::f32::consts::FRAC_PI_2,
            fov: 75.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
            damping: 0.05,
            rotate_speed: 0.005,
            zoom_speed: 0.95,
            pending_azimuth: 0.0,
            pending_polar: 0.0,
            pending_pan: Vec3::ZERO,
            home: (eye, target),
        };
        camera.set_eye(eye);
        camera
    }

    fn set_eye(&mut self, eye: Vec3) {
        let offset = eye - self.target;
        self.distance = offset.length().clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.azimuth = offset.x.atan2(offset.z);
        self.polar = (offset.y / offset.length().max(f32::EPSILON))
            .clamp(-1.0, 1.0)
            .acos()
            .clamp(MIN_POLAR, MAX_POLAR);
    }

    pub fn position(&self) -> Vec3 {
        let (sin_p, cos_p) = self.polar.sin_cos();
        let (sin_a, cos_a) = self.azimuth.sin_cos();
        self.target + self.distance * Vec3::new(sin_p * sin_a, cos_p, sin_p * cos_a)
    }

    /// Queue an orbit by a pointer drag of `(dx, dy)` pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.pending_azimuth -= dx * self.rotate_speed;
        self.pending_polar -= dy * self.rotate_speed;
    }

    /// Queue a pan by a pointer drag of `(dx, dy)` pixels.
    ///
    /// Panning is scaled so the target tracks the pointer at the target's depth.
    pub fn pan(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let world_per_pixel =
            2.0 * self.distance * (self.fov * 0.5).tan() / viewport_height.max(1.0);
        let forward = (self.target - self.position()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        self.pending_pan += (-right * dx + up * dy) * world_per_pixel;
    }

    /// Dolly towards (positive `steps`) or away from the target.
    pub fn zoom(&mut self, steps: f32) {
        self.distance = (self.distance * self.zoom_speed.powf(steps)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Advance damping by one frame. Returns true while motion is pending.
    pub fn update(&mut self) -> bool {
        let k = if self.damping > 0.0 && self.damping < 1.0 {
            self.damping
        } else {
            1.0
        };

        self.azimuth += self.pending_azimuth * k;
        self.polar = (self.polar + self.pending_polar * k).clamp(MIN_POLAR, MAX_POLAR);
        self.target += self.pending_pan * k;

        let keep = 1.0 - k;
        self.pending_azimuth *= keep;
        self.pending_polar *= keep;
        self.pending_pan *= keep;

        const SETTLED: f32 = 1e-5;
        let moving = self.pending_azimuth.abs() > SETTLED
            || self.pending_polar.abs() > SETTLED
            || self.pending_pan.length_squared() > SETTLED * SETTLED;
        if !moving {
            self.pending_azimuth = 0.0;
            self.pending_polar = 0.0;
            self.pending_pan = Vec3::ZERO;
        }
        moving
    }

    /// Return to the initial pose and drop pending motion.
    pub fn reset(&mut self) {
        let (eye, target) = self.home;
        self.target = target;
        self.set_eye(eye);
        self.pending_azimuth = 0.0;
        self.pending_polar = 0.0;
        self.pending_pan = Vec3::ZERO;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn render_view(&self) -> RenderView {
        RenderView {
            eye: self.position(),
            target: self.target,
            fov_degrees: self.fov.to_degrees(),
        }
    }
}
