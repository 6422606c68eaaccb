use cellpack_common::Color;

/// Side length of the generated cell texture, in pixels.
pub const CELL_TEXTURE_SIZE: u32 = 512;

/// One colour stop of a gradient, `offset` in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
}

/// Concentric radial gradient, evaluated like a 2D canvas gradient whose
/// start and end circles share a centre.
///
/// Distances inside `inner_radius` take the first stop, distances beyond
/// `outer_radius` take the last stop.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub center: [f32; 2],
    pub inner_radius: f32,
    pub outer_radius: f32,
    stops: Vec<GradientStop>,
}

impl RadialGradient {
    pub fn new(center: [f32; 2], inner_radius: f32, outer_radius: f32) -> Self {
        Self {
            center,
            inner_radius,
            outer_radius,
            stops: Vec::new(),
        }
    }

    /// The red-yellow-blue-black gradient mapped onto every cell.
    pub fn cell_texture() -> Self {
        let half = CELL_TEXTURE_SIZE as f32 / 2.0;
        let mut gradient = Self::new([half, half], 0.0, half);
        gradient.add_color_stop(0.0, Color::rgb(1.0, 0.0, 0.0));
        gradient.add_color_stop(0.5, Color::rgb(1.0, 1.0, 0.0));
        gradient.add_color_stop(0.8, Color::rgb(0.0, 0.0, 1.0));
        gradient.add_color_stop(1.0, Color::BLACK);
        gradient
    }

    /// Insert a stop. Offsets are clamped to `[0, 1]`; a stop at an existing
    /// offset goes after the stops already there.
    pub fn add_color_stop(&mut self, offset: f32, color: Color) {
        let offset = if offset.is_nan() { 0.0 } else { offset.clamp(0.0, 1.0) };
        let at = self.stops.partition_point(|s| s.offset <= offset);
        self.stops.insert(at, GradientStop { offset, color });
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Colour at normalized gradient parameter `t`.
    pub fn color_at(&self, t: f32) -> Color {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return Color {
                a: 0.0,
                ..Color::BLACK
            };
        };
        if t <= first.offset {
            return first.color;
        }
        if t >= last.offset {
            return last.color;
        }
        let upper = self.stops.partition_point(|s| s.offset <= t);
        let (a, b) = (self.stops[upper - 1], self.stops[upper]);
        let span = b.offset - a.offset;
        if span <= f32::EPSILON {
            return b.color;
        }
        a.color.lerp(b.color, (t - a.offset) / span)
    }

    /// Colour at canvas point `(x, y)`.
    pub fn sample(&self, x: f32, y: f32) -> Color {
        let dx = x - self.center[0];
        let dy = y - self.center[1];
        let distance = (dx * dx + dy * dy).sqrt();
        let span = self.outer_radius - self.inner_radius;
        let t = if span <= f32::EPSILON {
            if distance < self.inner_radius { 0.0 } else { 1.0 }
        } else {
            ((distance - self.inner_radius) / span).clamp(0.0, 1.0)
        };
        self.color_at(t)
    }

    /// Rasterize into an RGBA8 image, sampling at pixel centres.
    pub fn render(&self, width: u32, height: u32) -> TextureImage {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                let c = self.sample(x as f32 + 0.5, y as f32 + 0.5);
                pixels.extend_from_slice(&c.to_rgba8());
            }
        }
        TextureImage {
            width,
            height,
            pixels,
        }
    }
}

/// Tightly packed RGBA8 image, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    /// The gradient texture shared by all cell instances.
    pub fn cell_texture() -> Self {
        RadialGradient::cell_texture().render(CELL_TEXTURE_SIZE, CELL_TEXTURE_SIZE)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_is_red() {
        let g = RadialGradient::cell_texture();
        assert_eq!(g.sample(256.0, 256.0), Color::rgb(1.0, 0.0, 0.0));
    }

    #[test]
    fn half_radius_is_yellow() {
        let g = RadialGradient::cell_texture();
        assert_eq!(g.sample(384.0, 256.0), Color::rgb(1.0, 1.0, 0.0));
    }

    #[test]
    fn between_yellow_and_blue() {
        let g = RadialGradient::cell_texture();
        // t = 0.65, halfway between the 0.5 and 0.8 stops
        let c = g.color_at(0.65);
        assert!((c.r - 0.5).abs() < 1e-4);
        assert!((c.g - 0.5).abs() < 1e-4);
        assert!((c.b - 0.5).abs() < 1e-4);
    }

    #[test]
    fn outside_radius_pads_to_black() {
        let g = RadialGradient::cell_texture();
        assert_eq!(g.sample(0.0, 0.0), Color::BLACK);
        assert_eq!(g.sample(511.0, 511.0), Color::BLACK);
    }

    #[test]
    fn stops_stay_sorted() {
        let mut g = RadialGradient::new([0.0, 0.0], 0.0, 1.0);
        g.add_color_stop(0.8, Color::BLACK);
        g.add_color_stop(0.2, Color::WHITE);
        g.add_color_stop(1.5, Color::BLACK);
        let offsets: Vec<f32> = g.stops().iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.2, 0.8, 1.0]);
    }

    #[test]
    fn empty_gradient_is_transparent() {
        let g = RadialGradient::new([0.0, 0.0], 0.0, 1.0);
        assert_eq!(g.color_at(0.5).a, 0.0);
    }

    #[test]
    fn rendered_texture_layout() {
        let img = TextureImage::cell_texture();
        assert_eq!(img.width, 512);
        assert_eq!(img.pixels.len(), 512 * 512 * 4);
        assert_eq!(img.bytes_per_row(), 2048);
        assert_eq!(img.pixel(0, 0), Some([0, 0, 0, 255]));
        let centre = img.pixel(255, 255).unwrap();
        assert_eq!(centre[0], 255);
        assert!(centre[1] < 8);
        assert!(img.pixel(512, 0).is_none());
    }
}
