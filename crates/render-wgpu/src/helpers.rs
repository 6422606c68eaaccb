use bytemuck::{Pod, Zeroable};
use cellpack_common::Color;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

const GRID_CENTER_COLOR: [u8; 3] = [0x44, 0x44, 0x44];
const GRID_LINE_COLOR: [u8; 3] = [0x88, 0x88, 0x88];

/// Convert an sRGB-encoded colour to linear for an sRGB render target.
pub(crate) fn srgb_to_linear(c: Color) -> [f32; 4] {
    let f = |v: f32| {
        if v <= 0.04045 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    };
    [f(c.r), f(c.g), f(c.b), c.a]
}

fn line(verts: &mut Vec<LineVertex>, a: [f32; 3], b: [f32; 3], color: [f32; 4]) {
    verts.push(LineVertex { position: a, color });
    verts.push(LineVertex { position: b, color });
}

/// Square floor grid on the XZ plane, centred on the origin.
/// The two centre lines are drawn darker.
pub(crate) fn grid_lines(size: f32, divisions: u32) -> Vec<LineVertex> {
    let divisions = divisions.max(1);
    let step = size / divisions as f32;
    let half = size / 2.0;
    let center = divisions / 2;
    let [cr, cg, cb] = GRID_CENTER_COLOR;
    let [lr, lg, lb] = GRID_LINE_COLOR;
    let center_color = srgb_to_linear(Color::from_rgb8(cr, cg, cb));
    let line_color = srgb_to_linear(Color::from_rgb8(lr, lg, lb));

    let mut verts = Vec::with_capacity((divisions as usize + 1) * 4);
    for i in 0..=divisions {
        let k = -half + i as f32 * step;
        let color = if divisions % 2 == 0 && i == center {
            center_color
        } else {
            line_color
        };
        line(&mut verts, [-half, 0.0, k], [half, 0.0, k], color);
        line(&mut verts, [k, 0.0, -half], [k, 0.0, half], color);
    }
    verts
}

/// X (red), Y (green) and Z (blue) axes from the origin.
pub(crate) fn axes_lines(length: f32) -> Vec<LineVertex> {
    let mut verts = Vec::with_capacity(6);
    line(&mut verts, [0.0; 3], [length, 0.0, 0.0], [1.0, 0.0, 0.0, 1.0]);
    line(&mut verts, [0.0; 3], [0.0, length, 0.0], [0.0, 1.0, 0.0, 1.0]);
    line(&mut verts, [0.0; 3], [0.0, 0.0, length], [0.0, 0.0, 1.0, 1.0]);
    verts
}
