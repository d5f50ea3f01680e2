use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use lifegrid_common::GridSize;

/// One corner of the shared cell quad, in cell-local coordinates.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
}

/// Two triangles covering `[-0.8, 0.8]²`, leaving a gap between neighbouring cells.
#[rustfmt::skip]
pub const QUAD_VERTICES: [QuadVertex; 6] = [
    QuadVertex { position: [-0.8, -0.8] },
    QuadVertex { position: [ 0.8, -0.8] },
    QuadVertex { position: [ 0.8,  0.8] },

    QuadVertex { position: [-0.8, -0.8] },
    QuadVertex { position: [ 0.8,  0.8] },
    QuadVertex { position: [-0.8,  0.8] },
];

/// Background behind the grid.
pub const CLEAR_COLOR: [f64; 4] = [0.0, 0.0, 0.4, 1.0];

/// Dead cells: a shade darker than the background so the tiling stays visible.
pub const DEAD_COLOR: [f32; 4] = [0.0, 0.0, 0.25, 1.0];

pub const ALIVE_GLYPH: char = '#';
pub const DEAD_GLYPH: char = '.';

/// Cell coordinate drawn by instance `instance`.
pub fn instance_cell(instance: u32, size: GridSize) -> (u32, u32) {
    (instance % size.width(), instance / size.width())
}

/// Clip-space position of a template vertex for the given instance.
///
/// The grid spans the whole viewport; row 0 sits at the bottom.
pub fn cell_clip_position(vertex: Vec2, instance: u32, size: GridSize) -> Vec2 {
    let dims = Vec2::new(size.width() as f32, size.height() as f32);
    let (x, y) = instance_cell(instance, size);
    let cell = Vec2::new(x as f32, y as f32);
    (vertex + 1.0) / dims - 1.0 + cell / dims * 2.0
}

/// Colour of a live cell: a gradient over the grid position.
pub fn alive_color(instance: u32, size: GridSize) -> [f32; 4] {
    let (x, y) = instance_cell(instance, size);
    let c = Vec2::new(
        x as f32 / size.width() as f32,
        y as f32 / size.height() as f32,
    );
    [c.x, c.y, 1.0 - c.x, 1.0]
}

/// Pixel rectangle the grid is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub side: f32,
}

/// Largest centred square that fits a `width` x `height` surface.
pub fn square_viewport(width: u32, height: u32) -> Viewport {
    let side = width.min(height);
    Viewport {
        x: ((width - side) / 2) as f32,
        y: ((height - side) / 2) as f32,
        side: side as f32,
    }
}
