//! Rendering Adapter: renderer-agnostic view of a generation.
//!
//! # Invariants
//! - Renderers never mutate a generation; they only read the latest completed one.
//! - Instance `i` is cell `(i mod width, i div width)`, matching the flat buffer layout.
//! - Alive and dead cells are always visually distinct.

mod layout;
mod renderer;

pub use layout::{
    ALIVE_GLYPH, CLEAR_COLOR, DEAD_COLOR, DEAD_GLYPH, QUAD_VERTICES, QuadVertex, Viewport,
    alive_color, cell_clip_position, instance_cell, square_viewport,
};
pub use renderer::{DebugTextRenderer, Renderer};

pub fn crate_info() -> &'static str {
    "lifegrid-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
