use lifegrid_kernel::Generation;

use crate::layout::{ALIVE_GLYPH, DEAD_GLYPH};

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads one completed generation and produces output. It never
/// mutates it; cell state changes only through the update rule.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one completed generation.
    fn render(&self, generation: &Generation, step: u64) -> Self::Output;
}

/// Text renderer for the CLI, logs and tests.
///
/// Rows are printed top row first so the picture matches the on-screen grid,
/// where row 0 is at the bottom.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, generation: &Generation, step: u64) -> String {
        let size = generation.size();
        let mut out = String::new();
        out.push_str(&format!(
            "=== Generation (step={}, {}x{}, alive={}) ===\n",
            step,
            size.width(),
            size.height(),
            generation.alive_count()
        ));
        for y in (0..size.height() as i64).rev() {
            for x in 0..size.width() as i64 {
                out.push(if generation.get(x, y) != 0 {
                    ALIVE_GLYPH
                } else {
                    DEAD_GLYPH
                });
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifegrid_common::{ALIVE, GridSize};

    #[test]
    fn debug_renderer_empty_grid() {
        let generation = Generation::dead(GridSize::new(3, 2).unwrap());
        let output = DebugTextRenderer::new().render(&generation, 0);

        assert!(output.contains("step=0"));
        assert!(output.contains("alive=0"));
        assert!(output.ends_with("...\n...\n"));
    }

    #[test]
    fn debug_renderer_puts_row_zero_last() {
        let mut generation = Generation::dead(GridSize::new(3, 2).unwrap());
        generation.set(0, 0, ALIVE);
        generation.set(2, 1, ALIVE);
        let output = DebugTextRenderer::new().render(&generation, 4);

        let rows: Vec<&str> = output.lines().skip(1).collect();
        assert_eq!(rows, vec!["..#", "#.."]);
        assert!(output.contains("alive=2"));
    }
}
