use bytemuck::{Pod, Zeroable};

use crate::WORKGROUP_SIZE;

/// Liveness of one cell. Stored as a full `u32` so host uploads and shader
/// reads share the same element layout.
pub type CellState = u32;

pub const ALIVE: CellState = 1;
pub const DEAD: CellState = 0;

/// Errors from validating grid parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("invalid grid dimension {width}x{height}: both sides must be positive")]
    InvalidDimension { width: i64, height: i64 },
    #[error("alive probability {0} is outside [0, 1]")]
    InvalidProbability(f64),
    #[error("cell array has {actual} elements, grid needs {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Logical grid dimensions, fixed for the lifetime of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridSize {
    width: u32,
    height: u32,
}

impl GridSize {
    /// Validate and build a grid size. Takes signed input so that negative
    /// requests are reported instead of wrapping.
    pub fn new(width: i64, height: i64) -> Result<Self, GridError> {
        let invalid = GridError::InvalidDimension { width, height };
        if width <= 0 || height <= 0 {
            return Err(invalid);
        }
        let (Ok(w), Ok(h)) = (u32::try_from(width), u32::try_from(height)) else {
            return Err(invalid);
        };
        // Flat indices are u32 on the device.
        if (w as u64) * (h as u64) > u32::MAX as u64 {
            return Err(invalid);
        }
        Ok(Self {
            width: w,
            height: h,
        })
    }

    /// Square grid of the given side.
    pub fn square(side: u32) -> Result<Self, GridError> {
        Self::new(side as i64, side as i64)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells, i.e. elements in one generation buffer.
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Flat row-major index of `(x, y)` with toroidal wraparound.
    ///
    /// Coordinates may be one step (or any number of steps) outside the grid
    /// in either direction; `-1` maps to the last column/row.
    pub fn wrap_index(&self, x: i64, y: i64) -> usize {
        let wx = x.rem_euclid(self.width as i64) as usize;
        let wy = y.rem_euclid(self.height as i64) as usize;
        wy * self.width as usize + wx
    }

    /// Inverse of the flat layout: `(index mod width, index div width)`.
    pub fn coord_of(&self, index: usize) -> (u32, u32) {
        let w = self.width as usize;
        ((index % w) as u32, (index / w) as u32)
    }

    /// Uniform record uploaded once for both kernels.
    pub fn uniform(&self) -> GridUniform {
        GridUniform {
            width: self.width,
            height: self.height,
        }
    }
}

/// Device-side grid description: width then height, 8 bytes.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
pub struct GridUniform {
    pub width: u32,
    pub height: u32,
}

/// Workgroups needed to cover the grid with `WORKGROUP_SIZE`-square tiles,
/// rounding up so remainder rows and columns are dispatched too.
pub fn workgroup_count(size: GridSize) -> (u32, u32) {
    (
        size.width().div_ceil(WORKGROUP_SIZE),
        size.height().div_ceil(WORKGROUP_SIZE),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_dimensions() {
        assert_eq!(
            GridSize::new(0, 64),
            Err(GridError::InvalidDimension {
                width: 0,
                height: 64
            })
        );
        assert!(matches!(
            GridSize::new(64, -1),
            Err(GridError::InvalidDimension { height: -1, .. })
        ));
        assert!(GridSize::new(1, 1).is_ok());
    }

    #[test]
    fn rejects_oversized_dimensions() {
        assert!(GridSize::new(i64::from(u32::MAX) + 1, 1).is_err());
        assert!(GridSize::new(1 << 20, 1 << 20).is_err());
    }

    #[test]
    fn wrap_index_handles_both_edges() {
        let size = GridSize::new(5, 3).unwrap();
        assert_eq!(size.wrap_index(0, 0), 0);
        assert_eq!(size.wrap_index(-1, 0), 4);
        assert_eq!(size.wrap_index(0, -1), 2 * 5);
        assert_eq!(size.wrap_index(5, 3), 0);
        assert_eq!(size.wrap_index(-1, -1), 14);
        assert_eq!(size.wrap_index(2, 1), 7);
    }

    #[test]
    fn coord_of_is_row_major() {
        let size = GridSize::new(4, 2).unwrap();
        assert_eq!(size.coord_of(0), (0, 0));
        assert_eq!(size.coord_of(3), (3, 0));
        assert_eq!(size.coord_of(5), (1, 1));
        assert_eq!(size.cell_count(), 8);
    }

    #[test]
    fn uniform_layout_is_width_then_height() {
        let uniform = GridSize::new(7, 3).unwrap().uniform();
        let words: &[u32] = bytemuck::cast_slice(std::slice::from_ref(&uniform));
        assert_eq!(words, &[7, 3]);
        assert_eq!(std::mem::size_of::<GridUniform>(), 8);
    }

    #[test]
    fn workgroups_cover_remainders() {
        assert_eq!(workgroup_count(GridSize::square(64).unwrap()), (8, 8));
        assert_eq!(workgroup_count(GridSize::new(13, 7).unwrap()), (2, 1));
        assert_eq!(workgroup_count(GridSize::new(1, 17).unwrap()), (1, 3));
    }
}
