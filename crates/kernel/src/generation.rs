use lifegrid_common::{ALIVE, CellState, DEAD, GridError, GridSize};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::rules::{NEIGHBOR_OFFSETS, next_state};

/// A complete assignment of cell states to a grid, stored row-major.
///
/// This is the host-side image of one generation buffer: same element type,
/// same layout, so it can be uploaded or compared against a readback as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    size: GridSize,
    cells: Vec<CellState>,
}

impl Generation {
    /// All cells dead.
    pub fn dead(size: GridSize) -> Self {
        Self {
            size,
            cells: vec![DEAD; size.cell_count()],
        }
    }

    /// Wrap an existing row-major cell array. Any non-zero value counts as alive.
    pub fn from_cells(size: GridSize, cells: Vec<CellState>) -> Result<Self, GridError> {
        if cells.len() != size.cell_count() {
            return Err(GridError::SizeMismatch {
                expected: size.cell_count(),
                actual: cells.len(),
            });
        }
        let cells = cells
            .into_iter()
            .map(|c| if c != DEAD { ALIVE } else { DEAD })
            .collect();
        Ok(Self { size, cells })
    }

    /// Seeded random generation. Each cell is alive when its uniform draw
    /// exceeds `1 - alive_probability`.
    pub fn random(size: GridSize, alive_probability: f64, seed: u64) -> Result<Self, GridError> {
        if !(0.0..=1.0).contains(&alive_probability) {
            return Err(GridError::InvalidProbability(alive_probability));
        }
        let threshold = 1.0 - alive_probability;
        let mut rng = StdRng::seed_from_u64(seed);
        let cells = (0..size.cell_count())
            .map(|_| {
                if rng.random::<f64>() > threshold {
                    ALIVE
                } else {
                    DEAD
                }
            })
            .collect();
        Ok(Self { size, cells })
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Row-major cell states, ready for upload.
    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [CellState] {
        &mut self.cells
    }

    /// State at `(x, y)`, wrapping out-of-range coordinates.
    pub fn get(&self, x: i64, y: i64) -> CellState {
        self.cells[self.size.wrap_index(x, y)]
    }

    /// Builder used to lay out patterns before the first upload.
    pub fn set(&mut self, x: i64, y: i64, state: CellState) {
        let i = self.size.wrap_index(x, y);
        self.cells[i] = if state != DEAD { ALIVE } else { DEAD };
    }

    pub fn alive_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == ALIVE).count()
    }

    /// Alive cells among the eight toroidal neighbours of `(x, y)`.
    pub fn neighbor_count(&self, x: i64, y: i64) -> u32 {
        NEIGHBOR_OFFSETS
            .iter()
            .map(|(dx, dy)| self.get(x + dx, y + dy))
            .sum()
    }

    /// The following generation, computed exactly as the update kernel does.
    pub fn next(&self) -> Self {
        let mut out = Self::dead(self.size);
        self.next_into(&mut out.cells);
        out
    }

    /// Write the following generation into `out`, which must be `cell_count` long.
    /// Reads only `self`; every output element is written exactly once.
    pub(crate) fn next_into(&self, out: &mut [CellState]) {
        debug_assert_eq!(out.len(), self.cells.len());
        for (i, slot) in out.iter_mut().enumerate() {
            let (x, y) = self.size.coord_of(i);
            let (x, y) = (x as i64, y as i64);
            *slot = next_state(self.cells[i], self.neighbor_count(x, y));
        }
    }

    /// FNV-1a hash over the dimensions and cell states, for cheap comparisons.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        let mut mix = |bytes: &[u8]| {
            for &b in bytes {
                h ^= b as u64;
                h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&self.size.width().to_le_bytes());
        mix(&self.size.height().to_le_bytes());
        for cell in &self.cells {
            mix(&cell.to_le_bytes());
        }
        h
    }
}
