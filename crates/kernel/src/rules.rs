use lifegrid_common::{ALIVE, CellState, DEAD};

/// Conway transition: two neighbours keep the current state, three make the
/// cell alive, anything else leaves it dead.
pub fn next_state(current: CellState, neighbors: u32) -> CellState {
    match neighbors {
        2 => current,
        3 => ALIVE,
        _ => DEAD,
    }
}

/// Offsets of the eight surrounding cells.
pub(crate) const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];
