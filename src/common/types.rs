//! Common types used throughout grid_planning_sandbox

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cost of an axis-aligned move between neighbouring cells
pub const STRAIGHT_COST: f64 = 1.0;
/// Cost of a diagonal move between neighbouring cells
pub const DIAGONAL_COST: f64 = std::f64::consts::SQRT_2;

/// One (row, col) unit of the occupancy grid.
///
/// Coordinates are signed so that neighbour arithmetic can step outside
/// the grid; the costmap bounds-checks every access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Cell displaced by (dr, dc)
    pub fn offset(&self, dr: i32, dc: i32) -> Self {
        Self::new(self.row + dr, self.col + dc)
    }

    pub fn manhattan(&self, other: &Cell) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }

    pub fn chebyshev(&self, other: &Cell) -> i32 {
        (self.row - other.row).abs().max((self.col - other.col).abs())
    }

    pub fn euclidean(&self, other: &Cell) -> f64 {
        let dr = (self.row - other.row) as f64;
        let dc = (self.col - other.col) as f64;
        (dr * dr + dc * dc).sqrt()
    }

    /// Bearing from `self` to `other` in degrees, normalised to [0, 360).
    ///
    /// Angles grow from +col (0°) towards +row (90°), i.e. clockwise on a
    /// screen where rows increase downwards.
    pub fn bearing_deg(&self, other: &Cell) -> f64 {
        let dr = (other.row - self.row) as f64;
        let dc = (other.col - self.col) as f64;
        dr.atan2(dc).to_degrees().rem_euclid(360.0)
    }

    /// True if the two cells are 8-connected neighbours on a diagonal
    pub fn is_diagonal_to(&self, other: &Cell) -> bool {
        (self.row - other.row).abs() == 1 && (self.col - other.col).abs() == 1
    }
}

impl From<(i32, i32)> for Cell {
    fn from(tuple: (i32, i32)) -> Self {
        Self { row: tuple.0, col: tuple.1 }
    }
}

impl From<Cell> for (i32, i32) {
    fn from(cell: Cell) -> Self {
        (cell.row, cell.col)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Binary occupancy of one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    Free,
    Occupied,
}

impl CellState {
    pub fn is_free(self) -> bool {
        self == CellState::Free
    }

    /// Raw grid value: 0 = free, 1 = occupied
    pub fn value(self) -> u8 {
        match self {
            CellState::Free => 0,
            CellState::Occupied => 1,
        }
    }

    /// Any non-zero raw value counts as occupied
    pub fn from_value(value: u8) -> Self {
        if value == 0 {
            CellState::Free
        } else {
            CellState::Occupied
        }
    }
}

/// Distance estimate used to guide informed search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heuristic {
    /// Admissible on 4-connected grids only
    Manhattan,
    /// Admissible on both 4- and 8-connected grids
    Euclidean,
    /// Admissible on 8-connected grids
    Chebyshev,
}

impl Heuristic {
    pub fn estimate(self, from: &Cell, to: &Cell) -> f64 {
        match self {
            Heuristic::Manhattan => from.manhattan(to) as f64,
            Heuristic::Euclidean => from.euclidean(to),
            Heuristic::Chebyshev => from.chebyshev(to) as f64,
        }
    }
}

impl Default for Heuristic {
    fn default() -> Self {
        Heuristic::Euclidean
    }
}

/// Cost of a single move between two cells
pub fn step_cost(from: &Cell, to: &Cell) -> f64 {
    if from.is_diagonal_to(to) {
        DIAGONAL_COST
    } else if from.manhattan(to) == 1 {
        STRAIGHT_COST
    } else {
        from.euclidean(to)
    }
}

/// Total traversal cost of `path` when starting from `start`.
///
/// The start cell is not part of `path`, matching the planners' output.
pub fn path_cost(start: Cell, path: &[Cell]) -> f64 {
    std::iter::once(&start)
        .chain(path.iter())
        .tuple_windows()
        .map(|(a, b)| step_cost(a, b))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_distances() {
        let a = Cell::new(0, 0);
        let b = Cell::new(3, 4);
        assert_eq!(a.manhattan(&b), 7);
        assert_eq!(a.chebyshev(&b), 4);
        assert!((a.euclidean(&b) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_bearing_is_normalised() {
        let origin = Cell::new(5, 5);
        assert!((origin.bearing_deg(&Cell::new(5, 9)) - 0.0).abs() < 1e-9);
        assert!((origin.bearing_deg(&Cell::new(9, 5)) - 90.0).abs() < 1e-9);
        assert!((origin.bearing_deg(&Cell::new(5, 1)) - 180.0).abs() < 1e-9);
        assert!((origin.bearing_deg(&Cell::new(1, 5)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_path_cost_mixes_straight_and_diagonal() {
        let path = vec![Cell::new(1, 1), Cell::new(1, 2), Cell::new(2, 3)];
        let cost = path_cost(Cell::new(0, 0), &path);
        assert!((cost - (2.0 * DIAGONAL_COST + 1.0)).abs() < 1e-10);
        assert_eq!(path_cost(Cell::new(0, 0), &[]), 0.0);
    }

    #[test]
    fn test_cell_state_values() {
        assert_eq!(CellState::from_value(0), CellState::Free);
        assert_eq!(CellState::from_value(7), CellState::Occupied);
        assert_eq!(CellState::Occupied.value(), 1);
    }
}
