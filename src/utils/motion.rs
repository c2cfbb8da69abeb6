// Grid motion primitives shared by the planners

use crate::common::Cell;

/// Axis moves in expansion order: right, down, left, up
pub const AXIS_MOVES: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Diagonal moves in expansion order
pub const DIAGONAL_MOVES: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// All eight moves, axis moves first
pub const KING_MOVES: [(i32, i32); 8] = [
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Moves considered by a search with the given connectivity
pub fn moves(allow_diagonal: bool) -> &'static [(i32, i32)] {
    if allow_diagonal {
        &KING_MOVES
    } else {
        &AXIS_MOVES
    }
}

/// Unit step from `from` towards `to` along the sign of each delta
pub fn sign_step(from: Cell, to: Cell) -> (i32, i32) {
    ((to.row - from.row).signum(), (to.col - from.col).signum())
}

/// One-cell move approximating a heading in degrees (0° = +col, 90° = +row)
pub fn heading_step(angle_deg: f64) -> (i32, i32) {
    let rad = angle_deg.to_radians();
    (rad.sin().round() as i32, rad.cos().round() as i32)
}

/// Cell reached by travelling `distance` from `origin` along `angle_deg`,
/// truncating each coordinate towards zero.
pub fn project(origin: Cell, distance: f64, angle_deg: f64) -> Cell {
    let rad = angle_deg.to_radians();
    Cell::new(
        (origin.row as f64 + distance * rad.sin()) as i32,
        (origin.col as f64 + distance * rad.cos()) as i32,
    )
}

/// Linear interpolation between two cells, truncating towards zero
pub fn lerp(from: Cell, to: Cell, fraction: f64) -> Cell {
    Cell::new(
        (from.row as f64 + fraction * (to.row - from.row) as f64) as i32,
        (from.col as f64 + fraction * (to.col - from.col) as f64) as i32,
    )
}

/// Append `cell` unless it repeats the last emitted cell
pub fn push_distinct(path: &mut Vec<Cell>, cell: Cell) {
    if path.last() != Some(&cell) {
        path.push(cell);
    }
}
