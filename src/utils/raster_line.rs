//! Bresenham line rasterisation on the cell grid
//!
//! Used for straight-segment collision checks (RRT edges, path smoothing).

use crate::common::Cell;

/// Iterator over the cells crossed by the segment `from -> to`,
/// both endpoints included.
#[derive(Debug, Clone)]
pub struct LineCells {
    current: Cell,
    end: Cell,
    d_col: i32,
    d_row: i32,
    s_col: i32,
    s_row: i32,
    err: i32,
    done: bool,
}

impl LineCells {
    pub fn new(from: Cell, to: Cell) -> Self {
        let d_col = (to.col - from.col).abs();
        let d_row = (to.row - from.row).abs();
        LineCells {
            current: from,
            end: to,
            d_col,
            d_row,
            s_col: if from.col < to.col { 1 } else { -1 },
            s_row: if from.row < to.row { 1 } else { -1 },
            err: d_col - d_row,
            done: false,
        }
    }
}

impl Iterator for LineCells {
    type Item = Cell;

    fn next(&mut self) -> Option<Cell> {
        if self.done {
            return None;
        }
        let out = self.current;
        if out == self.end {
            self.done = true;
            return Some(out);
        }
        let e2 = 2 * self.err;
        if e2 > -self.d_row {
            self.err -= self.d_row;
            self.current.col += self.s_col;
        }
        if e2 < self.d_col {
            self.err += self.d_col;
            self.current.row += self.s_row;
        }
        Some(out)
    }
}

/// Cells on the segment `from -> to`, both endpoints included
pub fn line_cells(from: Cell, to: Cell) -> Vec<Cell> {
    LineCells::new(from, to).collect()
}
