//! Occupancy-grid costmap shared between a planner and its host
//!
//! A fixed-size binary grid (0 = free, 1 = occupied) plus the robot, goal,
//! start and path state the host renders. Every mutator is bounds-checked
//! and silently ignores out-of-range input: clicks and resampled rasters are
//! approximate by nature, so bad coordinates are dropped rather than raised.

use std::fmt;
use std::path::Path;

use itertools::{iproduct, Itertools};
use log::{debug, warn};
use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::common::{Cell, CellState, SandboxResult};
use crate::mapping::pgm;
use crate::utils::LineCells;

/// Grid width of the reference deployment, in cells
pub const DEFAULT_GRID_WIDTH: usize = 45;
/// Grid height of the reference deployment, in cells
pub const DEFAULT_GRID_HEIGHT: usize = 23;

/// Pixel rectangle the grid is drawn into by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 900.0,
            height: 460.0,
        }
    }
}

/// What a click on the grid places
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Robot,
    Goal,
}

/// Binary occupancy grid with robot/goal/path state
#[derive(Debug, Clone)]
pub struct Costmap {
    cells: na::DMatrix<u8>,
    viewport: Viewport,
    robot_cell: Option<Cell>,
    goal_cell: Option<Cell>,
    start_cell: Option<Cell>,
    path: Vec<Cell>,
}

impl Costmap {
    /// Create an all-free grid of `width` x `height` cells
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_viewport(width, height, Viewport::default())
    }

    pub fn with_viewport(width: usize, height: usize, viewport: Viewport) -> Self {
        Costmap {
            cells: na::DMatrix::zeros(height, width),
            viewport,
            robot_cell: None,
            goal_cell: None,
            start_cell: None,
            path: Vec::new(),
        }
    }

    /// Demo level: border walls, two rectangles and a disc, with robot and
    /// goal placed in opposite corners of the free area.
    pub fn demo(width: usize, height: usize) -> Self {
        let mut map = Self::new(width, height);
        let (w, h) = (width as i32, height as i32);
        for col in 0..w {
            map.set_cell(0, col, CellState::Occupied);
            map.set_cell(h - 1, col, CellState::Occupied);
        }
        for row in 0..h {
            map.set_cell(row, 0, CellState::Occupied);
            map.set_cell(row, w - 1, CellState::Occupied);
        }
        map.add_rectangle_obstacle(5, 5, 5, 10);
        map.add_rectangle_obstacle(15, 15, 10, 5);
        map.add_circular_obstacle(10, 20, 3);
        map.set_robot_cell(5, 2);
        map.set_goal_cell(h - 5, w - 5);
        map
    }

    /// Load a costmap of the given size from a PGM raster on disk.
    ///
    /// Robot and goal are auto-placed on the first free cell scanning from
    /// the top-left and bottom-right corners respectively.
    pub fn from_pgm_file<P: AsRef<Path>>(path: P, width: usize, height: usize) -> SandboxResult<Self> {
        let mut map = Self::new(width, height);
        map.load_pgm_file(path)?;
        Ok(map)
    }

    pub fn width(&self) -> usize {
        self.cells.ncols()
    }

    pub fn height(&self) -> usize {
        self.cells.nrows()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Raw occupancy values, rows x cols
    pub fn as_matrix(&self) -> &na::DMatrix<u8> {
        &self.cells
    }

    pub fn in_bounds(&self, row: i32, col: i32) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.height() && (col as usize) < self.width()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.in_bounds(cell.row, cell.col)
    }

    /// Set one cell; out-of-range coordinates are ignored
    pub fn set_cell(&mut self, row: i32, col: i32, state: CellState) {
        if self.in_bounds(row, col) {
            self.cells[(row as usize, col as usize)] = state.value();
        }
    }

    /// Occupancy of one cell, `None` outside the grid
    pub fn get_cell(&self, row: i32, col: i32) -> Option<CellState> {
        if self.in_bounds(row, col) {
            Some(CellState::from_value(self.cells[(row as usize, col as usize)]))
        } else {
            None
        }
    }

    /// True only for in-bounds free cells
    pub fn is_free(&self, cell: Cell) -> bool {
        self.get_cell(cell.row, cell.col) == Some(CellState::Free)
    }

    /// True if every cell on the straight segment `from -> to` is in bounds
    /// and free. A diagonal step along the line also needs both of its
    /// corner cells free, the same rule the grid searches apply.
    pub fn segment_is_free(&self, from: Cell, to: Cell) -> bool {
        self.is_free(from)
            && LineCells::new(from, to)
                .tuple_windows()
                .all(|(a, b)| self.step_is_free(a, b))
    }

    /// True if a single move `from -> to` lands on a free cell without
    /// squeezing between two diagonally adjacent obstacles
    pub fn step_is_free(&self, from: Cell, to: Cell) -> bool {
        self.is_free(to)
            && (!from.is_diagonal_to(&to)
                || (self.is_free(Cell::new(from.row, to.col)) && self.is_free(Cell::new(to.row, from.col))))
    }

    /// Clamp a cell into the grid
    pub fn clamp(&self, cell: Cell) -> Cell {
        let max_row = self.height().saturating_sub(1) as i32;
        let max_col = self.width().saturating_sub(1) as i32;
        Cell::new(cell.row.max(0).min(max_row), cell.col.max(0).min(max_col))
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v != 0).count()
    }

    /// Free every cell; robot, goal and path are kept
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    pub fn robot_cell(&self) -> Option<Cell> {
        self.robot_cell
    }

    pub fn goal_cell(&self) -> Option<Cell> {
        self.goal_cell
    }

    /// Original robot placement, restored by [`Costmap::reset`]
    pub fn start_cell(&self) -> Option<Cell> {
        self.start_cell
    }

    /// Move the robot. The first accepted placement also fixes the start cell.
    pub fn set_robot_cell(&mut self, row: i32, col: i32) {
        if !self.in_bounds(row, col) {
            return;
        }
        let cell = Cell::new(row, col);
        self.robot_cell = Some(cell);
        if self.start_cell.is_none() {
            self.start_cell = Some(cell);
        }
    }

    pub fn set_goal_cell(&mut self, row: i32, col: i32) {
        if self.in_bounds(row, col) {
            self.goal_cell = Some(Cell::new(row, col));
        }
    }

    /// Forget robot and start placement, e.g. before a new level
    pub fn clear_robot(&mut self) {
        self.robot_cell = None;
        self.start_cell = None;
    }

    /// Place robot or goal from a click. Only in-bounds free cells are accepted.
    pub fn handle_click(&mut self, row: i32, col: i32, placement: Placement) -> bool {
        if self.get_cell(row, col) != Some(CellState::Free) {
            return false;
        }
        match placement {
            Placement::Robot => self.set_robot_cell(row, col),
            Placement::Goal => self.set_goal_cell(row, col),
        }
        true
    }

    pub fn path(&self) -> &[Cell] {
        &self.path
    }

    /// Replace the stored path, dropping cells outside the grid
    pub fn set_path<I>(&mut self, path: I)
    where
        I: IntoIterator<Item = Cell>,
    {
        let before = self.path.len();
        self.path = path.into_iter().filter(|c| self.contains(*c)).collect();
        debug!("costmap path replaced ({} -> {} cells)", before, self.path.len());
    }

    /// Replace the stored path from raw coordinate tuples.
    ///
    /// Entries that are not exactly `[row, col]` or that fall outside the
    /// grid are dropped.
    pub fn set_path_from_coords<I, C>(&mut self, coords: I)
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[i64]>,
    {
        let cells: Vec<Cell> = coords
            .into_iter()
            .filter_map(|c| match c.as_ref() {
                &[row, col] if row >= 0 && col >= 0 && row <= i32::MAX as i64 && col <= i32::MAX as i64 => {
                    Some(Cell::new(row as i32, col as i32))
                }
                _ => None,
            })
            .collect();
        self.set_path(cells);
    }

    /// Clear the path and return the robot to its start cell.
    /// Obstacles and goal are untouched.
    pub fn reset(&mut self) {
        self.path.clear();
        if let Some(start) = self.start_cell {
            self.robot_cell = Some(start);
        }
    }

    /// Mark a `width` x `height` block occupied, anchored at its top-left cell.
    /// Clipped to the grid; no-op if the anchor is outside.
    pub fn add_rectangle_obstacle(&mut self, row: i32, col: i32, width: i32, height: i32) {
        if !self.in_bounds(row, col) {
            return;
        }
        let row_end = row.saturating_add(height.max(0)).min(self.height() as i32);
        let col_end = col.saturating_add(width.max(0)).min(self.width() as i32);
        for (r, c) in iproduct!(row..row_end, col..col_end) {
            self.set_cell(r, c, CellState::Occupied);
        }
    }

    /// Mark a filled disc occupied. Clipped to the grid; no-op if the centre is outside.
    pub fn add_circular_obstacle(&mut self, center_row: i32, center_col: i32, radius: i32) {
        if !self.in_bounds(center_row, center_col) || radius < 0 {
            return;
        }
        let row_start = (center_row - radius).max(0);
        let row_end = (center_row + radius + 1).min(self.height() as i32);
        let col_start = (center_col - radius).max(0);
        let col_end = (center_col + radius + 1).min(self.width() as i32);
        for (r, c) in iproduct!(row_start..row_end, col_start..col_end) {
            let (dr, dc) = (r - center_row, c - center_col);
            if dr * dr + dc * dc <= radius * radius {
                self.set_cell(r, c, CellState::Occupied);
            }
        }
    }

    fn scale(&self) -> (f64, f64) {
        (
            self.viewport.width / self.width().max(1) as f64,
            self.viewport.height / self.height().max(1) as f64,
        )
    }

    /// Viewport pixel to cell, clamped into the grid
    pub fn pixel_to_cell(&self, px: f64, py: f64) -> Cell {
        let (sx, sy) = self.scale();
        let col = (px / sx).floor();
        let row = (py / sy).floor();
        // `as` saturates, so huge or non-finite input still clamps
        self.clamp(Cell::new(row as i32, col as i32))
    }

    /// Centre pixel of a cell; out-of-range cells are clamped first
    pub fn cell_to_pixel(&self, row: i32, col: i32) -> (f64, f64) {
        let (sx, sy) = self.scale();
        let cell = self.clamp(Cell::new(row, col));
        (
            cell.col as f64 * sx + sx / 2.0,
            cell.row as f64 * sy + sy / 2.0,
        )
    }

    /// Replace obstacles with the contents of a PGM raster file.
    ///
    /// On failure the costmap is left untouched and the error is returned so
    /// the caller can fall back to [`Costmap::demo`].
    pub fn load_pgm_file<P: AsRef<Path>>(&mut self, path: P) -> SandboxResult<()> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            warn!("failed to read map {}: {}", path.display(), e);
            e
        })?;
        self.load_pgm_bytes(&bytes)
    }

    /// Replace obstacles with the contents of an in-memory PGM raster
    pub fn load_pgm_bytes(&mut self, bytes: &[u8]) -> SandboxResult<()> {
        let raster = pgm::parse(bytes).map_err(|e| {
            warn!("failed to decode map: {}", e);
            e
        })?;
        self.cells = raster.to_occupancy(self.height(), self.width());
        self.path.clear();
        self.robot_cell = None;
        self.goal_cell = None;
        self.start_cell = None;
        self.auto_place();
        debug!(
            "loaded {}x{} raster into {}x{} grid, {} occupied cells",
            raster.width(),
            raster.height(),
            self.width(),
            self.height(),
            self.occupied_count()
        );
        Ok(())
    }

    /// Robot on the first free cell from the top-left, goal on the first free
    /// cell from the bottom-right. Leaves them unset on a fully blocked grid.
    pub fn auto_place(&mut self) {
        let (h, w) = (self.height() as i32, self.width() as i32);
        let mut forward = iproduct!(0..h, 0..w).map(|(r, c)| Cell::new(r, c));
        let robot = forward.find(|c| self.is_free(*c));
        let mut backward = iproduct!((0..h).rev(), (0..w).rev()).map(|(r, c)| Cell::new(r, c));
        let goal = backward.find(|c| self.is_free(*c));
        if let Some(robot) = robot {
            self.set_robot_cell(robot.row, robot.col);
        }
        if let Some(goal) = goal {
            self.set_goal_cell(goal.row, goal.col);
        }
    }
}

impl fmt::Display for Costmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.height() as i32 {
            for col in 0..self.width() as i32 {
                let cell = Cell::new(row, col);
                let ch = if Some(cell) == self.robot_cell {
                    'R'
                } else if Some(cell) == self.goal_cell {
                    'G'
                } else if !self.is_free(cell) {
                    '#'
                } else if self.path.contains(&cell) {
                    '*'
                } else {
                    '.'
                };
                write!(f, "{}", ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Default for Costmap {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_WIDTH, DEFAULT_GRID_HEIGHT)
    }
}
