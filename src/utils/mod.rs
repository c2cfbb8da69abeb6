//! Utility modules for grid_planning_sandbox

pub mod motion;
pub mod raster_line;

pub use raster_line::{line_cells, LineCells};
