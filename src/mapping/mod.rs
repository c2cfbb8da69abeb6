// Occupancy grid and raster map loading

pub mod costmap;
pub mod pgm;

pub use costmap::*;
pub use pgm::GrayRaster;
