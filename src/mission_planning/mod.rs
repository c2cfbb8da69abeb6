//! Mission planning: planner selection and episode execution

pub mod executor;
pub mod planner;

pub use executor::*;
pub use planner::*;
