//! Grid planning sandbox - path planning algorithms on a 2D occupancy grid
//!
//! This crate provides a costmap, a set of global, local and recovery
//! planners behind one trait, and an episode executor that plays a planned
//! path back one cell per tick.

// Core modules
pub mod common;
pub mod config;
pub mod utils;

// Algorithm modules
pub mod mapping;
pub mod path_planning;
pub mod local_planning;
pub mod recovery;
pub mod mission_planning;

// Re-export common types for convenience
pub use common::{Cell, CellState, Heuristic};
pub use common::PathPlanner;
pub use common::{SandboxError, SandboxResult};
pub use config::SandboxConfig;
pub use mapping::Costmap;
pub use mission_planning::{Algorithm, Planner, PlannerKind, RunState};
