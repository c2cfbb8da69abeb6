//! A* grid path planner
//!
//! Orders the frontier by `g(n) + h(n)`. With an admissible heuristic for
//! the chosen connectivity (Euclidean or Chebyshev on 8-connected grids,
//! any of the three on 4-connected ones) the returned path is a shortest
//! path.

use serde::{Deserialize, Serialize};

use crate::common::{Cell, Heuristic, PathPlanner, SandboxError, SandboxResult};
use crate::mapping::Costmap;
use crate::path_planning::grid_search::{best_first_search, SearchOrder};

/// Configuration for the A* planner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AStarConfig {
    /// Allow the four diagonal moves in addition to the axis moves
    pub allow_diagonal: bool,
    pub heuristic: Heuristic,
}

impl Default for AStarConfig {
    fn default() -> Self {
        Self {
            allow_diagonal: true,
            heuristic: Heuristic::Euclidean,
        }
    }
}

/// A* path planner
#[derive(Debug, Clone, Default)]
pub struct AStarPlanner {
    config: AStarConfig,
}

impl AStarPlanner {
    pub fn new(config: AStarConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AStarConfig {
        &self.config
    }
}

impl PathPlanner for AStarPlanner {
    fn name(&self) -> &'static str {
        "AStar"
    }

    fn plan(&mut self, grid: &Costmap, start: Cell, goal: Cell) -> SandboxResult<Vec<Cell>> {
        // Manhattan overestimates once diagonal moves exist
        if self.config.allow_diagonal && self.config.heuristic == Heuristic::Manhattan {
            return Err(SandboxError::InvalidParameter(
                "A* manhattan heuristic requires allow_diagonal = false".to_string(),
            ));
        }
        best_first_search(
            grid,
            start,
            goal,
            self.config.allow_diagonal,
            SearchOrder::AStar(self.config.heuristic),
        )
    }
}
