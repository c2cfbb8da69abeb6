//! Greedy Best-First grid planner
//!
//! Orders the frontier by the heuristic alone. Each cell is discovered at
//! most once and its predecessor is never revised, so the result is fast
//! but NOT guaranteed to be a shortest path.

use serde::{Deserialize, Serialize};

use crate::common::{Cell, Heuristic, PathPlanner, SandboxResult};
use crate::mapping::Costmap;
use crate::path_planning::grid_search::{best_first_search, SearchOrder};

/// Configuration for the Greedy Best-First planner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreedyConfig {
    pub allow_diagonal: bool,
    pub heuristic: Heuristic,
}

impl Default for GreedyConfig {
    fn default() -> Self {
        Self {
            allow_diagonal: true,
            heuristic: Heuristic::Euclidean,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GreedyPlanner {
    config: GreedyConfig,
}

impl GreedyPlanner {
    pub fn new(config: GreedyConfig) -> Self {
        Self { config }
    }
}

impl PathPlanner for GreedyPlanner {
    fn name(&self) -> &'static str {
        "GreedySearch"
    }

    fn plan(&mut self, grid: &Costmap, start: Cell, goal: Cell) -> SandboxResult<Vec<Cell>> {
        best_first_search(
            grid,
            start,
            goal,
            self.config.allow_diagonal,
            SearchOrder::Greedy(self.config.heuristic),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::path_cost;
    use crate::path_planning::AStarPlanner;

    #[test]
    fn test_greedy_reaches_goal_on_open_grid() {
        let grid = Costmap::new(10, 10);
        let path = GreedyPlanner::default()
            .plan(&grid, Cell::new(0, 0), Cell::new(9, 4))
            .unwrap();
        assert_eq!(path.last(), Some(&Cell::new(9, 4)));
        assert!(path.iter().all(|c| grid.is_free(*c)));
    }

    #[test]
    fn test_greedy_never_beats_a_star() {
        let mut grid = Costmap::new(15, 15);
        grid.add_rectangle_obstacle(3, 4, 8, 1);
        grid.add_rectangle_obstacle(3, 11, 1, 8);
        let start = Cell::new(0, 7);
        let goal = Cell::new(14, 7);
        let greedy = GreedyPlanner::default().plan(&grid, start, goal).unwrap();
        let optimal = AStarPlanner::default().plan(&grid, start, goal).unwrap();
        assert!(path_cost(start, &greedy) + 1e-9 >= path_cost(start, &optimal));
    }
}
