//! Dijkstra grid path planner
//!
//! Uniform-cost search: the A* skeleton with a zero heuristic.

use serde::{Deserialize, Serialize};

use crate::common::{Cell, PathPlanner, SandboxResult};
use crate::mapping::Costmap;
use crate::path_planning::grid_search::{best_first_search, SearchOrder};

/// Configuration for the Dijkstra planner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DijkstraConfig {
    pub allow_diagonal: bool,
}

impl Default for DijkstraConfig {
    fn default() -> Self {
        Self {
            allow_diagonal: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DijkstraPlanner {
    config: DijkstraConfig,
}

impl DijkstraPlanner {
    pub fn new(config: DijkstraConfig) -> Self {
        Self { config }
    }
}

impl PathPlanner for DijkstraPlanner {
    fn name(&self) -> &'static str {
        "Dijkstra"
    }

    fn plan(&mut self, grid: &Costmap, start: Cell, goal: Cell) -> SandboxResult<Vec<Cell>> {
        best_first_search(grid, start, goal, self.config.allow_diagonal, SearchOrder::Dijkstra)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{path_cost, CellState};
    use crate::path_planning::AStarPlanner;

    #[test]
    fn test_dijkstra_matches_a_star_cost() {
        let mut grid = Costmap::new(12, 8);
        grid.add_rectangle_obstacle(2, 3, 2, 5);
        grid.set_cell(6, 8, CellState::Occupied);
        let start = Cell::new(0, 0);
        let goal = Cell::new(7, 11);

        let dijkstra = DijkstraPlanner::default().plan(&grid, start, goal).unwrap();
        let a_star = AStarPlanner::default().plan(&grid, start, goal).unwrap();
        assert!((path_cost(start, &dijkstra) - path_cost(start, &a_star)).abs() < 1e-9);
    }

    #[test]
    fn test_dijkstra_straight_line() {
        let grid = Costmap::new(5, 1);
        let path = DijkstraPlanner::default()
            .plan(&grid, Cell::new(0, 0), Cell::new(0, 4))
            .unwrap();
        assert_eq!(
            path,
            vec![Cell::new(0, 1), Cell::new(0, 2), Cell::new(0, 3), Cell::new(0, 4)]
        );
    }
}
