//! Breadth-first and depth-first grid search
//!
//! Both are 4-connected and mark a cell visited when it is pushed, so every
//! cell is discovered once. BFS pops from the front of the frontier and
//! returns a fewest-steps path. DFS pops from the back; its neighbours are
//! pushed Up, Left, Down, Right, so Right is explored first. DFS paths are
//! valid but generally far from shortest.

use std::collections::{HashMap, HashSet, VecDeque};

use log::{debug, warn};

use crate::common::{Cell, PathPlanner, SandboxError, SandboxResult};
use crate::mapping::Costmap;

const BFS_ORDER: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
const DFS_ORDER: [(i32, i32); 4] = [(-1, 0), (0, -1), (1, 0), (0, 1)];

/// Which end of the frontier is popped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    BreadthFirst,
    DepthFirst,
}

impl Traversal {
    fn label(self) -> &'static str {
        match self {
            Traversal::BreadthFirst => "BFS",
            Traversal::DepthFirst => "DFS",
        }
    }

    fn neighbor_order(self) -> &'static [(i32, i32); 4] {
        match self {
            Traversal::BreadthFirst => &BFS_ORDER,
            Traversal::DepthFirst => &DFS_ORDER,
        }
    }
}

/// Uninformed grid planner, BFS or DFS
#[derive(Debug, Clone)]
pub struct UninformedPlanner {
    traversal: Traversal,
}

impl UninformedPlanner {
    pub fn new(traversal: Traversal) -> Self {
        Self { traversal }
    }

    pub fn bfs() -> Self {
        Self::new(Traversal::BreadthFirst)
    }

    pub fn dfs() -> Self {
        Self::new(Traversal::DepthFirst)
    }

    pub fn traversal(&self) -> Traversal {
        self.traversal
    }

    fn search(&self, grid: &Costmap, start: Cell, goal: Cell) -> SandboxResult<Vec<Cell>> {
        let label = self.traversal.label();
        if !grid.is_free(goal) {
            warn!("{}: goal {} is not a free cell", label, goal);
            return Err(SandboxError::PlanningFailed(format!(
                "goal {} is not a free cell",
                goal
            )));
        }

        let mut frontier = VecDeque::new();
        let mut visited: HashSet<Cell> = HashSet::new();
        let mut came_from: HashMap<Cell, Cell> = HashMap::new();
        frontier.push_back(start);
        visited.insert(start);

        loop {
            let popped = match self.traversal {
                Traversal::BreadthFirst => frontier.pop_front(),
                Traversal::DepthFirst => frontier.pop_back(),
            };
            let current = match popped {
                Some(cell) => cell,
                None => break,
            };

            if current == goal {
                let mut path = Vec::new();
                let mut cell = goal;
                while let Some(&prev) = came_from.get(&cell) {
                    path.push(cell);
                    cell = prev;
                }
                path.reverse();
                debug!("{}: path planned with {} steps", label, path.len());
                return Ok(path);
            }

            for &(dr, dc) in self.traversal.neighbor_order() {
                let next = current.offset(dr, dc);
                if !grid.is_free(next) || visited.contains(&next) {
                    continue;
                }
                visited.insert(next);
                came_from.insert(next, current);
                frontier.push_back(next);
            }
        }

        warn!("{}: no path found from {} to {}", label, start, goal);
        Err(SandboxError::PlanningFailed(format!(
            "{}: no path to {}",
            label, goal
        )))
    }
}

impl PathPlanner for UninformedPlanner {
    fn name(&self) -> &'static str {
        self.traversal.label()
    }

    fn plan(&mut self, grid: &Costmap, start: Cell, goal: Cell) -> SandboxResult<Vec<Cell>> {
        self.search(grid, start, goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_four_connected(start: Cell, path: &[Cell]) -> bool {
        let mut prev = start;
        path.iter().all(|c| {
            let ok = prev.manhattan(c) == 1;
            prev = *c;
            ok
        })
    }

    #[test]
    fn test_bfs_fewest_steps() {
        let mut grid = Costmap::new(6, 6);
        grid.add_rectangle_obstacle(0, 3, 1, 5);
        let start = Cell::new(0, 0);
        let goal = Cell::new(0, 5);
        let path = UninformedPlanner::bfs().plan(&grid, start, goal).unwrap();
        // down to row 5, across, and back up
        assert_eq!(path.len(), 15);
        assert!(is_four_connected(start, &path));
        assert_eq!(path.last(), Some(&goal));
    }

    #[test]
    fn test_dfs_explores_right_first() {
        let grid = Costmap::new(4, 1);
        let path = UninformedPlanner::dfs()
            .plan(&grid, Cell::new(0, 0), Cell::new(0, 3))
            .unwrap();
        assert_eq!(path, vec![Cell::new(0, 1), Cell::new(0, 2), Cell::new(0, 3)]);
    }

    #[test]
    fn test_dfs_path_is_valid() {
        let grid = Costmap::new(7, 7);
        let start = Cell::new(3, 3);
        let goal = Cell::new(0, 0);
        let path = UninformedPlanner::dfs().plan(&grid, start, goal).unwrap();
        assert!(is_four_connected(start, &path));
        assert!(path.iter().all(|c| grid.is_free(*c)));
        assert_eq!(path.last(), Some(&goal));
    }

    #[test]
    fn test_start_is_goal() {
        let grid = Costmap::new(3, 3);
        let path = UninformedPlanner::bfs()
            .plan(&grid, Cell::new(1, 1), Cell::new(1, 1))
            .unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn test_names() {
        assert_eq!(UninformedPlanner::bfs().name(), "BFS");
        assert_eq!(UninformedPlanner::dfs().name(), "DFS");
    }
}
