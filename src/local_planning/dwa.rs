//! Grid Dynamic Window Approach (DWA)
//!
//! A discrete take on DWA: each simulated step scores a small fan of
//! headings around the bearing to the goal and moves one cell along the
//! best one. A candidate scores its obstacle clearance within a lookahead
//! window, minus `goal_weight` times its remaining distance to the goal.
//! A non-zero `revisit_penalty` also docks cells the walk already visited.

use std::collections::HashSet;

use log::{debug, trace, warn};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::common::{Cell, PathPlanner, SandboxResult};
use crate::local_planning::finish_walk;
use crate::mapping::Costmap;
use crate::utils::motion;

const GOAL_APPEND_RADIUS: f64 = 2.0;

/// Configuration for the DWA planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DWAConfig {
    /// Heading offsets from the goal bearing, in degrees
    pub heading_offsets: Vec<f64>,
    /// Half-size of the clearance window, in cells
    pub lookahead: i32,
    pub goal_weight: f64,
    /// Subtracted from already visited cells; off by default
    pub revisit_penalty: f64,
    /// Step budget as a multiple of the start-goal distance
    pub step_factor: f64,
}

impl Default for DWAConfig {
    fn default() -> Self {
        Self {
            heading_offsets: vec![0.0, -45.0, 45.0, -90.0, 90.0],
            lookahead: 3,
            goal_weight: 0.5,
            revisit_penalty: 0.0,
            step_factor: 3.0,
        }
    }
}

/// DWA planner
#[derive(Debug, Clone, Default)]
pub struct DWAPlanner {
    config: DWAConfig,
}

impl DWAPlanner {
    pub fn new(config: DWAConfig) -> Self {
        Self { config }
    }

    /// Distance to the nearest obstacle inside the lookahead window, or
    /// `lookahead + 1` when the window is clear.
    pub fn clearance(&self, grid: &Costmap, cell: Cell) -> f64 {
        let r = self.config.lookahead;
        let mut nearest = (r + 1) as f64;
        for row in (cell.row - r)..=(cell.row + r) {
            for col in (cell.col - r)..=(cell.col + r) {
                let other = Cell::new(row, col);
                if grid.get_cell(row, col).map_or(false, |s| !s.is_free()) {
                    nearest = nearest.min(cell.euclidean(&other));
                }
            }
        }
        nearest
    }

    /// Simulate the walk; the returned cells start with `start`
    fn simulate(&self, grid: &Costmap, start: Cell, goal: Cell) -> Vec<Cell> {
        let max_steps = (start.euclidean(&goal) * self.config.step_factor).ceil() as usize;
        let mut current = start;
        let mut walk = vec![start];
        let mut visited: HashSet<Cell> = HashSet::new();
        visited.insert(start);

        for _ in 0..max_steps {
            if current == goal {
                break;
            }
            let bearing = current.bearing_deg(&goal);
            let best = self
                .config
                .heading_offsets
                .iter()
                .filter_map(|offset| {
                    let (dr, dc) = motion::heading_step(bearing + offset);
                    let candidate = current.offset(dr, dc);
                    if candidate == current || !grid.step_is_free(current, candidate) {
                        return None;
                    }
                    let mut score = self.clearance(grid, candidate)
                        - self.config.goal_weight * candidate.euclidean(&goal);
                    if visited.contains(&candidate) {
                        score -= self.config.revisit_penalty;
                    }
                    Some((candidate, score))
                })
                .max_by_key(|&(_, score)| OrderedFloat(score));

            match best {
                Some((next, score)) => {
                    trace!("DWA: {} -> {} (score {:.3})", current, next, score);
                    current = next;
                    visited.insert(next);
                    walk.push(next);
                }
                None => {
                    warn!("DWA: every candidate heading is blocked at {}", current);
                    break;
                }
            }
        }
        walk
    }
}

impl PathPlanner for DWAPlanner {
    fn name(&self) -> &'static str {
        "DWA"
    }

    fn plan(&mut self, grid: &Costmap, start: Cell, goal: Cell) -> SandboxResult<Vec<Cell>> {
        let walk = self.simulate(grid, start, goal);
        let path = finish_walk(grid, walk, goal, GOAL_APPEND_RADIUS);
        debug!("DWA: path planned with {} steps", path.len());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::CellState;

    #[test]
    fn test_clearance() {
        let mut grid = Costmap::new(10, 10);
        let planner = DWAPlanner::default();
        assert_eq!(planner.clearance(&grid, Cell::new(5, 5)), 4.0);
        grid.set_cell(5, 7, CellState::Occupied);
        assert_eq!(planner.clearance(&grid, Cell::new(5, 5)), 2.0);
    }

    #[test]
    fn test_dwa_straight_run() {
        let grid = Costmap::new(10, 3);
        let path = DWAPlanner::default()
            .plan(&grid, Cell::new(1, 0), Cell::new(1, 9))
            .unwrap();
        assert_eq!(path.last(), Some(&Cell::new(1, 9)));
        assert!(path.iter().all(|c| grid.is_free(*c)));
    }

    #[test]
    fn test_dwa_fully_boxed_in() {
        let mut grid = Costmap::new(5, 5);
        for (r, c) in [(1, 1), (1, 2), (1, 3), (2, 1), (2, 3), (3, 1), (3, 2), (3, 3)].iter() {
            grid.set_cell(*r, *c, CellState::Occupied);
        }
        let path = DWAPlanner::default()
            .plan(&grid, Cell::new(2, 2), Cell::new(4, 4))
            .unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn test_dwa_steps_around_obstacle() {
        let mut grid = Costmap::new(15, 9);
        grid.add_rectangle_obstacle(3, 7, 1, 3);
        let start = Cell::new(4, 1);
        let goal = Cell::new(4, 13);
        let mut planner = DWAPlanner::new(DWAConfig {
            revisit_penalty: 1.0,
            ..DWAConfig::default()
        });
        let path = planner.plan(&grid, start, goal).unwrap();
        let mut prev = start;
        for cell in &path {
            assert!(grid.is_free(*cell));
            assert_eq!(prev.chebyshev(cell), 1);
            prev = *cell;
        }
        assert_eq!(path.last(), Some(&goal));
    }

    #[test]
    fn test_default_score_is_clearance_minus_goal_distance() {
        let mut grid = Costmap::new(9, 9);
        grid.set_cell(3, 5, CellState::Occupied);
        grid.set_cell(5, 3, CellState::Occupied);
        let start = Cell::new(4, 4);
        let goal = Cell::new(8, 8);
        let mut planner = DWAPlanner::default();
        assert_eq!(planner.config.revisit_penalty, 0.0);

        let bearing = start.bearing_deg(&goal);
        let expected = planner
            .config
            .heading_offsets
            .iter()
            .map(|offset| {
                let (dr, dc) = motion::heading_step(bearing + offset);
                start.offset(dr, dc)
            })
            .filter(|c| *c != start && grid.step_is_free(start, *c))
            .max_by_key(|c| OrderedFloat(planner.clearance(&grid, *c) - 0.5 * c.euclidean(&goal)))
            .unwrap();

        let path = planner.plan(&grid, start, goal).unwrap();
        assert_eq!(path.first(), Some(&expected));
    }
}
