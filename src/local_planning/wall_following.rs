//! Wall following with the left-hand rule
//!
//! The robot moves on the 4-connected grid. In open space it heads toward
//! the goal along the axis with the larger remaining delta. When blocked it
//! turns so the wall is on its left and follows it: turn left if that cell
//! is free, else go forward if free, else turn right in place and retry.
//! It leaves the wall once it is closer to the goal than where it hit the
//! wall and the step toward the goal is free.

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::common::{Cell, PathPlanner, SandboxResult};
use crate::local_planning::finish_walk;
use crate::mapping::Costmap;
use crate::utils::motion::AXIS_MOVES;

/// Configuration for the wall-following planner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallFollowingConfig {
    /// Manhattan distance to the goal at which the walk stops
    pub goal_tolerance: i32,
    pub goal_append_radius: f64,
}

impl Default for WallFollowingConfig {
    fn default() -> Self {
        Self {
            goal_tolerance: 1,
            goal_append_radius: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Seek,
    Follow { hit_dist: f64 },
}

/// Index into [`AXIS_MOVES`] pointing at the goal along the dominant axis
fn goal_heading(from: Cell, goal: Cell) -> usize {
    let dr = goal.row - from.row;
    let dc = goal.col - from.col;
    if dc.abs() >= dr.abs() {
        if dc >= 0 {
            0
        } else {
            2
        }
    } else if dr > 0 {
        1
    } else {
        3
    }
}

fn step(cell: Cell, heading: usize) -> Cell {
    let (dr, dc) = AXIS_MOVES[heading];
    cell.offset(dr, dc)
}

/// Left-hand wall follower
#[derive(Debug, Clone, Default)]
pub struct WallFollowingPlanner {
    config: WallFollowingConfig,
}

impl WallFollowingPlanner {
    pub fn new(config: WallFollowingConfig) -> Self {
        Self { config }
    }

    /// Simulate the walk; the returned cells start with `start`.
    /// Turning in place uses up budget like a move does.
    fn simulate(&self, grid: &Costmap, start: Cell, goal: Cell) -> Vec<Cell> {
        let max_steps = grid.width() * grid.height();
        let mut current = start;
        let mut walk = vec![start];
        let mut heading = goal_heading(start, goal);
        let mut mode = Mode::Seek;

        for _ in 0..max_steps {
            if current.manhattan(&goal) <= self.config.goal_tolerance {
                break;
            }
            match mode {
                Mode::Seek => {
                    heading = goal_heading(current, goal);
                    let next = step(current, heading);
                    if grid.is_free(next) {
                        current = next;
                        walk.push(next);
                    } else {
                        trace!("WallFollowing: wall ahead of {}", current);
                        // turn right so the wall ends up on the left
                        heading = (heading + 1) % 4;
                        mode = Mode::Follow {
                            hit_dist: current.euclidean(&goal),
                        };
                    }
                }
                Mode::Follow { hit_dist } => {
                    let toward_goal = step(current, goal_heading(current, goal));
                    if current.euclidean(&goal) < hit_dist && grid.is_free(toward_goal) {
                        trace!("WallFollowing: leaving wall at {}", current);
                        mode = Mode::Seek;
                        continue;
                    }
                    let left = (heading + 3) % 4;
                    if grid.is_free(step(current, left)) {
                        heading = left;
                    } else if !grid.is_free(step(current, heading)) {
                        heading = (heading + 1) % 4;
                        continue;
                    }
                    current = step(current, heading);
                    walk.push(current);
                }
            }
        }

        if current.manhattan(&goal) > self.config.goal_tolerance {
            warn!("WallFollowing: step budget spent {} cells from {}", current.manhattan(&goal), goal);
        }
        walk
    }
}

impl PathPlanner for WallFollowingPlanner {
    fn name(&self) -> &'static str {
        "WallFollowing"
    }

    fn plan(&mut self, grid: &Costmap, start: Cell, goal: Cell) -> SandboxResult<Vec<Cell>> {
        let walk = self.simulate(grid, start, goal);
        let path = finish_walk(grid, walk, goal, self.config.goal_append_radius);
        debug!("WallFollowing: path planned with {} steps", path.len());
        Ok(path)
    }
}
