//! Bug algorithm
//!
//! Heads straight for the goal until blocked, then keeps the obstacle on its
//! right-hand side and walks around it, remembering the boundary cell that
//! came closest to the goal. Once back at the hit point it follows the
//! boundary again up to that closest cell and resumes heading for the goal.

use std::collections::HashSet;

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::common::{Cell, PathPlanner, SandboxResult};
use crate::local_planning::finish_walk;
use crate::mapping::Costmap;
use crate::utils::motion::{self, AXIS_MOVES};

/// Configuration for the Bug planner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BugConfig {
    /// Boundary steps that must pass before arriving at the hit point
    /// counts as a full circuit
    pub follow_return_steps: usize,
    /// Once this many distinct boundary cells have been visited, a revisit
    /// jumps straight to the closest cell found
    pub cycle_limit: usize,
    pub goal_append_radius: f64,
}

impl Default for BugConfig {
    fn default() -> Self {
        Self {
            follow_return_steps: 8,
            cycle_limit: 100,
            goal_append_radius: 2.0,
        }
    }
}

/// Bug planner mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BugMode {
    MoveToGoal,
    FollowObstacle {
        hit_point: Cell,
        closest: Cell,
        min_dist: f64,
        /// Index into [`AXIS_MOVES`]; the obstacle is on the right of it
        heading: usize,
        steps: usize,
        /// Circuit finished, heading along the boundary to `closest`
        returning: bool,
    },
}

fn axis_index(dr: i32, dc: i32) -> usize {
    AXIS_MOVES
        .iter()
        .position(|&m| m == (dr, dc))
        .unwrap_or(0)
}

/// One greedy step toward the goal, or the axis direction of the blocking cell
fn greedy_step(grid: &Costmap, current: Cell, goal: Cell) -> Result<Cell, usize> {
    let (dr, dc) = motion::sign_step(current, goal);
    if dr != 0 && dc != 0 {
        let col_free = grid.is_free(current.offset(0, dc));
        let row_free = grid.is_free(current.offset(dr, 0));
        if !col_free {
            return Err(axis_index(0, dc));
        }
        if !row_free {
            return Err(axis_index(dr, 0));
        }
        let diagonal = current.offset(dr, dc);
        if grid.is_free(diagonal) {
            Ok(diagonal)
        } else {
            // lone corner obstacle, slide past it
            Ok(current.offset(0, dc))
        }
    } else {
        let next = current.offset(dr, dc);
        if grid.is_free(next) {
            Ok(next)
        } else {
            Err(axis_index(dr, dc))
        }
    }
}

/// Bug planner
#[derive(Debug, Clone, Default)]
pub struct BugPlanner {
    config: BugConfig,
}

impl BugPlanner {
    pub fn new(config: BugConfig) -> Self {
        Self { config }
    }

    /// Simulate the walk; the returned cells start with `start`
    fn simulate(&self, grid: &Costmap, start: Cell, goal: Cell) -> Vec<Cell> {
        let max_steps = grid.width() * grid.height();
        let path_cap = max_steps as f64 / 2.0;

        let mut current = start;
        let mut walk = vec![start];
        let mut visited: HashSet<Cell> = HashSet::new();
        let mut mode = BugMode::MoveToGoal;

        for _ in 0..max_steps {
            if current == goal {
                break;
            }

            let state = mode;
            match state {
                BugMode::MoveToGoal => match greedy_step(grid, current, goal) {
                    Ok(next) => {
                        current = next;
                        walk.push(next);
                    }
                    Err(blocked) => {
                        trace!("Bug: hit obstacle at {}", current);
                        visited.clear();
                        mode = BugMode::FollowObstacle {
                            hit_point: current,
                            closest: current,
                            min_dist: current.euclidean(&goal),
                            heading: (blocked + 3) % 4,
                            steps: 0,
                            returning: false,
                        };
                    }
                },
                BugMode::FollowObstacle {
                    hit_point,
                    mut closest,
                    mut min_dist,
                    mut heading,
                    mut steps,
                    mut returning,
                } => {
                    steps += 1;
                    let dist = current.euclidean(&goal);
                    if dist < min_dist {
                        min_dist = dist;
                        closest = current;
                    }
                    if returning && current == closest {
                        trace!("Bug: leaving obstacle at {}", current);
                        mode = BugMode::MoveToGoal;
                        continue;
                    }
                    if !returning && current == hit_point && steps > self.config.follow_return_steps {
                        if closest == hit_point {
                            warn!("Bug: circled the obstacle at {} without getting closer to {}", hit_point, goal);
                            break;
                        }
                        returning = true;
                    }

                    let right = (heading + 1) % 4;
                    let (rr, rc) = AXIS_MOVES[right];
                    let (fr, fc) = AXIS_MOVES[heading];
                    let next = if grid.is_free(current.offset(rr, rc)) {
                        heading = right;
                        Some(current.offset(rr, rc))
                    } else if grid.is_free(current.offset(fr, fc)) {
                        Some(current.offset(fr, fc))
                    } else {
                        heading = (heading + 3) % 4;
                        None
                    };

                    if let Some(next) = next {
                        if visited.insert(next) || visited.len() <= self.config.cycle_limit {
                            current = next;
                            walk.push(next);
                        } else {
                            debug!("Bug: boundary cycle, jumping to closest cell {}", closest);
                            current = closest;
                            walk.push(closest);
                            visited.clear();
                            mode = BugMode::MoveToGoal;
                            continue;
                        }
                    }
                    mode = BugMode::FollowObstacle {
                        hit_point,
                        closest,
                        min_dist,
                        heading,
                        steps,
                        returning,
                    };
                }
            }

            if walk.len() as f64 > path_cap {
                warn!("Bug: walk exceeded {} cells, giving up", path_cap);
                break;
            }
        }
        walk
    }
}

impl PathPlanner for BugPlanner {
    fn name(&self) -> &'static str {
        "Bug"
    }

    fn plan(&mut self, grid: &Costmap, start: Cell, goal: Cell) -> SandboxResult<Vec<Cell>> {
        let walk = self.simulate(grid, start, goal);
        let path = finish_walk(grid, walk, goal, self.config.goal_append_radius);
        debug!("Bug: path planned with {} steps", path.len());
        Ok(path)
    }
}
