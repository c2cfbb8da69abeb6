//! RRT (Rapidly-exploring Random Tree) grid planner
//!
//! Grows a tree from the start by sampling free cells (or the goal with
//! probability `goal_sample_rate`), steering the nearest tree node at most
//! `step_size` cells toward the sample, and accepting the new node only when
//! the rasterised segment from its parent is entirely free. The episode
//! succeeds as soon as a node lands within `goal_threshold` of the goal with
//! a free segment to it. The tree path is then shortcut greedily.

use std::collections::HashSet;

use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Bernoulli, Distribution, Uniform};
use serde::{Deserialize, Serialize};

use crate::common::{Cell, PathPlanner, SandboxError, SandboxResult};
use crate::mapping::Costmap;

/// Configuration for RRT planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RRTConfig {
    /// Maximum number of samples
    pub max_iterations: usize,
    /// Maximum extension length per sample, in cells
    pub step_size: f64,
    /// Probability of sampling the goal instead of a random free cell
    pub goal_sample_rate: f64,
    /// Distance within which a new node tries to connect to the goal
    pub goal_threshold: f64,
    /// Fixed RNG seed; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for RRTConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            step_size: 3.0,
            goal_sample_rate: 0.1,
            goal_threshold: 5.0,
            seed: None,
        }
    }
}

/// Tree node; `parent` indexes into the node list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RRTNode {
    pub cell: Cell,
    pub parent: Option<usize>,
}

/// RRT path planner
#[derive(Debug, Clone, Default)]
pub struct RRTPlanner {
    config: RRTConfig,
    node_list: Vec<RRTNode>,
    raw_path: Vec<Cell>,
}

impl RRTPlanner {
    pub fn new(config: RRTConfig) -> Self {
        Self {
            config,
            node_list: Vec::new(),
            raw_path: Vec::new(),
        }
    }

    pub fn config(&self) -> &RRTConfig {
        &self.config
    }

    /// Get the tree built during the last planning call
    pub fn get_tree(&self) -> &[RRTNode] {
        &self.node_list
    }

    /// Tree path of the last successful plan, before shortcutting; starts
    /// with the start cell and ends with the goal.
    pub fn raw_path(&self) -> &[Cell] {
        &self.raw_path
    }

    fn make_rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn get_nearest_node_index(&self, target: Cell) -> usize {
        let mut min_dist = f64::INFINITY;
        let mut min_ind = 0;
        for (i, node) in self.node_list.iter().enumerate() {
            let dist = node.cell.euclidean(&target);
            if dist < min_dist {
                min_dist = dist;
                min_ind = i;
            }
        }
        min_ind
    }

    /// Move from `from` toward `to` by at most `step_size`, truncating to
    /// integer cells and clamping to the grid.
    fn steer(&self, grid: &Costmap, from: Cell, to: Cell) -> Cell {
        let dist = from.euclidean(&to);
        if dist <= self.config.step_size {
            return to;
        }
        let dir_row = (to.row - from.row) as f64 / dist;
        let dir_col = (to.col - from.col) as f64 / dist;
        let row = (from.row as f64 + dir_row * self.config.step_size) as i32;
        let col = (from.col as f64 + dir_col * self.config.step_size) as i32;
        grid.clamp(Cell::new(row, col))
    }

    fn generate_final_course(&self, goal_index: usize) -> Vec<Cell> {
        let mut path = Vec::new();
        let mut node_index = Some(goal_index);
        while let Some(index) = node_index {
            let node = &self.node_list[index];
            path.push(node.cell);
            node_index = node.parent;
        }
        path.reverse();
        path
    }

    /// Shortcut a tree path: from each retained vertex jump to the furthest
    /// later vertex reachable by a free segment.
    pub fn smooth_path(grid: &Costmap, path: &[Cell]) -> Vec<Cell> {
        if path.len() <= 2 {
            return path.to_vec();
        }
        let mut smoothed = vec![path[0]];
        let mut i = 0;
        while i < path.len() - 1 {
            let mut next = i + 1;
            for j in (i + 2..path.len()).rev() {
                if grid.segment_is_free(path[i], path[j]) {
                    next = j;
                    break;
                }
            }
            smoothed.push(path[next]);
            i = next;
        }
        smoothed
    }
}

impl PathPlanner for RRTPlanner {
    fn name(&self) -> &'static str {
        "RRT"
    }

    fn plan(&mut self, grid: &Costmap, start: Cell, goal: Cell) -> SandboxResult<Vec<Cell>> {
        self.node_list.clear();
        self.raw_path.clear();

        if !grid.is_free(goal) {
            warn!("RRT: goal {} is not a free cell", goal);
            return Err(SandboxError::PlanningFailed(format!(
                "goal {} is not a free cell",
                goal
            )));
        }
        if start == goal {
            self.raw_path = vec![start];
            return Ok(Vec::new());
        }

        let goal_sampler = Bernoulli::new(self.config.goal_sample_rate).map_err(|_| {
            SandboxError::InvalidParameter(format!(
                "goal_sample_rate {} is not a probability",
                self.config.goal_sample_rate
            ))
        })?;
        let free_cells: Vec<Cell> = (0..grid.height() as i32)
            .flat_map(|row| (0..grid.width() as i32).map(move |col| Cell::new(row, col)))
            .filter(|cell| grid.is_free(*cell))
            .collect();
        let cell_sampler = Uniform::new(0, free_cells.len());
        let mut rng = self.make_rng();

        self.node_list.push(RRTNode {
            cell: start,
            parent: None,
        });
        let mut in_tree: HashSet<Cell> = HashSet::new();
        in_tree.insert(start);

        for iteration in 0..self.config.max_iterations {
            let sample = if goal_sampler.sample(&mut rng) {
                goal
            } else {
                free_cells[cell_sampler.sample(&mut rng)]
            };

            let nearest_index = self.get_nearest_node_index(sample);
            let nearest = self.node_list[nearest_index].cell;
            let new_cell = self.steer(grid, nearest, sample);
            if new_cell == nearest || in_tree.contains(&new_cell) {
                continue;
            }
            if !grid.segment_is_free(nearest, new_cell) {
                continue;
            }
            self.node_list.push(RRTNode {
                cell: new_cell,
                parent: Some(nearest_index),
            });
            in_tree.insert(new_cell);
            trace!("RRT: added {} (parent {})", new_cell, nearest);

            if new_cell.euclidean(&goal) <= self.config.goal_threshold
                && grid.segment_is_free(new_cell, goal)
            {
                let new_index = self.node_list.len() - 1;
                let goal_index = if new_cell == goal {
                    new_index
                } else {
                    self.node_list.push(RRTNode {
                        cell: goal,
                        parent: Some(new_index),
                    });
                    self.node_list.len() - 1
                };
                self.raw_path = self.generate_final_course(goal_index);
                let smoothed = Self::smooth_path(grid, &self.raw_path);
                debug!(
                    "RRT: path planned with {} vertices ({} before smoothing) after {} iterations",
                    smoothed.len() - 1,
                    self.raw_path.len() - 1,
                    iteration + 1
                );
                return Ok(smoothed.into_iter().skip(1).collect());
            }
        }

        warn!(
            "RRT: no path found within {} iterations ({} tree nodes)",
            self.config.max_iterations,
            self.node_list.len()
        );
        Err(SandboxError::PlanningFailed(format!(
            "RRT: goal not reached within {} iterations",
            self.config.max_iterations
        )))
    }
}
