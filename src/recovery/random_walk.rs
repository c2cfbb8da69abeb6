//! Random walk recovery
//!
//! Takes up to `max_steps` strides of `step_length` cells. Each stride
//! either heads toward the goal (probability `goal_bias`) or along one of
//! the eight compass directions picked uniformly. Every intermediate cell is
//! checked; the walk ends at the first blocked cell or when the goal is
//! reached.

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Bernoulli, Distribution, Uniform};
use serde::{Deserialize, Serialize};

use crate::common::{Cell, PathPlanner, SandboxError, SandboxResult};
use crate::mapping::Costmap;
use crate::utils::motion::{self, KING_MOVES};

/// Configuration for the random walk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomWalkConfig {
    pub max_steps: usize,
    /// Cells per stride
    pub step_length: i32,
    /// Probability that a stride heads toward the goal
    pub goal_bias: f64,
    /// Fixed RNG seed; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for RandomWalkConfig {
    fn default() -> Self {
        Self {
            max_steps: 20,
            step_length: 2,
            goal_bias: 0.2,
            seed: None,
        }
    }
}

/// Random walk planner
#[derive(Debug, Clone, Default)]
pub struct RandomWalkPlanner {
    config: RandomWalkConfig,
}

impl RandomWalkPlanner {
    pub fn new(config: RandomWalkConfig) -> Self {
        Self { config }
    }

    /// Generate a walk from `start`; without a goal every stride is random.
    /// The returned cells exclude `start`.
    pub fn walk(&self, grid: &Costmap, start: Cell, goal: Option<Cell>) -> SandboxResult<Vec<Cell>> {
        if self.config.step_length < 1 {
            return Err(SandboxError::InvalidParameter(format!(
                "random walk step length {} must be at least 1",
                self.config.step_length
            )));
        }
        let bias = Bernoulli::new(self.config.goal_bias).map_err(|_| {
            SandboxError::InvalidParameter(format!(
                "goal bias {} is not a probability",
                self.config.goal_bias
            ))
        })?;
        let direction = Uniform::new(0, KING_MOVES.len());
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut path = vec![start];
        let mut current = start;
        'strides: for stride in 0..self.config.max_steps {
            let toward_goal = bias.sample(&mut rng);
            let (dr, dc) = match goal {
                Some(goal) if toward_goal => motion::sign_step(current, goal),
                _ => KING_MOVES[direction.sample(&mut rng)],
            };
            trace!("RandomWalk: stride {} direction ({}, {})", stride, dr, dc);

            let origin = current;
            for i in 1..=self.config.step_length {
                let next = grid.clamp(origin.offset(dr * i, dc * i));
                if !grid.step_is_free(current, next) {
                    debug!("RandomWalk: blocked at {}", next);
                    break 'strides;
                }
                motion::push_distinct(&mut path, next);
                current = next;
                if Some(next) == goal {
                    break 'strides;
                }
            }
        }
        path.remove(0);

        debug!("RandomWalk: path planned with {} steps", path.len());
        Ok(path)
    }
}

impl PathPlanner for RandomWalkPlanner {
    fn name(&self) -> &'static str {
        "RandomWalk"
    }

    fn plan(&mut self, grid: &Costmap, start: Cell, goal: Cell) -> SandboxResult<Vec<Cell>> {
        self.walk(grid, start, Some(goal))
    }
}
