//! Spin recovery
//!
//! Scans rays around the robot for the nearest obstacle, shrinks the spin
//! radius to fit inside that clearance and spirals outward starting on the
//! side facing away from the obstacle. The rotation sense is whichever side
//! of the obstacle bearing shows more free probe cells. With a goal, a short
//! straight approach toward it follows the spiral. A spiral point is kept
//! only if the straight segment from the previous kept point is free.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::common::{Cell, PathPlanner, SandboxError, SandboxResult};
use crate::mapping::Costmap;
use crate::utils::motion;

/// Configuration for spin recovery
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinRecoveryConfig {
    /// Base spiral radius in cells
    pub radius: f64,
    /// Number of spiral points over one revolution
    pub num_points: usize,
    /// Ray length used for the obstacle scan and the free-space probes
    pub scan_distance: i32,
    /// Angle between scan rays, in degrees
    pub scan_increment: f64,
    /// Maximum number of cells in the approach toward the goal
    pub approach_steps: usize,
}

impl Default for SpinRecoveryConfig {
    fn default() -> Self {
        Self {
            radius: 3.0,
            num_points: 16,
            scan_distance: 5,
            scan_increment: 10.0,
            approach_steps: 10,
        }
    }
}

/// Nearest obstacle found by the ray scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleBearing {
    pub distance: i32,
    pub angle_deg: f64,
}

/// Rotation sense of the spiral: +1 clockwise on screen, -1 counter-clockwise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinDirection {
    Clockwise,
    CounterClockwise,
}

impl SpinDirection {
    fn sign(self) -> f64 {
        match self {
            SpinDirection::Clockwise => 1.0,
            SpinDirection::CounterClockwise => -1.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpinRecoveryPlanner {
    config: SpinRecoveryConfig,
}

impl SpinRecoveryPlanner {
    pub fn new(config: SpinRecoveryConfig) -> Self {
        Self { config }
    }

    /// Cast rays every `scan_increment` degrees; cells outside the grid are
    /// skipped, the first obstacle ends a ray.
    pub fn scan(&self, grid: &Costmap, center: Cell) -> Option<ObstacleBearing> {
        let mut nearest: Option<ObstacleBearing> = None;
        let mut angle = 0.0;
        while angle < 360.0 {
            for distance in 1..=self.config.scan_distance {
                let probe = motion::project(center, distance as f64, angle);
                if !grid.contains(probe) {
                    continue;
                }
                if !grid.is_free(probe) {
                    if nearest.map_or(true, |n| distance < n.distance) {
                        nearest = Some(ObstacleBearing {
                            distance,
                            angle_deg: angle,
                        });
                    }
                    break;
                }
            }
            angle += self.config.scan_increment;
        }
        nearest
    }

    /// Count free probe cells at 30 degree steps on each side of the obstacle
    /// bearing (30 to 150 degrees); the freer side wins, ties spin clockwise.
    pub fn spin_direction(&self, grid: &Costmap, center: Cell, obstacle_deg: f64) -> SpinDirection {
        let reach = self.config.scan_distance as f64;
        let free_at = |angle: f64| grid.is_free(motion::project(center, reach, angle.rem_euclid(360.0)));
        let (mut clockwise, mut counter) = (0, 0);
        for i in 1..=5 {
            let turn = 30.0 * i as f64;
            if free_at(obstacle_deg + turn) {
                clockwise += 1;
            }
            if free_at(obstacle_deg - turn) {
                counter += 1;
            }
        }
        if clockwise >= counter {
            SpinDirection::Clockwise
        } else {
            SpinDirection::CounterClockwise
        }
    }

    /// Spiral from `start`, followed by an approach toward `goal` when one is
    /// given. The returned cells exclude `start`.
    pub fn spin(&self, grid: &Costmap, start: Cell, goal: Option<Cell>) -> SandboxResult<Vec<Cell>> {
        if self.config.num_points == 0 || self.config.scan_increment <= 0.0 {
            return Err(SandboxError::InvalidParameter(
                "spin recovery needs at least one spiral point and a positive scan increment"
                    .to_string(),
            ));
        }

        let nearest = self.scan(grid, start);
        let (radius, obstacle_deg) = match nearest {
            Some(obstacle) => (
                self.config.radius.min(((obstacle.distance - 1).max(1)) as f64),
                obstacle.angle_deg,
            ),
            None => (self.config.radius, 0.0),
        };
        let away_deg = (obstacle_deg + 180.0).rem_euclid(360.0);
        let direction = self.spin_direction(grid, start, obstacle_deg);
        trace!(
            "SpinRecovery: nearest obstacle {:?}, radius {}, spinning {:?}",
            nearest,
            radius,
            direction
        );

        let mut path = vec![start];
        let n = self.config.num_points as f64;
        for i in 0..self.config.num_points {
            let i = i as f64;
            let angle = (away_deg + direction.sign() * i * 360.0 / n).rem_euclid(360.0);
            let r = radius * (1.0 + i / (n * 2.0));
            let cell = grid.clamp(motion::project(start, r, angle));
            let last = path[path.len() - 1];
            if grid.segment_is_free(last, cell) {
                motion::push_distinct(&mut path, cell);
            }
        }

        if let Some(goal) = goal {
            if path.len() > 1 {
                let last = path[path.len() - 1];
                let num_steps = self.config.approach_steps.min(last.euclidean(&goal) as usize);
                for i in 1..=num_steps {
                    let cell = grid.clamp(motion::lerp(last, goal, i as f64 / num_steps as f64));
                    if !grid.segment_is_free(path[path.len() - 1], cell) {
                        break;
                    }
                    motion::push_distinct(&mut path, cell);
                }
            }
        }

        path.remove(0);
        debug!("SpinRecovery: path planned with {} steps", path.len());
        Ok(path)
    }
}

impl PathPlanner for SpinRecoveryPlanner {
    fn name(&self) -> &'static str {
        "SpinRecovery"
    }

    fn plan(&mut self, grid: &Costmap, start: Cell, goal: Cell) -> SandboxResult<Vec<Cell>> {
        self.spin(grid, start, Some(goal))
    }
}
