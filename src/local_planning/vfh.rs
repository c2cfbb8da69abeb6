//! Vector Field Histogram (VFH) local planner
//!
//! At every simulated step a polar histogram of obstacle density is built
//! around the robot, smoothed, and thresholded into candidate "valleys".
//! The robot moves one cell along the valley sector closest to the goal
//! bearing.

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::common::{Cell, PathPlanner, SandboxError, SandboxResult};
use crate::local_planning::finish_walk;
use crate::mapping::Costmap;
use crate::utils::motion;

/// Narrowest accepted sector, in degrees
const MIN_SECTOR_DEG: f64 = 1.0;
const MAX_SECTORS: usize = 360;

/// Configuration for the VFH planner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VFHConfig {
    /// Angular width of one histogram sector in degrees
    pub sector_size: f64,
    /// Obstacles at or inside this distance block their sector completely
    pub safety_distance: f64,
    /// Width of the circular smoothing window, in sectors
    pub window_size: usize,
    /// Half-size of the square scanned for obstacles
    pub scan_radius: i32,
    /// Simulation stops once the robot is closer than this to the goal
    pub goal_tolerance: f64,
    pub goal_append_radius: f64,
}

impl Default for VFHConfig {
    fn default() -> Self {
        Self {
            sector_size: 20.0,
            safety_distance: 3.0,
            window_size: 5,
            scan_radius: 5,
            goal_tolerance: 2.0,
            goal_append_radius: 10.0,
        }
    }
}

/// VFH planner
#[derive(Debug, Clone, Default)]
pub struct VFHPlanner {
    config: VFHConfig,
}

impl VFHPlanner {
    pub fn new(config: VFHConfig) -> Self {
        Self { config }
    }

    pub fn num_sectors(&self) -> usize {
        ((360.0 / self.config.sector_size).floor() as usize).clamp(1, MAX_SECTORS)
    }

    /// Sector index of a bearing, clamped to `[0, num_sectors)`
    pub fn sector_of(&self, angle_deg: f64) -> usize {
        let sector = (angle_deg.rem_euclid(360.0) / self.config.sector_size).floor() as usize;
        sector.min(self.num_sectors() - 1)
    }

    fn sector_heading(&self, sector: usize) -> f64 {
        (sector as f64 + 0.5) * self.config.sector_size
    }

    /// Obstacle density per sector around `center`; blocked sectors are infinite
    pub fn histogram(&self, grid: &Costmap, center: Cell) -> Vec<f64> {
        let mut histogram = vec![0.0; self.num_sectors()];
        let r = self.config.scan_radius;
        for row in (center.row - r)..=(center.row + r) {
            for col in (center.col - r)..=(center.col + r) {
                let cell = Cell::new(row, col);
                if !grid.contains(cell) || grid.is_free(cell) {
                    continue;
                }
                let sector = self.sector_of(center.bearing_deg(&cell));
                let distance = center.euclidean(&cell);
                if distance <= self.config.safety_distance {
                    histogram[sector] = f64::INFINITY;
                } else {
                    histogram[sector] += 1.0 / (distance - self.config.safety_distance);
                }
            }
        }
        histogram
    }

    /// Circular moving average weighted `window - |offset|`
    pub fn smooth(&self, histogram: &[f64]) -> Vec<f64> {
        let n = histogram.len() as i64;
        let window = self.config.window_size as i64;
        let half = window / 2;
        (0..n)
            .map(|i| {
                let mut total = 0.0;
                let mut weight_sum = 0.0;
                for j in -half..=half {
                    let weight = (window - j.abs()) as f64;
                    total += histogram[(i + j).rem_euclid(n) as usize] * weight;
                    weight_sum += weight;
                }
                if weight_sum > 0.0 {
                    total / weight_sum
                } else {
                    0.0
                }
            })
            .collect()
    }

    /// Sectors below half the mean density that are not blocked.
    ///
    /// When none qualify (a uniform histogram, e.g. open space) every
    /// unblocked sector at the minimum density is a valley.
    pub fn valleys(&self, smoothed: &[f64]) -> Vec<usize> {
        if smoothed.is_empty() {
            return Vec::new();
        }
        let threshold = smoothed.iter().sum::<f64>() / smoothed.len() as f64 * 0.5;
        let valleys: Vec<usize> = (0..smoothed.len())
            .filter(|&i| smoothed[i].is_finite() && smoothed[i] < threshold)
            .collect();
        if !valleys.is_empty() {
            return valleys;
        }
        let min = smoothed
            .iter()
            .cloned()
            .filter(|v| v.is_finite())
            .fold(f64::INFINITY, f64::min);
        if !min.is_finite() {
            return Vec::new();
        }
        (0..smoothed.len()).filter(|&i| smoothed[i] == min).collect()
    }

    fn circular_distance(&self, a: usize, b: usize) -> usize {
        let n = self.num_sectors();
        let d = if a > b { a - b } else { b - a };
        d.min(n - d)
    }

    /// Simulate the walk; the returned cells start with `start`
    fn simulate(&self, grid: &Costmap, start: Cell, goal: Cell) -> Vec<Cell> {
        let by_distance = (start.euclidean(&goal) * 3.0) as usize;
        let max_steps = by_distance.min(grid.width() * grid.height() / 4);

        let mut current = start;
        let mut walk = vec![start];
        for _ in 0..max_steps {
            if current == goal || current.euclidean(&goal) < self.config.goal_tolerance {
                break;
            }
            let smoothed = self.smooth(&self.histogram(grid, current));
            let mut valleys = self.valleys(&smoothed);
            if valleys.is_empty() {
                warn!("VFH: every sector is blocked at {}", current);
                break;
            }
            let desired = self.sector_of(current.bearing_deg(&goal));
            valleys.sort_by_key(|&v| self.circular_distance(v, desired));
            trace!("VFH: at {} desired sector {} valleys {:?}", current, desired, valleys);

            let next = valleys.iter().find_map(|&sector| {
                let (dr, dc) = motion::heading_step(self.sector_heading(sector));
                let candidate = current.offset(dr, dc);
                if (dr, dc) != (0, 0) && grid.step_is_free(current, candidate) {
                    Some(candidate)
                } else {
                    None
                }
            });
            match next {
                Some(cell) => {
                    current = cell;
                    walk.push(cell);
                }
                None => {
                    warn!("VFH: stuck at {}, no valley leads to a free cell", current);
                    break;
                }
            }
        }
        walk
    }
}

impl PathPlanner for VFHPlanner {
    fn name(&self) -> &'static str {
        "VFH"
    }

    fn plan(&mut self, grid: &Costmap, start: Cell, goal: Cell) -> SandboxResult<Vec<Cell>> {
        let size = self.config.sector_size;
        if !(MIN_SECTOR_DEG..=360.0).contains(&size) {
            return Err(SandboxError::InvalidParameter(format!(
                "VFH sector size {} must be in [1, 360] degrees",
                self.config.sector_size
            )));
        }
        let walk = self.simulate(grid, start, goal);
        let path = finish_walk(grid, walk, goal, self.config.goal_append_radius);
        debug!("VFH: path planned with {} steps", path.len());
        Ok(path)
    }
}
