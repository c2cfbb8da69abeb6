//! Sandbox configuration
//!
//! All sections are optional in the TOML file; missing keys take their
//! defaults.
//!
//! ```toml
//! [grid]
//! width = 30
//! height = 20
//!
//! [execution]
//! step_delay_ms = 50
//!
//! [planners.a_star]
//! allow_diagonal = false
//! heuristic = "manhattan"
//!
//! [planners.rrt]
//! seed = 7
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::common::SandboxResult;
use crate::local_planning::{BugConfig, DWAConfig, VFHConfig, WallFollowingConfig};
use crate::mapping::{Costmap, Viewport, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH};
use crate::path_planning::{AStarConfig, DijkstraConfig, GreedyConfig, RRTConfig};
use crate::recovery::{RandomWalkConfig, SpinRecoveryConfig};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub grid: GridSettings,
    pub execution: ExecutionSettings,
    pub planners: PlannerSettings,
}

impl SandboxConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> SandboxResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> SandboxResult<Self> {
        let config: SandboxConfig = toml::from_str(contents)?;
        Ok(config)
    }
}

/// Grid dimensions and the pixel rectangle it is drawn into
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub width: usize,
    pub height: usize,
    pub viewport: Viewport,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
            viewport: Viewport::default(),
        }
    }
}

impl GridSettings {
    /// Empty costmap with these dimensions
    pub fn build(&self) -> Costmap {
        Costmap::with_viewport(self.width, self.height, self.viewport)
    }
}

/// Playback settings for the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSettings {
    /// Minimum time between two robot steps, in milliseconds
    pub step_delay_ms: u64,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self { step_delay_ms: 200 }
    }
}

impl ExecutionSettings {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}

/// Per-planner parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    pub a_star: AStarConfig,
    pub dijkstra: DijkstraConfig,
    pub greedy: GreedyConfig,
    pub rrt: RRTConfig,
    pub bug: BugConfig,
    pub vfh: VFHConfig,
    pub dwa: DWAConfig,
    pub wall_following: WallFollowingConfig,
    pub random_walk: RandomWalkConfig,
    pub spin_recovery: SpinRecoveryConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Cell, Heuristic, PathPlanner, SandboxError};

    #[test]
    fn test_defaults() {
        let config = SandboxConfig::default();
        assert_eq!(config.grid.width, 45);
        assert_eq!(config.grid.height, 23);
        assert_eq!(config.grid.viewport, Viewport { width: 900.0, height: 460.0 });
        assert_eq!(config.execution.step_delay(), Duration::from_millis(200));
        assert_eq!(config.planners.rrt.max_iterations, 1000);
        assert_eq!(config.planners.vfh.sector_size, 20.0);
    }

    #[test]
    fn test_partial_toml() {
        let config = SandboxConfig::from_toml_str(
            r#"
            [grid]
            width = 30

            [execution]
            step_delay_ms = 0

            [planners.a_star]
            heuristic = "manhattan"
            allow_diagonal = false

            [planners.rrt]
            seed = 7
            step_size = 2.5
            "#,
        )
        .unwrap();
        assert_eq!(config.grid.width, 30);
        assert_eq!(config.grid.height, 23);
        assert_eq!(config.execution.step_delay(), Duration::from_millis(0));
        assert_eq!(config.planners.a_star.heuristic, Heuristic::Manhattan);
        assert!(!config.planners.a_star.allow_diagonal);
        assert_eq!(config.planners.rrt.seed, Some(7));
        assert_eq!(config.planners.rrt.step_size, 2.5);
        assert_eq!(config.planners.rrt.goal_threshold, 5.0);
        assert_eq!(config.planners.dwa, DWAConfig::default());

        let mut planner = crate::path_planning::AStarPlanner::new(config.planners.a_star);
        let path = planner
            .plan(&config.grid.build(), Cell::new(0, 0), Cell::new(3, 3))
            .unwrap();
        assert_eq!(path.len(), 6);
    }

    #[test]
    fn test_empty_and_invalid_toml() {
        assert_eq!(SandboxConfig::from_toml_str("").unwrap(), SandboxConfig::default());
        assert!(matches!(
            SandboxConfig::from_toml_str("[grid]\nwidth = \"wide\""),
            Err(SandboxError::Config(_))
        ));
        assert!(matches!(
            SandboxConfig::from_file("/nonexistent/sandbox.toml"),
            Err(SandboxError::Io(_))
        ));
    }

    #[test]
    fn test_grid_settings_build() {
        let settings = GridSettings {
            width: 12,
            height: 8,
            ..Default::default()
        };
        let grid = settings.build();
        assert_eq!((grid.width(), grid.height()), (12, 8));
    }
}
