//! Error types for grid_planning_sandbox

/// Main error type for the sandbox
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// `start()` was called before a robot cell was known
    #[error("Robot position not set")]
    MissingRobot,

    /// `start()` was called before a goal cell was known
    #[error("Goal position not set")]
    MissingGoal,

    /// `start()` was called on an episode that is not idle
    #[error("Episode not idle: {0}")]
    NotIdle(String),

    /// Path planning produced no path
    #[error("Planning error: {0}")]
    PlanningFailed(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Symbolic planner name not recognised
    #[error("Unknown planner: {0}")]
    UnknownPlanner(String),

    /// Raster map could not be decoded
    #[error("Map format error: {0}")]
    MapFormat(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

impl SandboxError {
    /// True for outcomes the executor treats as an empty path rather than an error
    pub fn is_planning_failure(&self) -> bool {
        matches!(self, SandboxError::PlanningFailed(_))
    }
}

/// Result type alias for sandbox operations
pub type SandboxResult<T> = Result<T, SandboxError>;
