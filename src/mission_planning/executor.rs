//! Planning episode lifecycle
//!
//! An [`Algorithm`] plans the whole route once in [`Algorithm::start`] and
//! then plays it back one cell per accepted [`Algorithm::update`], writing
//! the robot position into the host's [`Costmap`].
//!
//! States: `Idle -> Running -> Completed` or `Idle -> Running -> Stopped`.
//! Only [`Algorithm::reset`] leads back to `Idle`.
//! Throttling is a timestamp comparison; callers keep calling `update` every
//! tick.

use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::common::{Cell, PathPlanner, SandboxError, SandboxResult};
use crate::mapping::Costmap;
use crate::mission_planning::planner::Planner;

/// Default minimum time between two robot steps
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(200);

/// Lifecycle state of an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Stopped,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Completed => "completed",
            RunState::Stopped => "stopped",
        };
        write!(f, "{}", name)
    }
}

/// One planner bound to one (robot, goal) pair
#[derive(Debug, Clone)]
pub struct Algorithm {
    planner: Planner,
    robot_pos: Option<Cell>,
    goal_pos: Option<Cell>,
    path: Vec<Cell>,
    current_index: usize,
    state: RunState,
    goal_reached: bool,
    step_delay: Duration,
    last_step_time: Option<Instant>,
    transition_history: Vec<(RunState, RunState)>,
}

impl Algorithm {
    /// Bind `planner` to an episode. Robot and goal default to the grid's
    /// current placements.
    pub fn new(planner: Planner, grid: &Costmap, robot: Option<Cell>, goal: Option<Cell>) -> Self {
        Algorithm {
            planner,
            robot_pos: robot.or_else(|| grid.robot_cell()),
            goal_pos: goal.or_else(|| grid.goal_cell()),
            path: Vec::new(),
            current_index: 0,
            state: RunState::Idle,
            goal_reached: false,
            step_delay: DEFAULT_STEP_DELAY,
            last_step_time: None,
            transition_history: Vec::new(),
        }
    }

    pub fn with_step_delay(mut self, step_delay: Duration) -> Self {
        self.step_delay = step_delay;
        self
    }

    pub fn set_step_delay(&mut self, step_delay: Duration) {
        self.step_delay = step_delay;
    }

    pub fn step_delay(&self) -> Duration {
        self.step_delay
    }

    /// Symbolic name of the planner
    pub fn name(&self) -> &'static str {
        self.planner.name()
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn is_completed(&self) -> bool {
        self.state == RunState::Completed
    }

    /// True when the episode completed with the robot on the goal cell
    pub fn goal_reached(&self) -> bool {
        self.goal_reached
    }

    pub fn robot_pos(&self) -> Option<Cell> {
        self.robot_pos
    }

    pub fn goal_pos(&self) -> Option<Cell> {
        self.goal_pos
    }

    /// Planned route, excluding the start cell
    pub fn path(&self) -> &[Cell] {
        &self.path
    }

    /// Index of the next path cell to visit
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Every state change so far as (from, to)
    pub fn transition_history(&self) -> &[(RunState, RunState)] {
        &self.transition_history
    }

    fn transition(&mut self, to: RunState) {
        if self.state != to {
            debug!("{}: {} -> {}", self.name(), self.state, to);
            self.transition_history.push((self.state, to));
            self.state = to;
        }
    }

    /// Plan the route and begin playback.
    ///
    /// Fails without touching any state if the episode is not idle or the
    /// robot or goal is unknown. A finished or stopped episode must be
    /// [`reset`](Algorithm::reset) before it can start again. A planner that
    /// finds no route yields an empty path, which completes on the next update.
    pub fn start(&mut self, grid: &mut Costmap) -> SandboxResult<()> {
        self.start_at(grid, Instant::now())
    }

    /// [`Algorithm::start`] with an explicit clock reading
    pub fn start_at(&mut self, grid: &mut Costmap, now: Instant) -> SandboxResult<()> {
        if self.state != RunState::Idle {
            warn!("{}: cannot start while {}, reset first", self.name(), self.state);
            return Err(SandboxError::NotIdle(self.state.to_string()));
        }
        let robot = match self.robot_pos {
            Some(robot) => robot,
            None => {
                warn!("{}: cannot start, robot position not set", self.name());
                return Err(SandboxError::MissingRobot);
            }
        };
        let goal = match self.goal_pos {
            Some(goal) => goal,
            None => {
                warn!("{}: cannot start, goal position not set", self.name());
                return Err(SandboxError::MissingGoal);
            }
        };

        self.path = match self.planner.plan(grid, robot, goal) {
            Ok(path) => path,
            Err(e) if e.is_planning_failure() => {
                warn!("{}: {}", self.name(), e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        grid.set_path(self.path.iter().copied());
        info!("{}: planned {} steps from {} to {}", self.name(), self.path.len(), robot, goal);

        self.current_index = 0;
        self.goal_reached = false;
        self.last_step_time = Some(now);
        self.transition(RunState::Running);
        Ok(())
    }

    /// Halt playback; the robot stays where it is
    pub fn stop(&mut self) {
        if self.state == RunState::Running {
            self.transition(RunState::Stopped);
        }
    }

    /// Back to idle with no path
    pub fn reset(&mut self) {
        self.path.clear();
        self.current_index = 0;
        self.goal_reached = false;
        self.last_step_time = None;
        self.transition(RunState::Idle);
    }

    /// Advance at most one cell. Returns whether the episode is still running.
    pub fn update(&mut self, grid: &mut Costmap) -> bool {
        self.update_at(grid, Instant::now())
    }

    /// [`Algorithm::update`] with an explicit clock reading
    pub fn update_at(&mut self, grid: &mut Costmap, now: Instant) -> bool {
        if self.state != RunState::Running {
            return false;
        }
        if self.path.is_empty() {
            self.goal_reached = self.robot_pos.is_some() && self.robot_pos == self.goal_pos;
            info!("{}: nothing to execute", self.name());
            self.transition(RunState::Completed);
            return false;
        }
        if let Some(last) = self.last_step_time {
            if now.saturating_duration_since(last) < self.step_delay {
                return true;
            }
        }

        let next = match self.path.get(self.current_index) {
            Some(&cell) => cell,
            None => {
                self.transition(RunState::Completed);
                return false;
            }
        };
        grid.set_robot_cell(next.row, next.col);
        self.robot_pos = Some(next);
        self.current_index += 1;
        self.last_step_time = Some(now);

        if let Some(goal) = self.goal_pos {
            if next.manhattan(&goal) <= 1 {
                grid.set_robot_cell(goal.row, goal.col);
                self.robot_pos = Some(goal);
                self.goal_reached = true;
                info!("{}: goal {} reached after {} steps", self.name(), goal, self.current_index);
                self.transition(RunState::Completed);
                return false;
            }
        }
        if self.current_index >= self.path.len() {
            info!(
                "{}: path exhausted at {} without reaching the goal",
                self.name(),
                next
            );
            self.transition(RunState::Completed);
            return false;
        }
        true
    }
}
