//! Common traits defining interfaces for planning algorithms

use crate::common::error::SandboxResult;
use crate::common::types::Cell;
use crate::mapping::Costmap;

/// Trait for grid path planning algorithms.
///
/// `plan` computes the whole route in one synchronous call. The returned
/// sequence excludes `start` and is played back one cell per tick by
/// [`crate::mission_planning::Algorithm`]. An empty path means "nothing to
/// execute" (already at the goal); `Err(PlanningFailed)` means no route was
/// found.
pub trait PathPlanner {
    /// Symbolic name used to select this planner
    fn name(&self) -> &'static str;

    /// Plan a path on `grid` from `start` to `goal`
    fn plan(&mut self, grid: &Costmap, start: Cell, goal: Cell) -> SandboxResult<Vec<Cell>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test that traits compile correctly
    struct DummyPlanner;

    impl PathPlanner for DummyPlanner {
        fn name(&self) -> &'static str {
            "Dummy"
        }

        fn plan(&mut self, _grid: &Costmap, _start: Cell, goal: Cell) -> SandboxResult<Vec<Cell>> {
            Ok(vec![goal])
        }
    }

    #[test]
    fn test_path_planner_trait() {
        let grid = Costmap::new(3, 3);
        let mut planner = DummyPlanner;
        let result = planner.plan(&grid, Cell::new(0, 0), Cell::new(2, 2));
        assert_eq!(result.unwrap(), vec![Cell::new(2, 2)]);
        assert_eq!(planner.name(), "Dummy");
    }
}
