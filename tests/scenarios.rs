//! End-to-end scenarios: costmap, planners and the episode lifecycle together

use std::time::Duration;

use grid_planning_sandbox::common::{path_cost, DIAGONAL_COST};
use grid_planning_sandbox::config::PlannerSettings;
use grid_planning_sandbox::path_planning::{RRTConfig, RRTPlanner};
use grid_planning_sandbox::{
    Algorithm, Cell, CellState, Costmap, PathPlanner, Planner, PlannerKind, RunState, SandboxError,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn pgm(width: usize, height: usize, value: u8) -> Vec<u8> {
    let mut bytes = format!("P5\n{} {}\n255\n", width, height).into_bytes();
    bytes.extend(std::iter::repeat(value).take(width * height));
    bytes
}

fn assert_walkable(grid: &Costmap, start: Cell, path: &[Cell]) {
    let mut prev = start;
    for cell in path {
        assert!(grid.is_free(*cell), "{} is not free", cell);
        assert_eq!(prev.chebyshev(cell), 1, "{} -> {} is not a single step", prev, cell);
        if prev.is_diagonal_to(cell) {
            assert!(grid.is_free(Cell::new(prev.row, cell.col)));
            assert!(grid.is_free(Cell::new(cell.row, prev.col)));
        }
        prev = *cell;
    }
}

/// 10x10 grid with a wall down column 5 and a single gap at (5, 5)
fn wall_with_gap() -> Costmap {
    let mut grid = Costmap::new(10, 10);
    grid.add_rectangle_obstacle(0, 5, 1, 10);
    grid.set_cell(5, 5, CellState::Free);
    grid
}

#[test]
fn bounds_are_respected() {
    let mut grid = Costmap::new(4, 3);
    assert_eq!(grid.get_cell(-1, 0), None);
    assert_eq!(grid.get_cell(3, 0), None);
    assert_eq!(grid.get_cell(0, 4), None);
    assert_eq!(grid.get_cell(2, 3), Some(CellState::Free));
    assert!(!grid.is_free(Cell::new(0, -1)));

    grid.set_cell(5, 5, CellState::Occupied);
    assert_eq!(grid.occupied_count(), 0);

    grid.set_robot_cell(-1, 2);
    assert_eq!(grid.robot_cell(), None);
    grid.set_goal_cell(3, 0);
    assert_eq!(grid.goal_cell(), None);
}

#[test]
fn a_star_and_dijkstra_agree_on_open_grid() {
    init_logger();
    let grid = Costmap::new(15, 10);
    let start = Cell::new(0, 0);
    let goal = Cell::new(9, 14);
    let expected = 9.0 * DIAGONAL_COST + 5.0;

    let a_star = Planner::new(PlannerKind::AStar).plan(&grid, start, goal).unwrap();
    let dijkstra = Planner::new(PlannerKind::Dijkstra).plan(&grid, start, goal).unwrap();
    assert!((path_cost(start, &a_star) - expected).abs() < 1e-9);
    assert!((path_cost(start, &dijkstra) - expected).abs() < 1e-9);
    assert_eq!(a_star.last(), Some(&goal));
    assert_walkable(&grid, start, &a_star);
}

fn seeded_planner(kind: PlannerKind) -> Planner {
    let mut settings = PlannerSettings::default();
    settings.rrt.seed = Some(1);
    settings.random_walk.seed = Some(1);
    Planner::from_kind(kind, &settings)
}

#[test]
fn no_squeezing_through_diagonal_gap() {
    init_logger();
    let mut grid = Costmap::new(6, 6);
    grid.set_cell(0, 1, CellState::Occupied);
    grid.set_cell(1, 0, CellState::Occupied);
    let start = Cell::new(0, 0);
    let goal = Cell::new(5, 5);
    for kind in PlannerKind::ALL.iter() {
        // the only way out of (0, 0) is between the two obstacles
        match seeded_planner(*kind).plan(&grid, start, goal) {
            Ok(path) => assert!(path.is_empty(), "{} escaped through the corner: {:?}", kind, path),
            Err(e) => assert!(e.is_planning_failure(), "{}: {}", kind, e),
        }
    }
}

#[test]
fn diagonal_wall_is_not_crossed() {
    init_logger();
    // cells with row + col == 7 form a wall with only diagonal gaps
    let mut grid = Costmap::new(8, 8);
    for row in 0..8 {
        grid.set_cell(row, 7 - row, CellState::Occupied);
    }
    let start = Cell::new(0, 0);
    let goal = Cell::new(7, 7);
    for kind in PlannerKind::ALL.iter() {
        let path = match seeded_planner(*kind).plan(&grid, start, goal) {
            Ok(path) => path,
            Err(e) => {
                assert!(e.is_planning_failure(), "{}: {}", kind, e);
                continue;
            }
        };
        for cell in &path {
            assert!(cell.row + cell.col < 7, "{} crossed the wall at {}", kind, cell);
        }
        let mut prev = start;
        for cell in &path {
            if prev.chebyshev(cell) == 1 {
                assert!(grid.step_is_free(prev, *cell), "{}: {} -> {}", kind, prev, cell);
            }
            prev = *cell;
        }
    }
}

#[test]
fn search_planners_use_the_gap() {
    init_logger();
    let grid = wall_with_gap();
    let start = Cell::new(0, 0);
    let goal = Cell::new(9, 9);
    for kind in [
        PlannerKind::AStar,
        PlannerKind::Dijkstra,
        PlannerKind::GreedySearch,
        PlannerKind::Bfs,
        PlannerKind::Dfs,
    ]
    .iter()
    {
        let path = Planner::new(*kind).plan(&grid, start, goal).unwrap();
        assert!(path.contains(&Cell::new(5, 5)), "{} missed the gap", kind);
        assert_eq!(path.last(), Some(&goal));
        assert_walkable(&grid, start, &path);
    }
}

#[test]
fn wall_makes_a_star_detour() {
    let start = Cell::new(0, 0);
    let goal = Cell::new(9, 9);
    let open = Planner::new(PlannerKind::AStar)
        .plan(&Costmap::new(10, 10), start, goal)
        .unwrap();
    let walled = Planner::new(PlannerKind::AStar)
        .plan(&wall_with_gap(), start, goal)
        .unwrap();
    assert_eq!(open.len(), 9);
    assert!(walled.len() >= 10);
    assert!(path_cost(start, &walled) > path_cost(start, &open));
}

#[test]
fn bfs_is_no_longer_than_dfs() {
    let grid = wall_with_gap();
    let start = Cell::new(0, 0);
    let goal = Cell::new(9, 9);
    let bfs = Planner::new(PlannerKind::Bfs).plan(&grid, start, goal).unwrap();
    let dfs = Planner::new(PlannerKind::Dfs).plan(&grid, start, goal).unwrap();
    // 4-connected: 9 down + 9 right is the lower bound
    assert_eq!(bfs.len(), 18);
    assert!(dfs.len() >= bfs.len());
}

#[test]
fn start_on_goal_completes_immediately() {
    let mut grid = Costmap::new(5, 5);
    grid.set_robot_cell(0, 0);
    grid.set_goal_cell(0, 0);
    let mut algo = Algorithm::new(Planner::new(PlannerKind::AStar), &grid, None, None);
    algo.start(&mut grid).unwrap();
    assert!(algo.path().is_empty());
    assert!(!algo.update(&mut grid));
    assert!(algo.is_completed());
    assert!(algo.goal_reached());
    assert_eq!(grid.robot_cell(), Some(Cell::new(0, 0)));
}

#[test]
fn update_before_start_is_a_no_op() {
    let mut grid = Costmap::new(5, 5);
    grid.set_robot_cell(0, 0);
    grid.set_goal_cell(4, 4);
    let mut algo = Algorithm::new(Planner::new(PlannerKind::Bfs), &grid, None, None);
    assert!(!algo.update(&mut grid));
    assert_eq!(algo.state(), RunState::Idle);
    assert_eq!(grid.robot_cell(), Some(Cell::new(0, 0)));
}

#[test]
fn unset_goal_rejects_start() {
    let mut grid = Costmap::new(5, 5);
    grid.set_robot_cell(0, 0);
    let mut algo = Algorithm::new(Planner::new(PlannerKind::Dijkstra), &grid, None, None);
    assert!(matches!(algo.start(&mut grid), Err(SandboxError::MissingGoal)));
    assert!(!algo.is_running());
    assert!(grid.path().is_empty());
}

#[test]
fn occupied_goal_gives_empty_episode() {
    init_logger();
    let mut grid = Costmap::new(6, 6);
    grid.set_robot_cell(0, 0);
    grid.set_goal_cell(5, 5);
    grid.set_cell(5, 5, CellState::Occupied);
    for kind in [PlannerKind::AStar, PlannerKind::Bfs, PlannerKind::Rrt].iter() {
        let mut algo = Algorithm::new(Planner::new(*kind), &grid, None, None);
        algo.start(&mut grid).unwrap();
        assert!(algo.path().is_empty());
        assert!(!algo.update(&mut grid));
        assert!(algo.is_completed());
        assert!(!algo.goal_reached());
    }
}

#[test]
fn episode_through_the_gap() {
    init_logger();
    let mut grid = wall_with_gap();
    grid.set_robot_cell(0, 0);
    grid.set_goal_cell(9, 9);
    let mut algo = Algorithm::new(Planner::new(PlannerKind::AStar), &grid, None, None)
        .with_step_delay(Duration::from_millis(0));
    algo.start(&mut grid).unwrap();
    assert_eq!(grid.path(), algo.path());

    let mut visited = Vec::new();
    while algo.update(&mut grid) {
        visited.extend(grid.robot_cell());
    }
    assert!(visited.contains(&Cell::new(5, 5)));
    assert!(algo.goal_reached());
    assert_eq!(grid.robot_cell(), Some(Cell::new(9, 9)));

    grid.reset();
    assert_eq!(grid.robot_cell(), Some(Cell::new(0, 0)));
    assert!(grid.path().is_empty());
}

#[test]
fn rrt_raw_path_is_collision_free() {
    init_logger();
    let mut grid = Costmap::new(20, 20);
    grid.add_rectangle_obstacle(4, 8, 4, 12);
    let start = Cell::new(2, 2);
    let goal = Cell::new(17, 17);
    let mut planner = RRTPlanner::new(RRTConfig {
        seed: Some(7),
        max_iterations: 3000,
        ..Default::default()
    });
    let path = planner.plan(&grid, start, goal).unwrap();
    assert_eq!(path.last(), Some(&goal));

    let raw = planner.raw_path();
    assert_eq!(raw.first(), Some(&start));
    assert_eq!(raw.last(), Some(&goal));
    for pair in raw.windows(2) {
        assert!(grid.segment_is_free(pair[0], pair[1]), "{} -> {}", pair[0], pair[1]);
    }
    assert!(planner.get_tree().iter().all(|node| grid.is_free(node.cell)));
    assert!(path.len() < raw.len());
}

#[test]
fn white_raster_is_all_free() {
    let mut grid = Costmap::new(5, 5);
    grid.load_pgm_bytes(&pgm(5, 5, 255)).unwrap();
    assert_eq!(grid.occupied_count(), 0);
    assert_eq!(grid.robot_cell(), Some(Cell::new(0, 0)));
    assert_eq!(grid.goal_cell(), Some(Cell::new(4, 4)));
}

#[test]
fn black_raster_blocks_everything() {
    let mut grid = Costmap::new(5, 5);
    grid.load_pgm_bytes(&pgm(5, 5, 0)).unwrap();
    assert_eq!(grid.occupied_count(), 25);
    assert_eq!(grid.robot_cell(), None);
    assert_eq!(grid.goal_cell(), None);

    let mut algo = Algorithm::new(Planner::new(PlannerKind::AStar), &grid, None, None);
    assert!(matches!(algo.start(&mut grid), Err(SandboxError::MissingRobot)));
}

#[test]
fn broken_raster_keeps_grid() {
    let mut grid = Costmap::new(5, 5);
    grid.set_cell(1, 1, CellState::Occupied);
    assert!(matches!(
        grid.load_pgm_bytes(b"P2\n5 5\n255\n"),
        Err(SandboxError::MapFormat(_))
    ));
    assert_eq!(grid.get_cell(1, 1), Some(CellState::Occupied));
}

#[test]
fn demo_level_is_solvable() {
    init_logger();
    let mut grid = Costmap::demo(45, 23);
    let mut algo = Algorithm::new(Planner::new(PlannerKind::AStar), &grid, None, None)
        .with_step_delay(Duration::from_millis(0));
    algo.start(&mut grid).unwrap();
    assert!(!algo.path().is_empty());
    while algo.update(&mut grid) {}
    assert!(algo.goal_reached());
}
