// Run one planner on a grid and print the result
//
// usage: grid_sandbox [PLANNER] [MAP.pgm] [CONFIG.toml]
//
// Without a map (or when it fails to load) the built-in demo level is used.
// Set RUST_LOG=debug for planner traces.

use std::env;
use std::process;
use std::time::Duration;

use log::{error, info, warn};

use grid_planning_sandbox::{Algorithm, Costmap, Planner, RunState, SandboxConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let planner_name = args.get(0).map(String::as_str).unwrap_or("AStar");

    let config = match args.get(2) {
        Some(path) => match SandboxConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("failed to load config {}: {}", path, e);
                process::exit(1);
            }
        },
        None => SandboxConfig::default(),
    };
    let (width, height) = (config.grid.width, config.grid.height);

    let mut grid = match args.get(1) {
        Some(path) => match Costmap::from_pgm_file(path, width, height) {
            Ok(grid) => grid,
            Err(e) => {
                warn!("could not load {} ({}), using the demo level", path, e);
                Costmap::demo(width, height)
            }
        },
        None => Costmap::demo(width, height),
    };

    let planner = match Planner::from_name(planner_name, &config.planners) {
        Ok(planner) => planner,
        Err(e) => {
            error!("{}", e);
            process::exit(2);
        }
    };

    let mut algorithm = Algorithm::new(planner, &grid, None, None).with_step_delay(Duration::from_millis(0));
    if let Err(e) = algorithm.start(&mut grid) {
        error!("{}", e);
        process::exit(1);
    }
    println!("{}", grid);

    while algorithm.update(&mut grid) {}

    println!("{}", grid);
    info!(
        "{} finished: state {}, {} of {} steps, goal reached: {}",
        algorithm.name(),
        algorithm.state(),
        algorithm.current_index(),
        algorithm.path().len(),
        algorithm.goal_reached()
    );
    if algorithm.state() != RunState::Completed || !algorithm.goal_reached() {
        process::exit(3);
    }
}
