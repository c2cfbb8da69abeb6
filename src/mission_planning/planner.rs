//! Planner selection by symbolic name
//!
//! `PlannerKind` is the name a host uses to pick a strategy; `Planner` holds
//! one configured planner of that kind.

use std::fmt;
use std::str::FromStr;

use crate::common::{Cell, PathPlanner, SandboxError, SandboxResult};
use crate::config::PlannerSettings;
use crate::local_planning::{BugPlanner, DWAPlanner, VFHPlanner, WallFollowingPlanner};
use crate::mapping::Costmap;
use crate::path_planning::{
    AStarPlanner, DijkstraPlanner, GreedyPlanner, RRTPlanner, Traversal, UninformedPlanner,
};
use crate::recovery::{RandomWalkPlanner, SpinRecoveryPlanner};

/// Every selectable strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlannerKind {
    AStar,
    Dijkstra,
    GreedySearch,
    Bfs,
    Dfs,
    Rrt,
    Bug,
    Vfh,
    Dwa,
    WallFollowing,
    RandomWalk,
    SpinRecovery,
}

impl PlannerKind {
    pub const ALL: [PlannerKind; 12] = [
        PlannerKind::AStar,
        PlannerKind::Dijkstra,
        PlannerKind::GreedySearch,
        PlannerKind::Bfs,
        PlannerKind::Dfs,
        PlannerKind::Rrt,
        PlannerKind::Bug,
        PlannerKind::Vfh,
        PlannerKind::Dwa,
        PlannerKind::WallFollowing,
        PlannerKind::RandomWalk,
        PlannerKind::SpinRecovery,
    ];

    /// Symbolic name
    pub fn name(self) -> &'static str {
        match self {
            PlannerKind::AStar => "AStar",
            PlannerKind::Dijkstra => "Dijkstra",
            PlannerKind::GreedySearch => "GreedySearch",
            PlannerKind::Bfs => "BFS",
            PlannerKind::Dfs => "DFS",
            PlannerKind::Rrt => "RRT",
            PlannerKind::Bug => "Bug",
            PlannerKind::Vfh => "VFH",
            PlannerKind::Dwa => "DWA",
            PlannerKind::WallFollowing => "WallFollowing",
            PlannerKind::RandomWalk => "RandomWalk",
            PlannerKind::SpinRecovery => "SpinRecovery",
        }
    }
}

impl fmt::Display for PlannerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for PlannerKind {
    type Err = SandboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "BUG" {
            return Ok(PlannerKind::Bug);
        }
        PlannerKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| SandboxError::UnknownPlanner(s.to_string()))
    }
}

/// One configured planner
#[derive(Debug, Clone)]
pub enum Planner {
    AStar(AStarPlanner),
    Dijkstra(DijkstraPlanner),
    GreedySearch(GreedyPlanner),
    Uninformed(UninformedPlanner),
    Rrt(RRTPlanner),
    Bug(BugPlanner),
    Vfh(VFHPlanner),
    Dwa(DWAPlanner),
    WallFollowing(WallFollowingPlanner),
    RandomWalk(RandomWalkPlanner),
    SpinRecovery(SpinRecoveryPlanner),
}

impl Planner {
    /// Planner of `kind` with default parameters
    pub fn new(kind: PlannerKind) -> Self {
        Self::from_kind(kind, &PlannerSettings::default())
    }

    /// Planner of `kind` configured from `settings`
    pub fn from_kind(kind: PlannerKind, settings: &PlannerSettings) -> Self {
        match kind {
            PlannerKind::AStar => Planner::AStar(AStarPlanner::new(settings.a_star)),
            PlannerKind::Dijkstra => Planner::Dijkstra(DijkstraPlanner::new(settings.dijkstra)),
            PlannerKind::GreedySearch => Planner::GreedySearch(GreedyPlanner::new(settings.greedy)),
            PlannerKind::Bfs => Planner::Uninformed(UninformedPlanner::bfs()),
            PlannerKind::Dfs => Planner::Uninformed(UninformedPlanner::dfs()),
            PlannerKind::Rrt => Planner::Rrt(RRTPlanner::new(settings.rrt.clone())),
            PlannerKind::Bug => Planner::Bug(BugPlanner::new(settings.bug)),
            PlannerKind::Vfh => Planner::Vfh(VFHPlanner::new(settings.vfh)),
            PlannerKind::Dwa => Planner::Dwa(DWAPlanner::new(settings.dwa.clone())),
            PlannerKind::WallFollowing => {
                Planner::WallFollowing(WallFollowingPlanner::new(settings.wall_following))
            }
            PlannerKind::RandomWalk => {
                Planner::RandomWalk(RandomWalkPlanner::new(settings.random_walk.clone()))
            }
            PlannerKind::SpinRecovery => {
                Planner::SpinRecovery(SpinRecoveryPlanner::new(settings.spin_recovery))
            }
        }
    }

    /// Look a planner up by symbolic name
    pub fn from_name(name: &str, settings: &PlannerSettings) -> SandboxResult<Self> {
        let kind: PlannerKind = name.parse()?;
        Ok(Self::from_kind(kind, settings))
    }

    pub fn kind(&self) -> PlannerKind {
        match self {
            Planner::AStar(_) => PlannerKind::AStar,
            Planner::Dijkstra(_) => PlannerKind::Dijkstra,
            Planner::GreedySearch(_) => PlannerKind::GreedySearch,
            Planner::Uninformed(p) => match p.traversal() {
                Traversal::BreadthFirst => PlannerKind::Bfs,
                Traversal::DepthFirst => PlannerKind::Dfs,
            },
            Planner::Rrt(_) => PlannerKind::Rrt,
            Planner::Bug(_) => PlannerKind::Bug,
            Planner::Vfh(_) => PlannerKind::Vfh,
            Planner::Dwa(_) => PlannerKind::Dwa,
            Planner::WallFollowing(_) => PlannerKind::WallFollowing,
            Planner::RandomWalk(_) => PlannerKind::RandomWalk,
            Planner::SpinRecovery(_) => PlannerKind::SpinRecovery,
        }
    }

    fn as_path_planner(&mut self) -> &mut dyn PathPlanner {
        match self {
            Planner::AStar(p) => p,
            Planner::Dijkstra(p) => p,
            Planner::GreedySearch(p) => p,
            Planner::Uninformed(p) => p,
            Planner::Rrt(p) => p,
            Planner::Bug(p) => p,
            Planner::Vfh(p) => p,
            Planner::Dwa(p) => p,
            Planner::WallFollowing(p) => p,
            Planner::RandomWalk(p) => p,
            Planner::SpinRecovery(p) => p,
        }
    }
}

impl PathPlanner for Planner {
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    fn plan(&mut self, grid: &Costmap, start: Cell, goal: Cell) -> SandboxResult<Vec<Cell>> {
        self.as_path_planner().plan(grid, start, goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("AStar".parse::<PlannerKind>().unwrap(), PlannerKind::AStar);
        assert_eq!("BUG".parse::<PlannerKind>().unwrap(), PlannerKind::Bug);
        assert_eq!("Bug".parse::<PlannerKind>().unwrap(), PlannerKind::Bug);
        assert_eq!("GreedySearch".parse::<PlannerKind>().unwrap(), PlannerKind::GreedySearch);
        assert!(matches!(
            "Teleport".parse::<PlannerKind>(),
            Err(SandboxError::UnknownPlanner(_))
        ));
    }

    #[test]
    fn test_names_round_trip() {
        for kind in PlannerKind::ALL.iter() {
            let planner = Planner::new(*kind);
            assert_eq!(planner.kind(), *kind);
            assert_eq!(planner.name(), kind.name());
            assert_eq!(kind.to_string().parse::<PlannerKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn test_settings_reach_planner() {
        let mut settings = PlannerSettings::default();
        settings.rrt.max_iterations = 5;
        match Planner::from_kind(PlannerKind::Rrt, &settings) {
            Planner::Rrt(p) => assert_eq!(p.config().max_iterations, 5),
            other => panic!("unexpected planner {:?}", other.kind()),
        }
    }

    #[test]
    fn test_every_planner_runs_on_open_grid() {
        let grid = Costmap::new(12, 12);
        let mut settings = PlannerSettings::default();
        settings.rrt.seed = Some(11);
        settings.random_walk.seed = Some(11);
        for kind in PlannerKind::ALL.iter() {
            let mut planner = Planner::from_kind(*kind, &settings);
            let path = planner.plan(&grid, Cell::new(1, 1), Cell::new(10, 10)).unwrap();
            assert!(path.iter().all(|c| grid.is_free(*c)), "{} left the free space", kind);
        }
    }
}
