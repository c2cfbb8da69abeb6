//! Best-first search skeleton shared by A*, Dijkstra and Greedy Best-First
//!
//! The three planners differ only in the key used to order the frontier and
//! in whether a discovered cell may later be relaxed. Ties on the key are
//! broken by discovery order, so the first cell pushed with a given key is
//! expanded first.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use log::{debug, trace, warn};
use ordered_float::OrderedFloat;

use crate::common::{step_cost, Cell, Heuristic, SandboxError, SandboxResult};
use crate::mapping::Costmap;
use crate::utils::motion;

/// How the frontier is ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOrder {
    /// g(n)
    Dijkstra,
    /// g(n) + h(n)
    AStar(Heuristic),
    /// h(n) only; each cell is discovered at most once and never relaxed
    Greedy(Heuristic),
}

impl SearchOrder {
    fn label(&self) -> &'static str {
        match self {
            SearchOrder::Dijkstra => "Dijkstra",
            SearchOrder::AStar(_) => "AStar",
            SearchOrder::Greedy(_) => "GreedySearch",
        }
    }
}

/// Frontier entry (min-heap on priority, then on discovery sequence)
#[derive(Debug)]
struct PriorityNode {
    cell: Cell,
    priority: OrderedFloat<f64>,
    seq: u64,
}

impl Eq for PriorityNode {}

impl PartialEq for PriorityNode {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Ord for PriorityNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for PriorityNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Free neighbours of `cell` with their move costs.
///
/// A diagonal move is only allowed when both orthogonal corner cells are
/// free, so a path never squeezes between two diagonally adjacent obstacles.
pub fn neighbors(grid: &Costmap, cell: Cell, allow_diagonal: bool) -> Vec<(Cell, f64)> {
    motion::moves(allow_diagonal)
        .iter()
        .filter_map(|&(dr, dc)| {
            let next = cell.offset(dr, dc);
            if !grid.is_free(next) {
                return None;
            }
            if dr != 0 && dc != 0
                && (!grid.is_free(cell.offset(0, dc)) || !grid.is_free(cell.offset(dr, 0)))
            {
                return None;
            }
            Some((next, step_cost(&cell, &next)))
        })
        .collect()
}

/// Walk `came_from` back from `goal`; the start cell is not included
fn reconstruct_path(came_from: &HashMap<Cell, Cell>, start: Cell, goal: Cell) -> Vec<Cell> {
    let mut path = Vec::new();
    let mut current = goal;
    while current != start {
        path.push(current);
        match came_from.get(&current) {
            Some(&prev) => current = prev,
            None => break,
        }
    }
    path.reverse();
    path
}

/// Run a best-first search from `start` to `goal`.
///
/// Returns the path excluding `start`; an empty path when `start == goal`.
pub fn best_first_search(
    grid: &Costmap,
    start: Cell,
    goal: Cell,
    allow_diagonal: bool,
    order: SearchOrder,
) -> SandboxResult<Vec<Cell>> {
    let label = order.label();
    if !grid.is_free(goal) {
        warn!("{}: goal {} is an obstacle or outside the grid", label, goal);
        return Err(SandboxError::PlanningFailed(format!(
            "goal {} is not a free cell",
            goal
        )));
    }
    if !grid.contains(start) {
        warn!("{}: start {} is outside the grid", label, start);
        return Err(SandboxError::PlanningFailed(format!(
            "start {} is outside the grid",
            start
        )));
    }
    if start == goal {
        debug!("{}: already at goal {}", label, goal);
        return Ok(Vec::new());
    }

    let (priority_of, relaxes): (Box<dyn Fn(&Cell, f64) -> f64>, bool) = match order {
        SearchOrder::Dijkstra => (Box::new(|_: &Cell, g: f64| g), true),
        SearchOrder::AStar(h) => (Box::new(move |c: &Cell, g: f64| g + h.estimate(c, &goal)), true),
        SearchOrder::Greedy(h) => (Box::new(move |c: &Cell, _: f64| h.estimate(c, &goal)), false),
    };

    let mut open_set = BinaryHeap::new();
    let mut closed_set: HashSet<Cell> = HashSet::new();
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();
    let mut g_score: HashMap<Cell, f64> = HashMap::new();
    let mut seq = 0u64;

    g_score.insert(start, 0.0);
    open_set.push(PriorityNode {
        cell: start,
        priority: OrderedFloat(priority_of(&start, 0.0)),
        seq,
    });

    while let Some(current) = open_set.pop() {
        let cell = current.cell;
        if closed_set.contains(&cell) {
            continue;
        }
        if cell == goal {
            let path = reconstruct_path(&came_from, start, goal);
            debug!(
                "{}: path planned with {} steps after {} expansions",
                label,
                path.len(),
                closed_set.len()
            );
            return Ok(path);
        }
        closed_set.insert(cell);
        trace!("{}: expanding {} (priority {})", label, cell, current.priority);

        let g_current = g_score.get(&cell).copied().unwrap_or(f64::INFINITY);
        for (next, cost) in neighbors(grid, cell, allow_diagonal) {
            if closed_set.contains(&next) {
                continue;
            }
            let tentative = g_current + cost;
            let discovered = next == start || came_from.contains_key(&next);
            let improves = tentative < g_score.get(&next).copied().unwrap_or(f64::INFINITY);
            let accept = if relaxes { improves } else { !discovered };
            if !accept {
                continue;
            }
            came_from.insert(next, cell);
            g_score.insert(next, tentative);
            seq += 1;
            open_set.push(PriorityNode {
                cell: next,
                priority: OrderedFloat(priority_of(&next, tentative)),
                seq,
            });
        }
    }

    warn!("{}: no path found from {} to {}", label, start, goal);
    Err(SandboxError::PlanningFailed(format!(
        "{}: frontier exhausted before reaching {}",
        label, goal
    )))
}
