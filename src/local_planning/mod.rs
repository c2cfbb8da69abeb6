// Reactive local planners
//
// Each one simulates its decision loop for a bounded number of steps inside
// `plan` and hands back the visited cells for playback.

pub mod bug;
pub mod dwa;
pub mod vfh;
pub mod wall_following;

pub use bug::*;
pub use dwa::*;
pub use vfh::*;
pub use wall_following::*;

use crate::common::Cell;
use crate::mapping::Costmap;

/// Turn a simulated walk (starting with the start cell) into a playback
/// path: the start cell is dropped and the goal is appended when the walk
/// stopped short of it, within `append_radius` and with a free straight
/// segment to it.
pub(crate) fn finish_walk(
    grid: &Costmap,
    mut walk: Vec<Cell>,
    goal: Cell,
    append_radius: f64,
) -> Vec<Cell> {
    if let Some(&last) = walk.last() {
        if last != goal && last.euclidean(&goal) < append_radius && grid.segment_is_free(last, goal) {
            walk.push(goal);
        }
    }
    if !walk.is_empty() {
        walk.remove(0);
    }
    walk
}
