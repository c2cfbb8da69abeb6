// Global path planning algorithms module

pub mod grid_search;
pub mod a_star;
pub mod dijkstra;
pub mod greedy;
pub mod uninformed;
pub mod rrt;

pub use a_star::*;
pub use dijkstra::*;
pub use greedy::*;
pub use uninformed::*;
pub use rrt::*;
