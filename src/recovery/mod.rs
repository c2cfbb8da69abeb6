// Recovery behaviours for a stuck robot

pub mod random_walk;
pub mod spin_recovery;

pub use random_walk::*;
pub use spin_recovery::*;
