//! Common types, traits, and error definitions for grid_planning_sandbox
//!
//! This module provides the foundational building blocks used across
//! all planners in this crate.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
