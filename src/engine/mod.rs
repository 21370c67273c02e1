//! The propagation engine: live parameter state plus bounded iterative
//! relaxation over the graph model.
pub mod params;
pub mod propagate;

pub use params::EdgeParamState;
pub use propagate::{compute_all, Settlement, DISPLAY_RANGE, GUARD_LIMIT};
