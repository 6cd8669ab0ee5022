mod solver;

pub use solver::{ClearingError, Solver};
