#![warn(missing_docs)]
//! Least-cost dispatch of a multi-region electricity market.
//!
//! A [`Registry`](nem_core::models::Registry) is translated into a
//! [`LinearProgram`] by [`DispatchModel`], solved by a numerical [`Backend`],
//! and read back into a [`MarketOutcome`](nem_core::models::MarketOutcome) with
//! a clearing price per region. [`DispatchSolver`] ties these steps together
//! behind the [`Solver`](nem_core::ports::Solver) port.

/**
 * These are implementations of the numerical backend.
 */
mod impls;
pub use impls::*;

mod backend;
pub use backend::{Backend, LpSolution, LpStatus};

mod program;
pub use program::{Column, ColumnId, LinearProgram, Row, RowId};

mod builder;
pub use builder::{DispatchModel, shortfalls};

mod settings;
pub use settings::{BackendSettings, DispatchSettings, PricingRule};

mod dispatch;
pub use dispatch::DispatchSolver;

/// Deriving regional prices from a solved program
pub mod pricing;

mod assemble;
mod solve;

/// Utilities for exporting the dispatch program to standard formats
pub mod export;
