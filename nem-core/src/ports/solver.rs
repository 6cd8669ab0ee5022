use crate::models::{MarketOutcome, RegionId, Registry};

/// Interface for engines that clear a market snapshot.
///
/// A solver takes a validated registry and produces the least-cost dispatch
/// together with the regional clearing prices. Each call is independent: no
/// state is carried between solves, so solving the same registry twice must
/// give the same outcome.
pub trait Solver {
    /// Clear the market described by the registry.
    ///
    /// # Returns
    ///
    /// The dispatch, prices, flows and total cost on success, or the reason no
    /// dispatch schedule could be produced.
    fn solve(&self, registry: &Registry) -> Result<MarketOutcome, ClearingError>;
}

/// The ways a clearing run can fail. None of these are recovered from inside
/// a solver; a failed solve yields no dispatch at all.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClearingError {
    /// No dispatch satisfies every balance and bound constraint
    #[error("market is infeasible (regions short of supply: {regions:?})")]
    Infeasible {
        /// The regions identified as short of supply, if determinable
        regions: Vec<RegionId>,
    },
    /// The solver reported an unbounded objective, which finite bounds on every
    /// variable should make impossible
    #[error("model reported unbounded; this indicates an internal inconsistency")]
    Unbounded,
    /// The solver failed numerically, ran out of iterations or time, or could
    /// not be set up
    #[error("solver failure: {0}")]
    SolverFailure(String),
}
