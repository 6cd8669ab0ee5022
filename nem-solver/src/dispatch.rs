use crate::{Backend, DispatchModel, DispatchSettings, assemble::assemble, solve::check_status};
use nem_core::{
    models::{MarketOutcome, Registry},
    ports::{ClearingError, Solver},
};
use tracing::{Level, event, span};

/// Clears a market snapshot by least-cost dispatch.
///
/// The solver builds the dispatch program for the registry, hands it to the
/// numerical backend, checks the termination status and assembles the outcome,
/// pricing each region as configured. It holds no state between calls.
pub struct DispatchSolver<B> {
    backend: B,
    settings: DispatchSettings,
}

impl<B: Backend> DispatchSolver<B> {
    /// Create a solver around the given backend
    pub fn new(backend: B, settings: DispatchSettings) -> Self {
        Self { backend, settings }
    }

    /// The settings used to interpret solutions
    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }
}

#[cfg(feature = "clarabel")]
impl Default for DispatchSolver<crate::clarabel::ClarabelBackend> {
    fn default() -> Self {
        Self::new(Default::default(), Default::default())
    }
}

impl<B: Backend> Solver for DispatchSolver<B> {
    fn solve(&self, registry: &Registry) -> Result<MarketOutcome, ClearingError> {
        let span = span!(
            Level::INFO,
            "dispatch",
            regions = registry.regions().len(),
            generators = registry.generators().len(),
            links = registry.links().len(),
        );
        let _guard = span.enter();

        let model = DispatchModel::build(registry)?;
        let solution = self.backend.solve(model.program())?;
        event!(
            Level::DEBUG,
            status = ?solution.status,
            iterations = solution.iterations,
            objective = solution.objective,
            "backend finished"
        );
        check_status(&model, &solution)?;

        let outcome = assemble(&model, &solution, &self.settings);
        event!(
            Level::INFO,
            total_cost = outcome.total_cost,
            "market cleared"
        );
        Ok(outcome)
    }
}
