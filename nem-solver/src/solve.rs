use crate::{DispatchModel, LpSolution, LpStatus};
use nem_core::ports::ClearingError;
use tracing::{Level, event};

/// Accept a backend solution, or translate its status into a [`ClearingError`].
///
/// The pre-checks in [`DispatchModel::build`] name the regions that are short
/// whenever the shortage is local or confined to a connected group. A program
/// the backend nonetheless proves infeasible is short across some transmission
/// cut, which has no single region to blame, so the list is left empty.
pub fn check_status(model: &DispatchModel, solution: &LpSolution) -> Result<(), ClearingError> {
    match &solution.status {
        LpStatus::Optimal => {
            let expected = model.program().columns().len();
            if solution.primal.len() != expected
                || solution.duals.len() != model.program().rows().len()
            {
                return Err(ClearingError::SolverFailure(format!(
                    "backend returned {} values for {} columns",
                    solution.primal.len(),
                    expected
                )));
            }
            Ok(())
        }
        LpStatus::Infeasible => {
            event!(Level::WARN, "backend proved the dispatch infeasible");
            Err(ClearingError::Infeasible {
                regions: Vec::new(),
            })
        }
        LpStatus::Unbounded => Err(ClearingError::Unbounded),
        LpStatus::Failed(reason) => Err(ClearingError::SolverFailure(reason.clone())),
    }
}
