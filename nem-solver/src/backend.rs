use crate::{ColumnId, LinearProgram, RowId};
use nem_core::ports::ClearingError;

/// The termination status reported by a numerical backend
#[derive(Clone, Debug, PartialEq)]
pub enum LpStatus {
    /// An optimal solution was found
    Optimal,
    /// No point satisfies every constraint
    Infeasible,
    /// The objective can be decreased without limit
    Unbounded,
    /// The backend stopped without a usable answer (numerical trouble, limits reached)
    Failed(String),
}

/// The raw answer of a numerical backend.
///
/// The dual of a row is reported as the rate of change of the optimal objective
/// with respect to the row's right-hand side. For a cost-minimizing program this
/// is the marginal cost of the constraint, whatever sign convention the
/// underlying solver uses internally.
#[derive(Clone, Debug, PartialEq)]
pub struct LpSolution {
    /// How the solve terminated
    pub status: LpStatus,
    /// The value of every column, by position
    pub primal: Vec<f64>,
    /// The dual of every row, by position
    pub duals: Vec<f64>,
    /// The objective value reported by the backend
    pub objective: f64,
    /// The number of iterations the backend used
    pub iterations: u32,
}

impl LpSolution {
    /// The solution of a program with no columns and no rows
    pub fn empty() -> Self {
        Self {
            status: LpStatus::Optimal,
            primal: Vec::new(),
            duals: Vec::new(),
            objective: 0.0,
            iterations: 0,
        }
    }

    /// The value of a column
    pub fn value(&self, column: ColumnId) -> f64 {
        self.primal[column.index()]
    }

    /// The dual of a row
    pub fn dual(&self, row: RowId) -> f64 {
        self.duals[row.index()]
    }
}

/// The contract with an external numerical solver.
///
/// A backend accepts a [`LinearProgram`] and solves it once, reporting the
/// termination status along with primal and dual values. Interpreting the
/// status is left to the caller; an `Err` is reserved for a program the
/// backend could not even be set up with.
pub trait Backend {
    /// Solve the program
    fn solve(&self, program: &LinearProgram) -> Result<LpSolution, ClearingError>;
}
