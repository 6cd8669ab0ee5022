use crate::{Backend, BackendSettings, LinearProgram, LpSolution, LpStatus};
use clarabel::{algebra::*, solver::*};
use nem_core::ports::ClearingError;
use tracing::{Level, event};

/// A backend using the Clarabel interior point solver
pub struct ClarabelBackend(DefaultSettings<f64>);

impl Default for ClarabelBackend {
    fn default() -> Self {
        let mut settings = DefaultSettings::default();
        settings.verbose = false;
        Self(settings)
    }
}

impl ClarabelBackend {
    /// Create a new instance with the provided settings
    pub fn new(settings: DefaultSettings<f64>) -> Self {
        Self(settings)
    }
}

impl From<&BackendSettings> for ClarabelBackend {
    fn from(value: &BackendSettings) -> Self {
        let mut settings = DefaultSettings::default();
        settings.max_iter = value.max_iter;
        settings.time_limit = value.time_limit.unwrap_or(f64::INFINITY);
        settings.verbose = value.verbose;
        Self(settings)
    }
}

impl Backend for ClarabelBackend {
    fn solve(&self, program: &LinearProgram) -> Result<LpSolution, ClearingError> {
        if program.is_empty() {
            return Ok(LpSolution::empty());
        }

        let n = program.columns().len();
        let nzero = program.rows().len();

        // Clarabel handles constraints via a cone specification, e.g. Ax + s = b, where s is a cone.
        // The first `nzero` rows of b and s are the equalities, so we do that work upfront.
        let mut b = program.rows().iter().map(|row| row.rhs).collect::<Vec<_>>();

        // The rows are stored by row, but Clarabel's matrix input is CSC, so we
        // transpose the coefficients into per-column lists. Iterating the rows in
        // order keeps each column's row indices sorted.
        let mut entries = vec![Vec::new(); n];
        for (i, row) in program.rows().iter().enumerate() {
            for &(column, coefficient) in row.coefficients.iter() {
                entries[column.index()].push((i, coefficient));
            }
        }

        let mut a_nzval = Vec::new();
        let mut a_rowval = Vec::new();
        let mut a_colptr = Vec::with_capacity(n + 1);

        for (column, entries) in program.columns().iter().zip(entries) {
            // start a new column in the constraint matrix
            a_colptr.push(a_nzval.len());

            for (i, coefficient) in entries {
                a_nzval.push(coefficient);
                a_rowval.push(i);
            }

            // Now we add the box constraints. Note that here, we are dynamically
            // growing the constraint vector b and using that to track our row indices.
            // The signs on the lower bound are wonky because we have to use s>=0 as
            // the cone specification.
            if column.lower.is_finite() {
                a_nzval.push(-1.0);
                a_rowval.push(b.len());
                b.push(-column.lower);
            }
            if column.upper.is_finite() {
                a_nzval.push(1.0);
                a_rowval.push(b.len());
                b.push(column.upper);
            }
        }

        // We need to polish off the CSC matrix
        a_colptr.push(a_nzval.len());

        let a_matrix = CscMatrix::new(b.len(), n, a_colptr, a_rowval, a_nzval);

        let mut cones = Vec::with_capacity(2);
        if nzero > 0 {
            cones.push(ZeroConeT(nzero));
        }
        if b.len() > nzero {
            cones.push(NonnegativeConeT(b.len() - nzero));
        }

        // The objective is purely linear
        let p_matrix = CscMatrix::new(n, n, vec![0; n + 1], Vec::new(), Vec::new());
        let q = program
            .columns()
            .iter()
            .map(|column| column.cost)
            .collect::<Vec<_>>();

        event!(
            Level::DEBUG,
            columns = n,
            equalities = nzero,
            bounds = b.len() - nzero,
            "invoking clarabel"
        );

        // Now we can solve!
        let mut solver =
            DefaultSolver::new(&p_matrix, &q, &a_matrix, &b, &cones, self.0.clone())
                .map_err(|e| ClearingError::SolverFailure(format!("clarabel setup: {e:?}")))?;
        solver.solve();

        let solution = &solver.solution;
        let status = match solution.status {
            SolverStatus::Solved => LpStatus::Optimal,
            SolverStatus::AlmostSolved => {
                event!(
                    Level::WARN,
                    "clarabel reached reduced accuracy; accepting the solution"
                );
                LpStatus::Optimal
            }
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                LpStatus::Infeasible
            }
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                LpStatus::Unbounded
            }
            status => LpStatus::Failed(format!("{status:?}")),
        };

        event!(
            Level::DEBUG,
            status = ?solution.status,
            iterations = solution.iterations,
            solve_time = solution.solve_time,
        );

        // Clarabel reports the multiplier z of Ax + s = b, which is the negative of
        // the objective's sensitivity to b.
        Ok(LpSolution {
            status,
            primal: solution.x.clone(),
            duals: solution.z[..nzero].iter().map(|z| -z).collect(),
            objective: solution.obj_val,
            iterations: solution.iterations,
        })
    }
}
