/// A handle to a decision variable of a [`LinearProgram`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColumnId(usize);

impl ColumnId {
    /// The position of the column in the program
    pub fn index(self) -> usize {
        self.0
    }
}

/// A handle to an equality constraint of a [`LinearProgram`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RowId(usize);

impl RowId {
    /// The position of the row in the program
    pub fn index(self) -> usize {
        self.0
    }
}

/// A bounded, continuous decision variable
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    /// A stable name, used when exporting the program
    pub name: String,
    /// The objective coefficient
    pub cost: f64,
    /// The lower bound
    pub lower: f64,
    /// The upper bound
    pub upper: f64,
}

/// A named linear equality, Σ coefficient · column = rhs
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    /// A stable name, used to identify the constraint and its dual
    pub name: String,
    /// The nonzero coefficients, by column
    pub coefficients: Vec<(ColumnId, f64)>,
    /// The right-hand side
    pub rhs: f64,
}

/// A linear program in the form
///
/// ```text
/// minimize    Σ cost_j · x_j
/// subject to  Σ a_ij · x_j = rhs_i    for every row i
///             lower_j ≤ x_j ≤ upper_j for every column j
/// ```
///
/// This is the contract handed to a numerical [`Backend`](crate::Backend).
/// Columns and rows are addressed by the typed handles returned when they are
/// added, never by re-deriving their positions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinearProgram {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl LinearProgram {
    /// Add a decision variable
    pub fn add_column(&mut self, name: String, cost: f64, lower: f64, upper: f64) -> ColumnId {
        self.columns.push(Column {
            name,
            cost,
            lower,
            upper,
        });
        ColumnId(self.columns.len() - 1)
    }

    /// Add an equality constraint
    pub fn add_row(&mut self, name: String, coefficients: Vec<(ColumnId, f64)>, rhs: f64) -> RowId {
        self.rows.push(Row {
            name,
            coefficients,
            rhs,
        });
        RowId(self.rows.len() - 1)
    }

    /// The decision variables, in the order they were added
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// The equality constraints, in the order they were added
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Look up a column by handle
    pub fn column(&self, id: ColumnId) -> &Column {
        &self.columns[id.0]
    }

    /// Look up a row by handle
    pub fn row(&self, id: RowId) -> &Row {
        &self.rows[id.0]
    }

    /// Look up a row handle by name
    pub fn find_row(&self, name: &str) -> Option<RowId> {
        self.rows.iter().position(|row| row.name == name).map(RowId)
    }

    /// Does the program have no variables at all?
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Evaluate the objective at the given column values
    pub fn objective(&self, values: &[f64]) -> f64 {
        self.columns
            .iter()
            .zip(values)
            .map(|(column, value)| column.cost * value)
            .sum()
    }
}
