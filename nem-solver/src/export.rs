use crate::LinearProgram;
use nem_core::models::Map;
use std::borrow::Cow;
use std::io::{Error, ErrorKind, Write};

/// Export the program to `.mps` (fixed-free) format.
///
/// Fails with [`ErrorKind::InvalidInput`] if two columns or two rows would be
/// written under the same sanitized name.
pub fn export_mps(program: &LinearProgram, buffer: &mut impl Write) -> Result<(), Error> {
    check_names(program)?;

    // MPS is a somewhat archaic format, but is easy enough to generate.
    // https://www.ibm.com/docs/en/icos/22.1.2?topic=standard-records-in-mps-format
    // is a good reference.

    writeln!(buffer, "NAME dispatch_lp")?;
    writeln!(buffer, "ROWS")?;

    // Our objective is the total cost of the dispatch
    writeln!(buffer, " N    cost")?;

    // One equality per balance row
    for row in program.rows() {
        writeln!(buffer, " E    {}", sanitize(&row.name))?;
    }

    // MPS lists the matrix column by column, so we transpose the rows first
    let mut entries = vec![Vec::new(); program.columns().len()];
    for row in program.rows() {
        for &(column, coefficient) in row.coefficients.iter() {
            entries[column.index()].push((sanitize(&row.name), coefficient));
        }
    }

    writeln!(buffer, "COLUMNS")?;
    for (column, entries) in program.columns().iter().zip(entries) {
        let name = sanitize(&column.name);
        if column.cost != 0.0 {
            writeln!(buffer, "    {name}    cost    {}", column.cost)?;
        }
        for (row, coefficient) in entries {
            writeln!(buffer, "    {name}    {row}    {coefficient}")?;
        }
    }

    writeln!(buffer, "RHS")?;
    for row in program.rows() {
        if row.rhs != 0.0 {
            writeln!(buffer, "    RHS    {}    {}", sanitize(&row.name), row.rhs)?;
        }
    }

    // Now we specify the domains for each variable. MPS defaults to [0, ∞).
    writeln!(buffer, "BOUNDS")?;
    for column in program.columns() {
        let name = sanitize(&column.name);
        match (column.lower.is_finite(), column.upper.is_finite()) {
            (false, false) => writeln!(buffer, " FR BND    {name}")?,
            (lower, upper) => {
                if !lower {
                    writeln!(buffer, " MI BND    {name}")?;
                } else if column.lower != 0.0 {
                    writeln!(buffer, " LO BND    {name}    {}", column.lower)?;
                }
                if upper {
                    writeln!(buffer, " UP BND    {name}    {}", column.upper)?;
                }
            }
        }
    }

    writeln!(buffer, "ENDATA")?;
    Ok(())
}

/// Export the program to CPLEX `.lp` format.
///
/// Fails under the same conditions as [`export_mps`].
pub fn export_lp(program: &LinearProgram, buffer: &mut impl Write) -> Result<(), Error> {
    check_names(program)?;

    writeln!(buffer, "\\ least-cost dispatch")?;
    writeln!(buffer, "Minimize")?;
    write!(buffer, " cost:")?;
    let mut empty = true;
    for column in program.columns() {
        if column.cost != 0.0 {
            write!(buffer, " {}", term(column.cost, &column.name, empty))?;
            empty = false;
        }
    }
    if empty {
        write!(buffer, " 0")?;
    }
    writeln!(buffer)?;

    writeln!(buffer, "Subject To")?;
    for row in program.rows() {
        write!(buffer, " {}:", sanitize(&row.name))?;
        for (offset, &(column, coefficient)) in row.coefficients.iter().enumerate() {
            let name = &program.column(column).name;
            write!(buffer, " {}", term(coefficient, name, offset == 0))?;
        }
        writeln!(buffer, " = {}", row.rhs)?;
    }

    writeln!(buffer, "Bounds")?;
    for column in program.columns() {
        let name = sanitize(&column.name);
        match (column.lower.is_finite(), column.upper.is_finite()) {
            (true, true) => writeln!(buffer, " {} <= {name} <= {}", column.lower, column.upper)?,
            (true, false) => writeln!(buffer, " {name} >= {}", column.lower)?,
            (false, true) => writeln!(buffer, " -inf <= {name} <= {}", column.upper)?,
            (false, false) => writeln!(buffer, " {name} free")?,
        }
    }

    writeln!(buffer, "End")?;
    Ok(())
}

// Render `coefficient name` with an explicit sign, except on the leading term
fn term(coefficient: f64, name: &str, leading: bool) -> String {
    let name = sanitize(name);
    match (leading, coefficient < 0.0) {
        (true, false) => format!("{coefficient} {name}"),
        (true, true) => format!("- {} {name}", -coefficient),
        (false, false) => format!("+ {coefficient} {name}"),
        (false, true) => format!("- {} {name}", -coefficient),
    }
}

// Distinct identifiers may sanitize to the same name, e.g. `G 2` and `G_2`
fn check_names(program: &LinearProgram) -> Result<(), Error> {
    let columns = program.columns().iter().map(|column| column.name.as_str());
    let rows = program.rows().iter().map(|row| row.name.as_str());
    for (kind, names) in [
        ("column", columns.collect::<Vec<_>>()),
        ("row", rows.collect::<Vec<_>>()),
    ] {
        let mut seen: Map<Cow<'_, str>, &str> = Map::default();
        for name in names {
            if let Some(other) = seen.insert(sanitize(name), name) {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!("{kind}s {other:?} and {name:?} export under the same name"),
                ));
            }
        }
    }
    Ok(())
}

// Identifiers come from user input; both formats choke on whitespace and on
// operator characters, so anything outside a conservative set becomes `_`.
fn sanitize(name: &str) -> Cow<'_, str> {
    let ok = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '.');
    if name.chars().all(ok) {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(name.chars().map(|c| if ok(c) { c } else { '_' }).collect())
    }
}
