#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Markdown reports for a single solver run.
//!
//! A report has five parts: a title naming the solver and the test case, the
//! input formula, the execution statistics, the solution table (satisfiable
//! runs only), and a short description of the algorithm.

use crate::sat::formula::Formula;
use crate::sat::literal::{polarity, var_of_lit};
use crate::sat::solver::{ExecutionStats, Solution};
use itertools::Itertools;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

/// Everything a report renders. Borrowed from the caller for the duration of
/// one write.
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub solver_name: &'static str,
    pub description: &'static str,
    pub case_name: &'a str,
    pub formula: &'a Formula,
    pub solution: &'a Solution,
    pub stats: &'a ExecutionStats,
    pub elapsed: Duration,
    /// `∧ ∨ ¬` when set, `AND OR NOT` otherwise.
    pub unicode: bool,
}

/// Renders the formula as a conjunction of parenthesised disjunctions.
///
/// ```
/// use cnf_solver::sat::formula::Formula;
/// use cnf_solver::sat::report::render_formula;
///
/// let f = Formula::new(2, vec![vec![1, -2], vec![2]]);
/// assert_eq!(render_formula(&f, true), "(x1 ∨ ¬x2) ∧ (x2)");
/// assert_eq!(render_formula(&f, false), "(x1 OR NOT x2) AND (x2)");
/// ```
#[must_use]
pub fn render_formula(formula: &Formula, unicode: bool) -> String {
    let (and, or, not) = if unicode {
        (" ∧ ", " ∨ ", "¬")
    } else {
        (" AND ", " OR ", "NOT ")
    };

    formula
        .iter()
        .map(|clause| {
            let lits = clause
                .iter()
                .map(|&lit| {
                    let var = var_of_lit(lit);
                    if polarity(lit) {
                        format!("x{var}")
                    } else {
                        format!("{not}x{var}")
                    }
                })
                .join(or);
            format!("({lits})")
        })
        .join(and)
}

/// Renders the full report as Markdown text.
#[must_use]
pub fn render(input: &ReportInput<'_>) -> String {
    let mut out = String::new();
    // Writing into a `String` cannot fail.
    let _ = write_report(&mut out, input);
    out
}

fn write_report(out: &mut String, input: &ReportInput<'_>) -> std::fmt::Result {
    writeln!(out, "# {} Results: {}\n", input.solver_name, input.case_name)?;

    writeln!(out, "## Input\n")?;
    writeln!(out, "- **Variables:** {}", input.formula.num_vars)?;
    writeln!(out, "- **Clauses:** {}", input.formula.clauses.len())?;
    writeln!(out, "- **Formula:**")?;
    writeln!(out, "  - {}\n", render_formula(input.formula, input.unicode))?;

    writeln!(out, "## Execution Statistics\n")?;
    writeln!(out, "- **Status:** {}", input.solution.status())?;
    writeln!(
        out,
        "- **Time Taken:** {:.6} seconds",
        input.elapsed.as_secs_f64()
    )?;
    for (label, value) in input.stats.counters() {
        writeln!(out, "- **{label}:** {value}")?;
    }
    if !input.stats.defaulted_variables.is_empty() {
        let vars = input
            .stats
            .defaulted_variables
            .iter()
            .map(|v| format!("x{v}"))
            .join(", ");
        writeln!(out, "- **Defaulted Variables:** {vars}")?;
    }

    if let Solution::Sat(model) = input.solution {
        writeln!(out, "\n## Solution\n")?;
        writeln!(out, "| Variable | Value | Assignment Type |")?;
        writeln!(out, "|----------|-------|----------------|")?;
        for (var, value, reason) in model.iter() {
            let value = if value { "True" } else { "False" };
            writeln!(out, "| x{var} | {value} | {reason} |")?;
        }
    }

    if !input.description.is_empty() {
        writeln!(out, "\n## Algorithm\n\n{}", input.description)?;
    }

    Ok(())
}

/// Writes the report to `path`, creating missing parent directories.
///
/// # Errors
///
/// Any I/O error from creating the directory or writing the file.
pub fn write_markdown(input: &ReportInput<'_>, path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render(input))?;
    log::debug!("wrote report for {} to {}", input.case_name, path.display());
    Ok(())
}
