#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The common interface of the search strategies.
//!
//! Every solver borrows a [`Formula`] for its lifetime and never mutates it.
//! [`Solver::solve`] resets the solver's [`ExecutionStats`], runs the search, and
//! returns a tagged [`Solution`]: either a complete [`Model`] or
//! [`Solution::Unsat`]. Unsatisfiability is an ordinary outcome, not an error.
//!
//! [`solve`] is the one-call entry point used by the command line and the batch
//! runner: it picks a solver by [`SolverType`], times it, logs the verdict, and
//! optionally writes a Markdown report.

use crate::sat::assignment::{Assignment, Model};
use crate::sat::backward::Backward;
use crate::sat::dpll::Dpll;
use crate::sat::formula::Formula;
use crate::sat::goal_oriented::{DEFAULT_MARGIN, GoalOriented};
use crate::sat::literal::Variable;
use crate::sat::report::{self, ReportInput};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt::{self, Display};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// Counters accumulated over one top-level solve.
///
/// Pure bookkeeping: no solver reads these to make a decision. Counters that a
/// strategy has no use for stay at zero.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionStats {
    pub recursive_calls: usize,
    pub backtracks: usize,
    pub conflicts: usize,
    pub unit_propagations: usize,
    pub pure_literal_assignments: usize,
    pub heuristic_choices: usize,
    pub branch_choices: usize,
    /// Variables filled with the default `false` when completing the model.
    pub defaulted_variables: Vec<Variable>,
}

impl ExecutionStats {
    /// Named counters, in a fixed order, for reports and the stats table.
    #[must_use]
    pub const fn counters(&self) -> [(&'static str, usize); 7] {
        [
            ("Recursive calls", self.recursive_calls),
            ("Backtracks", self.backtracks),
            ("Conflicts", self.conflicts),
            ("Unit propagations", self.unit_propagations),
            ("Pure literal assignments", self.pure_literal_assignments),
            ("Heuristic choices", self.heuristic_choices),
            ("Branch choices", self.branch_choices),
        ]
    }
}

/// Outcome of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Solution {
    /// A total assignment over `1..=num_vars` satisfying every clause.
    Sat(Model),
    /// No satisfying assignment exists.
    Unsat,
}

impl Solution {
    #[must_use]
    pub const fn is_sat(&self) -> bool {
        matches!(self, Self::Sat(_))
    }

    #[must_use]
    pub const fn model(&self) -> Option<&Model> {
        match self {
            Self::Sat(m) => Some(m),
            Self::Unsat => None,
        }
    }

    #[must_use]
    pub const fn status(&self) -> &'static str {
        match self {
            Self::Sat(_) => "SATISFIABLE",
            Self::Unsat => "UNSATISFIABLE",
        }
    }
}

impl Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status())
    }
}

pub trait Solver<'a> {
    fn new(formula: &'a Formula) -> Self;

    /// Runs a fresh search. Statistics from any previous call are discarded.
    fn solve(&mut self) -> Solution;

    fn stats(&self) -> &ExecutionStats;

    /// Human readable name, used as the report title.
    fn name(&self) -> &'static str;

    /// Markdown paragraph describing the strategy, used in reports.
    fn description(&self) -> &'static str;
}

/// Turns the raw search result into a [`Solution`], recording defaulted variables.
pub(crate) fn finish(
    formula: &Formula,
    result: Option<Assignment>,
    stats: &mut ExecutionStats,
) -> Solution {
    match result {
        Some(assignment) => {
            let (model, defaulted) = assignment.complete(formula.num_vars);
            stats.defaulted_variables = defaulted;
            Solution::Sat(model)
        }
        None => Solution::Unsat,
    }
}

/// The available search strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolverType {
    /// Unit propagation, pure literal elimination, most-frequent-variable branching.
    #[default]
    Dpll,
    /// Forced-choice heuristic sweep with clause-targeted fallback branching.
    GoalOriented,
    /// Clause-targeted branching only.
    Backward,
}

impl SolverType {
    pub const ALL: [Self; 3] = [Self::Dpll, Self::GoalOriented, Self::Backward];
}

impl FromStr for SolverType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}

impl Display for SolverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dpll => write!(f, "dpll"),
            Self::GoalOriented => write!(f, "goal-oriented"),
            Self::Backward => write!(f, "backward"),
        }
    }
}

/// Per-call settings for [`solve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveOptions {
    /// Label used in reports and logs.
    pub case_name: Option<String>,
    /// Where to write a Markdown report, if anywhere.
    pub report_path: Option<PathBuf>,
    /// Margin for the goal-oriented heuristic. Ignored by the other solvers.
    pub margin: usize,
    /// Render formulas in reports with `∧ ∨ ¬` rather than `AND OR NOT`.
    pub unicode: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            case_name: None,
            report_path: None,
            margin: DEFAULT_MARGIN,
            unicode: true,
        }
    }
}

/// Everything one call to [`solve`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveOutcome {
    pub solution: Solution,
    pub stats: ExecutionStats,
    pub elapsed: Duration,
}

/// Solves `formula` with the chosen strategy.
///
/// A failure to write the report is logged and otherwise ignored; it never
/// affects the returned outcome.
#[must_use]
pub fn solve(kind: SolverType, formula: &Formula, options: &SolveOptions) -> SolveOutcome {
    match kind {
        SolverType::Dpll => run(Dpll::new(formula), formula, options),
        SolverType::GoalOriented => run(
            GoalOriented::new(formula).with_margin(options.margin),
            formula,
            options,
        ),
        SolverType::Backward => run(Backward::new(formula), formula, options),
    }
}

fn run<'a, S: Solver<'a>>(mut solver: S, formula: &Formula, options: &SolveOptions) -> SolveOutcome {
    let case = options
        .case_name
        .as_deref()
        .or(formula.name.as_deref())
        .unwrap_or("formula");

    let time = Instant::now();
    let solution = solver.solve();
    let elapsed = time.elapsed();
    let stats = solver.stats().clone();

    log::info!(
        "{}: {case} is {} ({} recursive calls, {} backtracks) in {elapsed:?}",
        solver.name(),
        solution.status(),
        stats.recursive_calls,
        stats.backtracks,
    );

    if let Some(path) = &options.report_path {
        let input = ReportInput {
            solver_name: solver.name(),
            description: solver.description(),
            case_name: case,
            formula,
            solution: &solution,
            stats: &stats,
            elapsed,
            unicode: options.unicode,
        };
        if let Err(e) = report::write_markdown(&input, path) {
            log::warn!("failed to write report to {}: {e}", path.display());
        }
    }

    SolveOutcome {
        solution,
        stats,
        elapsed,
    }
}
