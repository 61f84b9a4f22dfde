#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The goal-oriented forced-choice solver.
//!
//! Before branching, every call sweeps the unassigned variables `1..=num_vars`
//! in increasing order and tentatively evaluates both polarities of each one.
//! The first variable with a forced choice is assigned and the search recurses:
//! - a polarity is forced if it is the only one that contradicts no clause;
//! - otherwise, if neither contradicts, a polarity is forced when it satisfies
//!   more than `margin` clauses beyond what the other one satisfies.
//!
//! If a forced subtree fails, the sweep carries on with the next variable. Once
//! the sweep is exhausted the solver falls back to branching on the literals of
//! the first unsatisfied clause.
//!
//! Rule (a) never excludes a model. Rule (b) may, but the clause branching that
//! follows a failed sweep is complete on its own.
//!
//! Resuming the sweep after a failed forced subtree keeps the search complete,
//! but the same partial assignments are reached again through different forcing
//! orders. The number of recursive calls therefore grows far faster than for
//! [`Dpll`](crate::sat::dpll::Dpll): random 3-SAT near the satisfiability
//! threshold already needs tens of millions of calls at around 13 variables,
//! which puts `uf20`-sized instances out of practical reach.

use crate::sat::assignment::{Assignment, Reason};
use crate::sat::clause::Clause;
use crate::sat::formula::Formula;
use crate::sat::literal::{Variable, var_of_lit};
use crate::sat::solver::{self, ExecutionStats, Solution, Solver};
use std::borrow::Cow;

/// How many more clauses one polarity must satisfy than the other to be forced.
pub const DEFAULT_MARGIN: usize = 1;

/// The outcome of tentatively assigning one polarity of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Evaluation {
    /// Some clause has every literal assigned and false.
    pub contradiction: bool,
    /// Currently unsatisfied clauses that the assignment satisfies.
    pub satisfied: usize,
}

/// The forced-choice rule. `None` means neither polarity is forced.
#[must_use]
pub const fn forced_value(on_true: Evaluation, on_false: Evaluation, margin: usize) -> Option<bool> {
    match (on_true.contradiction, on_false.contradiction) {
        (false, true) => Some(true),
        (true, false) => Some(false),
        (false, false) if on_true.satisfied > on_false.satisfied.saturating_add(margin) => Some(true),
        (false, false) if on_false.satisfied > on_true.satisfied.saturating_add(margin) => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct GoalOriented<'a> {
    pub formula: Cow<'a, Formula>,
    margin: usize,
    /// Indices of the clauses mentioning each variable.
    occurrences: Vec<Vec<usize>>,
    has_empty_clause: bool,
    stats: ExecutionStats,
}

impl<'a> Solver<'a> for GoalOriented<'a> {
    fn new(formula: &'a Formula) -> Self {
        let formula = formula.compact();
        let mut occurrences = vec![Vec::new(); formula.variable_span() + 1];
        for (idx, clause) in formula.iter().enumerate() {
            for var in clause.variables() {
                occurrences[var as usize].push(idx);
            }
        }
        let has_empty_clause = formula.iter().any(Clause::is_empty);

        Self {
            formula,
            margin: DEFAULT_MARGIN,
            occurrences,
            has_empty_clause,
            stats: ExecutionStats::default(),
        }
    }

    fn solve(&mut self) -> Solution {
        self.stats = ExecutionStats::default();
        let assignment = Assignment::new(self.formula.variable_span());
        let unsatisfied = (0..self.formula.clauses.len()).collect();
        let result = self.search(assignment, unsatisfied);
        solver::finish(&self.formula, result, &mut self.stats)
    }

    fn stats(&self) -> &ExecutionStats {
        &self.stats
    }

    fn name(&self) -> &'static str {
        "Goal-Oriented 3-SAT Solver"
    }

    fn description(&self) -> &'static str {
        "This problem was solved using the **Goal-Oriented Forced Choice Heuristic**, \
         which makes variable assignments based on:\n\n\
         1. Contradiction avoidance\n\
         2. Maximizing the number of satisfied clauses\n\
         3. Falling back to systematic backtracking when necessary\n"
    }
}

impl GoalOriented<'_> {
    #[must_use]
    pub fn with_margin(mut self, margin: usize) -> Self {
        self.margin = margin;
        self
    }

    #[must_use]
    pub const fn margin(&self) -> usize {
        self.margin
    }

    fn search(&mut self, mut assignment: Assignment, unsatisfied: Vec<usize>) -> Option<Assignment> {
        self.stats.recursive_calls += 1;
        log::trace!(
            "goal-oriented call {} with {} unsatisfied clauses",
            self.stats.recursive_calls,
            unsatisfied.len()
        );

        if unsatisfied.is_empty() {
            return Some(assignment);
        }

        for var in (1..=self.formula.num_vars).filter_map(|v| Variable::try_from(v).ok()) {
            if assignment.is_assigned(var) {
                continue;
            }

            let on_true = self.evaluate(&mut assignment, &unsatisfied, var, true);
            let on_false = self.evaluate(&mut assignment, &unsatisfied, var, false);
            let Some(value) = forced_value(on_true, on_false, self.margin) else {
                continue;
            };

            self.stats.heuristic_choices += 1;
            log::debug!("forced x{var} = {value} ({on_true:?} / {on_false:?})");

            let mut next = assignment.clone();
            next.set(var, value, Reason::Heuristic);
            let remaining = self.remaining(&next, &unsatisfied);
            if let Some(solution) = self.search(next, remaining) {
                return Some(solution);
            }
            log::debug!("forced x{var} = {value} failed, continuing sweep");
        }

        self.stats.branch_choices += 1;
        let target = self.formula.clauses[unsatisfied[0]].clone();
        log::debug!("branching on clause {target}");

        for &lit in target.iter() {
            let var = var_of_lit(lit);
            if assignment.is_assigned(var) {
                continue;
            }

            let mut next = assignment.clone();
            next.assign(lit, Reason::Branch);
            if self.contradicts(&next, var) {
                self.stats.backtracks += 1;
                continue;
            }

            let remaining = self.remaining(&next, &unsatisfied);
            if let Some(solution) = self.search(next, remaining) {
                return Some(solution);
            }
        }

        self.stats.backtracks += 1;
        None
    }

    fn evaluate(
        &self,
        assignment: &mut Assignment,
        unsatisfied: &[usize],
        var: Variable,
        value: bool,
    ) -> Evaluation {
        assignment.set(var, value, Reason::Heuristic);
        let evaluation = Evaluation {
            contradiction: self.contradicts(assignment, var),
            satisfied: unsatisfied
                .iter()
                .filter(|&&i| self.formula.clauses[i].is_satisfied(assignment))
                .count(),
        };
        assignment.unassign(var);
        evaluation
    }

    /// Whether assigning `var` contradicted some clause.
    ///
    /// Only the clauses mentioning `var` can have changed, since the search
    /// never extends an assignment that already contradicts a non-empty clause.
    fn contradicts(&self, assignment: &Assignment, var: Variable) -> bool {
        self.has_empty_clause
            || self.occurrences.get(var as usize).is_some_and(|clauses| {
                clauses
                    .iter()
                    .any(|&i| self.formula.clauses[i].is_contradiction(assignment))
            })
    }

    fn remaining(&self, assignment: &Assignment, unsatisfied: &[usize]) -> Vec<usize> {
        unsatisfied
            .iter()
            .copied()
            .filter(|&i| !self.formula.clauses[i].is_satisfied(assignment))
            .collect()
    }
}
