#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Defines the DPLL (Davis-Putnam-Logemann-Loveland) solver.
//!
//! Each recursive call works on its own copy of the partial assignment:
//! 1.  **Unit Propagation:** while some not-yet-satisfied clause has exactly one
//!     unassigned literal, that literal is made true.
//! 2.  **Conflict check:** a clause whose literals are all assigned and false
//!     fails the branch.
//! 3.  **Satisfaction check:** if every clause is satisfied the current (possibly
//!     partial) assignment is returned.
//! 4.  **Pure Literal Elimination:** an unassigned variable that occurs in a
//!     single polarity among the unsatisfied clauses is set to that polarity. This
//!     is a reduction, not a branch, so it is never undone on its own.
//! 5.  **Decision:** the unassigned variable occurring most often in unsatisfied
//!     clauses is tried `true`, then `false`, each on a fresh copy.
//!
//! Every recursive path assigns at least one new variable before recursing, so
//! the search terminates and its depth is bounded by the number of variables.

use crate::sat::assignment::{Assignment, Reason};
use crate::sat::clause::Clause;
use crate::sat::formula::Formula;
use crate::sat::literal::{Literal, Variable, polarity, var_of_lit};
use crate::sat::solver::{self, ExecutionStats, Solution, Solver};
use itertools::Itertools;
use rustc_hash::FxHashMap;
use std::borrow::Cow;
use std::cmp::Reverse;

/// A recursive DPLL solver over a borrowed formula.
#[derive(Debug, Clone)]
pub struct Dpll<'a> {
    /// The formula being solved. Never modified.
    pub formula: Cow<'a, Formula>,
    stats: ExecutionStats,
}

impl<'a> Solver<'a> for Dpll<'a> {
    fn new(formula: &'a Formula) -> Self {
        Self {
            formula: formula.compact(),
            stats: ExecutionStats::default(),
        }
    }

    fn solve(&mut self) -> Solution {
        self.stats = ExecutionStats::default();
        let assignment = Assignment::new(self.formula.variable_span());
        let result = self.search(assignment);
        solver::finish(&self.formula, result, &mut self.stats)
    }

    fn stats(&self) -> &ExecutionStats {
        &self.stats
    }

    fn name(&self) -> &'static str {
        "DPLL Solver"
    }

    fn description(&self) -> &'static str {
        "This problem was solved using the **DPLL algorithm**, which repeatedly:\n\n\
         1. Propagates unit clauses\n\
         2. Assigns pure literals\n\
         3. Branches on the most frequent unassigned variable, trying `true` before `false`\n"
    }
}

impl Dpll<'_> {
    fn search(&mut self, mut assignment: Assignment) -> Option<Assignment> {
        self.stats.recursive_calls += 1;
        log::trace!(
            "dpll call {} with {} assigned",
            self.stats.recursive_calls,
            assignment.num_assigned()
        );

        while let Some(lit) = self.find_unit(&assignment) {
            assignment.assign(lit, Reason::Propagated);
            self.stats.unit_propagations += 1;
        }

        if self.is_unsat(&assignment) {
            self.stats.conflicts += 1;
            log::trace!("conflict after propagation");
            return None;
        }

        if self.formula.verify(&assignment) {
            return Some(assignment);
        }

        if let Some(lit) = self.find_pure_literal(&assignment) {
            assignment.assign(lit, Reason::PureLiteral);
            self.stats.pure_literal_assignments += 1;
            return self.search(assignment);
        }

        // Some unsatisfied clause is not yet falsified, so it has an unassigned
        // literal and a branching variable exists.
        let var = self.choose_variable(&assignment)?;
        self.stats.branch_choices += 1;
        log::debug!("branching on x{var}");

        let mut true_branch = assignment.clone();
        true_branch.set(var, true, Reason::Branch);
        if let Some(solution) = self.search(true_branch) {
            return Some(solution);
        }

        self.stats.backtracks += 1;
        log::debug!("x{var} = true failed, trying false");
        assignment.set(var, false, Reason::Branch);
        self.search(assignment)
    }

    fn unsatisfied<'b>(
        &'b self,
        assignment: &'b Assignment,
    ) -> impl Iterator<Item = &'b Clause> + 'b {
        self.formula
            .iter()
            .filter(move |c| !c.is_satisfied(assignment))
    }

    /// The sole unassigned literal of the first unsatisfied clause that has one.
    fn find_unit(&self, assignment: &Assignment) -> Option<Literal> {
        self.unsatisfied(assignment)
            .find_map(|c| c.unassigned_literals(assignment).exactly_one().ok())
    }

    fn is_unsat(&self, assignment: &Assignment) -> bool {
        self.formula.iter().any(|c| c.is_contradiction(assignment))
    }

    /// A pure literal among the unassigned variables of the unsatisfied clauses.
    /// The lowest variable id wins.
    fn find_pure_literal(&self, assignment: &Assignment) -> Option<Literal> {
        let mut occurrences: FxHashMap<Variable, (Option<Literal>, Option<Literal>)> =
            FxHashMap::default();

        for clause in self.unsatisfied(assignment) {
            for lit in clause.unassigned_literals(assignment) {
                let entry = occurrences.entry(var_of_lit(lit)).or_default();
                if polarity(lit) {
                    entry.0 = Some(lit);
                } else {
                    entry.1 = Some(lit);
                }
            }
        }

        occurrences
            .into_iter()
            .filter_map(|(var, polarities)| match polarities {
                (Some(lit), None) | (None, Some(lit)) => Some((var, lit)),
                _ => None,
            })
            .min_by_key(|&(var, _)| var)
            .map(|(_, lit)| lit)
    }

    /// The unassigned variable with the most occurrences in unsatisfied clauses.
    /// Ties go to the variable encountered first.
    fn choose_variable(&self, assignment: &Assignment) -> Option<Variable> {
        let mut counts: FxHashMap<Variable, usize> = FxHashMap::default();
        let mut order = Vec::new();

        for clause in self.unsatisfied(assignment) {
            for lit in clause.unassigned_literals(assignment) {
                let count = counts.entry(var_of_lit(lit)).or_insert_with(|| {
                    order.push(var_of_lit(lit));
                    0
                });
                *count += 1;
            }
        }

        order.into_iter().min_by_key(|v| Reverse(counts[v]))
    }
}
