#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Backward, clause-targeted search.
//!
//! No propagation, no pure literals and no heuristic: each call picks the first
//! unsatisfied clause and tries to make each of its literals true in turn.
//! Literals over an already assigned variable are skipped whatever their value.

use crate::sat::assignment::{Assignment, Reason};
use crate::sat::formula::Formula;
use crate::sat::literal::var_of_lit;
use crate::sat::solver::{self, ExecutionStats, Solution, Solver};
use std::borrow::Cow;

#[derive(Debug, Clone)]
pub struct Backward<'a> {
    pub formula: Cow<'a, Formula>,
    stats: ExecutionStats,
}

impl<'a> Solver<'a> for Backward<'a> {
    fn new(formula: &'a Formula) -> Self {
        Self {
            formula: formula.compact(),
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
        "Backward 3-SAT Solver"
    }

    fn description(&self) -> &'static str {
        "This problem was solved using the **Backward Decision-Making Approach**, \
         which focuses on satisfying individual clauses by:\n\n\
         1. Selecting an unsatisfied clause as the target\n\
         2. Assigning values to its variables to make it satisfied\n\
         3. Backtracking when a branch doesn't lead to a solution\n"
    }
}

impl Backward<'_> {
    fn search(&mut self, assignment: Assignment, unsatisfied: Vec<usize>) -> Option<Assignment> {
        self.stats.recursive_calls += 1;

        let Some(&target) = unsatisfied.first() else {
            return Some(assignment);
        };
        let clause = self.formula.clauses[target].clone();
        log::trace!("targeting clause {target}: {clause}");

        for &lit in clause.iter() {
            if assignment.is_assigned(var_of_lit(lit)) {
                continue;
            }

            let mut next = assignment.clone();
            next.assign(lit, Reason::Branch);
            let remaining = unsatisfied
                .iter()
                .copied()
                .filter(|&i| !self.formula.clauses[i].is_satisfied(&next))
                .collect();

            if let Some(solution) = self.search(next, remaining) {
                self.stats.branch_choices += 1;
                return Some(solution);
            }
        }

        self.stats.backtracks += 1;
        log::debug!("clause {target} exhausted, backtracking");
        None
    }
}
