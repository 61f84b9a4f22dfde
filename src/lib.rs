//! This crate provides a CNF formula model, structural transforms over it, and
//! three backtracking SAT solvers: DPLL, a goal-oriented forced-choice solver and
//! a backward clause-targeted solver.

/// The `sat` module holds the formula model, the DIMACS parser, the structural
/// transforms, the solvers, and the Markdown reporting and batch tooling built
/// on top of them.
pub mod sat;
