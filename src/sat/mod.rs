#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! CNF formulas, their structural views, and three recursive search strategies.

pub mod assignment;
pub mod backward;
pub mod batch;
pub mod clause;
pub mod dimacs;
pub mod dpll;
pub mod error;
pub mod formula;
pub mod goal_oriented;
pub mod literal;
pub mod report;
pub mod solver;
pub mod transforms;
