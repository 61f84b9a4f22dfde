#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Error types for reading formulas.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for DIMACS parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors raised while reading a DIMACS CNF source.
///
/// The solvers never produce these: they assume a structurally valid formula.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The input file does not exist.
    #[error("CNF file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Reading the source failed.
    #[error("failed to read CNF input: {0}")]
    Io(#[from] std::io::Error),

    /// A token on a clause line is not an integer literal.
    #[error("line {line}: failed to parse literal '{token}'")]
    InvalidLiteral { line: usize, token: String },

    /// A `p` line that is not of the form `p cnf <vars> <clauses>`.
    #[error("line {line}: malformed problem line '{content}'")]
    InvalidHeader { line: usize, content: String },
}
