#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A parser for the DIMACS CNF file format.
//!
//! The format consists of:
//! - Comment lines starting with `c`. Their text (without the `c`) is kept in
//!   [`Formula::comments`].
//! - A problem line `p cnf <num_variables> <num_clauses>`. Both counts are
//!   recorded as declared; neither is checked against the clauses that follow.
//! - Clause lines: whitespace separated integer literals. Every `0` token is
//!   dropped, and a line that is empty after that is skipped, so each non-empty
//!   line yields exactly one clause.
//! - An optional `%` line marking the end of data. Anything after it is ignored.

use crate::sat::error::{ParseError, ParseResult};
use crate::sat::formula::Formula;
use crate::sat::literal::Literal;
use std::io::{self, BufRead};
use std::path::Path;

/// Parses DIMACS data from any buffered reader.
///
/// # Errors
///
/// - [`ParseError::Io`] if a line cannot be read.
/// - [`ParseError::InvalidHeader`] if a `p` line is not `p cnf <vars> <clauses>`.
/// - [`ParseError::InvalidLiteral`] if a clause token is not an `i32`.
pub fn parse_dimacs<R: BufRead>(reader: R) -> ParseResult<Formula> {
    let mut comments = Vec::new();
    let mut clauses: Vec<Vec<Literal>> = Vec::new();
    let mut num_vars = 0;
    let mut num_clauses = None;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        if let Some(comment) = trimmed.strip_prefix('c') {
            comments.push(comment.trim().to_string());
        } else if trimmed.starts_with('p') {
            let (vars, count) = parse_header(trimmed, line_no)?;
            num_vars = vars;
            num_clauses = Some(count);
        } else if trimmed.starts_with('%') {
            break;
        } else {
            let literals = trimmed
                .split_whitespace()
                .map(|token| {
                    token
                        .parse::<Literal>()
                        .map_err(|_| ParseError::InvalidLiteral {
                            line: line_no,
                            token: token.to_string(),
                        })
                })
                .filter(|lit| !matches!(lit, Ok(0)))
                .collect::<ParseResult<Vec<_>>>()?;

            if !literals.is_empty() {
                clauses.push(literals);
            }
        }
    }

    log::debug!(
        "parsed DIMACS input: {num_vars} declared variables, {} clauses, {} comments",
        clauses.len(),
        comments.len()
    );

    let mut formula = Formula::new(num_vars, clauses).with_comments(comments);
    if let Some(declared) = num_clauses {
        formula.num_clauses = declared;
    }
    Ok(formula)
}

fn parse_header(line: &str, line_no: usize) -> ParseResult<(usize, usize)> {
    let invalid = || ParseError::InvalidHeader {
        line: line_no,
        content: line.to_string(),
    };

    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        ["p", "cnf", vars, clauses, ..] => {
            let vars = vars.parse().map_err(|_| invalid())?;
            let clauses = clauses.parse().map_err(|_| invalid())?;
            Ok((vars, clauses))
        }
        _ => Err(invalid()),
    }
}

/// Parses DIMACS text held in memory.
///
/// # Errors
///
/// See [`parse_dimacs`].
pub fn parse_str(input: &str) -> ParseResult<Formula> {
    parse_dimacs(io::Cursor::new(input))
}

/// Parses a DIMACS CNF file. The formula is named after the file.
///
/// # Errors
///
/// [`ParseError::NotFound`] if `path` does not exist, otherwise see
/// [`parse_dimacs`].
pub fn parse_file(path: impl AsRef<Path>) -> ParseResult<Formula> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ParseError::NotFound(path.to_path_buf()));
    }

    let file = std::fs::File::open(path)?;
    let formula = parse_dimacs(io::BufReader::new(file))?;
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    Ok(formula.with_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_simple_dimacs() {
        let dimacs_content = "c This is a comment\n\
                              p cnf 3 2\n\
                              1 -2 0\n\
                              2 3 0\n";
        let formula = parse_dimacs(Cursor::new(dimacs_content)).unwrap();

        assert_eq!(formula.clauses.len(), 2, "Should parse 2 clauses");
        assert_eq!(formula.num_vars, 3);
        assert_eq!(formula.num_clauses, 2);
        assert_eq!(formula.comments, vec!["This is a comment".to_string()]);
        assert_eq!(formula.clauses[0].literals.as_slice(), &[1, -2]);
        assert_eq!(formula.clauses[1].literals.as_slice(), &[2, 3]);
    }

    #[test]
    fn test_parse_dimacs_with_empty_lines_and_end_marker() {
        let dimacs_content = "p cnf 2 2\n\
                              \n\
                              1 0\n\
                              \n\
                              -2 0\n\
                              %\n\
                              0\n\
                              c this should be ignored";
        let formula = parse_str(dimacs_content).unwrap();

        assert_eq!(formula.clauses.len(), 2);
        assert_eq!(formula.clauses[0][0], 1);
        assert_eq!(formula.clauses[1][0], -2);
        assert!(formula.comments.is_empty());
    }

    #[test]
    fn test_declared_clause_count_is_advisory() {
        let formula = parse_str("p cnf 4 9\n1 2 0\n").unwrap();
        assert_eq!(formula.num_clauses, 9);
        assert_eq!(formula.clauses.len(), 1);
        assert_eq!(formula.num_vars, 4);
    }

    #[test]
    fn test_zero_only_line_is_skipped() {
        let formula = parse_str("p cnf 1 1\n0\n").unwrap();
        assert!(formula.clauses.is_empty());
    }

    #[test]
    fn test_missing_header_defaults_to_zero_vars() {
        let formula = parse_str("1 -3 0\n").unwrap();
        assert_eq!(formula.num_vars, 0);
        assert_eq!(formula.num_clauses, 1);
        assert_eq!(formula.max_variable(), 3);
    }

    #[test]
    fn test_parse_dimacs_malformed_literal() {
        let err = parse_str("p cnf 2 1\n1 abc 0\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidLiteral { line: 2, ref token } if token == "abc"
        ));
        assert_eq!(err.to_string(), "line 2: failed to parse literal 'abc'");
    }

    #[test]
    fn test_parse_dimacs_malformed_header() {
        let err = parse_str("p cnf x 1\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidHeader { line: 1, .. }));
        assert!(matches!(
            parse_str("p dnf 1 1\n"),
            Err(ParseError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn test_parse_file_missing() {
        let err = parse_file("/definitely/not/here.cnf").unwrap_err();
        assert!(matches!(err, ParseError::NotFound(_)));
    }

    #[test]
    fn test_parse_file_names_formula() {
        let dir = std::env::temp_dir().join("cnf_solver_dimacs_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tiny.cnf");
        std::fs::write(&path, "p cnf 1 1\n1 0\n").unwrap();

        let formula = parse_file(&path).unwrap();
        assert_eq!(formula.name.as_deref(), Some("tiny.cnf"));
        assert_eq!(formula.clauses.len(), 1);

        std::fs::remove_file(&path).unwrap();
    }
}
