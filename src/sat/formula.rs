#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The CNF formula model.
//!
//! A [`Formula`] is immutable once built. It records the declared variable and
//! clause counts alongside the clauses themselves; neither declared count is
//! checked against the clauses. Use [`Formula::actual_variable_count`] for the
//! number of variables that really occur.

use crate::sat::assignment::Assignment;
use crate::sat::clause::Clause;
use crate::sat::literal::{Literal, Variable, lit_of, polarity, var_of_lit};
use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};
use std::borrow::Cow;
use std::fmt::{self, Display};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Formula {
    /// Label for reports, usually the file name the formula was read from.
    pub name: Option<String>,
    /// Declared number of variables.
    pub num_vars: usize,
    /// Declared number of clauses. Advisory only.
    pub num_clauses: usize,
    pub clauses: Vec<Clause>,
    pub comments: Vec<String>,
}

impl Formula {
    /// Builds a formula from raw literal lists. The declared clause count is
    /// taken from the clause list.
    #[must_use]
    pub fn new<I, C>(num_vars: usize, clauses: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = Literal>,
    {
        let clauses = clauses.into_iter().map(Clause::new).collect_vec();
        Self {
            name: None,
            num_vars,
            num_clauses: clauses.len(),
            clauses,
            comments: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_comments(mut self, comments: Vec<String>) -> Self {
        self.comments = comments;
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    /// Number of distinct variables referenced by any literal.
    #[must_use]
    pub fn actual_variable_count(&self) -> usize {
        self.iter()
            .flat_map(|c| c.iter().map(|&l| var_of_lit(l)))
            .collect::<FxHashSet<_>>()
            .len()
    }

    /// Clause length to number of clauses with that length. Keys are unordered.
    #[must_use]
    pub fn clause_length_histogram(&self) -> FxHashMap<usize, usize> {
        let mut histogram = FxHashMap::default();
        for clause in &self.clauses {
            *histogram.entry(clause.len()).or_insert(0) += 1;
        }
        histogram
    }

    /// Largest variable id occurring in any clause, 0 if there are none.
    #[must_use]
    pub fn max_variable(&self) -> Variable {
        self.iter()
            .flat_map(|c| c.iter().map(|&l| var_of_lit(l)))
            .max()
            .unwrap_or(0)
    }

    /// Number of variable slots a search assignment needs: the declared count or
    /// the largest occurring id, whichever is bigger.
    #[must_use]
    pub fn variable_span(&self) -> usize {
        self.num_vars.max(self.max_variable() as usize)
    }

    #[must_use]
    pub fn num_literals(&self) -> usize {
        self.iter().map(Clause::len).sum()
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_clause_length(&self) -> f64 {
        if self.clauses.is_empty() {
            0.0
        } else {
            self.num_literals() as f64 / self.clauses.len() as f64
        }
    }

    /// Declared clauses per declared variable, 0 when no variables are declared.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn clause_variable_ratio(&self) -> f64 {
        if self.num_vars == 0 {
            0.0
        } else {
            self.num_clauses as f64 / self.num_vars as f64
        }
    }

    /// The formula with undeclared variables renumbered to `num_vars + 1`,
    /// `num_vars + 2`, and so on, in increasing id order.
    ///
    /// Declared variables keep their ids and the relative order of the others
    /// is preserved, so searching the result gives the same model over
    /// `1..=num_vars` while per-variable storage stays proportional to the
    /// number of variables that occur. Borrows when nothing needs renumbering.
    #[must_use]
    pub fn compact(&self) -> Cow<'_, Self> {
        let Ok(declared) = Variable::try_from(self.num_vars) else {
            return Cow::Borrowed(self);
        };
        let undeclared = self
            .iter()
            .flat_map(Clause::variables)
            .filter(|&v| v > declared)
            .sorted_unstable()
            .dedup()
            .collect_vec();

        let contiguous = undeclared
            .last()
            .is_none_or(|&last| last as usize == self.num_vars + undeclared.len());
        if contiguous {
            return Cow::Borrowed(self);
        }

        let renamed: FxHashMap<Variable, Variable> =
            undeclared.iter().copied().zip(declared + 1..).collect();
        log::debug!(
            "renumbering {} undeclared variables above x{declared}",
            renamed.len()
        );

        let clauses = self
            .iter()
            .map(|clause| {
                Clause::new(clause.iter().map(|&lit| {
                    renamed
                        .get(&var_of_lit(lit))
                        .map_or(lit, |&var| lit_of(var, polarity(lit)))
                }))
            })
            .collect_vec();

        Cow::Owned(Self {
            clauses,
            ..self.clone()
        })
    }

    /// Every clause is satisfied by `assignment`.
    #[must_use]
    pub fn verify(&self, assignment: &Assignment) -> bool {
        self.iter().all(|c| c.is_satisfied(assignment))
    }
}

impl Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for comment in &self.comments {
            writeln!(f, "c {comment}")?;
        }
        writeln!(f, "p cnf {} {}", self.num_vars, self.clauses.len())?;
        for clause in &self.clauses {
            writeln!(f, "{clause}")?;
        }
        Ok(())
    }
}
