#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Clauses and the clause satisfaction oracle shared by every solver.

use crate::sat::assignment::Assignment;
use crate::sat::literal::{Literal, Variable, var_of_lit};
use core::ops::Index;
use itertools::Itertools;
use smallvec::SmallVec;
use std::fmt::{self, Display};

/// Inline capacity for clause literals; 3-SAT clauses never spill.
pub type LiteralStorage = SmallVec<[Literal; 4]>;

/// A disjunction of literals.
///
/// The literal order is kept exactly as given since the clause-targeted solvers
/// try literals in that order. Duplicate and complementary literals are kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Clause {
    pub literals: LiteralStorage,
}

impl Clause {
    #[must_use]
    pub fn new(literals: impl IntoIterator<Item = Literal>) -> Self {
        Self {
            literals: literals.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.len() == 1
    }

    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.len() == 2
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    /// Distinct variables in first-occurrence order.
    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.iter().map(|&l| var_of_lit(l)).unique()
    }

    /// Contains some variable in both polarities.
    #[must_use]
    pub fn is_tautology(&self) -> bool {
        self.iter().any(|&l| self.literals.contains(&-l))
    }

    /// True iff at least one literal is assigned true.
    ///
    /// Literals over unassigned variables are skipped, so a clause with no
    /// assigned literal is reported unsatisfied rather than unknown. Every
    /// solver relies on this to decide which clauses still need attention.
    #[must_use]
    pub fn is_satisfied(&self, assignment: &Assignment) -> bool {
        self.iter()
            .any(|&lit| assignment.literal_value(lit) == Some(true))
    }

    /// True iff every literal is assigned and false.
    ///
    /// A clause with any unassigned literal is never a contradiction. The empty
    /// clause always is.
    #[must_use]
    pub fn is_contradiction(&self, assignment: &Assignment) -> bool {
        self.iter()
            .all(|&lit| assignment.literal_value(lit) == Some(false))
    }

    /// Literals whose variable has no value yet.
    pub fn unassigned_literals<'a>(
        &'a self,
        assignment: &'a Assignment,
    ) -> impl Iterator<Item = Literal> + 'a {
        self.iter()
            .copied()
            .filter(|&lit| !assignment.is_assigned(var_of_lit(lit)))
    }
}

impl Index<usize> for Clause {
    type Output = Literal;

    fn index(&self, index: usize) -> &Self::Output {
        &self.literals[index]
    }
}

impl From<Vec<Literal>> for Clause {
    fn from(literals: Vec<Literal>) -> Self {
        Self::new(literals)
    }
}

impl From<&[Literal]> for Clause {
    fn from(literals: &[Literal]) -> Self {
        Self::new(literals.iter().copied())
    }
}

impl<const N: usize> From<[Literal; N]> for Clause {
    fn from(literals: [Literal; N]) -> Self {
        Self::new(literals)
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} 0", self.iter().join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::assignment::Reason;

    fn assignment(lits: &[Literal]) -> Assignment {
        let mut a = Assignment::new(8);
        for &l in lits {
            a.assign(l, Reason::Branch);
        }
        a
    }

    #[test]
    fn test_new() {
        let clause = Clause::new(vec![1, -2, 3]);
        assert_eq!(clause.len(), 3);
        assert_eq!(clause[1], -2);
        assert!(!clause.is_unit());
    }

    #[test]
    fn test_satisfied_skips_unassigned() {
        let clause = Clause::from([1, -2, 3]);
        assert!(!clause.is_satisfied(&assignment(&[])));
        assert!(!clause.is_satisfied(&assignment(&[-1, 2])));
        assert!(clause.is_satisfied(&assignment(&[-1, -2])));
        assert!(clause.is_satisfied(&assignment(&[3])));
    }

    #[test]
    fn test_satisfied_is_idempotent() {
        let clause = Clause::from([1, 2]);
        let a = assignment(&[-1]);
        let first = clause.is_satisfied(&a);
        assert_eq!(first, clause.is_satisfied(&a));
        assert_eq!(first, clause.is_satisfied(&a));
    }

    #[test]
    fn test_contradiction_requires_full_assignment() {
        let clause = Clause::from([1, -2]);
        assert!(!clause.is_contradiction(&assignment(&[-1])));
        assert!(clause.is_contradiction(&assignment(&[-1, 2])));
        assert!(!clause.is_contradiction(&assignment(&[1, 2])));
        assert!(Clause::default().is_contradiction(&assignment(&[])));
    }

    #[test]
    fn test_tautology() {
        assert!(Clause::from([1, 2, -1]).is_tautology());
        assert!(!Clause::from([1, 2, 3]).is_tautology());
    }

    #[test]
    fn test_variables_unique() {
        let clause = Clause::from([3, -1, -3, 2]);
        assert_eq!(clause.variables().collect::<Vec<_>>(), vec![3, 1, 2]);
    }

    #[test]
    fn test_unassigned_literals() {
        let clause = Clause::from([1, -2, 3]);
        let a = assignment(&[2]);
        assert_eq!(clause.unassigned_literals(&a).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Clause::from([1, -2]).to_string(), "1 -2 0");
    }
}
