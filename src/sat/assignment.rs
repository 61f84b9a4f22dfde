#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Partial and complete truth assignments.
//!
//! An [`Assignment`] is the partial mapping built up during search. It is dense
//! (indexed by variable) and is cloned, never shared, whenever a search branches,
//! so sibling branches never observe each other's tentative values.
//!
//! A [`Model`] is the completed view handed to reporting: it covers exactly the
//! variables `1..=num_vars`, filling anything the search never touched with
//! `false`.

use crate::sat::literal::{Literal, Variable, is_true_under, lit_of, polarity, var_of_lit};
use core::ops::Index;
use itertools::Itertools;
use std::fmt::{self, Display};

/// How a variable received its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Reason {
    /// Chosen by a branching decision.
    #[default]
    Branch,
    /// Forced by unit propagation.
    Propagated,
    /// Assigned by pure literal elimination.
    PureLiteral,
    /// Forced by the goal-oriented heuristic sweep.
    Heuristic,
    /// Never touched by the search; filled in with `false` on completion.
    Defaulted,
}

impl Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Branch => "Branch Set",
            Self::Propagated => "Unit Propagated",
            Self::PureLiteral => "Pure Literal",
            Self::Heuristic => "Heuristic Set",
            Self::Defaulted => "Defaulted",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Copy, Default, Hash, PartialOrd, Ord)]
pub enum VarState {
    #[default]
    Unassigned,
    Assigned(bool, Reason),
}

impl VarState {
    #[must_use]
    pub const fn is_assigned(&self) -> bool {
        matches!(self, Self::Assigned(..))
    }

    #[must_use]
    pub const fn is_unassigned(&self) -> bool {
        !self.is_assigned()
    }

    #[must_use]
    pub const fn value(&self) -> Option<bool> {
        match self {
            Self::Assigned(b, _) => Some(*b),
            Self::Unassigned => None,
        }
    }

    #[must_use]
    pub const fn reason(&self) -> Option<Reason> {
        match self {
            Self::Assigned(_, r) => Some(*r),
            Self::Unassigned => None,
        }
    }
}

/// A partial assignment, indexed by variable id. Slot 0 is unused.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Assignment(Vec<VarState>);

impl Index<Variable> for Assignment {
    type Output = VarState;

    fn index(&self, index: Variable) -> &Self::Output {
        self.0.get(index as usize).unwrap_or(&VarState::Unassigned)
    }
}

impl Assignment {
    /// An empty assignment able to hold variables `1..=max_var` without growing.
    #[must_use]
    pub fn new(max_var: usize) -> Self {
        Self(vec![VarState::Unassigned; max_var + 1])
    }

    /// Number of variable slots, excluding the unused slot 0.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn set(&mut self, var: Variable, value: bool, reason: Reason) {
        let idx = var as usize;
        if idx >= self.0.len() {
            self.0.resize(idx + 1, VarState::Unassigned);
        }
        self.0[idx] = VarState::Assigned(value, reason);
    }

    /// Makes `lit` true.
    pub fn assign(&mut self, lit: Literal, reason: Reason) {
        self.set(var_of_lit(lit), polarity(lit), reason);
    }

    pub fn unassign(&mut self, var: Variable) {
        if let Some(slot) = self.0.get_mut(var as usize) {
            *slot = VarState::Unassigned;
        }
    }

    #[must_use]
    pub fn is_assigned(&self, var: Variable) -> bool {
        self[var].is_assigned()
    }

    #[must_use]
    pub fn var_value(&self, var: Variable) -> Option<bool> {
        self[var].value()
    }

    /// Truth value of `lit`, or `None` if its variable is unassigned.
    #[must_use]
    pub fn literal_value(&self, lit: Literal) -> Option<bool> {
        self.var_value(var_of_lit(lit))
            .map(|value| is_true_under(lit, value))
    }

    #[must_use]
    pub fn num_assigned(&self) -> usize {
        self.0.iter().filter(|s| s.is_assigned()).count()
    }

    /// Assigned variables with their value, in increasing variable order.
    pub fn iter_assigned(&self) -> impl Iterator<Item = (Variable, bool)> + '_ {
        self.0.iter().enumerate().filter_map(|(i, s)| {
            s.value()
                .map(|b| (Variable::try_from(i).unwrap_or(Variable::MAX), b))
        })
    }

    /// Fills `1..=num_vars` to produce a [`Model`].
    ///
    /// Untouched variables become `false` with [`Reason::Defaulted`] and are
    /// returned separately so callers can record them. Values of variables above
    /// `num_vars` are not part of the model.
    #[must_use]
    pub fn complete(&self, num_vars: usize) -> (Model, Vec<Variable>) {
        let mut filled = Self::new(num_vars);
        let mut defaulted = Vec::new();

        for var in (1..=num_vars).filter_map(|v| Variable::try_from(v).ok()) {
            match self[var] {
                VarState::Assigned(value, reason) => filled.set(var, value, reason),
                VarState::Unassigned => {
                    filled.set(var, false, Reason::Defaulted);
                    defaulted.push(var);
                }
            }
        }

        (Model(filled), defaulted)
    }
}

/// A total assignment over `1..=num_vars`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Model(Assignment);

impl Model {
    #[must_use]
    pub const fn assignment(&self) -> &Assignment {
        &self.0
    }

    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.0.capacity()
    }

    #[must_use]
    pub fn value(&self, var: Variable) -> Option<bool> {
        self.0.var_value(var)
    }

    #[must_use]
    pub fn reason(&self, var: Variable) -> Option<Reason> {
        self.0[var].reason()
    }

    /// `(variable, value, reason)` triples in increasing variable order.
    pub fn iter(&self) -> impl Iterator<Item = (Variable, bool, Reason)> + '_ {
        self.0
            .iter_assigned()
            .map(|(v, b)| (v, b, self.0[v].reason().unwrap_or(Reason::Defaulted)))
    }

    /// The model as signed literals, one per variable.
    #[must_use]
    pub fn to_literals(&self) -> Vec<Literal> {
        self.iter().map(|(v, b, _)| lit_of(v, b)).collect()
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_literals().iter().join(" "))
    }
}
