#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Literals in the signed-integer (DIMACS) encoding.
//!
//! A literal is a nonzero `i32`: its absolute value names the variable and its
//! sign encodes the polarity (positive means unnegated).

/// A signed literal. Never zero.
pub type Literal = i32;

/// A 1-based variable identifier.
pub type Variable = u32;

/// Returns the variable named by `lit`.
#[must_use]
pub const fn var_of_lit(lit: Literal) -> Variable {
    lit.unsigned_abs()
}

/// Returns `true` for an unnegated literal.
#[must_use]
pub const fn polarity(lit: Literal) -> bool {
    lit > 0
}

/// Returns the literal of the opposite polarity.
#[must_use]
pub const fn neg_lit(lit: Literal) -> Literal {
    -lit
}

/// Builds the literal for `var` with the given polarity.
///
/// # Panics
///
/// If `var` does not fit in an `i32`.
#[must_use]
pub fn lit_of(var: Variable, polarity: bool) -> Literal {
    let var = Literal::try_from(var).unwrap_or_else(|_| panic!("variable {var} overflowed"));
    if polarity { var } else { -var }
}

/// Returns `true` if assigning `value` to the variable of `lit` makes `lit` true.
#[must_use]
pub const fn is_true_under(lit: Literal, value: bool) -> bool {
    polarity(lit) == value
}
