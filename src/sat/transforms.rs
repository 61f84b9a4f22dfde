#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Structural views derived from a [`Formula`].
//!
//! Every function here reads the formula and builds a fresh structure; nothing
//! is cached, so calling a transform twice yields equal results.

use crate::sat::formula::Formula;
use crate::sat::literal::{Literal, Variable, neg_lit, polarity, var_of_lit};
use bit_vec::BitVec;
use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

/// Variable co-occurrence graph.
pub type AdjacencyGraph = FxHashMap<Variable, FxHashSet<Variable>>;

/// Binary clause implications, from a literal to the literals it forces.
pub type ImplicationGraph = FxHashMap<Literal, Vec<Literal>>;

/// Records every pair of distinct variables sharing a clause as neighbours.
///
/// Polarity is ignored. A variable that never shares a clause with a different
/// variable has no entry at all.
#[must_use]
pub fn adjacency_graph(formula: &Formula) -> AdjacencyGraph {
    let mut adjacency = AdjacencyGraph::default();

    for clause in formula.iter() {
        let vars = clause.variables().collect_vec();
        for (&a, &b) in vars.iter().tuple_combinations() {
            adjacency.entry(a).or_default().insert(b);
            adjacency.entry(b).or_default().insert(a);
        }
    }

    adjacency
}

/// Builds the implication graph of the binary clauses.
///
/// `(l1 ∨ l2)` contributes `¬l1 → l2` and `¬l2 → l1`. Edges are appended in
/// clause order and duplicates are kept; clauses of any other length are
/// ignored.
#[must_use]
pub fn implication_graph(formula: &Formula) -> ImplicationGraph {
    let mut implications = ImplicationGraph::default();

    for clause in formula.iter().filter(|c| c.is_binary()) {
        let (l1, l2) = (clause[0], clause[1]);
        implications.entry(neg_lit(l1)).or_default().push(l2);
        implications.entry(neg_lit(l2)).or_default().push(l1);
    }

    implications
}

/// Literals of the unit clauses.
///
/// Opposite unit literals over the same variable are both returned; the
/// contradiction is left for the search to find.
#[must_use]
pub fn backbone(formula: &Formula) -> FxHashSet<Literal> {
    formula
        .iter()
        .filter(|c| c.is_unit())
        .map(|c| c[0])
        .collect()
}

/// Literals whose variable occurs in a single polarity across the formula.
#[must_use]
pub fn pure_literals(formula: &Formula) -> FxHashSet<Literal> {
    let mut positive = FxHashSet::default();
    let mut negative = FxHashSet::default();

    for &lit in formula.iter().flat_map(|c| c.iter()) {
        if polarity(lit) {
            positive.insert(var_of_lit(lit));
        } else {
            negative.insert(var_of_lit(lit));
        }
    }

    let mut pures = FxHashSet::default();
    for (lits, sign) in [(&positive, 1), (&negative, -1)] {
        let other = if sign > 0 { &negative } else { &positive };
        pures.extend(
            lits.difference(other)
                .filter_map(|&v| Literal::try_from(v).ok())
                .map(|v| v * sign),
        );
    }
    pures
}

/// Dense 0/1 clause-by-literal matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClauseMatrix {
    pub rows: Vec<BitVec>,
    pub num_rows: usize,
    pub num_cols: usize,
}

impl ClauseMatrix {
    /// Whether `lit` occurs in clause `row`.
    #[must_use]
    pub fn contains(&self, row: usize, lit: Literal) -> bool {
        let width = self.num_cols / 2;
        let var = var_of_lit(lit) as usize;
        if var == 0 || var > width {
            return false;
        }
        let col = if polarity(lit) { var - 1 } else { width + var - 1 };
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(false)
    }
}

/// Encodes each clause as a row of `2 × width` bits.
///
/// Column `v - 1` marks `+v` and column `width + v - 1` marks `-v`, where
/// `width` is the actual variable count. If variable ids are sparse, the width
/// widens to the largest id so that no literal falls outside its row.
#[must_use]
pub fn matrix(formula: &Formula) -> ClauseMatrix {
    let width = matrix_width(formula);
    let num_cols = 2 * width;

    let rows = formula
        .iter()
        .map(|clause| {
            let mut row = BitVec::from_elem(num_cols, false);
            for &lit in clause.iter().filter(|&&l| l != 0) {
                let var = var_of_lit(lit) as usize;
                let col = if polarity(lit) { var - 1 } else { width + var - 1 };
                row.set(col, true);
            }
            row
        })
        .collect_vec();

    ClauseMatrix {
        num_rows: rows.len(),
        num_cols,
        rows,
    }
}

fn matrix_width(formula: &Formula) -> usize {
    formula
        .actual_variable_count()
        .max(formula.max_variable() as usize)
}

/// Sizes of every structural view, as shown by `analyze` and the batch runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StructuralSummary {
    pub adjacency_nodes: usize,
    pub implication_edges: usize,
    pub backbone_size: usize,
    pub pure_literal_count: usize,
    pub matrix_rows: usize,
    pub matrix_cols: usize,
}

impl StructuralSummary {
    #[must_use]
    pub fn of(formula: &Formula) -> Self {
        Self {
            adjacency_nodes: adjacency_graph(formula).len(),
            implication_edges: implication_graph(formula).values().map(Vec::len).sum(),
            backbone_size: backbone(formula).len(),
            pure_literal_count: pure_literals(formula).len(),
            matrix_rows: formula.clauses.len(),
            matrix_cols: 2 * matrix_width(formula),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set<T: std::hash::Hash + Eq>(items: impl IntoIterator<Item = T>) -> FxHashSet<T> {
        items.into_iter().collect()
    }

    #[test]
    fn test_adjacency_graph() {
        let f = Formula::new(5, vec![vec![1, -2, 3], vec![-1, 4], vec![5]]);
        let g = adjacency_graph(&f);

        assert_eq!(g[&1], set([2, 3, 4]));
        assert_eq!(g[&2], set([1, 3]));
        assert_eq!(g[&4], set([1]));
        assert!(!g.contains_key(&5), "unit-only variable must be absent");
    }

    #[test]
    fn test_adjacency_graph_tautology_has_no_self_loop() {
        let f = Formula::new(1, vec![vec![1, -1]]);
        assert!(adjacency_graph(&f).is_empty());
    }

    #[test]
    fn test_implication_graph() {
        let f = Formula::new(3, vec![vec![1, 2], vec![-1, 3], vec![1, 2, 3], vec![1, 2]]);
        let g = implication_graph(&f);

        assert_eq!(g[&-1], vec![2, 2]);
        assert_eq!(g[&-2], vec![1, 1]);
        assert_eq!(g[&1], vec![3]);
        assert_eq!(g[&-3], vec![-1]);
        assert_eq!(g.len(), 4);
    }

    #[test]
    fn test_backbone_keeps_contradictions() {
        let f = Formula::new(5, vec![vec![5], vec![-5], vec![1, 2]]);
        assert_eq!(backbone(&f), set([5, -5]));
    }

    #[test]
    fn test_pure_literals() {
        let f = Formula::new(4, vec![vec![1, 2], vec![1, -2], vec![3, 4]]);
        assert_eq!(pure_literals(&f), set([1, 3, 4]));

        let g = Formula::new(3, vec![vec![-1, 2], vec![-1, -3]]);
        assert_eq!(pure_literals(&g), set([-1, 2, -3]));
    }

    #[test]
    fn test_matrix_encoding() {
        let f = Formula::new(3, vec![vec![1, -2], vec![-1, 3]]);
        let m = matrix(&f);

        assert_eq!(m.num_rows, 2);
        assert_eq!(m.num_cols, 6);
        let row0: Vec<bool> = m.rows[0].iter().collect();
        assert_eq!(row0, vec![true, false, false, false, true, false]);
        assert!(m.contains(1, -1));
        assert!(m.contains(1, 3));
        assert!(!m.contains(1, 1));
        assert!(!m.contains(7, 1));
    }

    #[test]
    fn test_matrix_sparse_ids_widen() {
        let f = Formula::new(9, vec![vec![1, -9]]);
        let m = matrix(&f);
        assert_eq!(m.num_cols, 18);
        assert!(m.contains(0, -9));
    }

    #[test]
    fn test_transforms_are_pure() {
        let f = Formula::new(4, vec![vec![1, 2], vec![-2, 3], vec![4], vec![1, -3, 4]]);
        assert_eq!(adjacency_graph(&f), adjacency_graph(&f));
        assert_eq!(implication_graph(&f), implication_graph(&f));
        assert_eq!(backbone(&f), backbone(&f));
        assert_eq!(pure_literals(&f), pure_literals(&f));
        assert_eq!(matrix(&f), matrix(&f));
    }

    #[test]
    fn test_structural_summary() {
        let f = Formula::new(3, vec![vec![1, 2], vec![-1, 3], vec![3]]);
        let s = StructuralSummary::of(&f);
        assert_eq!(s.adjacency_nodes, 3);
        assert_eq!(s.implication_edges, 4);
        assert_eq!(s.backbone_size, 1);
        assert_eq!(s.pure_literal_count, 2);
        assert_eq!((s.matrix_rows, s.matrix_cols), (3, 6));
    }

    #[test]
    fn test_structural_summary_matches_matrix_shape() {
        let f = Formula::new(2, vec![vec![1, -7], vec![2]]);
        let m = matrix(&f);
        let s = StructuralSummary::of(&f);
        assert_eq!((s.matrix_rows, s.matrix_cols), (m.num_rows, m.num_cols));

        let sparse = Formula::new(3, vec![vec![1, 200_000_000], vec![-1]]);
        assert_eq!(StructuralSummary::of(&sparse).matrix_cols, 400_000_000);
    }
}
