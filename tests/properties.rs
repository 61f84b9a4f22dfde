use cnf_solver::sat::assignment::{Assignment, Reason};
use cnf_solver::sat::formula::Formula;
use cnf_solver::sat::literal::{Literal, Variable};
use cnf_solver::sat::solver::{SolveOptions, SolverType, solve};

fn random_formula(rng: &mut fastrand::Rng, num_vars: usize) -> Formula {
    let num_clauses = rng.usize(1..=num_vars * 4);
    let clauses = (0..num_clauses)
        .map(|_| {
            (0..rng.usize(1..=3))
                .map(|_| {
                    let v = Literal::try_from(rng.usize(1..=num_vars)).unwrap();
                    if rng.bool() { v } else { -v }
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    Formula::new(num_vars, clauses)
}

fn brute_force_sat(formula: &Formula) -> bool {
    let n = formula.num_vars;
    (0u32..1 << n).any(|mask| {
        let mut a = Assignment::new(n);
        for v in 1..=n {
            a.set(v as Variable, mask & (1 << (v - 1)) != 0, Reason::Branch);
        }
        formula.verify(&a)
    })
}

#[test]
fn verdicts_match_brute_force() {
    let mut rng = fastrand::Rng::with_seed(2024);
    for round in 0..300 {
        let num_vars = rng.usize(1..=7);
        let formula = random_formula(&mut rng, num_vars);
        let expected = brute_force_sat(&formula);

        for kind in SolverType::ALL {
            let outcome = solve(kind, &formula, &SolveOptions::default());
            assert_eq!(
                outcome.solution.is_sat(),
                expected,
                "{kind} disagrees with brute force on round {round}:\n{formula}"
            );
        }
    }
}

#[test]
fn models_are_sound_and_total() {
    let mut rng = fastrand::Rng::with_seed(99);
    for _ in 0..200 {
        let num_vars = rng.usize(1..=8);
        let formula = random_formula(&mut rng, num_vars);

        for kind in SolverType::ALL {
            let outcome = solve(kind, &formula, &SolveOptions::default());
            if let Some(model) = outcome.solution.model() {
                assert!(formula.verify(model.assignment()), "{kind} returned a non-model");
                let vars: Vec<Variable> = model.iter().map(|(v, _, _)| v).collect();
                let expected: Vec<Variable> = (1..=num_vars as Variable).collect();
                assert_eq!(vars, expected, "{kind} model does not cover 1..={num_vars}");
                for &v in &outcome.stats.defaulted_variables {
                    assert_eq!(model.value(v), Some(false));
                    assert_eq!(model.reason(v), Some(Reason::Defaulted));
                }
            }
        }
    }
}

#[test]
fn solving_is_deterministic() {
    let mut rng = fastrand::Rng::with_seed(7);
    for _ in 0..50 {
        let formula = random_formula(&mut rng, 6);
        for kind in SolverType::ALL {
            let first = solve(kind, &formula, &SolveOptions::default());
            let second = solve(kind, &formula, &SolveOptions::default());
            assert_eq!(first.solution, second.solution);
            assert_eq!(first.stats, second.stats);
        }
    }
}

#[test]
fn margin_never_changes_the_verdict() {
    let mut rng = fastrand::Rng::with_seed(11);
    for _ in 0..100 {
        let formula = random_formula(&mut rng, 6);
        let expected = brute_force_sat(&formula);
        for margin in [0, 1, 2, 5] {
            let options = SolveOptions {
                margin,
                ..SolveOptions::default()
            };
            let outcome = solve(SolverType::GoalOriented, &formula, &options);
            assert_eq!(outcome.solution.is_sat(), expected, "margin {margin}");
        }
    }
}
