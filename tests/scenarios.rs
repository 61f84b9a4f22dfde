use cnf_solver::sat::assignment::Reason;
use cnf_solver::sat::batch::{self, BatchOptions, BatchSummary, SolverSummary};
use cnf_solver::sat::dimacs::parse_file;
use cnf_solver::sat::dpll::Dpll;
use cnf_solver::sat::formula::Formula;
use cnf_solver::sat::solver::{Solution, SolveOptions, Solver, SolverType, solve};
use cnf_solver::sat::transforms;
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};

fn data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

fn assert_verdict(name: &str, sat: bool) {
    let formula = parse_file(data(name)).unwrap();
    for kind in SolverType::ALL {
        let outcome = solve(kind, &formula, &SolveOptions::default());
        assert_eq!(outcome.solution.is_sat(), sat, "{kind} on {name}");
        if let Some(model) = outcome.solution.model() {
            assert!(formula.verify(model.assignment()));
            assert_eq!(model.num_vars(), formula.num_vars);
        }
    }
}

#[test]
fn original_five_variable_example_is_sat() {
    assert_verdict("original_5var.cnf", true);
}

#[test]
fn all_sign_combinations_are_unsat() {
    assert_verdict("small_unsat.cnf", false);
}

#[test]
fn moderate_six_variable_example_is_sat() {
    assert_verdict("moderate_6var.cnf", true);
}

#[test]
fn tautological_clauses_are_sat() {
    assert_verdict("small_sat.cnf", true);
}

#[test]
fn dpll_finds_a_witness() {
    let formula = Formula::new(3, vec![vec![1, 2], vec![-1, 3], vec![-2, -3]]);
    let mut solver = Dpll::new(&formula);
    let solution = solver.solve();
    let Solution::Sat(model) = solution else {
        panic!("expected a model");
    };
    assert!(formula.verify(model.assignment()));
    assert!(solver.stats().recursive_calls >= 1);
}

#[test]
fn pure_literal_and_backbone_scenarios() {
    let f = Formula::new(4, vec![vec![1, 2], vec![1, -2], vec![3, 4]]);
    let expected: FxHashSet<i32> = [1, 3, 4].into_iter().collect();
    assert_eq!(transforms::pure_literals(&f), expected);

    let g = Formula::new(5, vec![vec![5], vec![-5], vec![1, 2]]);
    let expected: FxHashSet<i32> = [5, -5].into_iter().collect();
    assert_eq!(transforms::backbone(&g), expected);
}

#[test]
fn parsed_comments_and_names() {
    let formula = parse_file(data("original_5var.cnf")).unwrap();
    assert_eq!(formula.comments, vec!["Original 5-Var Example".to_string()]);
    assert_eq!(formula.name.as_deref(), Some("original_5var.cnf"));
    assert_eq!(formula.to_string().lines().nth(1), Some("p cnf 5 4"));
}

#[test]
fn report_records_assignment_reasons() {
    let formula = parse_file(data("moderate_6var.cnf")).unwrap();
    let dir = std::env::temp_dir().join("cnf_solver_scenario_reports");
    let _ = std::fs::remove_dir_all(&dir);
    let path = dir.join("results_tc3.md");

    let options = SolveOptions {
        case_name: Some("Moderate Satisfiable Example".into()),
        report_path: Some(path.clone()),
        ..SolveOptions::default()
    };
    let outcome = solve(SolverType::GoalOriented, &formula, &options);
    let model = outcome.solution.model().unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("# Goal-Oriented 3-SAT Solver Results: Moderate Satisfiable Example"));
    assert!(text.contains("- **Clauses:** 10"));
    for (var, value, reason) in model.iter() {
        let row = format!("| x{var} | {} | {reason} |", if value { "True" } else { "False" });
        assert!(text.contains(&row), "missing row {row}");
    }
    assert!(model.iter().all(|(_, _, r)| r != Reason::PureLiteral));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn batch_over_data_directory() {
    let options = BatchOptions {
        solvers: vec![SolverType::Backward],
        ..BatchOptions::default()
    };
    let results = batch::run_dir(&data(""), &options);
    let summary = BatchSummary::of(&results);

    assert_eq!(summary.total, 4);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.satisfiable, 3);
    assert_eq!(summary.unsatisfiable, 1);
    assert!(summary.timings.is_some());
}

#[test]
fn every_solver_agrees_over_data_directory() {
    let options = BatchOptions {
        solvers: SolverType::ALL.to_vec(),
        ..BatchOptions::default()
    };
    let results = batch::run_dir(&data(""), &options);
    assert_eq!(results.len(), 12);

    for per_file in results.chunks(SolverType::ALL.len()) {
        let verdicts: Vec<Option<bool>> = per_file.iter().map(|r| r.satisfiable).collect();
        assert!(verdicts.iter().all(|v| *v == verdicts[0]), "{}", per_file[0].name());
    }
    for s in SolverSummary::per_solver(&results) {
        assert_eq!((s.summary.satisfiable, s.summary.unsatisfiable), (3, 1), "{}", s.solver);
    }
}
