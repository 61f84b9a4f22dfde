#![allow(clippy::cast_precision_loss)]

use cnf_solver::sat::batch::{self, BatchOptions, BatchReport, BatchResult, BatchSummary};
use cnf_solver::sat::dimacs::{parse_file, parse_str};
use cnf_solver::sat::formula::Formula;
use cnf_solver::sat::goal_oriented::DEFAULT_MARGIN;
use cnf_solver::sat::solver::{self, ExecutionStats, Solution, SolveOptions, SolverType};
use cnf_solver::sat::transforms::{self, StructuralSummary};
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use itertools::Itertools;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tikv_jemalloc_ctl::{epoch, stats};

/// Defines the command-line interface for the solver application.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(
    name = "cnf-solver",
    version,
    about = "Backtracking SAT solvers for CNF formulas"
)]
pub(crate) struct Cli {
    /// An optional path argument. If provided without a subcommand, it's
    /// treated as the path to a DIMACS .cnf file to solve.
    pub path: Option<PathBuf>,

    /// Specifies the subcommand to execute (e.g. `file`, `text`, `analyze`, `bench`).
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Common options applicable to all commands.
    #[command(flatten)]
    pub common: CommonOptions,
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve a CNF file in DIMACS format.
    File {
        /// Path to the DIMACS .cnf file.
        #[arg(long)]
        path: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a CNF formula provided as plain text.
    Text {
        /// Literal CNF input as a string (e.g. "1 -2 0\n2 3 0").
        /// Each line represents a clause, literals are space-separated, and 0 terminates a clause.
        #[arg(short, long)]
        input: String,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Print the structural views of a CNF file without solving it.
    Analyze {
        /// Path to the DIMACS .cnf file.
        #[arg(long)]
        path: PathBuf,
    },

    /// Parse, transform and solve every `.cnf` file below a directory.
    Bench(BenchArgs),

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Defines common command-line options shared across different subcommands.
#[derive(Args, Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CommonOptions {
    /// Enable debug logging. `RUST_LOG` overrides this.
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Check a found model against every clause of the input.
    #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
    pub(crate) verify: bool,

    /// Print problem and search statistics after solving.
    #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
    pub(crate) stats: bool,

    /// Print the satisfying assignment if the formula is satisfiable.
    #[arg(short, long, default_value_t = false)]
    pub(crate) print_solution: bool,

    /// Search strategy.
    #[arg(long, value_enum, default_value_t = SolverType::Dpll)]
    pub(crate) solver: SolverType,

    /// Extra clauses one polarity must satisfy to be forced by the goal-oriented solver.
    #[arg(long, default_value_t = DEFAULT_MARGIN)]
    pub(crate) margin: usize,

    /// Write a Markdown report to this path.
    #[arg(long)]
    pub(crate) report: Option<PathBuf>,

    /// Render formulas in reports with AND / OR / NOT instead of Unicode symbols.
    #[arg(long, default_value_t = false)]
    pub(crate) ascii: bool,
}

impl Default for CommonOptions {
    fn default() -> Self {
        Self {
            debug: false,
            verify: true,
            stats: true,
            print_solution: false,
            solver: SolverType::default(),
            margin: DEFAULT_MARGIN,
            report: None,
            ascii: false,
        }
    }
}

impl CommonOptions {
    fn solve_options(&self, case_name: Option<String>) -> SolveOptions {
        SolveOptions {
            case_name,
            report_path: self.report.clone(),
            margin: self.margin,
            unicode: !self.ascii,
        }
    }
}

/// Solvers picked by one `--solver` occurrence: a single strategy or `all`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SolverSelection(Vec<SolverType>);

fn parse_solver_selection(s: &str) -> Result<SolverSelection, String> {
    if s.eq_ignore_ascii_case("all") {
        Ok(SolverSelection(SolverType::ALL.to_vec()))
    } else {
        s.parse::<SolverType>()
            .map(|kind| SolverSelection(vec![kind]))
            .map_err(|_| format!("unknown solver '{s}' (expected dpll, goal-oriented, backward or all)"))
    }
}

/// Options of the `bench` subcommand.
#[derive(Args, Debug, Clone)]
pub(crate) struct BenchArgs {
    /// Directory to search for .cnf files.
    #[arg(long)]
    pub(crate) path: PathBuf,

    /// Only parse and transform; do not run a solver.
    #[arg(long, default_value_t = false)]
    pub(crate) transform_only: bool,

    /// Solver to run on every file. Repeat to compare several, or pass `all`.
    #[arg(long = "solver", value_name = "SOLVER", value_parser = parse_solver_selection, default_value = "dpll")]
    pub(crate) solvers: Vec<SolverSelection>,

    /// Extra clauses one polarity must satisfy to be forced by the goal-oriented solver.
    #[arg(long, default_value_t = DEFAULT_MARGIN)]
    pub(crate) margin: usize,

    /// Directory receiving one Markdown report per file and solver.
    #[arg(long)]
    pub(crate) report: Option<PathBuf>,

    /// Save the summaries and every per-file result to this JSON file.
    #[arg(short, long)]
    pub(crate) output: Option<PathBuf>,

    /// Enable debug logging. `RUST_LOG` overrides this.
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,
}

impl BenchArgs {
    /// The selected solvers in first-mention order, without repeats. Empty with
    /// `--transform-only`.
    fn solvers(&self) -> Vec<SolverType> {
        if self.transform_only {
            return Vec::new();
        }
        self.solvers
            .iter()
            .flat_map(|selection| selection.0.iter().copied())
            .unique()
            .collect()
    }
}

/// Prints the completion script for `shell` to stdout.
pub(crate) fn print_completions(shell: clap_complete::Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}

/// Parses a DIMACS file, solves it, and reports the results.
///
/// # Errors
///
/// If the file cannot be parsed, or if verification of a found model fails.
pub(crate) fn solve_file(path: &Path, common: &CommonOptions) -> Result<(), String> {
    let time = Instant::now();
    let formula = parse_file(path).map_err(|e| e.to_string())?;
    let parse_time = time.elapsed();

    println!("Solving: {}", path.display());
    solve_and_report(&formula, common, parse_time)
}

/// Solves a formula given as text. A literal `\n` in the input separates clauses.
///
/// # Errors
///
/// If the text cannot be parsed, or if verification of a found model fails.
pub(crate) fn solve_text(input: &str, common: &CommonOptions) -> Result<(), String> {
    let time = Instant::now();
    let formula = parse_str(&input.replace("\\n", "\n")).map_err(|e| e.to_string())?;
    let formula = if formula.num_vars == 0 {
        Formula {
            num_vars: formula.max_variable() as usize,
            ..formula
        }
    } else {
        formula
    };
    let parse_time = time.elapsed();

    solve_and_report(&formula.with_name("text input"), common, parse_time)
}

/// Solves `formula` with the configured solver, then verifies and prints the outcome.
///
/// # Arguments
/// * `formula` - The formula, typically parsed from a file or text.
/// * `common` - `CommonOptions` providing solver configuration.
/// * `parse_time` - The time taken to parse the input.
///
/// # Errors
///
/// If verification of a found model fails, or if memory statistics cannot be read.
pub(crate) fn solve_and_report(
    formula: &Formula,
    common: &CommonOptions,
    parse_time: Duration,
) -> Result<(), String> {
    if common.debug {
        println!("Variables: {}", formula.num_vars);
        println!("Clauses: {}", formula.clauses.len());
        println!("Literals: {}", formula.num_literals());
    }

    epoch::advance().map_err(|e| e.to_string())?;

    let outcome = solver::solve(
        common.solver,
        formula,
        &common.solve_options(formula.name.clone()),
    );

    let (allocated_mib, resident_mib) = memory_usage()?;

    if common.verify {
        verify_solution(formula, &outcome.solution)?;
    }

    if common.stats {
        print_stats(
            parse_time,
            outcome.elapsed,
            formula,
            common.solver,
            &outcome.stats,
            allocated_mib,
            resident_mib,
        );
    }

    if let (true, Some(model)) = (common.print_solution, outcome.solution.model()) {
        println!("Solution: {model}");
    }

    println!("\n{}", outcome.solution);
    Ok(())
}

/// Checks a model against every clause.
///
/// # Errors
///
/// If the model leaves some clause unsatisfied.
pub(crate) fn verify_solution(formula: &Formula, solution: &Solution) -> Result<(), String> {
    if let Some(model) = solution.model() {
        let ok = formula.verify(model.assignment());
        println!("Verified: {ok:?}");
        if !ok {
            return Err("Solution failed verification!".to_string());
        }
    }
    Ok(())
}

/// Allocated and resident memory in MiB, as reported by jemalloc.
fn memory_usage() -> Result<(f64, f64), String> {
    epoch::advance().map_err(|e| e.to_string())?;

    let allocated = stats::allocated::read().map_err(|e| e.to_string())?;
    let resident = stats::resident::read().map_err(|e| e.to_string())?;

    Ok((
        allocated as f64 / (1024.0 * 1024.0),
        resident as f64 / (1024.0 * 1024.0),
    ))
}

/// Helper function to print a single statistic line in a formatted table row.
pub(crate) fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Helper function to print a statistic line that includes a rate (value/second).
pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

/// Prints a summary of problem and search statistics.
#[allow(clippy::too_many_arguments)]
pub(crate) fn print_stats(
    parse_time: Duration,
    elapsed: Duration,
    formula: &Formula,
    solver: SolverType,
    s: &ExecutionStats,
    allocated: f64,
    resident: f64,
) {
    let elapsed_secs = elapsed.as_secs_f64();

    println!("\n=======================[ Problem Statistics ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Variables (declared)", formula.num_vars);
    stat_line("Variables (occurring)", formula.actual_variable_count());
    stat_line("Clauses", formula.clauses.len());
    stat_line("Literals", formula.num_literals());
    stat_line(
        "Avg clause length",
        format!("{:.2}", formula.average_clause_length()),
    );
    stat_line(
        "Clause/variable ratio",
        format!("{:.2}", formula.clause_variable_ratio()),
    );

    println!("========================[ Search Statistics ]========================");
    stat_line("Solver", solver.to_string());
    stat_line_with_rate("Recursive calls", s.recursive_calls, elapsed_secs);
    stat_line_with_rate("Backtracks", s.backtracks, elapsed_secs);
    for (label, value) in s.counters().into_iter().skip(2).filter(|&(_, v)| v > 0) {
        stat_line(label, value);
    }
    stat_line("Defaulted variables", s.defaulted_variables.len());
    stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
    stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");
}

/// Prints the structural views of a DIMACS file.
///
/// # Errors
///
/// If the file cannot be parsed.
pub(crate) fn analyze(path: &Path) -> Result<(), String> {
    let time = Instant::now();
    let formula = parse_file(path).map_err(|e| e.to_string())?;
    let parse_time = time.elapsed();

    let time = Instant::now();
    let summary = StructuralSummary::of(&formula);
    let transform_time = time.elapsed();

    println!("Analyzing: {}", path.display());
    println!("\n========================[ Formula Structure ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Transform time (s)", format!("{:.3}", transform_time.as_secs_f64()));
    stat_line("Variables (declared)", formula.num_vars);
    stat_line("Variables (occurring)", formula.actual_variable_count());
    stat_line("Clauses (declared)", formula.num_clauses);
    stat_line("Clauses (read)", formula.clauses.len());
    for (len, count) in formula.clause_length_histogram().into_iter().sorted() {
        stat_line(&format!("Clauses of length {len}"), count);
    }
    stat_line("Adjacency graph nodes", summary.adjacency_nodes);
    stat_line("Implication edges", summary.implication_edges);
    stat_line("Backbone literals", summary.backbone_size);
    stat_line("Pure literals", summary.pure_literal_count);
    stat_line(
        "Matrix shape",
        format!("{} x {}", summary.matrix_rows, summary.matrix_cols),
    );
    println!("=====================================================================");

    let backbone = transforms::backbone(&formula);
    if !backbone.is_empty() {
        println!("Backbone: {}", backbone.into_iter().sorted().join(" "));
    }
    let pures = transforms::pure_literals(&formula);
    if !pures.is_empty() {
        println!("Pure literals: {}", pures.into_iter().sorted().join(" "));
    }
    Ok(())
}

/// Runs the batch pipeline over a directory and prints per-file and summary lines.
///
/// With more than one solver, a per-solver comparison follows the summary.
///
/// # Errors
///
/// If `path` is not a directory, or if the JSON output cannot be written.
pub(crate) fn bench(args: &BenchArgs) -> Result<(), String> {
    if !args.path.is_dir() {
        return Err(format!(
            "Provided path is not a directory: {}",
            args.path.display()
        ));
    }

    let options = BatchOptions {
        solvers: args.solvers(),
        margin: args.margin,
        report_dir: args.report.clone(),
    };

    let results = batch::run_dir(&args.path, &options);
    for result in &results {
        print_batch_result(result);
    }

    let report = BatchReport::new(&results);
    println!("\n==========================[ Batch Summary ]==========================");
    print_batch_summary(&report.summary, args.transform_only);
    println!("=====================================================================");

    if report.solvers.len() > 1 {
        println!("\n=========================[ Solver Comparison ]=======================");
        for s in &report.solvers {
            let mean = s
                .summary
                .timings
                .map_or_else(|| "-".to_string(), |t| format!("{:.3} ms", t.mean_total_ms));
            stat_line(
                &s.solver.to_string(),
                format!(
                    "{}/{} solved ({} SAT, {} UNSAT), mean {mean}",
                    s.summary.succeeded, s.summary.total, s.summary.satisfiable, s.summary.unsatisfiable
                ),
            );
        }
        println!("=====================================================================");
    }

    if let Some(output) = &args.output {
        batch::write_json(&report, output)
            .map_err(|e| format!("Failed to write {}: {e}", output.display()))?;
        println!("Results saved to {}", output.display());
    }
    Ok(())
}

fn print_batch_summary(summary: &BatchSummary, transform_only: bool) {
    stat_line("Runs", summary.total);
    stat_line("Succeeded", summary.succeeded);
    stat_line("Failed", summary.failed);
    if !transform_only {
        stat_line("Satisfiable", summary.satisfiable);
        stat_line("Unsatisfiable", summary.unsatisfiable);
    }
    if let Some(t) = summary.timings {
        stat_line("Mean parse (ms)", format!("{:.3}", t.mean_parse_ms));
        stat_line("Mean transform (ms)", format!("{:.3}", t.mean_transform_ms));
        stat_line("Mean total (ms)", format!("{:.3}", t.mean_total_ms));
        stat_line("Median total (ms)", format!("{:.3}", t.median_total_ms));
        stat_line("Min total (ms)", format!("{:.3}", t.min_total_ms));
        stat_line("Max total (ms)", format!("{:.3}", t.max_total_ms));
    }
}

fn label(result: &BatchResult) -> String {
    result
        .solver
        .map_or_else(|| result.name(), |kind| format!("{} [{kind}]", result.name()))
}

fn print_batch_result(result: &BatchResult) {
    match (&result.error, result.satisfiable) {
        (Some(e), _) => println!("  ✗ {}: {e}", label(result)),
        (None, verdict) => {
            let verdict = match verdict {
                Some(true) => " SAT",
                Some(false) => " UNSAT",
                None => "",
            };
            println!(
                "  ✓ {}{verdict} in {:.3}s",
                label(result),
                result.total_time().as_secs_f64()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_file_subcommand() {
        let cli = Cli::try_parse_from([
            "cnf-solver",
            "file",
            "--path",
            "a.cnf",
            "--solver",
            "goal-oriented",
            "--margin",
            "3",
            "--stats",
            "false",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::File { path, common }) => {
                assert_eq!(path, PathBuf::from("a.cnf"));
                assert_eq!(common.solver, SolverType::GoalOriented);
                assert_eq!(common.margin, 3);
                assert!(!common.stats);
                assert!(common.verify);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_bare_path_uses_defaults() {
        let cli = Cli::try_parse_from(["cnf-solver", "problem.cnf"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.path, Some(PathBuf::from("problem.cnf")));
        assert_eq!(cli.common.solver, SolverType::Dpll);
        assert_eq!(cli.common.margin, DEFAULT_MARGIN);
    }

    #[test]
    fn test_unknown_solver_rejected() {
        assert!(Cli::try_parse_from(["cnf-solver", "x.cnf", "--solver", "cdcl"]).is_err());
    }

    #[test]
    fn test_verify_solution() {
        let f = Formula::new(1, vec![vec![1]]);
        let outcome = solver::solve(SolverType::Backward, &f, &SolveOptions::default());
        assert!(verify_solution(&f, &outcome.solution).is_ok());
        assert!(verify_solution(&f, &Solution::Unsat).is_ok());
    }

    #[test]
    fn test_solve_text() {
        let common = CommonOptions {
            stats: false,
            ..CommonOptions::default()
        };
        assert!(solve_text("1 -2 0\\n2 0", &common).is_ok());
        assert!(solve_text("1 x 0", &common).is_err());
    }

    fn bench_args(extra: &[&str]) -> BenchArgs {
        let args = ["cnf-solver", "bench"].into_iter().chain(extra.iter().copied());
        match Cli::try_parse_from(args).unwrap().command {
            Some(Commands::Bench(args)) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_bench_solver_selection() {
        let args = bench_args(&["--path", "d"]);
        assert_eq!(args.solvers(), vec![SolverType::Dpll]);

        let args = bench_args(&["--path", "d", "--solver", "backward", "--solver", "all"]);
        assert_eq!(
            args.solvers(),
            vec![SolverType::Backward, SolverType::Dpll, SolverType::GoalOriented]
        );

        let args = bench_args(&["--path", "d", "--solver", "all", "--transform-only"]);
        assert!(args.solvers().is_empty());

        let cli = Cli::try_parse_from(["cnf-solver", "bench", "--path", "d", "--solver", "cdcl"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_bench_rejects_file() {
        let args = bench_args(&["--path", "/definitely/missing"]);
        assert!(bench(&args).is_err());
    }

    #[test]
    fn test_bench_writes_json() {
        let dir = std::env::temp_dir().join("cnf_solver_cli_bench");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("one.cnf"), "p cnf 2 2\n1 2 0\n-2 0\n").unwrap();
        let output = dir.join("results").join("summary.json");

        let dir_arg = dir.display().to_string();
        let output_arg = output.display().to_string();
        let args = bench_args(&["--path", &dir_arg, "--solver", "all", "--output", &output_arg]);
        assert!(bench(&args).is_ok());

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(json["summary"]["satisfiable"], 3);
        assert_eq!(json["solvers"].as_array().map(Vec::len), Some(3));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
