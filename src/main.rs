//! # cnf-solver
//!
//! `cnf-solver` is a command-line SAT solver for CNF formulas in DIMACS format.
//!
//! Three backtracking strategies are available:
//! 1.  **DPLL**: unit propagation, pure literal elimination, and branching on the
//!     most frequent unassigned variable.
//! 2.  **Goal-oriented**: a forced-choice sweep over the variables, falling back
//!     to branching on the literals of the first unsatisfied clause.
//! 3.  **Backward**: branching on the literals of the first unsatisfied clause only.
//!
//! ## Usage
//!
//! ```sh
//! cnf-solver [OPTIONS] [PATH] [SUBCOMMAND]
//! ```
//!
//! A bare `PATH` solves that DIMACS file. Subcommands:
//!
//! -   `file --path <cnf>`: solve a DIMACS file.
//! -   `text --input "<clauses>"`: solve clauses given inline, e.g. `"1 -2 0\n2 3 0"`.
//! -   `analyze --path <cnf>`: print the structural views of a formula.
//! -   `bench --path <dir>`: parse, transform and solve every `.cnf` file below a directory.
//!     Repeat `--solver` (or pass `--solver all`) to compare strategies, and use
//!     `--output <file>` to save the results as JSON.
//! -   `completions <shell>`: print a shell completion script.
//!
//! ### Common Options
//!
//! -   `-d, --debug`: debug logging (`RUST_LOG` takes precedence).
//! -   `-v, --verify <bool>`: verify a found model (default: `true`).
//! -   `-s, --stats <bool>`: print statistics (default: `true`).
//! -   `-p, --print-solution`: print the model.
//! -   `--solver <dpll|goal-oriented|backward>`: search strategy (default: `dpll`).
//! -   `--margin <n>`: goal-oriented forcing margin (default: `1`).
//! -   `--report <path>`: write a Markdown report (a directory for `bench`).
//! -   `--ascii`: use `AND OR NOT` in reports.

mod command_line;

use crate::command_line::cli::{
    Cli, Commands, analyze, bench, print_completions, solve_file, solve_text,
};
use clap::Parser;

/// Global allocator using `tikv-jemallocator` for potentially better performance
/// and memory usage tracking.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Some(Commands::File { path, common }) => {
            init_logging(common.debug);
            solve_file(&path, &common)
        }
        Some(Commands::Text { input, common }) => {
            init_logging(common.debug);
            solve_text(&input, &common)
        }
        Some(Commands::Analyze { path }) => {
            init_logging(cli.common.debug);
            analyze(&path)
        }
        Some(Commands::Bench(args)) => {
            init_logging(args.debug);
            bench(&args)
        }
        Some(Commands::Completions { shell }) => {
            print_completions(shell);
            Ok(())
        }
        None => {
            init_logging(cli.common.debug);
            cli.path.map_or_else(
                || Err("No command provided. Use --help for more information.".to_string()),
                |path| solve_file(&path, &cli.common),
            )
        }
    }
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
