#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Runs the parser, the structural transforms and any number of solvers over
//! every `.cnf` file below a directory, timing each phase.
//!
//! Each file is parsed and transformed once. Every selected solver then runs on
//! it, giving one [`BatchResult`] per solver. The results of a run, with
//! overall and per-solver summaries, can be saved as JSON with [`write_json`].

use crate::sat::dimacs::parse_file;
use crate::sat::goal_oriented::DEFAULT_MARGIN;
use crate::sat::solver::{self, SolveOptions, SolverType};
use crate::sat::transforms::StructuralSummary;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::{Serialize, Serializer};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

/// Settings for a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Solvers to run after the transforms, in order. Empty only parses and
    /// transforms.
    pub solvers: Vec<SolverType>,
    pub margin: usize,
    /// Directory receiving one Markdown report per solved file and solver.
    pub report_dir: Option<PathBuf>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            solvers: Vec::new(),
            margin: DEFAULT_MARGIN,
            report_dir: None,
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}

/// Outcome of processing one file with one solver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub path: PathBuf,
    /// `None` when the run only parsed and transformed.
    pub solver: Option<SolverType>,
    #[serde(rename = "parse_time_ms", serialize_with = "millis")]
    pub parse_time: Duration,
    #[serde(rename = "transform_time_ms", serialize_with = "millis")]
    pub transform_time: Duration,
    #[serde(rename = "solve_time_ms", serialize_with = "millis")]
    pub solve_time: Duration,
    pub summary: Option<StructuralSummary>,
    /// `Some(true)` for satisfiable, `Some(false)` for unsatisfiable, `None`
    /// when no solver ran or the file failed.
    pub satisfiable: Option<bool>,
    pub error: Option<String>,
}

impl BatchResult {
    #[must_use]
    pub const fn success(&self) -> bool {
        self.error.is_none()
    }

    #[must_use]
    pub fn total_time(&self) -> Duration {
        self.parse_time + self.transform_time + self.solve_time
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.path.file_name().map_or_else(
            || self.path.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        )
    }

    fn failed(path: &Path, solver: Option<SolverType>, error: String) -> Self {
        Self {
            path: path.to_path_buf(),
            solver,
            parse_time: Duration::ZERO,
            transform_time: Duration::ZERO,
            solve_time: Duration::ZERO,
            summary: None,
            satisfiable: None,
            error: Some(error),
        }
    }
}

/// Timing statistics over the successful results, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TimingSummary {
    pub mean_parse_ms: f64,
    pub mean_transform_ms: f64,
    pub mean_total_ms: f64,
    pub median_total_ms: f64,
    pub min_total_ms: f64,
    pub max_total_ms: f64,
}

/// Counts over a set of results. A file run with several solvers counts once
/// per solver.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub satisfiable: usize,
    pub unsatisfiable: usize,
    /// `None` when no result succeeded.
    pub timings: Option<TimingSummary>,
}

impl BatchSummary {
    #[must_use]
    pub fn of<'r>(results: impl IntoIterator<Item = &'r BatchResult>) -> Self {
        let (ok, failed): (Vec<&BatchResult>, Vec<&BatchResult>) =
            results.into_iter().partition(|r| r.success());

        Self {
            total: ok.len() + failed.len(),
            succeeded: ok.len(),
            failed: failed.len(),
            satisfiable: ok.iter().filter(|r| r.satisfiable == Some(true)).count(),
            unsatisfiable: ok.iter().filter(|r| r.satisfiable == Some(false)).count(),
            timings: timings(&ok),
        }
    }
}

/// The summary of one solver's results in a comparison run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SolverSummary {
    pub solver: SolverType,
    #[serde(flatten)]
    pub summary: BatchSummary,
}

impl SolverSummary {
    /// One summary per solver, in the order the solvers first appear.
    #[must_use]
    pub fn per_solver(results: &[BatchResult]) -> Vec<Self> {
        results
            .iter()
            .filter_map(|r| r.solver)
            .unique()
            .map(|solver| Self {
                solver,
                summary: BatchSummary::of(results.iter().filter(|r| r.solver == Some(solver))),
            })
            .collect()
    }
}

/// Everything a batch run produced, as saved by [`write_json`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport<'a> {
    pub summary: BatchSummary,
    pub solvers: Vec<SolverSummary>,
    pub results: &'a [BatchResult],
}

impl<'a> BatchReport<'a> {
    #[must_use]
    pub fn new(results: &'a [BatchResult]) -> Self {
        Self {
            summary: BatchSummary::of(results),
            solvers: SolverSummary::per_solver(results),
            results,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn timings(results: &[&BatchResult]) -> Option<TimingSummary> {
    if results.is_empty() {
        return None;
    }

    let ms = |d: Duration| d.as_secs_f64() * 1000.0;
    let mean = |values: &[f64]| values.iter().sum::<f64>() / values.len() as f64;

    let parse: Vec<f64> = results.iter().map(|r| ms(r.parse_time)).collect();
    let transform: Vec<f64> = results.iter().map(|r| ms(r.transform_time)).collect();
    let mut total: Vec<OrderedFloat<f64>> = results
        .iter()
        .map(|r| OrderedFloat(ms(r.total_time())))
        .collect();
    total.sort_unstable();

    let n = total.len();
    let median = if n % 2 == 0 {
        (total[n / 2 - 1].0 + total[n / 2].0) / 2.0
    } else {
        total[n / 2].0
    };
    let totals: Vec<f64> = total.iter().map(|t| t.0).collect();

    Some(TimingSummary {
        mean_parse_ms: mean(&parse),
        mean_transform_ms: mean(&transform),
        mean_total_ms: mean(&totals),
        median_total_ms: median,
        min_total_ms: total[0].0,
        max_total_ms: total[n - 1].0,
    })
}

/// Every `.cnf` file below `dir`, in file name order.
#[must_use]
pub fn cnf_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        log::warn!("not a directory: {}", dir.display());
        return Vec::new();
    }

    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|p| p.extension().is_some_and(|ext| ext == "cnf"))
        .collect()
}

/// Parses and transforms one file, then runs each selected solver on it.
///
/// Gives one result per solver, or a single result when no solver is selected.
/// All of a file's results share its parse and transform times.
#[must_use]
pub fn run_file(path: &Path, options: &BatchOptions) -> Vec<BatchResult> {
    let kinds = if options.solvers.is_empty() {
        vec![None]
    } else {
        options.solvers.iter().copied().map(Some).collect_vec()
    };

    let time = Instant::now();
    let formula = match parse_file(path) {
        Ok(f) => f,
        Err(e) => {
            log::warn!("{}: {e}", path.display());
            return kinds
                .into_iter()
                .map(|kind| BatchResult::failed(path, kind, e.to_string()))
                .collect();
        }
    };
    let parse_time = time.elapsed();

    let time = Instant::now();
    let summary = StructuralSummary::of(&formula);
    let transform_time = time.elapsed();

    kinds
        .into_iter()
        .map(|kind| {
            let (solve_time, satisfiable) = kind.map_or((Duration::ZERO, None), |kind| {
                let report_path = options.report_dir.as_ref().map(|dir| {
                    let stem = path
                        .file_stem()
                        .map_or_else(|| "formula".into(), |s| s.to_string_lossy().into_owned());
                    dir.join(format!("{stem}_{kind}.md"))
                });
                let solve_options = SolveOptions {
                    report_path,
                    margin: options.margin,
                    ..SolveOptions::default()
                };
                let outcome = solver::solve(kind, &formula, &solve_options);
                (outcome.elapsed, Some(outcome.solution.is_sat()))
            });

            BatchResult {
                path: path.to_path_buf(),
                solver: kind,
                parse_time,
                transform_time,
                solve_time,
                summary: Some(summary),
                satisfiable,
                error: None,
            }
        })
        .collect()
}

/// Runs [`run_file`] on every file from [`cnf_files`].
#[must_use]
pub fn run_dir(dir: &Path, options: &BatchOptions) -> Vec<BatchResult> {
    let files = cnf_files(dir);
    log::info!("found {} CNF files in {}", files.len(), dir.display());
    files.iter().flat_map(|f| run_file(f, options)).collect()
}

/// Writes `report` as pretty-printed JSON, creating missing parent directories.
///
/// # Errors
///
/// Any I/O or serialization error.
pub fn write_json(report: &BatchReport<'_>, path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush()?;
    log::debug!("wrote {} batch results to {}", report.results.len(), path.display());
    Ok(())
}
