//! Deterministic scramble harness.
//!
//! Replays every scramble file in a directory plus a batch of random
//! scrambles, verifies each solution by hash comparison against the
//! solved state, and reports per-scramble and aggregate results. This
//! harness is the policeman for the degraded modes of the solver: a
//! missing table never raises an error on the solve path, it shows up
//! here as an unsolved scramble.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use cube_core::{ALL_TURNS, CubeState, Turn, format_turns, parse_turns};
use itertools::Itertools;
use log::{info, warn};

use crate::Solver;
use crate::{start, success};

/// How many random scrambles the harness appends after the fixed ones.
pub const RANDOM_SCRAMBLE_COUNT: usize = 9;
/// Length of each random scramble.
pub const RANDOM_SCRAMBLE_LEN: usize = 50;

/// The outcome of one scramble.
#[derive(Debug, Clone)]
pub struct ScrambleReport {
    pub name: String,
    pub scramble: Vec<Turn>,
    pub solved: bool,
    pub move_count: usize,
    pub duration: Duration,
}

/// Move-count and wall-time aggregates over the solved scrambles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    pub best_moves: usize,
    pub worst_moves: usize,
    pub average_moves: f64,
    pub fastest: Duration,
    pub slowest: Duration,
    pub average: Duration,
}

#[derive(Debug, Clone)]
pub struct SelfTestReport {
    pub scrambles: Vec<ScrambleReport>,
}

impl SelfTestReport {
    #[must_use]
    pub fn all_solved(&self) -> bool {
        !self.scrambles.is_empty() && self.scrambles.iter().all(|report| report.solved)
    }

    /// Aggregates over the scrambles, or `None` when nothing ran.
    #[must_use]
    pub fn aggregate(&self) -> Option<Aggregate> {
        let (best_moves, worst_moves) = self
            .scrambles
            .iter()
            .map(|report| report.move_count)
            .minmax()
            .into_option()?;
        let (fastest, slowest) = self
            .scrambles
            .iter()
            .map(|report| report.duration)
            .minmax()
            .into_option()?;
        let count = self.scrambles.len() as u32;
        Some(Aggregate {
            best_moves,
            worst_moves,
            average_moves: self
                .scrambles
                .iter()
                .map(|report| report.move_count)
                .sum::<usize>() as f64
                / f64::from(count),
            fastest,
            slowest,
            average: self
                .scrambles
                .iter()
                .map(|report| report.duration)
                .sum::<Duration>()
                / count,
        })
    }
}

fn run_scramble(solver: &Solver, name: String, scramble: Vec<Turn>) -> ScrambleReport {
    let scrambled = CubeState::default().with_turns(&scramble);
    let solve_start = Instant::now();
    let solution = solver.solve(&scrambled);
    let duration = solve_start.elapsed();
    let solved =
        scrambled.with_turns(&solution).state_hash() == CubeState::default().state_hash();
    info!(
        "{name}: {} in {} moves, {:.3}ms",
        if solved { "solved" } else { "NOT solved" },
        solution.len(),
        duration.as_secs_f64() * 1e3
    );
    ScrambleReport {
        name,
        scramble,
        solved,
        move_count: solution.len(),
        duration,
    }
}

/// Scramble files in `scramble_dir`, in file-name order.
fn fixed_scrambles(scramble_dir: &Path) -> Vec<(String, Result<Vec<Turn>, String>)> {
    let entries = match fs::read_dir(scramble_dir) {
        Ok(entries) => entries,
        Err(error) => {
            warn!("Could not read scramble directory {scramble_dir:?}: {error}");
            return Vec::new();
        }
    };
    let mut paths: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();
    paths
        .into_iter()
        .map(|path| {
            let name = path
                .file_name()
                .map_or_else(|| path.to_string_lossy().into_owned(), |n| {
                    n.to_string_lossy().into_owned()
                });
            let parsed = fs::read_to_string(&path)
                .map_err(|error| error.to_string())
                .and_then(|text| parse_turns(&text).map_err(|error| error.to_string()));
            (name, parsed)
        })
        .collect()
}

/// Run the harness: every scramble file in `scramble_dir` (if given),
/// then [`RANDOM_SCRAMBLE_COUNT`] random scrambles of
/// [`RANDOM_SCRAMBLE_LEN`] turns. Passing a seed makes the random batch
/// reproducible; `None` draws from entropy.
#[must_use]
pub fn run_self_tests(
    solver: &Solver,
    scramble_dir: Option<&Path>,
    seed: Option<u64>,
) -> SelfTestReport {
    info!(start!("Running self tests"));
    let mut scrambles = Vec::new();

    if let Some(scramble_dir) = scramble_dir {
        for (name, parsed) in fixed_scrambles(scramble_dir) {
            match parsed {
                Ok(scramble) => scrambles.push(run_scramble(solver, name, scramble)),
                Err(reason) => {
                    warn!("{name}: {reason}");
                    scrambles.push(ScrambleReport {
                        name,
                        scramble: Vec::new(),
                        solved: false,
                        move_count: 0,
                        duration: Duration::ZERO,
                    });
                }
            }
        }
    }

    let mut rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
    for index in 0..RANDOM_SCRAMBLE_COUNT {
        let scramble: Vec<Turn> = (0..RANDOM_SCRAMBLE_LEN)
            .map(|_| ALL_TURNS[rng.usize(..ALL_TURNS.len())])
            .collect();
        info!("random-{index}: {}", format_turns(&scramble));
        scrambles.push(run_scramble(solver, format!("random-{index}"), scramble));
    }

    let report = SelfTestReport { scrambles };
    if report.all_solved() {
        info!(success!("All {} scrambles solved"), report.scrambles.len());
    } else {
        warn!(
            "{} of {} scrambles failed",
            report
                .scrambles
                .iter()
                .filter(|scramble| !scramble.solved)
                .count(),
            report.scrambles.len()
        );
    }
    report
}
