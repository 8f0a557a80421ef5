//! Thistlethwaite's four-phase solver for the 3x3 Rubik's Cube.
//!
//! A scramble is reduced through the nested groups G0 ⊃ G1 ⊃ G2 ⊃ G3 ⊃
//! {e}: orient the edges, orient the corners while parking the M-slice
//! edges, separate the remaining slices and tetrads, then finish with
//! half turns. Each phase looks its current coset up in a precomputed
//! breadth-first table ([`pruning::PhaseTable`]) and either descends
//! greedily or runs a depth-bounded IDDFS ([`search`]). The
//! concatenated phase solutions are cleaned of redundant same-face
//! turns before being returned.
//!
//! The solver trades move-optimality for tiny tables and a simple
//! search: solves finish well under a second and never exceed 45
//! half-turn-metric moves.

#![warn(clippy::pedantic)]
#![allow(
    clippy::similar_names,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]

pub mod coords;
pub mod pruning;
pub mod search;
pub mod selftest;

use std::io;
use std::path::Path;

use cube_core::{CubeState, Turn, format_turns};
use log::debug;

pub use coords::Phase;
pub use pruning::{PhaseTable, PhaseTables, TableLoadError};
pub use search::{SearchStrategy, simplify, solve_phase};
pub use selftest::{Aggregate, ScrambleReport, SelfTestReport, run_self_tests};

#[macro_export]
macro_rules! start {
    ($msg:expr) => {
        concat!("⏳ ", $msg)
    };
}

#[macro_export]
macro_rules! working {
    ($msg:expr) => {
        concat!("🛠  ", $msg)
    };
}

#[macro_export]
macro_rules! success {
    ($msg:expr) => {
        concat!("✅ ", $msg)
    };
}

/// The solver facade: four loaded phase tables and the phase-chaining
/// logic. Tables are immutable once constructed, so one `Solver` may be
/// shared freely across threads; each solve works on a private copy of
/// the input state.
pub struct Solver {
    tables: PhaseTables,
}

impl Solver {
    #[must_use]
    pub fn new(tables: PhaseTables) -> Solver {
        Solver { tables }
    }

    /// Load the four tables from `table_dir`. Missing or corrupt
    /// tables degrade to empty ones with a logged warning rather than
    /// failing construction; the self-test harness exposes the damage.
    #[must_use]
    pub fn load(table_dir: &Path) -> Solver {
        Solver::new(PhaseTables::load(table_dir))
    }

    #[must_use]
    pub fn tables(&self) -> &PhaseTables {
        &self.tables
    }

    /// Solve a scramble: the returned turns bring `state` to the solved
    /// state. The caller's state is never mutated.
    ///
    /// For identical input and identical table contents the result is
    /// deterministic. With damaged tables the result may be empty or
    /// wrong, never an error; callers verify by replaying.
    #[must_use]
    pub fn solve(&self, state: &CubeState) -> Vec<Turn> {
        let mut working = state.clone();
        let mut solution: Vec<Turn> = Vec::new();
        for phase in Phase::ALL {
            let phase_solution = search::solve_phase(phase, self.tables.table(phase), &working);
            debug!("{phase:?}: {}", format_turns(&phase_solution));
            working.apply_turns(&phase_solution);
            solution.extend(phase_solution);
        }
        search::simplify(&solution)
    }
}

/// Offline utility: generate all four phase tables and write them into
/// `table_dir`.
///
/// # Errors
///
/// On failure to create the directory or write a table file.
pub fn generate_all_tables(table_dir: &Path) -> io::Result<()> {
    PhaseTables::generate_all().write_all(table_dir)
}
