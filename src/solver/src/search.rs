//! Per-phase search strategies.
//!
//! The first two phases descend greedily: the table stores exact
//! distances, so some turn always lowers the current depth by one and
//! the first such turn in the phase's scan order is taken. The last two
//! phases start from an arbitrary coset rather than the goal, so they
//! run an iterative-deepening DFS bounded by the stored depths.

use cube_core::{CubeState, Direction, Turn};
use log::error;

use crate::coords::Phase;
use crate::pruning::PhaseTable;

/// How a phase weaves its pruning table into a search.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum SearchStrategy {
    GreedyDescent,
    IterativeDeepening,
}

impl Phase {
    #[must_use]
    pub fn search_strategy(self) -> SearchStrategy {
        match self {
            Phase::EdgeOrientation | Phase::CornerOrientation => SearchStrategy::GreedyDescent,
            Phase::TetradSeparation | Phase::HalfTurnReduction => {
                SearchStrategy::IterativeDeepening
            }
        }
    }
}

/// Search for a turn sequence bringing `start` to the phase's goal
/// coset. Returns an empty (or partial) sequence when the table cannot
/// guide the search; the caller detects that through the final state.
#[must_use]
pub fn solve_phase(phase: Phase, table: &PhaseTable, start: &CubeState) -> Vec<Turn> {
    match phase.search_strategy() {
        SearchStrategy::GreedyDescent => greedy_descent(phase, table, start),
        SearchStrategy::IterativeDeepening => iterative_deepening(phase, table, start),
    }
}

fn greedy_descent(phase: Phase, table: &PhaseTable, start: &CubeState) -> Vec<Turn> {
    let mut state = start.clone();
    let mut solution = Vec::new();
    let Some(mut depth) = table.depth(phase.coord(&state)) else {
        error!("{phase:?}: starting coordinate is not in the table, abandoning the phase");
        return solution;
    };
    while depth > 0 {
        let mut descended = false;
        for &turn in phase.turn_set() {
            let mut next = state.clone();
            next.apply_turn(turn);
            if table.depth(phase.coord(&next)) == Some(depth - 1) {
                solution.push(turn);
                state = next;
                depth -= 1;
                descended = true;
                break;
            }
        }
        if !descended {
            // A complete table always offers a descending turn; report
            // instead of scanning forever.
            error!("{phase:?}: no turn lowers depth {depth}, abandoning the phase");
            return solution;
        }
    }
    solution
}

fn iterative_deepening(phase: Phase, table: &PhaseTable, start: &CubeState) -> Vec<Turn> {
    let mut solution = Vec::new();
    for limit in 0..=table.max_depth() {
        if depth_limited(phase, table, start, limit, &mut solution) {
            return solution;
        }
        debug_assert!(solution.is_empty());
    }
    solution
}

fn depth_limited(
    phase: Phase,
    table: &PhaseTable,
    state: &CubeState,
    limit: u8,
    solution: &mut Vec<Turn>,
) -> bool {
    let Some(depth) = table.depth(phase.coord(state)) else {
        return false;
    };
    if depth == 0 {
        return true;
    }
    if depth > limit || limit == 0 {
        return false;
    }
    for &turn in phase.turn_set() {
        let mut next = state.clone();
        next.apply_turn(turn);
        solution.push(turn);
        if depth_limited(phase, table, &next, limit - 1, solution) {
            return true;
        }
        solution.pop();
    }
    false
}

/// Collapse adjacent same-face turns, dropping pairs that cancel.
/// Phase boundaries can juxtapose turns of one face, so the pass steps
/// back after each collapse to catch newly adjacent pairs.
#[must_use]
pub fn simplify(turns: &[Turn]) -> Vec<Turn> {
    let mut result = turns.to_vec();
    let mut i = 0;
    while i + 1 < result.len() {
        if result[i].face != result[i + 1].face {
            i += 1;
            continue;
        }
        let quarter_turns =
            result[i].direction.quarter_turns() + result[i + 1].direction.quarter_turns();
        match Direction::from_quarter_turns(quarter_turns) {
            Some(direction) => {
                result[i] = Turn::new(result[i].face, direction);
                result.remove(i + 1);
            }
            None => {
                result.drain(i..=i + 1);
            }
        }
        i = i.saturating_sub(1);
    }
    result
}
