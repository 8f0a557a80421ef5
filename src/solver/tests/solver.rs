use std::path::PathBuf;
use std::sync::OnceLock;

use cube_core::{ALL_TURNS, CubeState, Turn, TurnParseError, parse_turns};
use solver::{Phase, PhaseTables, Solver, run_self_tests};

const EXPECTED_ENTRIES: [u32; 4] = [2_048, 1_082_565, 29_400, 663_552];
const EXPECTED_MAX_DEPTHS: [u8; 4] = [7, 10, 13, 15];

static SOLVER: OnceLock<Solver> = OnceLock::new();

fn shared_solver() -> &'static Solver {
    SOLVER.get_or_init(|| Solver::new(PhaseTables::generate_all()))
}

fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{name}-{}", std::process::id()))
}

fn random_scramble(rng: &mut fastrand::Rng, length: usize) -> Vec<Turn> {
    (0..length)
        .map(|_| ALL_TURNS[rng.usize(..ALL_TURNS.len())])
        .collect()
}

fn assert_solves(solver: &Solver, scramble: &[Turn]) -> Vec<Turn> {
    let scrambled = CubeState::default().with_turns(scramble);
    let solution = solver.solve(&scrambled);
    let finished = scrambled.with_turns(&solution);
    assert_eq!(
        finished.state_hash(),
        CubeState::default().state_hash(),
        "scramble {} left {finished:?}",
        cube_core::format_turns(scramble)
    );
    solution
}

#[test_log::test]
fn tables_reach_the_known_sizes_and_depths() {
    // The strongest end-to-end check of the coordinate functions and
    // the turn action: any inconsistency shifts these counts.
    let tables = shared_solver().tables();
    for (index, phase) in Phase::ALL.into_iter().enumerate() {
        let table = tables.table(phase);
        assert_eq!(table.entries(), EXPECTED_ENTRIES[index], "{phase:?}");
        assert_eq!(table.max_depth(), EXPECTED_MAX_DEPTHS[index], "{phase:?}");
    }
}

#[test_log::test]
fn tables_round_trip_through_disk() {
    let tables = shared_solver().tables();
    let dir = scratch_dir("thistle-tables");
    tables.write_all(&dir).unwrap();
    let read_back = PhaseTables::load(&dir);
    for phase in Phase::ALL {
        std::fs::remove_file(dir.join(phase.table_file_name())).unwrap();
    }
    std::fs::remove_dir(&dir).unwrap();
    assert_eq!(tables, &read_back);
}

#[test_log::test]
fn corner_three_cycle_setup_solves() {
    assert_solves(shared_solver(), &parse_turns("R U R' U'").unwrap());
}

#[test_log::test]
fn classic_oll_solves() {
    assert_solves(shared_solver(), &parse_turns("F R U R' U' F'").unwrap());
}

#[test_log::test]
fn sune_solves() {
    assert_solves(shared_solver(), &parse_turns("R U2 R' U' R U' R'").unwrap());
}

#[test]
fn slice_turn_scrambles_are_rejected_before_solving() {
    assert_eq!(
        parse_turns("M U M U M U M U"),
        Err(TurnParseError::UnknownFace("M".to_owned()))
    );
}

#[test_log::test]
fn random_scrambles_solve_within_the_move_bound() {
    let solver = shared_solver();
    let mut rng = fastrand::Rng::with_seed(2_024);
    for _ in 0..25 {
        let scramble = random_scramble(&mut rng, 50);
        let solution = assert_solves(solver, &scramble);
        assert!(
            solution.len() <= 45,
            "{} moves for {}",
            solution.len(),
            cube_core::format_turns(&scramble)
        );
    }
}

#[test_log::test]
fn the_solved_state_needs_no_turns() {
    let solution = shared_solver().solve(&CubeState::default());
    assert!(solution.is_empty());
}

#[test_log::test]
fn solving_never_mutates_the_input_and_is_deterministic() {
    let solver = shared_solver();
    let scrambled =
        CubeState::default().with_turns(&parse_turns("B2 D' F L2 U R' F2 L D2 B U2").unwrap());
    let pristine = scrambled.clone();
    let first = solver.solve(&scrambled);
    assert_eq!(scrambled, pristine);
    let second = solver.solve(&scrambled);
    assert_eq!(first, second);
}

#[test_log::test]
fn phases_reach_their_goal_coordinates_in_order() {
    let solver = shared_solver();
    let tables = solver.tables();
    let mut rng = fastrand::Rng::with_seed(77);
    for _ in 0..1_000 {
        let mut state = CubeState::default().with_turns(&random_scramble(&mut rng, 30));
        for (phase_index, phase) in Phase::ALL.into_iter().enumerate() {
            let phase_solution = solver::solve_phase(phase, tables.table(phase), &state);
            state.apply_turns(&phase_solution);
            for earlier in &Phase::ALL[..=phase_index] {
                assert_eq!(earlier.coord(&state), Some(0), "{earlier:?} after {phase:?}");
            }
        }
        assert!(state.is_solved());
    }
}

#[test_log::test]
fn missing_tables_degrade_to_detectable_failures() {
    let solver = Solver::load(&scratch_dir("thistle-no-tables"));
    let scrambled = CubeState::default().with_turns(&parse_turns("R U R' U'").unwrap());
    let solution = solver.solve(&scrambled);
    assert!(solution.is_empty());
    assert!(!scrambled.with_turns(&solution).is_solved());
}

#[test_log::test]
fn self_test_harness_reports_fixed_and_random_scrambles() {
    let solver = shared_solver();
    let dir = scratch_dir("thistle-scrambles");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("a_sexy.txt"), "R U R' U'").unwrap();
    std::fs::write(dir.join("b_bogus.txt"), "R U M2").unwrap();

    let report = run_self_tests(solver, Some(&dir), Some(42));
    std::fs::remove_file(dir.join("a_sexy.txt")).unwrap();
    std::fs::remove_file(dir.join("b_bogus.txt")).unwrap();
    std::fs::remove_dir(&dir).unwrap();

    assert_eq!(
        report.scrambles.len(),
        2 + solver::selftest::RANDOM_SCRAMBLE_COUNT
    );
    assert!(report.scrambles[0].solved);
    assert!(!report.scrambles[1].solved, "bogus scramble must fail");
    assert!(!report.all_solved());
    assert!(
        report
            .scrambles
            .iter()
            .skip(2)
            .all(|scramble| scramble.solved && scramble.move_count <= 45)
    );
    let aggregate = report.aggregate().unwrap();
    assert!(aggregate.best_moves <= aggregate.worst_moves);

    // The seeded random batch reproduces exactly.
    let again = run_self_tests(solver, None, Some(42));
    for (left, right) in report.scrambles.iter().skip(2).zip(&again.scrambles) {
        assert_eq!(left.scramble, right.scramble);
        assert_eq!(left.move_count, right.move_count);
    }
}
