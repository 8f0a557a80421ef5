//! The cubelet-level state of the cube and the face-turn action on it.
//!
//! Both permutation arrays are indexed by position: `corner_perm[i]` is
//! the identifier of the corner cubelet currently sitting at position
//! `i`. Both orientation arrays are indexed by cubelet identifier, so a
//! cubelet's orientation travels with it when a turn cycles it to a new
//! position. Turn deltas are therefore applied through the permutation,
//! to `orient[perm[position]]`.
//!
//! The numbering of positions and identifiers coincides:
//! - Corners: UBL DFL DBR UFR UFL DBL DFR UBR = 0..7
//! - Edges: UL DL DR UR BL FL FR BR UF DF DB UB = 0..11

use crate::moves::{Direction, Face, Turn};

pub const CORNERS: usize = 8;
pub const EDGES: usize = 12;

/// The four corner positions and four edge positions cycled by a
/// clockwise quarter turn of one face, plus which orientations the turn
/// touches.
struct FaceCycle {
    corners: [usize; 4],
    edges: [usize; 4],
    twists_corners: bool,
    flips_edges: bool,
}

/// Corner-orientation deltas added at the cycled positions by a quarter
/// turn of a twisting face. The twist a cubelet picks up is determined
/// by the position it lands on, so the same deltas apply to clockwise
/// and counter-clockwise turns.
const CORNER_TWIST: [u8; 4] = [2, 1, 2, 1];

/// Per-face cycle constants, indexed by `Face as usize`.
const FACE_CYCLES: [FaceCycle; 6] = [
    // R: corners DBR DFR UFR UBR, edges UR BR DR FR
    FaceCycle {
        corners: [2, 6, 3, 7],
        edges: [3, 7, 2, 6],
        twists_corners: false,
        flips_edges: false,
    },
    // L: corners UBL UFL DFL DBL, edges FL DL BL UL
    FaceCycle {
        corners: [0, 4, 1, 5],
        edges: [5, 1, 4, 0],
        twists_corners: false,
        flips_edges: false,
    },
    // U: corners UBL UBR UFR UFL, edges UB UR UF UL
    FaceCycle {
        corners: [0, 7, 3, 4],
        edges: [11, 3, 8, 0],
        twists_corners: true,
        flips_edges: true,
    },
    // D: corners DFL DFR DBR DBL, edges DL DF DR DB
    FaceCycle {
        corners: [1, 6, 2, 5],
        edges: [1, 9, 2, 10],
        twists_corners: true,
        flips_edges: true,
    },
    // F: corners UFL UFR DFR DFL, edges UF FR DF FL
    FaceCycle {
        corners: [4, 3, 6, 1],
        edges: [8, 6, 9, 5],
        twists_corners: true,
        flips_edges: false,
    },
    // B: corners DBL DBR UBR UBL, edges BL DB BR UB
    FaceCycle {
        corners: [5, 2, 7, 0],
        edges: [4, 10, 7, 11],
        twists_corners: true,
        flips_edges: false,
    },
];

/// One configuration of the cube. `Default` is solved; anything else
/// is produced by applying turns to it or by copying a state
/// mid-search.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct CubeState {
    pub corner_perm: [u8; CORNERS],
    pub corner_orient: [u8; CORNERS],
    pub edge_perm: [u8; EDGES],
    pub edge_orient: [u8; EDGES],
}

impl Default for CubeState {
    fn default() -> CubeState {
        CubeState {
            corner_perm: const {
                let mut arr = [0; CORNERS];
                let mut i = 0;
                while i < CORNERS {
                    arr[i] = i as u8;
                    i += 1;
                }
                arr
            },
            corner_orient: [0; CORNERS],
            edge_perm: const {
                let mut arr = [0; EDGES];
                let mut i = 0;
                while i < EDGES {
                    arr[i] = i as u8;
                    i += 1;
                }
                arr
            },
            edge_orient: [0; EDGES],
        }
    }
}

fn cycle_forward<const N: usize>(perm: &mut [u8; N], cycle: &[usize; 4]) {
    let first = perm[cycle[0]];
    perm[cycle[0]] = perm[cycle[3]];
    perm[cycle[3]] = perm[cycle[2]];
    perm[cycle[2]] = perm[cycle[1]];
    perm[cycle[1]] = first;
}

fn cycle_backward<const N: usize>(perm: &mut [u8; N], cycle: &[usize; 4]) {
    let first = perm[cycle[0]];
    perm[cycle[0]] = perm[cycle[1]];
    perm[cycle[1]] = perm[cycle[2]];
    perm[cycle[2]] = perm[cycle[3]];
    perm[cycle[3]] = first;
}

impl CubeState {
    /// The solved state.
    #[must_use]
    pub fn new_solved() -> CubeState {
        CubeState::default()
    }

    fn apply_quarter(&mut self, face: Face, inverse: bool) {
        let cycle = &FACE_CYCLES[face as usize];
        if inverse {
            cycle_backward(&mut self.corner_perm, &cycle.corners);
            cycle_backward(&mut self.edge_perm, &cycle.edges);
        } else {
            cycle_forward(&mut self.corner_perm, &cycle.corners);
            cycle_forward(&mut self.edge_perm, &cycle.edges);
        }
        if cycle.twists_corners {
            for (&position, &delta) in cycle.corners.iter().zip(CORNER_TWIST.iter()) {
                let cubelet = self.corner_perm[position] as usize;
                self.corner_orient[cubelet] = (self.corner_orient[cubelet] + delta) % 3;
            }
        }
        if cycle.flips_edges {
            for &position in &cycle.edges {
                let cubelet = self.edge_perm[position] as usize;
                self.edge_orient[cubelet] ^= 1;
            }
        }
    }

    /// Applies a turn to the configuration in place.
    pub fn apply_turn(&mut self, turn: Turn) {
        match turn.direction {
            Direction::Normal => self.apply_quarter(turn.face, false),
            Direction::Prime => self.apply_quarter(turn.face, true),
            Direction::Double => {
                self.apply_quarter(turn.face, false);
                self.apply_quarter(turn.face, false);
            }
        }
    }

    /// Applies a sequence of turns, in order.
    pub fn apply_turns(&mut self, turns: &[Turn]) {
        for &turn in turns {
            self.apply_turn(turn);
        }
    }

    /// The configuration reached from this one by `turns`.
    #[must_use]
    pub fn with_turns(&self, turns: &[Turn]) -> CubeState {
        let mut next = self.clone();
        next.apply_turns(turns);
        next
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        *self == CubeState::default()
    }

    /// A hash of the configuration that is stable across runs and
    /// builds (FNV-1a over the four arrays), usable to compare states in
    /// persisted artifacts and test reports.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
        let mut hash = FNV_OFFSET;
        for &byte in self
            .corner_perm
            .iter()
            .chain(self.corner_orient.iter())
            .chain(self.edge_perm.iter())
            .chain(self.edge_orient.iter())
        {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        hash
    }

    /// Whether the configuration satisfies the invariants every state
    /// reachable from solved by face turns satisfies: both permutation
    /// arrays are bijections, the corner orientations sum to 0 mod 3,
    /// the edge orientations sum to 0 mod 2, and the two permutation
    /// parities agree.
    #[must_use]
    pub fn satisfies_global_invariants(&self) -> bool {
        let mut seen_corners = [false; CORNERS];
        for &cubelet in &self.corner_perm {
            let Some(seen) = seen_corners.get_mut(cubelet as usize) else {
                return false;
            };
            *seen = true;
        }
        let mut seen_edges = [false; EDGES];
        for &cubelet in &self.edge_perm {
            let Some(seen) = seen_edges.get_mut(cubelet as usize) else {
                return false;
            };
            *seen = true;
        }
        seen_corners.into_iter().all(|seen| seen)
            && seen_edges.into_iter().all(|seen| seen)
            && self.corner_orient.iter().map(|&o| u32::from(o)).sum::<u32>() % 3 == 0
            && self.edge_orient.iter().map(|&o| u32::from(o)).sum::<u32>() % 2 == 0
            && permutation_parity(&self.corner_perm) == permutation_parity(&self.edge_perm)
    }
}

/// Permutation parity by inversion count; `true` means odd.
#[must_use]
pub fn permutation_parity(perm: &[u8]) -> bool {
    let mut inversions = 0_usize;
    for (i, &left) in perm.iter().enumerate() {
        for &right in &perm[i + 1..] {
            if right < left {
                inversions += 1;
            }
        }
    }
    inversions % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::{ALL_TURNS, invert_turns, parse_turns};
    use crate::turn;

    fn random_turns(rng: &mut fastrand::Rng, count: usize) -> Vec<Turn> {
        (0..count)
            .map(|_| ALL_TURNS[rng.usize(..ALL_TURNS.len())])
            .collect()
    }

    #[test]
    fn solved_by_default() {
        assert!(CubeState::new_solved().is_solved());
        assert!(CubeState::default().satisfies_global_invariants());
    }

    #[test]
    fn every_turn_round_trips_with_its_inverse() {
        let mut rng = fastrand::Rng::with_seed(7);
        let start = CubeState::default().with_turns(&random_turns(&mut rng, 30));
        for turn in ALL_TURNS {
            let mut state = start.clone();
            state.apply_turn(turn);
            assert_ne!(state, start, "{turn} was a no-op");
            state.apply_turn(turn.inverse());
            assert_eq!(state, start, "{turn} then {} drifted", turn.inverse());
        }
    }

    #[test]
    fn quarter_turns_have_order_four() {
        for turn in ALL_TURNS {
            let mut state = CubeState::default();
            let order = match turn.direction {
                Direction::Double => 2,
                _ => 4,
            };
            for _ in 0..order {
                state.apply_turn(turn);
            }
            assert!(state.is_solved(), "{turn} does not have order {order}");
        }
    }

    #[test]
    fn half_turn_is_two_quarter_turns() {
        for face in [Face::R, Face::L, Face::U, Face::D, Face::F, Face::B] {
            let mut doubled = CubeState::default();
            doubled.apply_turn(Turn::new(face, Direction::Double));
            let mut quartered = CubeState::default();
            quartered.apply_turn(Turn::new(face, Direction::Normal));
            quartered.apply_turn(Turn::new(face, Direction::Normal));
            assert_eq!(doubled, quartered);
        }
    }

    #[test]
    fn half_turns_leave_orientations_unchanged() {
        let mut rng = fastrand::Rng::with_seed(11);
        let start = CubeState::default().with_turns(&random_turns(&mut rng, 40));
        for face in [Face::R, Face::L, Face::U, Face::D, Face::F, Face::B] {
            let mut state = start.clone();
            state.apply_turn(Turn::new(face, Direction::Double));
            assert_eq!(state.corner_orient, start.corner_orient);
            assert_eq!(state.edge_orient, start.edge_orient);
        }
    }

    #[test]
    fn only_u_and_d_quarter_turns_flip_edges() {
        for turn in ALL_TURNS {
            let mut state = CubeState::default();
            state.apply_turn(turn);
            let flipped = state.edge_orient.iter().filter(|&&o| o == 1).count();
            let expected = match (turn.face, turn.direction) {
                (Face::U | Face::D, Direction::Normal | Direction::Prime) => 4,
                _ => 0,
            };
            assert_eq!(flipped, expected, "{turn}");
        }
    }

    #[test]
    fn sequences_round_trip_with_their_inverse() {
        let mut rng = fastrand::Rng::with_seed(99);
        for _ in 0..50 {
            let start = CubeState::default().with_turns(&random_turns(&mut rng, 20));
            let sequence = random_turns(&mut rng, 50);
            let mut state = start.with_turns(&sequence);
            state.apply_turns(&invert_turns(&sequence));
            assert_eq!(state, start);
        }
    }

    #[test]
    fn global_invariants_hold_under_random_walks() {
        let mut rng = fastrand::Rng::with_seed(5);
        let mut state = CubeState::default();
        for _ in 0..500 {
            state.apply_turn(ALL_TURNS[rng.usize(..ALL_TURNS.len())]);
            assert!(state.satisfies_global_invariants());
        }
    }

    #[test]
    fn sexy_move_has_order_six() {
        let sexy = parse_turns("R U R' U'").unwrap();
        let mut state = CubeState::default();
        for _ in 0..6 {
            state.apply_turns(&sexy);
        }
        assert!(state.is_solved());
        state.apply_turns(&sexy);
        assert!(!state.is_solved());
    }

    #[test]
    fn state_hash_distinguishes_and_reproduces() {
        let solved = CubeState::default();
        let mut turned = solved.clone();
        turned.apply_turn(turn!(R, Normal));
        assert_ne!(solved.state_hash(), turned.state_hash());
        assert_eq!(turned.state_hash(), turned.clone().state_hash());
        turned.apply_turn(turn!(R, Prime));
        assert_eq!(solved.state_hash(), turned.state_hash());
    }

    #[test]
    fn parity_helper_counts_inversions() {
        assert!(!permutation_parity(&[0, 1, 2, 3]));
        assert!(permutation_parity(&[1, 0, 2, 3]));
        assert!(!permutation_parity(&[1, 0, 3, 2]));
    }
}
