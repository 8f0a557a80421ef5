//! Coordinate projections onto the four phase quotient groups.
//!
//! Each phase keys its pruning table by a compact integer that
//! identifies a state's coset within the phase's quotient group. The
//! projections here are built from a handful of combinatorial ranks:
//! orientation digits, the combinatorial index of a position set, and
//! Lehmer codes of the permutation arrays. Solved projects to 0 in
//! every phase.

use std::sync::LazyLock;

use cube_core::{CORNERS, CubeState, EDGES, Turn, turn};

/// Binomial coefficients up to C(12, 12).
const BINOMIAL: [[u32; EDGES + 1]; EDGES + 1] = {
    let mut table = [[0; EDGES + 1]; EDGES + 1];
    let mut n = 0;
    while n <= EDGES {
        table[n][0] = 1;
        let mut k = 1;
        while k <= n {
            table[n][k] = table[n - 1][k - 1] + table[n - 1][k];
            k += 1;
        }
        n += 1;
    }
    table
};

const FACT_UNTIL_12: [u32; 13] = {
    let mut arr = [0; 13];
    arr[0] = 1;
    let mut i = 1;
    while i < arr.len() {
        arr[i] = arr[i - 1] * i as u32;
        i += 1;
    }
    arr
};

/// Renumbering of corner identifiers within their tetrad: tetrad A
/// walks UFR, UBL, DBR, DFL and tetrad B walks UBR, UFL, DFR, DBL.
/// Both orders happen to induce the same id-to-index table.
const TETRAD_INDEX: [usize; 4] = [1, 3, 2, 0];

/// The combinatorial index of a sorted set of `positions` chosen among
/// `0..n`: the number of k-subsets lexicographically before it.
fn rank_combination(positions: &[usize], n: usize) -> u32 {
    let k = positions.len();
    let mut rank = 0;
    let mut prev: Option<usize> = None;
    for (i, &position) in positions.iter().enumerate() {
        let lower = prev.map_or(0, |p| p + 1);
        for j in lower..position {
            rank += BINOMIAL[n - j - 1][k - i - 1];
        }
        prev = Some(position);
    }
    rank
}

/// Lehmer-code index of a permutation of `0..perm.len()`.
fn lehmer_rank(perm: &[u8]) -> u32 {
    let mut rank = 0;
    for (i, &value) in perm.iter().enumerate() {
        let smaller_after = perm[i + 1..].iter().filter(|&&other| other < value).count();
        rank += smaller_after as u32 * FACT_UNTIL_12[perm.len() - i - 1];
    }
    rank
}

/// Bits 0..10 are the orientations of the edges at positions 0..10; the
/// twelfth edge is implied by the even-flip invariant.
#[must_use]
pub fn edge_orient_coord(state: &CubeState) -> u32 {
    let mut coord = 0;
    for position in 0..EDGES - 1 {
        let flipped = state.edge_orient[state.edge_perm[position] as usize];
        coord |= u32::from(flipped) << position;
    }
    coord
}

/// Base-3 digits 0..6 are the orientations of the corners at positions
/// 0..6; the eighth corner is implied modulo 3.
#[must_use]
pub fn corner_orient_coord(state: &CubeState) -> u32 {
    let mut coord = 0;
    for position in 0..CORNERS - 1 {
        let twist = state.corner_orient[state.corner_perm[position] as usize];
        coord += u32::from(twist) * 3_u32.pow(position as u32);
    }
    coord
}

/// C(12,4) rank of the set of positions holding the four M-slice edges
/// (UF, DF, DB, UB), oriented so their home positions rank 0.
#[must_use]
pub fn m_slice_coord(state: &CubeState) -> u32 {
    let mut positions = [0; 4];
    let mut found = 0;
    // Walk top-down so the M home positions 8..12 come out as {0,1,2,3}.
    for position in 0..EDGES {
        if state.edge_perm[EDGES - 1 - position] >= 8 {
            positions[found] = position;
            found += 1;
        }
    }
    debug_assert_eq!(found, 4);
    rank_combination(&positions, EDGES)
}

/// C(8,4) rank of the placement of the four E-slice edges (BL, FL, FR,
/// BR) among the eight non-M positions, oriented so their home
/// positions rank 0. Positions holding M-slice edges are skipped by a
/// compressed running index; once phase 1 has parked the M slice those
/// are exactly positions 8..12, and phase 2's turn set keeps them
/// there.
#[must_use]
pub fn es_slice_coord(state: &CubeState) -> u32 {
    let mut positions = [0; 4];
    let mut found = 0;
    let mut index = 0;
    for position in (0..EDGES).rev() {
        let cubelet = state.edge_perm[position];
        if cubelet >= 8 {
            continue;
        }
        if cubelet >= 4 {
            positions[found] = index;
            found += 1;
        }
        index += 1;
    }
    debug_assert_eq!(found, 4);
    rank_combination(&positions, EDGES - 4)
}

/// C(8,4) rank of the set of corner positions holding tetrad A
/// (UFR, UBL, DBR, DFL).
#[must_use]
pub fn corner_tetrad_coord(state: &CubeState) -> u32 {
    let mut positions = [0; 4];
    let mut found = 0;
    for position in 0..CORNERS {
        if state.corner_perm[position] < 4 {
            positions[found] = position;
            found += 1;
        }
    }
    debug_assert_eq!(found, 4);
    rank_combination(&positions, CORNERS)
}

/// The combined twist class of the two corner tetrads, an integer in
/// 0..6. Within the phase-2 quotient group the residual bit of this
/// class also captures edge-permutation parity, which G2 membership
/// forces to agree with corner parity.
#[must_use]
pub fn tetrad_twist_coord(state: &CubeState) -> u32 {
    // Interleave both tetrads into one renumbered permutation: walking
    // positions in cube order, tetrad-A corners record their renumbered
    // id in encounter order, tetrad-B corners record their encounter
    // rank at their renumbered slot.
    let mut combined = [0_usize; CORNERS];
    let mut next_a = 0;
    let mut next_b = 0;
    for position in 0..CORNERS {
        let cubelet = state.corner_perm[position] as usize;
        let index = TETRAD_INDEX[cubelet & 3];
        if cubelet < 4 {
            combined[next_a] = index;
            next_a += 1;
        } else {
            combined[4 + index] = next_b;
            next_b += 1;
        }
    }
    let mut tetrad_b_perm = [0_usize; 4];
    for i in 0..4 {
        tetrad_b_perm[i] = combined[4 + combined[i]];
    }
    // XORing by the first element maps the last three to a permutation
    // of {1,2,3}.
    for i in 1..4 {
        tetrad_b_perm[i] ^= tetrad_b_perm[0];
    }
    (tetrad_b_perm[1] * 2 - 2 + usize::from(tetrad_b_perm[3] < tetrad_b_perm[2])) as u32
}

/// Sorted Lehmer codes of every permutation reachable from identity
/// under the given position cycles, by closure.
fn half_turn_lehmer_ranks<const N: usize>(generators: &[[u8; N]; 6]) -> Vec<u32> {
    let mut identity = [0_u8; N];
    for (position, value) in identity.iter_mut().enumerate() {
        *value = position as u8;
    }
    let mut seen = std::collections::HashSet::from([identity]);
    let mut frontier = vec![identity];
    while let Some(current) = frontier.pop() {
        for generator in generators {
            let mut next = [0_u8; N];
            for position in 0..N {
                next[position] = current[generator[position] as usize];
            }
            if seen.insert(next) {
                frontier.push(next);
            }
        }
    }
    let mut ranks: Vec<u32> = seen.iter().map(|perm| lehmer_rank(perm)).collect();
    ranks.sort_unstable();
    ranks
}

fn half_turn_generators() -> [CubeState; 6] {
    PHASE3_TURNS.map(|turn| CubeState::default().with_turns(&[turn]))
}

/// The 96 corner permutations of the half-turn group, as sorted Lehmer
/// codes. The binary-search position of a state's Lehmer code is its
/// dense phase-3 corner coordinate.
static CORNER_PERM_RANKS: LazyLock<Vec<u32>> = LazyLock::new(|| {
    let ranks = half_turn_lehmer_ranks(&half_turn_generators().map(|state| state.corner_perm));
    debug_assert_eq!(ranks.len(), 96);
    ranks
});

/// The 6912 edge permutations of the half-turn group, as sorted Lehmer
/// codes.
static EDGE_PERM_RANKS: LazyLock<Vec<u32>> = LazyLock::new(|| {
    let ranks = half_turn_lehmer_ranks(&half_turn_generators().map(|state| state.edge_perm));
    debug_assert_eq!(ranks.len(), 6912);
    ranks
});

/// Dense rank of the corner permutation among the 96 reachable in the
/// half-turn group, or `None` outside it.
#[must_use]
pub fn corner_perm_coord(state: &CubeState) -> Option<u32> {
    let rank = lehmer_rank(&state.corner_perm);
    CORNER_PERM_RANKS
        .binary_search(&rank)
        .ok()
        .map(|index| index as u32)
}

/// Dense rank of the edge permutation among the 6912 reachable in the
/// half-turn group, or `None` outside it.
#[must_use]
pub fn edge_perm_coord(state: &CubeState) -> Option<u32> {
    let rank = lehmer_rank(&state.edge_perm);
    EDGE_PERM_RANKS
        .binary_search(&rank)
        .ok()
        .map(|index| index as u32)
}

const PHASE0_TURNS: [Turn; 18] = cube_core::ALL_TURNS;

const PHASE1_TURNS: [Turn; 14] = [
    turn!(R, Normal),
    turn!(R, Prime),
    turn!(R, Double),
    turn!(L, Normal),
    turn!(L, Prime),
    turn!(L, Double),
    turn!(U, Double),
    turn!(D, Double),
    turn!(F, Normal),
    turn!(F, Prime),
    turn!(F, Double),
    turn!(B, Normal),
    turn!(B, Prime),
    turn!(B, Double),
];

const PHASE2_TURNS: [Turn; 10] = [
    turn!(R, Normal),
    turn!(R, Prime),
    turn!(R, Double),
    turn!(L, Normal),
    turn!(L, Prime),
    turn!(L, Double),
    turn!(U, Double),
    turn!(D, Double),
    turn!(F, Double),
    turn!(B, Double),
];

const PHASE3_TURNS: [Turn; 6] = [
    turn!(R, Double),
    turn!(L, Double),
    turn!(U, Double),
    turn!(D, Double),
    turn!(F, Double),
    turn!(B, Double),
];

/// One of the four group reductions of Thistlethwaite's algorithm, in
/// the order they are solved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Orient every edge.
    EdgeOrientation,
    /// Orient every corner and bring the M-slice edges into the M
    /// slice.
    CornerOrientation,
    /// Separate the E and S slices, sort the corners into their
    /// tetrads, and resolve the combined twist class.
    TetradSeparation,
    /// Finish within the half-turn group.
    HalfTurnReduction,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::EdgeOrientation,
        Phase::CornerOrientation,
        Phase::TetradSeparation,
        Phase::HalfTurnReduction,
    ];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The turns the phase is allowed to use: turns that keep the state
    /// inside the group the previous phases reached.
    #[must_use]
    pub fn turn_set(self) -> &'static [Turn] {
        match self {
            Phase::EdgeOrientation => &PHASE0_TURNS,
            Phase::CornerOrientation => &PHASE1_TURNS,
            Phase::TetradSeparation => &PHASE2_TURNS,
            Phase::HalfTurnReduction => &PHASE3_TURNS,
        }
    }

    /// Size of the coordinate space the phase's pruning table is keyed
    /// by. Every value is reachable except in the last phase, whose
    /// reachable count is 6912 * 96.
    #[must_use]
    pub fn coord_space(self) -> usize {
        match self {
            Phase::EdgeOrientation => 2_048,
            Phase::CornerOrientation => 2_187 * 495,
            Phase::TetradSeparation => 70 * 70 * 6,
            Phase::HalfTurnReduction => 6_912 * 96,
        }
    }

    /// File name of the phase's serialized pruning table.
    #[must_use]
    pub fn table_file_name(self) -> &'static str {
        match self {
            Phase::EdgeOrientation => "phase0.tbl",
            Phase::CornerOrientation => "phase1.tbl",
            Phase::TetradSeparation => "phase2.tbl",
            Phase::HalfTurnReduction => "phase3.tbl",
        }
    }

    /// Project a state onto the phase's coordinate. `None` when the
    /// state lies outside the phase's quotient group, which a correct
    /// search never produces except while probing phase 3.
    #[must_use]
    pub fn coord(self, state: &CubeState) -> Option<u32> {
        match self {
            Phase::EdgeOrientation => Some(edge_orient_coord(state)),
            Phase::CornerOrientation => {
                Some(corner_orient_coord(state) * 495 + m_slice_coord(state))
            }
            Phase::TetradSeparation => Some(
                (es_slice_coord(state) * 70 + corner_tetrad_coord(state)) * 6
                    + tetrad_twist_coord(state),
            ),
            Phase::HalfTurnReduction => {
                Some(edge_perm_coord(state)? * 96 + corner_perm_coord(state)?)
            }
        }
    }
}
