//! Pruning tables: the exact BFS distance from the phase goal for
//! every reachable phase coordinate, plus their on-disk form.
//!
//! Each table is dense: a flat byte per coordinate, with `0xFF` marking
//! coordinates the phase's turn set never reaches. Completeness is what
//! the searches rely on: whenever a coordinate has depth `d > 0`, some
//! turn in the phase's set leads to a coordinate of depth `d - 1`.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use cube_core::CubeState;
use log::{debug, info, warn};
use thiserror::Error;

use crate::coords::Phase;
use crate::{start, success, working};

const UNREACHED: u8 = u8::MAX;

/// How often the generation BFS reports progress, in visited states.
const PROGRESS_INTERVAL: u32 = 250_000;

#[derive(Debug, Error)]
pub enum TableLoadError {
    #[error("could not read pruning table {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("pruning table {path:?} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

/// The distance-to-goal map of a single phase.
#[derive(Debug, PartialEq, Eq)]
pub struct PhaseTable {
    phase: Phase,
    depths: Vec<u8>,
    entries: u32,
    max_depth: u8,
}

impl PhaseTable {
    /// A table with no reachable coordinates. Searching against it
    /// yields empty solutions; the self-test harness flags the
    /// resulting unsolved states.
    #[must_use]
    pub fn empty(phase: Phase) -> PhaseTable {
        PhaseTable {
            phase,
            depths: vec![UNREACHED; phase.coord_space()],
            entries: 0,
            max_depth: 0,
        }
    }

    /// Breadth-first generation from the solved state under the
    /// phase's turn set, recording the depth of every coordinate the
    /// first time it is seen.
    #[must_use]
    pub fn generate(phase: Phase) -> PhaseTable {
        info!(start!("Generating the {:?} pruning table"), phase);
        let generate_start = Instant::now();

        let mut table = PhaseTable::empty(phase);
        let solved = CubeState::default();
        let root = phase
            .coord(&solved)
            .expect("the solved state projects into every phase");
        table.depths[root as usize] = 0;
        table.entries = 1;

        let mut queue = VecDeque::from([(solved, 0_u8)]);
        let mut visited = 0_u32;
        while let Some((state, depth)) = queue.pop_front() {
            visited += 1;
            if visited % PROGRESS_INTERVAL == 0 {
                debug!(
                    working!("{:?}: {} coordinates seen at depth <= {}"),
                    phase,
                    table.entries,
                    depth + 1
                );
            }
            for &turn in phase.turn_set() {
                let mut next = state.clone();
                next.apply_turn(turn);
                let Some(coord) = phase.coord(&next) else {
                    continue;
                };
                let slot = &mut table.depths[coord as usize];
                if *slot == UNREACHED {
                    *slot = depth + 1;
                    table.entries += 1;
                    table.max_depth = table.max_depth.max(depth + 1);
                    queue.push_back((next, depth + 1));
                }
            }
        }

        info!(
            success!("{:?} table: {} coordinates, max depth {}, {:.3}s"),
            phase,
            table.entries,
            table.max_depth,
            generate_start.elapsed().as_secs_f64()
        );
        table
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of reachable coordinates recorded in the table.
    #[must_use]
    pub fn entries(&self) -> u32 {
        self.entries
    }

    #[must_use]
    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    /// Distance to the phase goal, or `None` for an absent coordinate
    /// (either the projection failed or the coordinate was never
    /// reached).
    #[must_use]
    pub fn depth(&self, coord: Option<u32>) -> Option<u8> {
        match self.depths.get(coord? as usize) {
            None | Some(&UNREACHED) => None,
            Some(&depth) => Some(depth),
        }
    }

    /// Serialize as little-endian `u32 count` followed by `count`
    /// records of `u32 coord, u32 depth`, in coordinate order.
    ///
    /// # Errors
    ///
    /// On I/O failure.
    pub fn write(&self, path: &Path) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(&self.entries.to_le_bytes())?;
        for (coord, &depth) in self.depths.iter().enumerate() {
            if depth != UNREACHED {
                writer.write_all(&(coord as u32).to_le_bytes())?;
                writer.write_all(&u32::from(depth).to_le_bytes())?;
            }
        }
        writer.flush()
    }

    /// Deserialize a table written by [`PhaseTable::write`].
    ///
    /// # Errors
    ///
    /// [`TableLoadError::Io`] when the file cannot be read (including
    /// a missing file) and [`TableLoadError::Corrupt`] when its
    /// contents do not describe a well-formed table for this phase.
    pub fn read(phase: Phase, path: &Path) -> Result<PhaseTable, TableLoadError> {
        let bytes = fs::read(path).map_err(|source| TableLoadError::Io {
            path: path.to_owned(),
            source,
        })?;
        let corrupt = |reason: String| TableLoadError::Corrupt {
            path: path.to_owned(),
            reason,
        };

        if bytes.len() < 4 {
            return Err(corrupt("missing entry-count header".to_owned()));
        }
        let count = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let expected_len = 4 + count as usize * 8;
        if bytes.len() != expected_len {
            return Err(corrupt(format!(
                "expected {expected_len} bytes for {count} records, found {}",
                bytes.len()
            )));
        }

        let mut table = PhaseTable::empty(phase);
        for record in bytes[4..].chunks_exact(8) {
            let coord = u32::from_le_bytes(record[0..4].try_into().unwrap());
            let depth = u32::from_le_bytes(record[4..8].try_into().unwrap());
            if coord as usize >= phase.coord_space() {
                return Err(corrupt(format!("coordinate {coord} out of range")));
            }
            if depth >= u32::from(UNREACHED) {
                return Err(corrupt(format!("depth {depth} out of range")));
            }
            let slot = &mut table.depths[coord as usize];
            if *slot != UNREACHED {
                return Err(corrupt(format!("duplicate coordinate {coord}")));
            }
            *slot = depth as u8;
            table.entries += 1;
            table.max_depth = table.max_depth.max(depth as u8);
        }
        Ok(table)
    }
}

/// The four phase tables the solver searches against.
#[derive(Debug, PartialEq, Eq)]
pub struct PhaseTables {
    tables: [PhaseTable; 4],
}

impl PhaseTables {
    /// Generate all four tables in memory.
    #[must_use]
    pub fn generate_all() -> PhaseTables {
        PhaseTables {
            tables: Phase::ALL.map(PhaseTable::generate),
        }
    }

    /// Load all four tables from `table_dir`. A missing or corrupt
    /// file degrades that phase to an empty table with a logged
    /// warning; `solve` then returns sequences the self-test harness
    /// will flag.
    #[must_use]
    pub fn load(table_dir: &Path) -> PhaseTables {
        PhaseTables {
            tables: Phase::ALL.map(|phase| {
                let path = table_dir.join(phase.table_file_name());
                match PhaseTable::read(phase, &path) {
                    Ok(table) => {
                        info!(
                            "Loaded the {phase:?} table: {} coordinates, max depth {}",
                            table.entries(),
                            table.max_depth()
                        );
                        table
                    }
                    Err(error) => {
                        warn!("{error}; continuing with an empty {phase:?} table");
                        PhaseTable::empty(phase)
                    }
                }
            }),
        }
    }

    /// Load each table from `table_dir`, generating and writing any
    /// that is missing or unreadable.
    ///
    /// # Errors
    ///
    /// On failure to create the directory or write a freshly generated
    /// table.
    pub fn load_or_generate(table_dir: &Path) -> io::Result<PhaseTables> {
        fs::create_dir_all(table_dir)?;
        let mut tables = Vec::with_capacity(Phase::ALL.len());
        for phase in Phase::ALL {
            let path = table_dir.join(phase.table_file_name());
            match PhaseTable::read(phase, &path) {
                Ok(table) => tables.push(table),
                Err(error) => {
                    debug!("{error}; generating");
                    let table = PhaseTable::generate(phase);
                    table.write(&path)?;
                    tables.push(table);
                }
            }
        }
        Ok(PhaseTables {
            tables: tables.try_into().expect("one table per phase"),
        })
    }

    /// Write all four tables into `table_dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// On I/O failure.
    pub fn write_all(&self, table_dir: &Path) -> io::Result<()> {
        fs::create_dir_all(table_dir)?;
        for table in &self.tables {
            table.write(&table_dir.join(table.phase().table_file_name()))?;
        }
        Ok(())
    }

    #[must_use]
    pub fn table(&self, phase: Phase) -> &PhaseTable {
        &self.tables[phase.index()]
    }
}
