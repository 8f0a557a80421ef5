use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use color_eyre::eyre::eyre;
use cube_core::{CubeState, format_turns, parse_turns};
use env_logger::TimestampPrecision;
use log::LevelFilter;
use solver::{Solver, generate_all_tables, run_self_tests};

/// Solves scrambles of the 3x3 Rubik's Cube with Thistlethwaite's
/// four-phase reduction
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Directory holding the four phase-table files
    #[arg(long, default_value = "tables", global = true)]
    tables: PathBuf,
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the four phase tables and write them to the table
    /// directory
    GenTables,
    /// Solve a scramble given as whitespace-separated turn tokens
    Solve {
        /// The scramble, e.g. `R U R' U'`
        scramble: Vec<String>,
    },
    /// Replay scramble files plus nine random scrambles and verify
    /// every solution
    SelfTest {
        /// Directory of scramble files, one token sequence per file
        #[arg(long)]
        scrambles: Option<PathBuf>,
        /// Seed for the random scrambles; drawn from entropy when
        /// omitted
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    match cli.command {
        Commands::GenTables => {
            generate_all_tables(&cli.tables)?;
        }
        Commands::Solve { scramble } => {
            let turns = parse_turns(&scramble.join(" "))?;
            if turns.is_empty() {
                return Err(eyre!("no scramble given"));
            }
            let scrambled = CubeState::default().with_turns(&turns);
            let solver = Solver::load(&cli.tables);
            let solution = solver.solve(&scrambled);
            if !scrambled.with_turns(&solution).is_solved() {
                return Err(eyre!(
                    "no solution found; run `thistle gen-tables` to build the phase tables"
                ));
            }
            println!("{}", format_turns(&solution));
        }
        Commands::SelfTest { scrambles, seed } => {
            let solver = Solver::load(&cli.tables);
            let report = run_self_tests(&solver, scrambles.as_deref(), seed);
            for scramble in &report.scrambles {
                println!(
                    "{}  {:>2} moves  {:>9.3} ms  {}",
                    if scramble.solved { "  ok" } else { "FAIL" },
                    scramble.move_count,
                    scramble.duration.as_secs_f64() * 1e3,
                    scramble.name
                );
            }
            if let Some(aggregate) = report.aggregate() {
                println!(
                    "moves: {} best / {:.1} avg / {} worst",
                    aggregate.best_moves, aggregate.average_moves, aggregate.worst_moves
                );
                println!(
                    "time:  {:.3} ms best / {:.3} ms avg / {:.3} ms worst",
                    aggregate.fastest.as_secs_f64() * 1e3,
                    aggregate.average.as_secs_f64() * 1e3,
                    aggregate.slowest.as_secs_f64() * 1e3
                );
            }
            if !report.all_solved() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
