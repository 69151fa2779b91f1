//! CLI entry point for the tube-sort engine.
//!
//! Usage:
//!   tube-sort-engine generate [options]
//!   tube-sort-engine solve <board.json> [options]
//!   tube-sort-engine solve --stdin [options]
//!
//! Boards are plain nested JSON arrays, bottom-to-top per tube, e.g.
//! `[[1,2],[2,1],[]]`. `generate` prints a board; `solve` reads one and
//! prints the search verdict.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;

use tube_sort_engine::{
    generate, random_fill, solve, tube_count_for_stage, Board, GenerationPolicy, RuleMode,
    SolveStatus, SolverConfig, VerifyBudget, MAX_COLORS, MAX_TUBES, TUBE_CAPACITY,
};

#[derive(Parser)]
#[command(name = "tube-sort-engine")]
#[command(about = "Bounded BFS solver and stage generator for tube-sort puzzles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a random stage board
    Generate {
        /// Number of tubes (one stays empty)
        #[arg(long, default_value = "6")]
        tubes: usize,

        /// Derive the tube count from a stage number instead of --tubes
        #[arg(long)]
        stage: Option<u32>,

        /// Rule mode: easy (unrestricted) or hard (color-matched)
        #[arg(long, default_value = "hard")]
        mode: String,

        /// Generation policy: auto, unconditional, verified, or quick
        #[arg(long, default_value = "auto")]
        policy: String,

        /// RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Decide whether a board is solvable within a move budget
    Solve {
        /// Path to board JSON file (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Read board from stdin instead of a file
        #[arg(long)]
        stdin: bool,

        /// Rule mode: easy (unrestricted) or hard (color-matched)
        #[arg(long, default_value = "hard")]
        mode: String,

        /// Maximum solution length considered
        #[arg(long, default_value = "50")]
        move_limit: u32,

        /// Abort the search past this many visited states
        #[arg(long, default_value = "10000")]
        visited_cap: usize,
    },
}

/// Output format for generate
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateOutput {
    mode: RuleMode,
    tube_count: usize,
    board: Board,
}

/// Output format for solve
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveOutput {
    solvable: bool,
    status: SolveStatus,
    moves: u32,
    states_visited: usize,
}

fn parse_mode(s: &str) -> RuleMode {
    match s {
        "easy" | "unrestricted" => RuleMode::Unrestricted,
        "hard" | "color-matched" | "matched" => RuleMode::ColorMatched,
        other => {
            eprintln!("Error: unknown mode '{}' (expected easy or hard)", other);
            std::process::exit(1);
        }
    }
}

/// Reject boards the core's preconditions exclude before handing them to the
/// search.
fn check_board(board: &Board) -> Result<(), String> {
    if board.tubes.len() < 2 || board.tubes.len() > MAX_TUBES {
        return Err(format!(
            "board must have 2..={} tubes, got {}",
            MAX_TUBES,
            board.tubes.len()
        ));
    }
    for (i, tube) in board.tubes.iter().enumerate() {
        if tube.len() > TUBE_CAPACITY {
            return Err(format!("tube {} exceeds capacity {}", i, TUBE_CAPACITY));
        }
        if let Some(&c) = tube.0.iter().find(|&&c| c == 0 || c > MAX_COLORS) {
            return Err(format!("tube {} holds invalid color {}", i, c));
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            tubes,
            stage,
            mode,
            policy,
            seed,
        } => {
            let mode = parse_mode(&mode);
            let tube_count = match stage {
                Some(stage) => tube_count_for_stage(stage, mode),
                None => tubes,
            };
            if tube_count < 2 || tube_count > MAX_TUBES {
                eprintln!("Error: tube count must be in 2..={}", MAX_TUBES);
                std::process::exit(1);
            }

            let mut rng = match seed {
                Some(seed) => SmallRng::seed_from_u64(seed),
                None => SmallRng::from_entropy(),
            };

            let board = match policy.as_str() {
                "unconditional" => random_fill(tube_count, &mut rng),
                "verified" => generate(
                    tube_count,
                    mode,
                    &GenerationPolicy::Verified(VerifyBudget::general()),
                    &mut rng,
                ),
                "quick" => generate(
                    tube_count,
                    mode,
                    &GenerationPolicy::Verified(VerifyBudget::quick()),
                    &mut rng,
                ),
                "auto" => {
                    let policy = match mode {
                        RuleMode::Unrestricted => GenerationPolicy::Unconditional,
                        RuleMode::ColorMatched if tube_count <= 8 => {
                            GenerationPolicy::Verified(VerifyBudget::quick())
                        }
                        RuleMode::ColorMatched => GenerationPolicy::Verified(VerifyBudget::general()),
                    };
                    generate(tube_count, mode, &policy, &mut rng)
                }
                other => {
                    eprintln!(
                        "Error: unknown policy '{}' (expected auto, unconditional, verified or quick)",
                        other
                    );
                    std::process::exit(1);
                }
            };

            let output = GenerateOutput {
                mode,
                tube_count,
                board,
            };
            println!("{}", serde_json::to_string_pretty(&output).unwrap());
        }

        Commands::Solve {
            file,
            stdin,
            mode,
            move_limit,
            visited_cap,
        } => {
            let mode = parse_mode(&mode);

            let json_content = if stdin {
                let mut buffer = String::new();
                io::stdin()
                    .read_to_string(&mut buffer)
                    .expect("Failed to read from stdin");
                buffer
            } else if let Some(path) = file {
                fs::read_to_string(&path)
                    .unwrap_or_else(|e| panic!("Failed to read file {:?}: {}", path, e))
            } else {
                eprintln!("Error: Must provide either a file path or --stdin");
                std::process::exit(1);
            };

            let board: Board = match serde_json::from_str(&json_content) {
                Ok(b) => b,
                Err(e) => {
                    eprintln!("Error parsing board JSON: {}", e);
                    std::process::exit(1);
                }
            };
            if let Err(e) = check_board(&board) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }

            let config = SolverConfig {
                move_limit,
                visited_cap,
            };
            let report = solve(&board, mode, &config);

            let output = SolveOutput {
                solvable: report.solvable(),
                status: report.status,
                moves: report.moves,
                states_visited: report.states_visited,
            };
            println!("{}", serde_json::to_string_pretty(&output).unwrap());

            if output.solvable {
                std::process::exit(0);
            } else {
                std::process::exit(1);
            }
        }
    }
}
