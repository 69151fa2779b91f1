//! Engine for the tube-sort puzzle.
//!
//! This crate provides the state-space core of the game: the board model
//! with its two movement rule regimes, a bounded breadth-first search that
//! decides whether a board is solvable within a move budget, and a stage
//! generator that retries random fills until one is provably solvable.
//! Rendering, timers and score persistence live elsewhere and consume these
//! pure functions.

pub mod board;
pub mod generator;
pub mod solver;

// Re-export main types
pub use board::{Board, BoardKey, Color, RuleMode, Tube, MAX_COLORS, MAX_TUBES, TUBE_CAPACITY};
pub use generator::{
    generate, generate_stage, random_fill, tube_count_for_stage, GenerationPolicy, VerifyBudget,
};
pub use solver::{solve, SolveReport, SolveStatus, SolverConfig};
