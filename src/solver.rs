//! Bounded breadth-first solvability search.
//!
//! Explores the board-transition graph from an initial board: an edge exists
//! from B to B' iff some legal move transforms B into B'. Because BFS
//! processes nodes in non-decreasing move-count order, the first completed
//! board dequeued yields a minimum-length solution among the states the
//! search enumerated (the caps below can turn that into a lower bound when
//! they bite first).
//!
//! Each call is a fresh, self-contained run with its own frontier and
//! visited set; there is no shared or persisted search state.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::board::{Board, BoardKey, RuleMode};

/// Caps for one search run.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Nodes at this depth are not expanded further.
    pub move_limit: u32,
    /// Circuit breaker: abort once the visited set grows past this size.
    pub visited_cap: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            move_limit: 50,
            visited_cap: 10_000,
        }
    }
}

impl SolverConfig {
    /// No depth bound; only the visited cap limits the search.
    pub fn unbounded_moves() -> Self {
        Self {
            move_limit: u32::MAX,
            visited_cap: 10_000,
        }
    }
}

/// How a search run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveStatus {
    /// A completed board was reached within the caps.
    Solved,
    /// The frontier emptied: no completion is reachable within the move
    /// limit.
    Exhausted,
    /// The visited cap tripped before the frontier emptied. Treated as
    /// unsolvable for play, but nothing was proven.
    Aborted,
}

/// Result of a search run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveReport {
    pub status: SolveStatus,
    /// Solution length when solved; otherwise the configured move limit.
    pub moves: u32,
    /// Size of the visited set when the run ended.
    pub states_visited: usize,
}

impl SolveReport {
    pub fn solvable(&self) -> bool {
        self.status == SolveStatus::Solved
    }
}

/// Decide whether `board` can be completed under `mode` within the caps.
///
/// Expansion order is fixed (`from` then `to`, ascending), so for a given
/// board the sequence of visited states is deterministic and reproducible.
pub fn solve(board: &Board, mode: RuleMode, config: &SolverConfig) -> SolveReport {
    let mut visited: HashSet<BoardKey> = HashSet::new();
    let mut frontier: VecDeque<(Board, u32)> = VecDeque::new();

    visited.insert(board.canonical_key());
    frontier.push_back((board.clone(), 0));

    while let Some((current, moves)) = frontier.pop_front() {
        if visited.len() > config.visited_cap {
            return SolveReport {
                status: SolveStatus::Aborted,
                moves: config.move_limit,
                states_visited: visited.len(),
            };
        }

        if current.is_completed() {
            return SolveReport {
                status: SolveStatus::Solved,
                moves,
                states_visited: visited.len(),
            };
        }

        if moves >= config.move_limit {
            continue;
        }

        let n = current.tubes.len();
        for from in 0..n {
            for to in 0..n {
                if !current.can_move(from, to, mode) {
                    continue;
                }
                let next = current.apply_move(from, to);
                let key = next.canonical_key();
                if visited.insert(key) {
                    frontier.push_back((next, moves + 1));
                }
            }
        }
    }

    SolveReport {
        status: SolveStatus::Exhausted,
        moves: config.move_limit,
        states_visited: visited.len(),
    }
}
