//! Board representation for the tube-sort puzzle.
//!
//! A board is an ordered sequence of tubes; each tube is a bounded stack of
//! color tokens stored bottom to top. Empty slots are never represented:
//! tubes are variable-length stacks, not fixed arrays with sentinels.
//!
//! Boards serialize as plain nested arrays (`[[1,2],[2,1],[]]`) so they match
//! the JSON the gameplay layer exchanges.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Maximum number of tokens a tube can hold.
pub const TUBE_CAPACITY: usize = 5;

/// Highest color identifier; tokens range over `1..=MAX_COLORS`.
pub const MAX_COLORS: u8 = 7;

/// Upper bound on tubes per board.
pub const MAX_TUBES: usize = 12;

/// A color token. Zero is never stored.
pub type Color = u8;

/// Movement rules in force for a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleMode {
    /// Pour into any tube with free space.
    Unrestricted,
    /// Pour only onto a matching top color, or into an empty tube.
    ColorMatched,
}

/// Composite canonical key: one packed code per tube, in board order.
///
/// Two boards produce the same key iff their tube contents are identical in
/// identical order, so this is an exact equality relation for the visited set,
/// not a similarity heuristic.
pub type BoardKey = SmallVec<[u32; MAX_TUBES]>;

/// One tube: a stack of tokens, bottom first. Never exceeds `TUBE_CAPACITY`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tube(pub SmallVec<[Color; TUBE_CAPACITY]>);

impl Tube {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.0.len() >= TUBE_CAPACITY
    }

    /// Topmost token, if any.
    pub fn top(&self) -> Option<Color> {
        self.0.last().copied()
    }

    /// Length of the maximal same-color suffix (the pourable run).
    pub fn run_len(&self) -> usize {
        match self.top() {
            Some(color) => self.0.iter().rev().take_while(|&&c| c == color).count(),
            None => 0,
        }
    }

    /// A tube is resolved when it is empty or full of a single color.
    pub fn is_resolved(&self) -> bool {
        if self.is_empty() {
            return true;
        }
        if self.0.len() != TUBE_CAPACITY {
            return false;
        }
        let first = self.0[0];
        self.0.iter().all(|&c| c == first)
    }

    /// Pack the tube's contents into a single integer: 3 bits per token
    /// (colors are 1..=7) times 5 slots, plus the length in the high bits.
    pub fn packed_code(&self) -> u32 {
        let mut code = (self.0.len() as u32) << (3 * TUBE_CAPACITY);
        for (i, &c) in self.0.iter().enumerate() {
            code |= (c as u32) << (3 * i);
        }
        code
    }
}

/// One puzzle state: an ordered collection of tubes.
///
/// Boards are immutable values in the search: `apply_move` returns a new
/// board rather than mutating in place, so the frontier and visited set can
/// hold many boards derived from a shared ancestor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    pub tubes: Vec<Tube>,
}

impl Board {
    pub fn new(tubes: Vec<Tube>) -> Self {
        Self { tubes }
    }

    /// Build a board from bottom-to-top stacks. Convenience for tests and
    /// fixture construction.
    pub fn from_stacks(stacks: &[&[Color]]) -> Self {
        Self {
            tubes: stacks
                .iter()
                .map(|s| Tube(SmallVec::from_slice(s)))
                .collect(),
        }
    }

    /// Check whether pouring `from` into `to` is legal under `mode`.
    ///
    /// Total for in-range indices; out-of-range indices are a caller bug.
    pub fn can_move(&self, from: usize, to: usize, mode: RuleMode) -> bool {
        if from == to {
            return false;
        }
        let src = &self.tubes[from];
        let dst = &self.tubes[to];
        if src.is_empty() || dst.is_full() {
            return false;
        }
        match mode {
            RuleMode::Unrestricted => true,
            RuleMode::ColorMatched => dst.is_empty() || src.top() == dst.top(),
        }
    }

    /// Pour the top run of `from` into `to`, returning the resulting board.
    ///
    /// Moves `min(run, space)` tokens, where `run` is the maximal same-color
    /// suffix of the source and `space` the destination's free capacity. An
    /// empty source is a no-op. Color compatibility is `can_move`'s job;
    /// applying an illegal move is a caller bug.
    pub fn apply_move(&self, from: usize, to: usize) -> Board {
        let mut next = self.clone();
        if next.tubes[from].is_empty() {
            return next;
        }
        let run = next.tubes[from].run_len();
        let space = TUBE_CAPACITY - next.tubes[to].len();
        let count = run.min(space);
        for _ in 0..count {
            let color = next.tubes[from].0.pop().unwrap();
            next.tubes[to].0.push(color);
        }
        next
    }

    /// True iff every tube is resolved.
    pub fn is_completed(&self) -> bool {
        self.tubes.iter().all(Tube::is_resolved)
    }

    /// Canonical key over the full board contents, used to deduplicate
    /// visited states during search.
    pub fn canonical_key(&self) -> BoardKey {
        self.tubes.iter().map(Tube::packed_code).collect()
    }

    /// Token count per color, indexed by color id. Legal moves leave this
    /// unchanged.
    pub fn color_counts(&self) -> [usize; MAX_COLORS as usize + 1] {
        let mut counts = [0usize; MAX_COLORS as usize + 1];
        for tube in &self.tubes {
            for &c in &tube.0 {
                counts[c as usize] += 1;
            }
        }
        counts
    }

    /// Append an empty tube (the extra-tube inventory item).
    pub fn with_extra_tube(&self) -> Board {
        let mut next = self.clone();
        next.tubes.push(Tube::default());
        next
    }
}
