use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::playlist::{Group, Pick};
use crate::sequence::{SortMode, derive_seed, sequence};

/// Produces the pick that follows `previous` (or the first pick when `None`).
///
/// Returning `None` ends the sequence. Whatever state a picker needs lives in
/// the picker itself.
pub trait Picker {
    fn pick(&mut self, tree: &Group, previous: Option<&Pick>) -> Option<Pick>;
}

impl<F> Picker for F
where
    F: FnMut(&Group, Option<&Pick>) -> Option<Pick>,
{
    fn pick(&mut self, tree: &Group, previous: Option<&Pick>) -> Option<Pick> {
        self(tree, previous)
    }
}

/// What happens once the generated sequence runs out.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoopMode {
    /// Start over with the same sequence.
    SameOrder,
    /// Derive a new seed and generate a fresh sequence.
    Regenerate,
    /// Stop.
    NoLoop,
}

impl FromStr for LoopMode {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "loop" | "loop-same-order" => Ok(Self::SameOrder),
            "loop-regenerate" => Ok(Self::Regenerate),
            "no-loop" | "no" => Ok(Self::NoLoop),
            "pick-random" => Err(Error::UnsupportedLoopMode(s.to_string())),
            _ => Err(Error::InvalidLoopMode(s.to_string())),
        }
    }
}

impl fmt::Display for LoopMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SameOrder => "loop-same-order",
            Self::Regenerate => "loop-regenerate",
            Self::NoLoop => "no-loop",
        };
        f.write_str(name)
    }
}

/// Picker backed by a cached seeded sequence.
#[derive(Debug, Clone)]
pub struct SequencePicker {
    sort: SortMode,
    loop_mode: LoopMode,
    seed: u64,
    cached: Option<Vec<Pick>>,
    /// Position of the last pick handed out; a hint for locating `previous`.
    cursor: usize,
}

impl SequencePicker {
    pub fn new(sort: SortMode, loop_mode: LoopMode, seed: u64) -> Self {
        Self {
            sort,
            loop_mode,
            seed,
            cached: None,
            cursor: 0,
        }
    }

    /// Build from configuration strings; an unknown mode is a fatal error.
    pub fn from_names(sort: &str, loop_mode: &str, seed: u64) -> Result<Self> {
        Ok(Self::new(sort.parse()?, loop_mode.parse()?, seed))
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn position_of(&self, sequence: &[Pick], previous: &Pick) -> Option<usize> {
        if sequence
            .get(self.cursor)
            .is_some_and(|p| p.occurrence == previous.occurrence)
        {
            return Some(self.cursor);
        }
        sequence
            .iter()
            .position(|p| p.occurrence == previous.occurrence)
    }
}

impl Picker for SequencePicker {
    fn pick(&mut self, tree: &Group, previous: Option<&Pick>) -> Option<Pick> {
        let (sort, seed) = (self.sort, self.seed);
        let seq = self.cached.take().unwrap_or_else(|| sequence(tree, sort, seed));
        if seq.is_empty() {
            self.cached = Some(seq);
            return None;
        }

        let next = match previous {
            None => 0,
            Some(prev) => self.position_of(&seq, prev).map_or(0, |i| i + 1),
        };

        if next < seq.len() {
            self.cursor = next;
            let pick = seq[next].clone();
            self.cached = Some(seq);
            return Some(pick);
        }

        match self.loop_mode {
            LoopMode::SameOrder => {
                debug!("end of sequence; starting over");
                self.cursor = 0;
                let pick = seq[0].clone();
                self.cached = Some(seq);
                Some(pick)
            }
            LoopMode::Regenerate => {
                self.seed = derive_seed(self.seed);
                info!(seed = self.seed, "end of sequence; regenerating");
                let fresh = sequence(tree, self.sort, self.seed);
                self.cursor = 0;
                let pick = fresh.first().cloned();
                self.cached = Some(fresh);
                pick
            }
            LoopMode::NoLoop => {
                self.cached = Some(seq);
                None
            }
        }
    }
}
