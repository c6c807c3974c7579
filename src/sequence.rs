//! Seeded sequencing: playlist tree + sort mode + seed -> ordered picks.
//!
//! `sequence` is pure. The same tree, mode and seed always produce the same
//! picks, see [`shuffle`] for the pinned random stream.

mod shuffle;
mod sort;

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::playlist::{Group, Pick, flatten};

pub use shuffle::{derive_seed, random_seed};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortMode {
    /// Tree order.
    Ordered,
    /// By normalized track name, ties in tree order.
    Alphabetical,
    /// Every track shuffled.
    ShuffleTracks,
    /// Sibling sub-playlists shuffled, tracks inside them kept in order.
    ShuffleGroups,
}

impl FromStr for SortMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ordered" | "order" => Ok(Self::Ordered),
            "alphabetical" | "alphabet" | "a-z" => Ok(Self::Alphabetical),
            "shuffle-tracks" | "shuffle" | "shuffled" => Ok(Self::ShuffleTracks),
            "shuffle-groups" => Ok(Self::ShuffleGroups),
            _ => Err(Error::InvalidSortMode(s.to_string())),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ordered => "ordered",
            Self::Alphabetical => "alphabetical",
            Self::ShuffleTracks => "shuffle-tracks",
            Self::ShuffleGroups => "shuffle-groups",
        };
        f.write_str(name)
    }
}

pub fn sequence(tree: &Group, mode: SortMode, seed: u64) -> Vec<Pick> {
    match mode {
        SortMode::Ordered => flatten(tree),
        SortMode::Alphabetical => sort::alphabetical(flatten(tree)),
        SortMode::ShuffleTracks => {
            let mut picks = flatten(tree);
            shuffle::fisher_yates(&mut picks, &mut shuffle::stream(seed));
            picks
        }
        SortMode::ShuffleGroups => shuffle::shuffle_groups(tree, &mut shuffle::stream(seed)),
    }
}
