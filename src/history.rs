//! Navigable timeline of picks.
//!
//! `History` asks its picker for picks ahead of time and keeps every pick it
//! ever got. Going back and then forward again replays the recorded picks
//! instead of asking the picker again, so a seeded shuffle never drifts.

mod picker;

use std::sync::Arc;

use tracing::debug;

use crate::playlist::{Group, Pick};

pub use picker::{LoopMode, Picker, SequencePicker};

pub const DEFAULT_FILL_SIZE: usize = 50;

pub struct History<P> {
    tree: Arc<Group>,
    picker: P,
    timeline: Vec<Pick>,
    index: Option<usize>,
    fill_size: usize,
    exhausted: bool,
}

impl<P: Picker> History<P> {
    pub fn new(tree: Arc<Group>, picker: P, fill_size: usize) -> Self {
        Self {
            tree,
            picker,
            timeline: Vec::new(),
            index: None,
            fill_size,
            exhausted: false,
        }
    }

    /// Move forward one pick.
    ///
    /// Returns `None` once the picker has ended the sequence and the timeline
    /// has nothing further; the index then stays on the last pick.
    pub fn advance(&mut self) -> Option<&Pick> {
        let target = self.index.map_or(0, |i| i + 1);
        self.fill(target);
        if target < self.timeline.len() {
            self.index = Some(target);
            self.timeline.get(target)
        } else {
            None
        }
    }

    /// Move back one pick (never before the first). Picks ahead are kept.
    pub fn retreat(&mut self) -> Option<&Pick> {
        let target = self.index?.saturating_sub(1);
        self.index = Some(target);
        self.timeline.get(target)
    }

    pub fn current(&self) -> Option<&Pick> {
        self.timeline.get(self.index?)
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    #[cfg(test)]
    pub fn timeline(&self) -> &[Pick] {
        &self.timeline
    }

    /// Top up until `len >= max(fill_size, 1) + position`.
    fn fill(&mut self, position: usize) {
        let wanted = self.fill_size.max(1) + position;
        while !self.exhausted && self.timeline.len() < wanted {
            match self.picker.pick(&self.tree, self.timeline.last()) {
                Some(pick) => self.timeline.push(pick),
                None => {
                    debug!(picks = self.timeline.len(), "picker reached the end");
                    self.exhausted = true;
                }
            }
        }
    }
}
