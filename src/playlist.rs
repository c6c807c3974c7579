//! Playlist tree: groups of groups and tracks.
//!
//! The tree is built once (from a playlist document or a crawler), edited by
//! the keep/remove/clear options and then shared read-only with the
//! sequencing and playback layers.

mod document;
mod model;
mod tree;

pub use document::*;
pub use model::*;
pub use tree::*;
