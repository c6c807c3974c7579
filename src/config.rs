//! Configuration loader and schema types.
//!
//! This module exposes the settings that seed playback (sort, loop mode,
//! seed), pick the player backend, tune the key bindings and the downloaders,
//! plus helpers to load them from disk and the environment.

mod load;
mod schema;

pub use schema::*;

#[cfg(test)]
mod tests;
