//! Playing acquired files through an external player process.
//!
//! A `Backend` knows how to launch one player program and, optionally, how to
//! talk to it while it runs. `Player` keeps at most one such process alive.

mod backend;
mod player;
mod types;

pub use backend::{Backend, MpvBackend, NoopBackend, SoxBackend, select_backend};
pub use player::{Completion, Player};
pub use types::{PlaybackEnd, Transport};
