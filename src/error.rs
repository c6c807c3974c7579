//! Error types shared across the crate.

use std::path::PathBuf;

/// Errors raised while loading playlists, acquiring tracks or driving players.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid sort mode: {0:?} (expected ordered, alphabetical, shuffle-tracks or shuffle-groups)")]
    InvalidSortMode(String),

    #[error("invalid loop mode: {0:?} (expected loop, loop-same-order, loop-regenerate or no-loop)")]
    InvalidLoopMode(String),

    #[error("loop mode {0:?} is not supported")]
    UnsupportedLoopMode(String),

    #[error("option {0} expects a value")]
    MissingOptionValue(String),

    #[error("option {option} got an invalid value {value:?}")]
    InvalidOptionValue { option: String, value: String },

    #[error("playlist nesting too deep while opening {0}")]
    OpenDepthExceeded(String),

    #[error("unknown downloader: {0}")]
    UnknownDownloader(String),

    #[error("download of {arg} failed: {reason}")]
    Download { arg: String, reason: String },

    #[error("{program} exited with {status}")]
    ProcessFailed { program: String, status: std::process::ExitStatus },

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
