//! Small types shared by the player and its backends.

/// Live adjustments forwarded to a running player.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Transport {
    /// Toggle pause/resume.
    TogglePause,
    /// Seek by the given number of seconds (positive or negative).
    SeekBy(i64),
    /// Change the volume by the given number of percentage points.
    VolumeBy(i32),
}

/// How a playback ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlaybackEnd {
    /// The player exited on its own after playing the file.
    Finished,
    /// The player was stopped before it finished.
    Skipped,
}
