use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/treeplay/config.toml` or `~/.config/treeplay/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `TREEPLAY__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
///
/// Command-line options are applied on top of these by the runtime.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub playback: PlaybackSettings,
    pub player: PlayerSettings,
    pub controls: ControlsSettings,
    pub download: DownloadSettings,
    pub source: SourceSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// One of `ordered`, `alphabetical`, `shuffle-tracks`, `shuffle-groups`.
    pub sort: String,
    /// One of `loop`, `loop-same-order`, `loop-regenerate`, `no-loop`.
    pub loop_mode: String,
    /// Fixed shuffle seed. A random one is drawn (and logged) when unset.
    pub seed: Option<u64>,
    /// How many picks to keep generated ahead of the current position.
    pub fill_size: usize,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            sort: "shuffle-tracks".to_string(),
            loop_mode: "loop-regenerate".to_string(),
            seed: None,
            fill_size: crate::history::DEFAULT_FILL_SIZE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// `mpv` (pause/seek/volume over IPC) or `sox` (no controls).
    pub backend: String,
    pub mpv_command: String,
    pub sox_command: String,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            backend: "mpv".to_string(),
            mpv_command: "mpv".to_string(),
            sox_command: "play".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Seconds to seek with the left/right arrows.
    pub seek_small: u64,
    /// Seconds to seek with shift + left/right.
    pub seek_large: u64,
    /// Volume step for up/down.
    pub volume_small: u32,
    /// Volume step for shift + up/down.
    pub volume_large: u32,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            seek_small: 5,
            seek_large: 30,
            volume_small: 10,
            volume_large: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Where fetched tracks are written. A private temporary directory
    /// (removed on exit) is used when unset.
    pub temp_dir: Option<PathBuf>,
    /// Convert every fetched track to this extension with ffmpeg (e.g. "wav").
    pub convert_to: Option<String>,
    pub ffmpeg_command: String,
    pub youtube_command: String,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            temp_dir: None,
            convert_to: None,
            ffmpeg_command: "ffmpeg".to_string(),
            youtube_command: "yt-dlp".to_string(),
        }
    }
}

/// Settings for the `crawl-local` source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            extensions: vec![
                "mp3".into(),
                "flac".into(),
                "wav".into(),
                "ogg".into(),
                "opus".into(),
                "m4a".into(),
            ],
            follow_links: true,
            include_hidden: false,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` wins when set.
    pub level: String,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
