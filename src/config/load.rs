use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then lets environment
/// variables (prefix `TREEPLAY__`) override it, and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("TREEPLAY")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    ///
    /// Sort and loop modes are checked later, when the picker is built.
    pub fn validate(&self) -> Result<(), String> {
        let commands = [
            ("player.mpv_command", &self.player.mpv_command),
            ("player.sox_command", &self.player.sox_command),
            ("download.ffmpeg_command", &self.download.ffmpeg_command),
            ("download.youtube_command", &self.download.youtube_command),
        ];
        for (key, value) in commands {
            if value.trim().is_empty() {
                return Err(format!("{key} must not be empty"));
            }
        }
        if self.controls.seek_large == 0 {
            return Err("controls.seek_large must be >= 1".to_string());
        }
        if self.controls.volume_large == 0 {
            return Err("controls.volume_large must be >= 1".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `TREEPLAY_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("TREEPLAY_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/treeplay/config.toml`
/// or `~/.config/treeplay/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("treeplay").join("config.toml"))
}
