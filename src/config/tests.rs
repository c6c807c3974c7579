use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_treeplay_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("TREEPLAY_CONFIG_PATH", "/tmp/treeplay-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/treeplay-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("treeplay")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("treeplay")
            .join("config.toml")
    );
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
sort = "shuffle-groups"
loop_mode = "no-loop"
seed = 42
fill_size = 12

[player]
backend = "sox"
sox_command = "/usr/bin/play"

[controls]
seek_small = 2
seek_large = 60
volume_small = 3
volume_large = 9

[download]
temp_dir = "/tmp/treeplay-downloads"
convert_to = "wav"

[source]
extensions = ["mp3"]
include_hidden = true
follow_links = false
max_depth = 3

[logging]
level = "debug"
file = "/tmp/treeplay.log"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("TREEPLAY_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("TREEPLAY__PLAYBACK__SEED");

    let s = Settings::load().unwrap();
    assert_eq!(s.playback.sort, "shuffle-groups");
    assert_eq!(s.playback.loop_mode, "no-loop");
    assert_eq!(s.playback.seed, Some(42));
    assert_eq!(s.playback.fill_size, 12);
    assert_eq!(s.player.backend, "sox");
    assert_eq!(s.player.sox_command, "/usr/bin/play");
    assert_eq!(s.player.mpv_command, "mpv");
    assert_eq!(s.controls.seek_small, 2);
    assert_eq!(s.controls.seek_large, 60);
    assert_eq!(s.controls.volume_small, 3);
    assert_eq!(s.controls.volume_large, 9);
    assert_eq!(
        s.download.temp_dir,
        Some(std::path::PathBuf::from("/tmp/treeplay-downloads"))
    );
    assert_eq!(s.download.convert_to.as_deref(), Some("wav"));
    assert_eq!(s.source.extensions, vec!["mp3".to_string()]);
    assert!(s.source.include_hidden);
    assert!(!s.source.follow_links);
    assert_eq!(s.source.max_depth, Some(3));
    assert_eq!(s.logging.level, "debug");
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
seed = 1
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("TREEPLAY_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("TREEPLAY__PLAYBACK__SEED", "99");

    let s = Settings::load().unwrap();
    assert_eq!(s.playback.seed, Some(99));
}

#[test]
fn defaults_are_valid_and_validate_rejects_empty_commands() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());
    assert_eq!(s.playback.fill_size, 50);

    s.player.mpv_command = "  ".to_string();
    let err = s.validate().unwrap_err();
    assert!(err.contains("player.mpv_command"));
}
