use crate::config::Settings;

/// Settings for this run. A missing or broken config never stops playback:
/// the problem is reported on stderr and defaults are used instead.
///
/// Logging is configured from these settings, so stderr is the only place
/// the problem can go.
pub fn load_settings() -> Settings {
    let (settings, problem) = settle(Settings::load());
    if let Some(problem) = problem {
        eprintln!("treeplay: {problem}; using defaults");
    }
    settings
}

fn settle(loaded: Result<Settings, ::config::ConfigError>) -> (Settings, Option<String>) {
    let checked = loaded
        .map_err(|e| format!("failed to load config: {e}"))
        .and_then(|s| match s.validate() {
            Ok(()) => Ok(s),
            Err(msg) => Err(format!("invalid config: {msg}")),
        });
    match checked {
        Ok(settings) => (settings, None),
        Err(problem) => (Settings::default(), Some(problem)),
    }
}
