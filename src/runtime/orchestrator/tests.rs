use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command as Process;
use tokio::sync::mpsc;

use super::*;
use crate::audio::Backend;
use crate::config::DownloadSettings;
use crate::download::Downloader;
use crate::error::Error;
use crate::history::SequencePicker;
use crate::playlist::{Group, Grouplike, Track};

type Log = Arc<Mutex<Vec<String>>>;

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

fn plays(log: &Log) -> Vec<String> {
    entries(log)
        .into_iter()
        .filter_map(|e| e.strip_prefix("play:").map(str::to_string))
        .collect()
}

/// Hands the argument back as a borrowed path; `bad*` arguments fail.
struct FakeDownloader {
    log: Log,
}

#[async_trait]
impl Downloader for FakeDownloader {
    fn name(&self) -> &str {
        "local"
    }

    async fn download(&self, arg: &str) -> crate::error::Result<Resource> {
        self.log.lock().unwrap().push(format!("fetch:{arg}"));
        if arg.starts_with("bad") {
            return Err(Error::Download {
                arg: arg.to_string(),
                reason: "unreachable".to_string(),
            });
        }
        Ok(Resource::borrowed(arg))
    }
}

/// Logs every play. With no script a playback lasts until skipped.
struct RecordingBackend {
    log: Log,
    script: Option<&'static str>,
}

#[async_trait]
impl Backend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn command(&self, path: &Path) -> Option<Process> {
        self.log
            .lock()
            .unwrap()
            .push(format!("play:{}", path.display()));
        self.script.map(|script| {
            let mut cmd = Process::new("sh");
            cmd.arg("-c").arg(script);
            cmd
        })
    }
}

fn tree(names: &[&str]) -> Arc<Group> {
    let items = names
        .iter()
        .map(|n| Grouplike::Track(Track::new(*n, *n)))
        .collect();
    Arc::new(Group::new(None, items))
}

struct Rig {
    orchestrator: Orchestrator<SequencePicker>,
    log: Log,
    _dir: tempfile::TempDir,
}

fn rig(names: &[&str], loop_mode: &str, script: Option<&'static str>) -> Rig {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let dir = tempfile::tempdir().unwrap();
    let settings = DownloadSettings {
        temp_dir: Some(dir.path().to_path_buf()),
        ..DownloadSettings::default()
    };
    let mut downloaders = Downloaders::new(&settings).unwrap();
    downloaders.register(Arc::new(FakeDownloader {
        log: Arc::clone(&log),
    }));

    let picker = SequencePicker::from_names("ordered", loop_mode, 7).unwrap();
    let history = History::new(tree(names), picker, 3);
    let player = Player::new(Arc::new(RecordingBackend {
        log: Arc::clone(&log),
        script,
    }));
    Rig {
        orchestrator: Orchestrator::new(history, downloaders, player),
        log,
        _dir: dir,
    }
}

async fn wait_until(log: &Log, what: impl Fn(&[String]) -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !what(&entries(log)) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("orchestrator never got there");
}

fn count(entries: &[String], entry: &str) -> usize {
    entries.iter().filter(|e| *e == entry).count()
}

#[tokio::test]
async fn next_track_is_fetched_while_current_plays() {
    let Rig {
        mut orchestrator,
        log,
        _dir,
    } = rig(&["a", "b", "c"], "no-loop", None);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let driver = async {
        wait_until(&log, |e| e.contains(&"fetch:b".to_string())).await;
        // `a` never ends on its own, so `b` was fetched during its playback.
        assert_eq!(plays(&log), vec!["a"]);
        tx.send(Command::Quit).unwrap();
    };
    let (result, ()) = tokio::join!(orchestrator.run(&mut rx), driver);
    result.unwrap();

    assert_eq!(entries(&log), vec!["fetch:a", "play:a", "fetch:b"]);
}

#[tokio::test]
async fn failed_acquisitions_are_skipped() {
    let Rig {
        mut orchestrator,
        log,
        _dir,
    } = rig(&["bad1", "bad2", "good"], "no-loop", None);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let driver = async {
        wait_until(&log, |e| e.contains(&"play:good".to_string())).await;
        tx.send(Command::Quit).unwrap();
    };
    let (result, ()) = tokio::join!(orchestrator.run(&mut rx), driver);
    result.unwrap();

    assert_eq!(plays(&log), vec!["good"]);
    assert_eq!(
        entries(&log)[..3],
        ["fetch:bad1", "fetch:bad2", "fetch:good"]
    );
}

#[tokio::test]
async fn skip_upcoming_repicks_before_playing() {
    let Rig {
        mut orchestrator,
        log,
        _dir,
    } = rig(&["a", "b", "c"], "no-loop", None);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let driver = async {
        wait_until(&log, |e| e.contains(&"fetch:b".to_string())).await;
        tx.send(Command::SkipUpcoming).unwrap();
        wait_until(&log, |e| e.contains(&"fetch:c".to_string())).await;
        tx.send(Command::SkipCurrent).unwrap();
        wait_until(&log, |e| e.contains(&"play:c".to_string())).await;
        tx.send(Command::Quit).unwrap();
    };
    let (result, ()) = tokio::join!(orchestrator.run(&mut rx), driver);
    result.unwrap();

    assert_eq!(plays(&log), vec!["a", "c"]);
}

#[tokio::test]
async fn previous_replays_the_earlier_pick() {
    let Rig {
        mut orchestrator,
        log,
        _dir,
    } = rig(&["a", "b", "c"], "no-loop", None);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let driver = async {
        wait_until(&log, |e| e.contains(&"fetch:b".to_string())).await;
        tx.send(Command::SkipCurrent).unwrap();
        wait_until(&log, |e| e.contains(&"play:b".to_string())).await;
        tx.send(Command::Previous).unwrap();
        wait_until(&log, |e| count(e, "play:a") == 2).await;
        tx.send(Command::Quit).unwrap();
    };
    let (result, ()) = tokio::join!(orchestrator.run(&mut rx), driver);
    result.unwrap();

    assert_eq!(plays(&log), vec!["a", "b", "a"]);
}

#[tokio::test]
async fn closed_command_channel_quits() {
    let Rig {
        mut orchestrator,
        log,
        _dir,
    } = rig(&["a"], "loop", None);
    let (tx, mut rx) = mpsc::unbounded_channel::<Command>();
    drop(tx);

    tokio::time::timeout(Duration::from_secs(5), orchestrator.run(&mut rx))
        .await
        .unwrap()
        .unwrap();
    assert!(plays(&log).len() <= 1);
}

#[tokio::test]
async fn all_tracks_failing_gives_up() {
    let Rig {
        mut orchestrator,
        log,
        _dir,
    } = rig(&["bad"], "loop", None);
    let (_tx, mut rx) = mpsc::unbounded_channel::<Command>();

    tokio::time::timeout(Duration::from_secs(5), orchestrator.run(&mut rx))
        .await
        .unwrap()
        .unwrap();
    assert!(plays(&log).is_empty());
    assert_eq!(count(&entries(&log), "fetch:bad"), MAX_CONSECUTIVE_FAILURES);
}

#[cfg(unix)]
#[tokio::test]
async fn no_loop_plays_everything_once_then_stops() {
    let Rig {
        mut orchestrator,
        log,
        _dir,
    } = rig(&["x", "y", "z"], "no-loop", Some("exit 0"));
    let (_tx, mut rx) = mpsc::unbounded_channel::<Command>();

    tokio::time::timeout(Duration::from_secs(10), orchestrator.run(&mut rx))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(plays(&log), vec!["x", "y", "z"]);
}

#[cfg(unix)]
#[tokio::test]
async fn failing_player_counts_as_finished() {
    let Rig {
        mut orchestrator,
        log,
        _dir,
    } = rig(&["x", "y"], "no-loop", Some("exit 1"));
    let (_tx, mut rx) = mpsc::unbounded_channel::<Command>();

    tokio::time::timeout(Duration::from_secs(10), orchestrator.run(&mut rx))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(plays(&log), vec!["x", "y"]);
}

#[tokio::test]
async fn owned_resources_are_deleted_after_playback() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("owned.mp3");
    std::fs::write(&file, b"x").unwrap();

    let Rig {
        mut orchestrator,
        log,
        _dir,
    } = rig(&["only"], "no-loop", None);
    orchestrator.downloaders.register(Arc::new(Owning {
        path: file.clone(),
        log: Arc::clone(&log),
    }));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let driver = async {
        wait_until(&log, |e| !plays_in(e).is_empty()).await;
        tx.send(Command::SkipCurrent).unwrap();
    };
    let (result, ()) = tokio::join!(orchestrator.run(&mut rx), driver);
    result.unwrap();

    assert!(!file.exists());
}

#[tokio::test]
async fn looping_one_owned_track_keeps_its_file_between_plays() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("owned.mp3");
    std::fs::write(&file, b"x").unwrap();

    let Rig {
        mut orchestrator,
        log,
        _dir,
    } = rig(&["only"], "loop", None);
    orchestrator.downloaders.register(Arc::new(Owning {
        path: file.clone(),
        log: Arc::clone(&log),
    }));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let driver = async {
        wait_until(&log, |e| count(e, "fetch:only") == 2).await;
        // Let the second fetch land as the ready upcoming track.
        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send(Command::SkipCurrent).unwrap();
        wait_until(&log, |e| plays_in(e).len() == 2).await;
        assert!(file.exists());
        tx.send(Command::Quit).unwrap();
    };
    let (result, ()) = tokio::join!(orchestrator.run(&mut rx), driver);
    result.unwrap();

    let played = file.display().to_string();
    assert_eq!(plays(&log), vec![played.clone(), played]);
}

/// Always hands back the same file, owned.
struct Owning {
    path: PathBuf,
    log: Log,
}

#[async_trait]
impl Downloader for Owning {
    fn name(&self) -> &str {
        "local"
    }

    async fn download(&self, arg: &str) -> crate::error::Result<Resource> {
        self.log.lock().unwrap().push(format!("fetch:{arg}"));
        Ok(Resource::owned(&self.path))
    }
}

fn plays_in(entries: &[String]) -> Vec<&String> {
    entries.iter().filter(|e| e.starts_with("play:")).collect()
}
