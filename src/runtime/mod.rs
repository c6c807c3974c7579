use std::env;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::audio::{Player, select_backend};
use crate::download::Downloaders;
use crate::error::{Error, Result};
use crate::history::{History, SequencePicker};
use crate::playlist::count_tracks;
use crate::sequence::random_seed;

pub use keys::Command;
pub use orchestrator::Orchestrator;

mod info;
mod input;
mod keys;
mod logging;
mod orchestrator;
mod settings;
mod startup;

/// Opened when the arguments name no playlist.
pub const DEFAULT_PLAYLIST: &str = "playlist.json";

pub fn run() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(start(env::args().skip(1).collect()))
}

async fn start(args: Vec<String>) -> Result<()> {
    let settings = settings::load_settings();
    logging::init(&settings.logging)?;

    let mut session = startup::Session::new(settings);
    session.apply(args).await?;
    if !session.opened {
        if !Path::new(DEFAULT_PLAYLIST).exists() {
            return Err(Error::NotFound(DEFAULT_PLAYLIST.into()));
        }
        info!(playlist = DEFAULT_PLAYLIST, "no playlist given; using the default");
        session.apply([DEFAULT_PLAYLIST]).await?;
    }

    for listing in &session.listings {
        println!("{listing}");
    }
    if !session.should_play() {
        return Ok(());
    }

    let playback = &session.settings.playback;
    let seed = playback.seed.unwrap_or_else(random_seed);
    let picker = SequencePicker::from_names(&playback.sort, &playback.loop_mode, seed)?;
    info!(
        seed,
        sort = %playback.sort,
        loop_mode = %playback.loop_mode,
        "sequence ready (pass --seed {seed} to replay it)"
    );

    let tree = Arc::new(session.tree);
    if count_tracks(&tree) == 0 {
        warn!("playlist has no tracks");
    }
    let history = History::new(tree, picker, playback.fill_size);

    let downloaders = Downloaders::new(&session.settings.download)?;
    let socket = downloaders.dir().join("mpv.sock");
    let player_settings = &session.settings.player;
    let player = Player::new(select_backend(&player_settings.backend, player_settings, &socket));
    info!(backend = player.backend_name(), "player ready");

    let mut orchestrator = Orchestrator::new(history, downloaders, player);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let _raw = if std::io::stdin().is_terminal() {
        let raw = input::RawMode::enable()?;
        input::spawn_key_reader(session.settings.controls.clone(), tx.clone());
        Some(raw)
    } else {
        None
    };

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(Command::Quit);
        }
    });

    orchestrator.run(&mut rx).await
}
