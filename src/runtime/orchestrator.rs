//! The play loop: history picks, acquisition fetches, the player plays.
//!
//! As soon as a track starts playing the next pick is requested and fetched,
//! so the following track is usually on disk before the current one ends.

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::info::{describe, say};
use super::keys::Command;
use crate::audio::{Completion, PlaybackEnd, Player};
use crate::download::{Acquisition, Downloaders, Resource};
use crate::error::Result;
use crate::history::{History, Picker};
use crate::playlist::Pick;

/// Give up after this many acquisitions in a row have failed.
pub const MAX_CONSECUTIVE_FAILURES: usize = 50;

/// The track after the current one.
#[derive(Debug)]
enum Upcoming {
    Idle,
    Fetching { pick: Pick, position: usize },
    Ready { pick: Pick, position: usize, resource: Resource },
    Exhausted,
}

impl Upcoming {
    fn pick(&self) -> Option<&Pick> {
        match self {
            Upcoming::Fetching { pick, .. } | Upcoming::Ready { pick, .. } => Some(pick),
            Upcoming::Idle | Upcoming::Exhausted => None,
        }
    }
}

struct Playing {
    pick: Pick,
    position: usize,
    resource: Resource,
    done: Completion,
}

pub struct Orchestrator<P> {
    history: History<P>,
    downloaders: Downloaders,
    acquisition: Acquisition,
    player: Player,
    playing: Option<Playing>,
    upcoming: Upcoming,
    failures: usize,
}

impl<P: Picker> Orchestrator<P> {
    pub fn new(history: History<P>, downloaders: Downloaders, player: Player) -> Self {
        Self {
            history,
            downloaders,
            acquisition: Acquisition::new(),
            player,
            playing: None,
            upcoming: Upcoming::Idle,
            failures: 0,
        }
    }

    /// Play until the sequence ends, acquisition keeps failing, or `Quit`.
    ///
    /// A closed command channel counts as `Quit`.
    pub async fn run(&mut self, commands: &mut mpsc::UnboundedReceiver<Command>) -> Result<()> {
        self.request_upcoming();

        loop {
            if self.playing.is_none() {
                match std::mem::replace(&mut self.upcoming, Upcoming::Idle) {
                    Upcoming::Ready {
                        pick,
                        position,
                        resource,
                    } => {
                        if let Err(e) = self.start_playing(pick, position, resource).await {
                            self.shutdown().await;
                            return Err(e);
                        }
                        self.request_upcoming();
                        continue;
                    }
                    Upcoming::Exhausted => {
                        info!("end of playlist");
                        break;
                    }
                    Upcoming::Idle => {
                        self.request_upcoming();
                        continue;
                    }
                    fetching @ Upcoming::Fetching { .. } => self.upcoming = fetching,
                }
            }

            let fetching = matches!(self.upcoming, Upcoming::Fetching { .. });
            let playing = self.playing.is_some();
            tokio::select! {
                result = self.acquisition.await_result(), if fetching => {
                    self.on_acquired(result);
                }
                end = wait_for(&mut self.playing), if playing => {
                    self.on_playback_end(end).await;
                }
                command = commands.recv() => {
                    let command = command.unwrap_or(Command::Quit);
                    if command == Command::Quit {
                        break;
                    }
                    self.handle(command).await;
                }
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// Advance history and start fetching the pick, skipping picks that
    /// cannot be resolved to a downloader.
    fn request_upcoming(&mut self) {
        loop {
            let Some(pick) = self.history.advance().cloned() else {
                self.upcoming = Upcoming::Exhausted;
                return;
            };
            let position = self.history.index().unwrap_or(0);
            if self.fetch(pick, position) {
                return;
            }
            if self.failures >= MAX_CONSECUTIVE_FAILURES {
                error!(failures = self.failures, "too many tracks in a row failed; stopping");
                self.upcoming = Upcoming::Exhausted;
                return;
            }
        }
    }

    fn fetch(&mut self, pick: Pick, position: usize) -> bool {
        match self.downloaders.resolve(&pick.track) {
            Ok(downloader) => {
                debug!(track = %pick.track.name, position, "fetching");
                self.acquisition
                    .start(downloader, pick.track.acquisition_arg.clone());
                self.upcoming = Upcoming::Fetching { pick, position };
                true
            }
            Err(e) => {
                warn!(track = %pick.track.name, error = %e, "skipping track");
                self.failures += 1;
                self.upcoming = Upcoming::Idle;
                false
            }
        }
    }

    fn on_acquired(&mut self, result: Option<Result<Resource>>) {
        let Upcoming::Fetching { pick, position } =
            std::mem::replace(&mut self.upcoming, Upcoming::Idle)
        else {
            return;
        };

        match result {
            Some(Ok(resource)) => {
                debug!(track = %pick.track.name, path = %resource.path.display(), "acquired");
                self.failures = 0;
                self.upcoming = Upcoming::Ready {
                    pick,
                    position,
                    resource,
                };
            }
            Some(Err(e)) => {
                warn!(track = %pick.track.name, error = %e, "acquisition failed; skipping track");
                self.failures += 1;
                if self.failures >= MAX_CONSECUTIVE_FAILURES {
                    error!(failures = self.failures, "too many tracks in a row failed; stopping");
                    self.upcoming = Upcoming::Exhausted;
                } else {
                    self.request_upcoming();
                }
            }
            None => {}
        }
    }

    /// A player that cannot be started at all is fatal.
    async fn start_playing(&mut self, pick: Pick, position: usize, resource: Resource) -> Result<()> {
        let done = match self.player.play(&resource) {
            Ok(done) => done,
            Err(e) => {
                error!(track = %pick.track.name, error = %e, "could not start player");
                resource.discard().await;
                return Err(e);
            }
        };
        info!(track = %pick.track.name, position, "now playing");
        say(&format!("Now playing: {}", describe(&pick)));
        self.playing = Some(Playing {
            pick,
            position,
            resource,
            done,
        });
        Ok(())
    }

    async fn on_playback_end(&mut self, end: Result<PlaybackEnd>) {
        let Some(finished) = self.playing.take() else {
            return;
        };
        match end {
            Ok(PlaybackEnd::Finished) => debug!(track = %finished.pick.track.name, "finished"),
            Ok(PlaybackEnd::Skipped) => info!(track = %finished.pick.track.name, "skipped"),
            Err(e) => warn!(track = %finished.pick.track.name, error = %e, "player failed"),
        }

        let next_path = match &self.upcoming {
            Upcoming::Ready { resource, .. } => Some(&resource.path),
            _ => None,
        };
        if next_path != Some(&finished.resource.path) {
            finished.resource.discard().await;
        }
    }

    async fn handle(&mut self, command: Command) {
        let outcome = match command {
            Command::TogglePause => self.player.toggle_pause().await,
            Command::Seek(secs) => self.player.seek_by(secs).await,
            Command::Volume(delta) => self.player.volume_by(delta).await,
            Command::SkipCurrent => {
                self.player.skip_current();
                Ok(())
            }
            Command::SkipUpcoming => {
                self.skip_upcoming().await;
                Ok(())
            }
            Command::Previous => {
                self.previous().await;
                Ok(())
            }
            Command::ShowCurrent => {
                match &self.playing {
                    Some(playing) => say(&format!("Current: {}", describe(&playing.pick))),
                    None => say("Nothing is playing."),
                }
                Ok(())
            }
            Command::ShowNext => {
                match self.upcoming.pick() {
                    Some(pick) => say(&format!("Next: {}", describe(pick))),
                    None => say("Nothing is queued."),
                }
                Ok(())
            }
            Command::Quit => Ok(()),
        };
        if let Err(e) = outcome {
            warn!(?command, error = %e, "player control failed");
        }
    }

    /// Drop whatever is queued and pick again.
    async fn skip_upcoming(&mut self) {
        self.acquisition.cancel();
        match std::mem::replace(&mut self.upcoming, Upcoming::Idle) {
            Upcoming::Ready { pick, resource, .. } => {
                say(&format!("Skipping upcoming: {}", pick.track.name));
                resource.discard().await;
            }
            Upcoming::Fetching { pick, .. } => {
                say(&format!("Skipping upcoming: {}", pick.track.name));
            }
            Upcoming::Exhausted => {
                self.upcoming = Upcoming::Exhausted;
                return;
            }
            Upcoming::Idle => {}
        }
        self.request_upcoming();
    }

    /// Queue the pick before the current one and stop the current track.
    async fn previous(&mut self) {
        let Some(index) = self.history.index() else {
            return;
        };
        let target = match &self.playing {
            Some(playing) => playing.position.saturating_sub(1),
            None => index.saturating_sub(1),
        };
        for _ in target..index {
            self.history.retreat();
        }
        let Some(pick) = self.history.current().cloned() else {
            return;
        };

        self.acquisition.cancel();
        if let Upcoming::Ready { resource, .. } =
            std::mem::replace(&mut self.upcoming, Upcoming::Idle)
        {
            resource.discard().await;
        }
        say(&format!("Going back to: {}", pick.track.name));
        self.fetch(pick, target);
        self.player.skip_current();
    }

    async fn shutdown(&mut self) {
        self.acquisition.cancel();
        self.player.skip_current();
        if let Some(mut playing) = self.playing.take() {
            let _ = tokio::time::timeout(std::time::Duration::from_secs(2), &mut playing.done).await;
            playing.resource.discard().await;
        }
        if let Upcoming::Ready { resource, .. } =
            std::mem::replace(&mut self.upcoming, Upcoming::Exhausted)
        {
            resource.discard().await;
        }
        debug!("stopped");
    }
}

/// Completion of the current playback. Never resolves when nothing plays.
async fn wait_for(playing: &mut Option<Playing>) -> Result<PlaybackEnd> {
    match playing {
        Some(playing) => match (&mut playing.done).await {
            Ok(outcome) => outcome,
            Err(_) => Ok(PlaybackEnd::Skipped),
        },
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests;
