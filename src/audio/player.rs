use std::process::Stdio;
use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{debug, info};

use super::backend::Backend;
use super::types::{PlaybackEnd, Transport};
use crate::download::Resource;
use crate::error::{Error, Result};

/// Resolves once the playback started by `Player::play` ends.
pub type Completion = oneshot::Receiver<Result<PlaybackEnd>>;

/// Keeps at most one player process alive.
pub struct Player {
    backend: Arc<dyn Backend>,
    stop: Option<oneshot::Sender<()>>,
}

impl Player {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            stop: None,
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Start playing `resource`, stopping whatever played before.
    pub fn play(&mut self, resource: &Resource) -> Result<Completion> {
        self.skip_current();

        let (done_tx, done_rx) = oneshot::channel();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        match self.backend.command(&resource.path) {
            Some(mut cmd) => {
                cmd.stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .kill_on_drop(true);
                let program = self.backend.name().to_string();
                let mut child = cmd.spawn().map_err(|source| Error::Spawn {
                    program: program.clone(),
                    source,
                })?;
                debug!(program = %program, path = %resource.path.display(), "player started");

                tokio::spawn(async move {
                    let outcome = tokio::select! {
                        status = child.wait() => match status {
                            Ok(status) if status.success() => Ok(PlaybackEnd::Finished),
                            Ok(status) => Err(Error::ProcessFailed { program, status }),
                            Err(e) => Err(Error::Io(e)),
                        },
                        _ = stop_rx => {
                            let _ = child.kill().await;
                            Ok(PlaybackEnd::Skipped)
                        }
                    };
                    let _ = done_tx.send(outcome);
                });
            }
            None => {
                tokio::spawn(async move {
                    let _ = stop_rx.await;
                    let _ = done_tx.send(Ok(PlaybackEnd::Skipped));
                });
            }
        }

        self.stop = Some(stop_tx);
        Ok(done_rx)
    }

    /// Stop the current playback. Its completion resolves as `Skipped`.
    pub fn skip_current(&mut self) {
        if let Some(stop) = self.stop.take() {
            // Fails harmlessly when the process already exited.
            let _ = stop.send(());
        }
    }

    pub async fn toggle_pause(&self) -> Result<()> {
        self.transport(Transport::TogglePause).await
    }

    pub async fn seek_by(&self, secs: i64) -> Result<()> {
        self.transport(Transport::SeekBy(secs)).await
    }

    pub async fn volume_by(&self, delta: i32) -> Result<()> {
        self.transport(Transport::VolumeBy(delta)).await
    }

    /// Whether a playback is still running. The stop receiver is dropped as
    /// soon as the process exits, whichever way it ends.
    pub fn is_playing(&self) -> bool {
        self.stop.as_ref().is_some_and(|stop| !stop.is_closed())
    }

    async fn transport(&self, transport: Transport) -> Result<()> {
        if !self.is_playing() {
            debug!(?transport, "nothing playing; ignoring control");
            return Ok(());
        }
        if !self.backend.has_control() {
            info!(backend = self.backend.name(), ?transport, "player has no live controls");
            return Ok(());
        }
        self.backend.send(transport).await
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.skip_current();
    }
}
