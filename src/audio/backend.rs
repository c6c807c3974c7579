use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::types::Transport;
use crate::config::PlayerSettings;
use crate::error::Result;

#[async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> &str;

    /// The process that plays `path`, or `None` when nothing should be spawned.
    fn command(&self, path: &Path) -> Option<Command>;

    /// Whether `send` does anything.
    fn has_control(&self) -> bool {
        false
    }

    async fn send(&self, _transport: Transport) -> Result<()> {
        Ok(())
    }
}

/// mpv, controlled over its JSON IPC socket.
pub struct MpvBackend {
    program: String,
    socket: PathBuf,
}

impl MpvBackend {
    pub fn new(program: impl Into<String>, socket: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            socket: socket.into(),
        }
    }

    pub fn ipc_command(transport: Transport) -> serde_json::Value {
        let args = match transport {
            Transport::TogglePause => serde_json::json!(["cycle", "pause"]),
            Transport::SeekBy(secs) => serde_json::json!(["seek", secs, "relative"]),
            Transport::VolumeBy(delta) => serde_json::json!(["add", "volume", delta]),
        };
        serde_json::json!({ "command": args })
    }
}

#[async_trait]
impl Backend for MpvBackend {
    fn name(&self) -> &str {
        &self.program
    }

    fn command(&self, path: &Path) -> Option<Command> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--no-video")
            .arg("--no-terminal")
            .arg(format!("--input-ipc-server={}", self.socket.display()))
            .arg("--")
            .arg(path);
        Some(cmd)
    }

    fn has_control(&self) -> bool {
        cfg!(unix)
    }

    #[cfg(unix)]
    async fn send(&self, transport: Transport) -> Result<()> {
        use tokio::io::AsyncWriteExt;

        let mut line = serde_json::to_vec(&Self::ipc_command(transport))?;
        line.push(b'\n');
        let mut stream = tokio::net::UnixStream::connect(&self.socket).await?;
        stream.write_all(&line).await?;
        stream.shutdown().await?;
        debug!(?transport, "sent to mpv");
        Ok(())
    }
}

/// SoX's `play`. Runs to completion with no live controls.
pub struct SoxBackend {
    program: String,
}

impl SoxBackend {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl Backend for SoxBackend {
    fn name(&self) -> &str {
        &self.program
    }

    fn command(&self, path: &Path) -> Option<Command> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-q").arg(path);
        Some(cmd)
    }
}

/// Plays nothing. A "playback" lasts until it is skipped.
pub struct NoopBackend;

#[async_trait]
impl Backend for NoopBackend {
    fn name(&self) -> &str {
        "noop"
    }

    fn command(&self, _path: &Path) -> Option<Command> {
        None
    }
}

/// Backend for the configured name. Unknown names fall back to `NoopBackend`.
pub fn select_backend(name: &str, settings: &PlayerSettings, socket: &Path) -> Arc<dyn Backend> {
    match name.trim().to_ascii_lowercase().as_str() {
        "mpv" => Arc::new(MpvBackend::new(settings.mpv_command.clone(), socket)),
        "sox" | "play" => Arc::new(SoxBackend::new(settings.sox_command.clone())),
        "noop" | "none" => Arc::new(NoopBackend),
        other => {
            warn!(backend = other, "unknown player backend; nothing will be heard");
            Arc::new(NoopBackend)
        }
    }
}
