//! Raw-mode stdin reader.

use std::io::{self, Read};
use std::thread;

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use super::keys::{Command, parse};
use crate::config::ControlsSettings;

/// Raw mode for as long as this value lives.
pub struct RawMode;

impl RawMode {
    pub fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Forward keypresses as commands until stdin closes or the receiver is gone.
///
/// End of input is sent as `Quit`.
pub fn spawn_key_reader(controls: ControlsSettings, tx: UnboundedSender<Command>) {
    thread::spawn(move || {
        let mut stdin = io::stdin();
        let mut buf = [0u8; 64];
        loop {
            let n = match stdin.read(&mut buf) {
                Ok(0) => {
                    debug!("stdin closed");
                    let _ = tx.send(Command::Quit);
                    return;
                }
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(error = %e, "reading keys failed");
                    let _ = tx.send(Command::Quit);
                    return;
                }
            };
            for command in parse(&buf[..n], &controls) {
                if tx.send(command).is_err() {
                    return;
                }
            }
        }
    });
}
