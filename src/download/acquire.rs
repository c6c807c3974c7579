use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::{Downloader, Resource};
use crate::error::{Error, Result};

/// At most one live download, with results delivered by message.
///
/// Starting a download cancels the one before it. A canceled download is
/// never reported; if it still produces a file, that file is deleted.
pub struct Acquisition {
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
    next_id: u64,
    in_flight: Option<Attempt>,
}

struct Attempt {
    id: u64,
    arg: String,
    canceled: Arc<AtomicBool>,
}

struct Event {
    id: u64,
    signal: Signal,
}

enum Signal {
    Acquired(Resource),
    Failed(Error),
    Discarded,
}

impl Default for Acquisition {
    fn default() -> Self {
        Self::new()
    }
}

impl Acquisition {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            next_id: 0,
            in_flight: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Begin fetching `arg`, canceling whatever was in flight.
    pub fn start(&mut self, downloader: Arc<dyn Downloader>, arg: String) {
        self.cancel();

        self.next_id += 1;
        let id = self.next_id;
        let canceled = Arc::new(AtomicBool::new(false));
        debug!(id, arg = %arg, downloader = downloader.name(), "acquisition started");

        let tx = self.tx.clone();
        let flag = Arc::clone(&canceled);
        let task_arg = arg.clone();
        tokio::spawn(async move {
            let result = downloader.download(&task_arg).await;
            let signal = if flag.load(Ordering::SeqCst) {
                if let Ok(resource) = result {
                    resource.discard().await;
                }
                Signal::Discarded
            } else {
                match result {
                    Ok(resource) => Signal::Acquired(resource),
                    Err(e) => Signal::Failed(e),
                }
            };
            // The receiver only goes away at shutdown.
            let _ = tx.send(Event { id, signal });
        });

        self.in_flight = Some(Attempt { id, arg, canceled });
    }

    /// Cancel the live download, if any. Does nothing once its result was taken.
    pub fn cancel(&mut self) {
        if let Some(attempt) = self.in_flight.take() {
            attempt.canceled.store(true, Ordering::SeqCst);
            info!(arg = %attempt.arg, "canceled acquisition");
        }
    }

    /// Wait for the live download to finish.
    ///
    /// Returns `None` when nothing is in flight. Safe to drop mid-wait: the
    /// download stays live and a later call picks its result up.
    pub async fn await_result(&mut self) -> Option<Result<Resource>> {
        loop {
            let live = self.in_flight.as_ref()?.id;
            let event = self.rx.recv().await?;

            if event.id != live {
                if let Signal::Acquired(stale) = event.signal {
                    tokio::spawn(async move { stale.discard().await });
                }
                continue;
            }

            match event.signal {
                Signal::Acquired(resource) => {
                    self.in_flight = None;
                    return Some(Ok(resource));
                }
                Signal::Failed(e) => {
                    self.in_flight = None;
                    return Some(Err(e));
                }
                Signal::Discarded => continue,
            }
        }
    }
}

impl Drop for Acquisition {
    fn drop(&mut self) {
        self.cancel();
    }
}
