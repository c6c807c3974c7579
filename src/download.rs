//! Turning a track's acquisition argument into a local file.
//!
//! Downloaders are picked by the track's explicit `acquisitionMethod`, or by
//! the shape of the argument when none is given. `Acquisition` runs one
//! download at a time on behalf of the orchestrator.

mod acquire;
mod convert;
mod http;
mod local;
mod youtube;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::config::DownloadSettings;
use crate::error::{Error, Result};
use crate::playlist::Track;

pub use acquire::Acquisition;
pub use convert::ConvertingDownloader;
pub use http::HttpDownloader;
pub use local::LocalDownloader;
pub use youtube::YoutubeDownloader;

/// A playable local file.
///
/// Only owned resources (files this program wrote) are ever deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub path: PathBuf,
    pub owned: bool,
}

impl Resource {
    pub fn owned(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            owned: true,
        }
    }

    pub fn borrowed(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            owned: false,
        }
    }

    /// Delete the file if this program owns it.
    pub async fn discard(&self) {
        if !self.owned {
            return;
        }
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => debug!(path = %self.path.display(), "deleted downloaded file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "could not delete downloaded file"),
        }
    }
}

#[async_trait]
pub trait Downloader: Send + Sync {
    fn name(&self) -> &str;

    async fn download(&self, arg: &str) -> Result<Resource>;
}

/// Named downloaders plus the scratch directory they write into.
pub struct Downloaders {
    by_name: HashMap<String, Arc<dyn Downloader>>,
    convert_to: Option<String>,
    ffmpeg_command: String,
    dir: PathBuf,
    // Removed (with anything left in it) when dropped.
    _scratch: Option<TempDir>,
}

impl Downloaders {
    pub fn new(settings: &DownloadSettings) -> Result<Self> {
        let (dir, scratch) = match &settings.temp_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                (dir.clone(), None)
            }
            None => {
                let scratch = tempfile::Builder::new().prefix("treeplay-").tempdir()?;
                (scratch.path().to_path_buf(), Some(scratch))
            }
        };

        let mut downloaders = Self {
            by_name: HashMap::new(),
            convert_to: settings.convert_to.clone(),
            ffmpeg_command: settings.ffmpeg_command.clone(),
            dir: dir.clone(),
            _scratch: scratch,
        };
        downloaders.register(Arc::new(HttpDownloader::new(dir.clone())));
        downloaders.register(Arc::new(LocalDownloader));
        downloaders.register(Arc::new(YoutubeDownloader::new(
            settings.youtube_command.clone(),
            dir,
        )));
        Ok(downloaders)
    }

    pub fn register(&mut self, downloader: Arc<dyn Downloader>) {
        self.by_name.insert(downloader.name().to_string(), downloader);
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The downloader for `track`, wrapped in a converter when configured.
    pub fn resolve(&self, track: &Track) -> Result<Arc<dyn Downloader>> {
        let method = track
            .acquisition_method
            .as_deref()
            .unwrap_or_else(|| infer_method(&track.acquisition_arg));
        let inner = self
            .by_name
            .get(method)
            .cloned()
            .ok_or_else(|| Error::UnknownDownloader(method.to_string()))?;

        Ok(match &self.convert_to {
            Some(ext) => Arc::new(ConvertingDownloader::new(
                inner,
                self.ffmpeg_command.clone(),
                ext.clone(),
                self.dir.clone(),
            )),
            None => inner,
        })
    }
}

/// Downloader name implied by the form of `arg`.
pub fn infer_method(arg: &str) -> &'static str {
    let lower = arg.trim().to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return "local";
    }
    let host = lower
        .split("://")
        .nth(1)
        .and_then(|rest| rest.split(['/', '?', '#']).next())
        .unwrap_or("");
    let host = host.rsplit('@').next().unwrap_or(host);
    let host = host.split(':').next().unwrap_or(host);
    if host == "youtu.be" || host == "youtube.com" || host.ends_with(".youtube.com") {
        "youtube"
    } else {
        "http"
    }
}

/// File extension of the last path segment of a URL or path, if it looks like one.
pub fn extension_of(arg: &str) -> Option<String> {
    let without_query = arg.split(['?', '#']).next().unwrap_or(arg);
    let last = without_query.rsplit('/').next().unwrap_or(without_query);
    let (_, ext) = last.rsplit_once('.')?;
    let ok = !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric());
    ok.then(|| ext.to_ascii_lowercase())
}

/// A fresh, persistent file path in `dir` ending in `.ext`.
pub(crate) fn scratch_file(dir: &Path, ext: Option<&str>) -> Result<PathBuf> {
    let suffix = ext.map(|e| format!(".{e}")).unwrap_or_default();
    let file = tempfile::Builder::new()
        .prefix("track-")
        .suffix(&suffix)
        .tempfile_in(dir)?;
    Ok(file.into_temp_path().keep().map_err(|e| e.error)?)
}
