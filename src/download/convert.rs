use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{Downloader, Resource, scratch_file};
use crate::error::{Error, Result};

/// Runs another downloader, then converts its output with ffmpeg.
///
/// The intermediate file is deleted when the inner downloader owned it.
pub struct ConvertingDownloader {
    inner: Arc<dyn Downloader>,
    program: String,
    extension: String,
    dir: PathBuf,
}

impl ConvertingDownloader {
    pub fn new(inner: Arc<dyn Downloader>, program: String, extension: String, dir: PathBuf) -> Self {
        Self {
            inner,
            program,
            extension,
            dir,
        }
    }

    async fn convert(&self, input: &Resource, output: &Resource) -> Result<()> {
        let status = Command::new(&self.program)
            .arg("-loglevel")
            .arg("error")
            .arg("-y")
            .arg("-i")
            .arg(&input.path)
            .arg("-vn")
            .arg(&output.path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|source| Error::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::ProcessFailed {
                program: self.program.clone(),
                status,
            })
        }
    }
}

#[async_trait]
impl Downloader for ConvertingDownloader {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn download(&self, arg: &str) -> Result<Resource> {
        let fetched = self.inner.download(arg).await?;
        let output = match scratch_file(&self.dir, Some(&self.extension)) {
            Ok(path) => Resource::owned(path),
            Err(e) => {
                fetched.discard().await;
                return Err(e);
            }
        };

        let converted = self.convert(&fetched, &output).await;
        fetched.discard().await;
        match converted {
            Ok(()) => {
                debug!(from = %fetched.path.display(), to = %output.path.display(), "converted");
                Ok(output)
            }
            Err(e) => {
                output.discard().await;
                Err(e)
            }
        }
    }
}
