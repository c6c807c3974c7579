use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::{Downloader, Resource};
use crate::error::{Error, Result};

/// Extracts the audio of a video page with `yt-dlp` (or a compatible tool).
pub struct YoutubeDownloader {
    program: String,
    dir: PathBuf,
}

impl YoutubeDownloader {
    pub fn new(program: String, dir: PathBuf) -> Self {
        Self { program, dir }
    }
}

#[async_trait]
impl Downloader for YoutubeDownloader {
    fn name(&self) -> &str {
        "youtube"
    }

    async fn download(&self, arg: &str) -> Result<Resource> {
        let template = self.dir.join("yt-%(id)s.%(ext)s");
        let output = Command::new(&self.program)
            .arg("--quiet")
            .arg("--no-playlist")
            .arg("--extract-audio")
            .arg("--output")
            .arg(&template)
            .arg("--print")
            .arg("after_move:filepath")
            .arg("--")
            .arg(arg)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| Error::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(Error::ProcessFailed {
                program: self.program.clone(),
                status: output.status,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let path = stdout
            .lines()
            .map(str::trim)
            .rfind(|line| !line.is_empty())
            .ok_or_else(|| Error::Download {
                arg: arg.to_string(),
                reason: format!("{} did not report a file", self.program),
            })?;
        Ok(Resource::owned(path))
    }
}
