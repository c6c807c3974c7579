use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::{Downloader, Resource, extension_of, scratch_file};
use crate::error::Result;

/// Streams a URL into the scratch directory.
pub struct HttpDownloader {
    client: reqwest::Client,
    dir: PathBuf,
}

impl HttpDownloader {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            client: reqwest::Client::new(),
            dir,
        }
    }

    async fn fetch_into(&self, url: &str, path: &Path) -> Result<u64> {
        let mut response = self.client.get(url).send().await?.error_for_status()?;
        let mut file = tokio::fs::File::create(path).await?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    fn name(&self) -> &str {
        "http"
    }

    async fn download(&self, arg: &str) -> Result<Resource> {
        let path = scratch_file(&self.dir, extension_of(arg).as_deref())?;
        let resource = Resource::owned(path);
        match self.fetch_into(arg, &resource.path).await {
            Ok(bytes) => {
                debug!(url = arg, bytes, path = %resource.path.display(), "downloaded");
                Ok(resource)
            }
            Err(e) => {
                resource.discard().await;
                Err(e)
            }
        }
    }
}
