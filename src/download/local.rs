use std::path::PathBuf;

use async_trait::async_trait;

use super::{Downloader, Resource};
use crate::error::{Error, Result};

/// Plays files in place. The file is never copied and never deleted.
pub struct LocalDownloader;

#[async_trait]
impl Downloader for LocalDownloader {
    fn name(&self) -> &str {
        "local"
    }

    async fn download(&self, arg: &str) -> Result<Resource> {
        let path = PathBuf::from(arg.strip_prefix("file://").unwrap_or(arg));
        if tokio::fs::try_exists(&path).await? {
            Ok(Resource::borrowed(path))
        } else {
            Err(Error::NotFound(path))
        }
    }
}
