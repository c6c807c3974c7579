//! Persisted playlist documents.
//!
//! A document is a group (`name`, `items`) plus three directives that are
//! resolved before the tree reaches the sequencer:
//!
//! - `source`: `[crawler, ...args]`, replaced by whatever the crawler produces
//! - `filters`: tag filters for the external filter pass (not applied here)
//! - `options`: option strings applied right after the document is opened

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::SourceSettings;
use crate::error::Result;
use crate::source;

use super::model::{Group, Grouplike};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaylistDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub items: Vec<Grouplike>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl PlaylistDocument {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a document from a local file or an `http(s)` URL.
    pub async fn load(location: &str) -> Result<Self> {
        let text = if is_url(location) {
            reqwest::get(location)
                .await?
                .error_for_status()?
                .text()
                .await?
        } else {
            tokio::fs::read_to_string(Path::new(location)).await?
        };
        info!(location, "opened playlist");
        Self::parse(&text)
    }

    /// Resolve the `source` directive and produce the plain tree.
    ///
    /// Returns the tree together with the document's `options`.
    pub fn into_tree(self, settings: &SourceSettings) -> (Group, Vec<String>) {
        if !self.filters.is_empty() {
            warn!(
                count = self.filters.len(),
                "playlist filters are not applied by this player; ignoring them"
            );
        }

        let tree = match self.source {
            Some(args) => {
                if !self.items.is_empty() {
                    warn!("playlist has both `source` and `items`; using `source`");
                }
                let mut crawled = source::resolve(&args, settings);
                if self.name.is_some() {
                    crawled.name = self.name;
                }
                crawled
            }
            None => Group::new(self.name, self.items),
        };
        (tree, self.options)
    }
}

pub fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}
