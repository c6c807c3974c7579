use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A playable leaf of the playlist tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    #[serde(default)]
    pub name: String,
    /// What the downloader is given: a URL, a path, a video id...
    #[serde(alias = "downloaderArg")]
    pub acquisition_arg: String,
    /// Explicit downloader name; inferred from `acquisition_arg` when absent.
    #[serde(default, alias = "downloader", skip_serializing_if = "Option::is_none")]
    pub acquisition_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    /// Kilobits per second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, serde_json::Value>>,
}

/// An ordered, named collection of nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub items: Vec<Grouplike>,
}

/// A node of the playlist tree.
///
/// Deserialization is capability based: anything carrying `items` is a group,
/// everything else must look like a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Grouplike {
    Group(Group),
    Track(Track),
}

impl Grouplike {
    pub fn name(&self) -> Option<&str> {
        match self {
            Grouplike::Group(g) => g.name.as_deref(),
            Grouplike::Track(t) => Some(t.name.as_str()),
        }
    }
}

impl Group {
    pub fn new(name: Option<String>, items: Vec<Grouplike>) -> Self {
        Self { name, items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Track {
    pub fn new(name: impl Into<String>, acquisition_arg: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            acquisition_arg: acquisition_arg.into(),
            acquisition_method: None,
            metadata: None,
        }
    }
}

/// Where exactly a track sits in the tree: the child index taken at every level
/// from the root group down to the track.
///
/// Two value-equal tracks in different places have different occurrences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Occurrence(Vec<usize>);

impl Occurrence {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        Self(path)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for Occurrence {
    fn from(path: Vec<usize>) -> Self {
        Self(path)
    }
}

impl fmt::Display for Occurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "/{}", parts.join("/"))
    }
}

/// One track occurrence handed out by the sequencer.
#[derive(Debug, Clone, PartialEq)]
pub struct Pick {
    pub occurrence: Occurrence,
    pub track: Track,
}
