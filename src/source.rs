//! Crawlers that turn a `source` directive into a playlist tree.

mod local;

use std::path::Path;

use tracing::warn;

use crate::config::SourceSettings;
use crate::playlist::Group;

pub use local::crawl_local;

/// Resolve `[crawler, ...args]` into a tree.
///
/// Unknown crawlers and missing arguments produce an empty group.
pub fn resolve(args: &[String], settings: &SourceSettings) -> Group {
    match args {
        [crawler, dir, ..] if matches!(crawler.as_str(), "crawl-local" | "local") => {
            crawl_local(Path::new(dir), settings)
        }
        [crawler] if crawler == "crawl-local" || crawler == "local" => {
            warn!(crawler = %crawler, "source is missing a directory argument");
            Group::default()
        }
        [crawler, ..] => {
            warn!(crawler = %crawler, "unknown source crawler; playlist is empty");
            Group::default()
        }
        [] => {
            warn!("empty source directive; playlist is empty");
            Group::default()
        }
    }
}
