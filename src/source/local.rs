use std::collections::BTreeMap;
use std::path::Path;

use lofty::prelude::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::SourceSettings;
use crate::playlist::{Group, Grouplike, Metadata, Track};

fn is_audio_file(path: &Path, settings: &SourceSettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn dir_name(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN");
    format!("{name}/")
}

/// Build one group per directory (named `"dir/"`) holding its audio files,
/// sorted by file name. Directories without audio are dropped.
pub fn crawl_local(dir: &Path, settings: &SourceSettings) -> Group {
    let mut walker = WalkDir::new(dir)
        .follow_links(settings.follow_links)
        .sort_by_file_name();
    if let Some(d) = settings.max_depth {
        walker = walker.max_depth(d);
    }

    // Groups still open along the current branch; index = walkdir depth.
    let mut stack: Vec<Group> = Vec::new();

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };

        while stack.len() > entry.depth() {
            close_group(&mut stack);
        }

        let path = entry.path();
        if entry.file_type().is_dir() {
            stack.push(Group::new(Some(dir_name(path)), Vec::new()));
        } else if is_audio_file(path, settings) {
            if let Some(group) = stack.last_mut() {
                group.items.push(Grouplike::Track(track_from_file(path)));
            }
        }
    }

    while stack.len() > 1 {
        close_group(&mut stack);
    }
    let root = stack.pop().unwrap_or_default();
    debug!(dir = %dir.display(), tracks = crate::playlist::count_tracks(&root), "crawled directory");
    root
}

fn close_group(stack: &mut Vec<Group>) {
    let Some(done) = stack.pop() else {
        return;
    };
    if done.is_empty() {
        return;
    }
    if let Some(parent) = stack.last_mut() {
        parent.items.push(Grouplike::Group(done));
    } else {
        stack.push(done);
    }
}

fn track_from_file(path: &Path) -> Track {
    let default_title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();

    let mut title = default_title;
    let mut tags = BTreeMap::new();
    let mut metadata = Metadata {
        size_bytes: std::fs::metadata(path).ok().map(|m| m.len()),
        ..Metadata::default()
    };

    if let Ok(tagged) = lofty::read_from_path(path) {
        let properties = tagged.properties();
        metadata.duration_seconds = Some(properties.duration().as_secs_f64());
        metadata.bitrate = properties.audio_bitrate().map(u64::from);

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            if let Some(v) = tag.title().filter(|v| !v.trim().is_empty()) {
                title = v.trim().to_string();
            }
            for (field, value) in [("artist", tag.artist()), ("album", tag.album())] {
                if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
                    tags.insert(field.to_string(), serde_json::Value::from(v.trim()));
                }
            }
        }
    }

    if !tags.is_empty() {
        metadata.tags = Some(tags);
    }

    Track {
        name: title,
        acquisition_arg: path.display().to_string(),
        acquisition_method: Some("local".to_string()),
        metadata: Some(metadata),
    }
}
