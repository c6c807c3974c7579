//! Pure operations over the playlist tree.

use tracing::{error, warn};

use super::model::{Group, Grouplike, Occurrence, Pick};

pub const PATH_SEPARATOR: char = '/';

pub fn is_group(node: &Grouplike) -> bool {
    matches!(node, Grouplike::Group(_))
}

pub fn is_track(node: &Grouplike) -> bool {
    matches!(node, Grouplike::Track(_))
}

/// Every track reachable from `tree`, depth first and left to right.
pub fn flatten(tree: &Group) -> Vec<Pick> {
    let mut out = Vec::new();
    flatten_into(tree, &Occurrence::root(), &mut out);
    out
}

fn flatten_into(group: &Group, at: &Occurrence, out: &mut Vec<Pick>) {
    for (i, item) in group.items.iter().enumerate() {
        match item {
            Grouplike::Group(child) => flatten_into(child, &at.child(i), out),
            Grouplike::Track(track) => out.push(Pick {
                occurrence: at.child(i),
                track: track.clone(),
            }),
        }
    }
}

pub fn count_tracks(tree: &Group) -> usize {
    tree.items
        .iter()
        .map(|item| match item {
            Grouplike::Group(g) => count_tracks(g),
            Grouplike::Track(_) => 1,
        })
        .sum()
}

/// Split `"Rock/Album/Song"` into `["Rock/", "Album/", "Song"]`.
///
/// Every segment followed by a separator keeps it, marking it as a group.
pub fn parse_path(path: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut rest = path;
    while let Some(pos) = rest.find(PATH_SEPARATOR) {
        let (segment, tail) = rest.split_at(pos + PATH_SEPARATOR.len_utf8());
        if segment.len() > PATH_SEPARATOR.len_utf8() {
            parts.push(segment.to_string());
        }
        rest = tail;
    }
    if !rest.is_empty() {
        parts.push(rest.to_string());
    }
    parts
}

fn bare_name(name: &str) -> &str {
    name.trim_end_matches(PATH_SEPARATOR)
}

fn segment_matches(node: &Grouplike, segment: &str) -> bool {
    let wants_group = segment.ends_with(PATH_SEPARATOR);
    if wants_group && !is_group(node) {
        return false;
    }
    node.name()
        .map(|name| bare_name(name) == bare_name(segment))
        .unwrap_or(false)
}

/// Child indices leading to the node named by `parts`, or `None` (with a
/// warning) when some segment does not resolve.
fn locate<S: AsRef<str>>(tree: &Group, parts: &[S]) -> Option<Vec<usize>> {
    if parts.is_empty() {
        warn!("empty playlist path; nothing selected");
        return None;
    }

    let mut indices = Vec::with_capacity(parts.len());
    let mut group = tree;
    for (depth, part) in parts.iter().enumerate() {
        let segment = part.as_ref();
        let Some(index) = group.items.iter().position(|n| segment_matches(n, segment)) else {
            warn!(
                path = %join_path(parts),
                segment,
                "playlist path segment not found; playlist left unchanged"
            );
            return None;
        };
        indices.push(index);

        if depth + 1 < parts.len() {
            match &group.items[index] {
                Grouplike::Group(child) => group = child,
                Grouplike::Track(_) => {
                    warn!(
                        path = %join_path(parts),
                        segment,
                        "playlist path descends into a track; playlist left unchanged"
                    );
                    return None;
                }
            }
        }
    }
    Some(indices)
}

fn join_path<S: AsRef<str>>(parts: &[S]) -> String {
    parts.iter().map(|p| p.as_ref()).collect::<Vec<_>>().concat()
}

fn node_at<'a>(tree: &'a Group, indices: &[usize]) -> Option<&'a Grouplike> {
    let (last, parents) = indices.split_last()?;
    let parent = group_at(tree, parents)?;
    parent.items.get(*last)
}

fn group_at<'a>(tree: &'a Group, indices: &[usize]) -> Option<&'a Group> {
    let mut group = tree;
    for &i in indices {
        match group.items.get(i)? {
            Grouplike::Group(child) => group = child,
            Grouplike::Track(_) => return None,
        }
    }
    Some(group)
}

fn group_at_mut<'a>(tree: &'a mut Group, indices: &[usize]) -> Option<&'a mut Group> {
    let mut group = tree;
    for &i in indices {
        match group.items.get_mut(i)? {
            Grouplike::Group(child) => group = child,
            Grouplike::Track(_) => return None,
        }
    }
    Some(group)
}

/// Find the node named by `parts`; see [`parse_path`].
pub fn find_by_path<'a, S: AsRef<str>>(tree: &'a Group, parts: &[S]) -> Option<&'a Grouplike> {
    let indices = locate(tree, parts)?;
    node_at(tree, &indices)
}

/// Splice the node named by `parts` out of its parent and return it.
///
/// The tree is left untouched when the path does not resolve, or when the
/// parent no longer holds the node that was located.
pub fn remove_by_path<S: AsRef<str>>(tree: &mut Group, parts: &[S]) -> Option<Grouplike> {
    let indices = locate(tree, parts)?;
    let (located_name, located_group) = {
        let node = node_at(tree, &indices)?;
        (node.name().map(str::to_string), is_group(node))
    };

    let (&last, parents) = indices.split_last()?;
    let Some(parent) = group_at_mut(tree, parents) else {
        error!(path = %join_path(parts), "parent group vanished; playlist left unchanged");
        return None;
    };

    let still_there = parent
        .items
        .get(last)
        .map(|n| n.name().map(str::to_string) == located_name && is_group(n) == located_group)
        .unwrap_or(false);
    if !still_there {
        error!(
            path = %join_path(parts),
            "parent does not contain the located item; playlist left unchanged"
        );
        return None;
    }

    Some(parent.items.remove(last))
}

/// Copy the node named by `parts` onto the end of `kept`.
///
/// Repeated keeps collect several subtrees into one new root. The root is
/// only created once a path resolves, so a miss leaves `kept` untouched.
/// Returns whether anything was kept.
pub fn keep_by_path<S: AsRef<str>>(tree: &Group, parts: &[S], kept: &mut Option<Group>) -> bool {
    match find_by_path(tree, parts) {
        Some(node) => {
            kept.get_or_insert_with(Group::default)
                .items
                .push(node.clone());
            true
        }
        None => false,
    }
}

pub fn list_groups(tree: &Group) -> String {
    outline(tree, false)
}

pub fn list_all(tree: &Group) -> String {
    outline(tree, true)
}

/// Indented outline of the tree, one line per group (and per track when
/// `include_tracks` is set).
pub fn outline(tree: &Group, include_tracks: bool) -> String {
    let mut lines = Vec::new();
    outline_into(tree, 0, include_tracks, &mut lines);
    lines.join("\n")
}

fn outline_into(group: &Group, depth: usize, include_tracks: bool, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    for item in &group.items {
        match item {
            Grouplike::Group(child) => {
                let name = child.name.as_deref().unwrap_or("(unnamed group)");
                lines.push(format!(
                    "{indent}{name} ({} tracks)",
                    count_tracks(child)
                ));
                outline_into(child, depth + 1, include_tracks, lines);
            }
            Grouplike::Track(track) if include_tracks => {
                lines.push(format!("{indent}- {}", track.name));
            }
            Grouplike::Track(_) => {}
        }
    }
}
