//! Applying option strings to build the playlist and playback choices.
//!
//! Command-line arguments and a playlist's `options` array share one syntax.
//! Options are processed from a queue; opening a playlist splices that
//! playlist's own options in right after the `--open`.

use std::collections::VecDeque;
use std::path::Path;
use std::str::FromStr;

use tracing::{info, warn};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::playlist::{
    Group, PlaylistDocument, count_tracks, keep_by_path, list_all, list_groups, parse_path,
    remove_by_path,
};
use crate::source::crawl_local;

/// How many playlists may open each other in a chain.
pub const MAX_OPEN_DEPTH: usize = 8;

/// Everything the options decided before playback starts.
#[derive(Debug)]
pub struct Session {
    pub tree: Group,
    pub settings: Settings,
    /// Whether any playlist (or directory) was opened.
    pub opened: bool,
    /// Outlines requested by `--list-groups` / `--list-all`, in order.
    pub listings: Vec<String>,
    play: Option<bool>,
    kept: Option<Group>,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            tree: Group::default(),
            settings,
            opened: false,
            listings: Vec::new(),
            play: None,
            kept: None,
        }
    }

    /// Play unless told not to. Listing the playlist implies `--no-play`
    /// unless `--play` is given.
    pub fn should_play(&self) -> bool {
        self.play.unwrap_or(self.listings.is_empty())
    }

    /// Apply `args` in order, including the options of every opened playlist.
    pub async fn apply<I, S>(&mut self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut queue: VecDeque<(String, usize)> =
            args.into_iter().map(|a| (a.into(), 0)).collect();

        while let Some((arg, depth)) = queue.pop_front() {
            let option = arg.as_str();
            match option {
                "--open" | "-o" => {
                    let location = take_value(&mut queue, option)?;
                    self.open(&location, depth, &mut queue).await?;
                }
                "--clear" | "-c" => {
                    self.finish_keep();
                    self.tree = Group::default();
                    info!("cleared playlist");
                }
                "--keep" | "-k" => {
                    let path = take_value(&mut queue, option)?;
                    if keep_by_path(&self.tree, &parse_path(&path), &mut self.kept) {
                        info!(path = %path, "keeping");
                    }
                }
                "--remove" | "-r" | "-x" => {
                    self.finish_keep();
                    let path = take_value(&mut queue, option)?;
                    if remove_by_path(&mut self.tree, &parse_path(&path)).is_some() {
                        info!(path = %path, "removed from playlist");
                    }
                }
                "--sort" => self.settings.playback.sort = take_value(&mut queue, option)?,
                "--loop" => self.settings.playback.loop_mode = take_value(&mut queue, option)?,
                "--seed" => {
                    self.settings.playback.seed = Some(take_parsed(&mut queue, option)?);
                }
                "--fill" => self.settings.playback.fill_size = take_parsed(&mut queue, option)?,
                "--player" => self.settings.player.backend = take_value(&mut queue, option)?,
                "--convert-to" => {
                    let ext = take_value(&mut queue, option)?;
                    self.settings.download.convert_to =
                        Some(ext.trim_start_matches('.').to_string());
                }
                "--list-groups" | "-l" => {
                    self.finish_keep();
                    self.listings.push(list_groups(&self.tree));
                }
                "--list-all" | "-L" => {
                    self.finish_keep();
                    self.listings.push(list_all(&self.tree));
                }
                "--play" => self.play = Some(true),
                "--no-play" | "-np" => self.play = Some(false),
                other if other.starts_with('-') => warn!(option = other, "unknown option; ignoring"),
                location => {
                    let location = location.to_string();
                    self.open(&location, depth, &mut queue).await?;
                }
            }
        }

        self.finish_keep();
        Ok(())
    }

    /// Replace the tree with `location`'s contents and queue its options.
    async fn open(
        &mut self,
        location: &str,
        depth: usize,
        queue: &mut VecDeque<(String, usize)>,
    ) -> Result<()> {
        self.finish_keep();
        if depth >= MAX_OPEN_DEPTH {
            return Err(Error::OpenDepthExceeded(location.to_string()));
        }

        let path = Path::new(location);
        let options = if path.is_dir() {
            self.tree = crawl_local(path, &self.settings.source);
            Vec::new()
        } else {
            let document = PlaylistDocument::load(location).await?;
            let (tree, options) = document.into_tree(&self.settings.source);
            self.tree = tree;
            options
        };
        self.opened = true;
        info!(location, tracks = count_tracks(&self.tree), "playlist loaded");

        for option in options.into_iter().rev() {
            queue.push_front((option, depth + 1));
        }
        Ok(())
    }

    fn finish_keep(&mut self) {
        if let Some(kept) = self.kept.take() {
            self.tree = kept;
        }
    }
}

fn take_value(queue: &mut VecDeque<(String, usize)>, option: &str) -> Result<String> {
    match queue.pop_front() {
        Some((value, _)) => Ok(value),
        None => Err(Error::MissingOptionValue(option.to_string())),
    }
}

fn take_parsed<T: FromStr>(queue: &mut VecDeque<(String, usize)>, option: &str) -> Result<T> {
    let value = take_value(queue, option)?;
    value.trim().parse().map_err(|_| Error::InvalidOptionValue {
        option: option.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::{Grouplike, flatten};

    fn write_playlist(dir: &Path, name: &str, json: &str) -> String {
        let path = dir.join(name);
        std::fs::write(&path, json).unwrap();
        path.to_string_lossy().into_owned()
    }

    const LIBRARY: &str = r#"{
        "items": [
            {"name": "Rock/", "items": [
                {"name": "one", "acquisitionArg": "/m/one.mp3"},
                {"name": "two", "acquisitionArg": "/m/two.mp3"}
            ]},
            {"name": "Jazz/", "items": [
                {"name": "blue", "acquisitionArg": "/m/blue.mp3"}
            ]}
        ],
        "options": ["--sort", "ordered"]
    }"#;

    fn names(session: &Session) -> Vec<String> {
        flatten(&session.tree)
            .into_iter()
            .map(|p| p.track.name)
            .collect()
    }

    #[tokio::test]
    async fn bare_argument_opens_and_applies_playlist_options() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_playlist(dir.path(), "lib.json", LIBRARY);

        let mut session = Session::new(Settings::default());
        session.apply([file]).await.unwrap();

        assert!(session.opened);
        assert_eq!(names(&session), vec!["one", "two", "blue"]);
        assert_eq!(session.settings.playback.sort, "ordered");
        assert!(session.should_play());
    }

    #[tokio::test]
    async fn command_line_options_after_open_win() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_playlist(dir.path(), "lib.json", LIBRARY);

        let mut session = Session::new(Settings::default());
        session
            .apply(["-o", file.as_str(), "--sort", "alphabetical", "--seed", "9", "--fill", "4"])
            .await
            .unwrap();

        let playback = &session.settings.playback;
        assert_eq!(playback.sort, "alphabetical");
        assert_eq!(playback.seed, Some(9));
        assert_eq!(playback.fill_size, 4);
    }

    #[tokio::test]
    async fn keep_and_remove_edit_the_tree() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_playlist(dir.path(), "lib.json", LIBRARY);

        let mut session = Session::new(Settings::default());
        session
            .apply([file.as_str(), "-k", "Jazz/", "-k", "Rock/two"])
            .await
            .unwrap();
        assert_eq!(names(&session), vec!["blue", "two"]);

        let mut session = Session::new(Settings::default());
        session.apply([file.as_str(), "-x", "Rock/"]).await.unwrap();
        assert_eq!(names(&session), vec!["blue"]);

        let mut session = Session::new(Settings::default());
        session.apply([file.as_str(), "--clear"]).await.unwrap();
        assert!(session.tree.items.is_empty());
    }

    #[tokio::test]
    async fn unresolved_keep_leaves_the_tree_alone() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_playlist(dir.path(), "lib.json", LIBRARY);

        let mut session = Session::new(Settings::default());
        session.apply([file.as_str(), "-k", "Nope/"]).await.unwrap();
        assert_eq!(names(&session), vec!["one", "two", "blue"]);

        let mut session = Session::new(Settings::default());
        session
            .apply([file.as_str(), "-k", "Nope/", "-k", "Jazz/blue"])
            .await
            .unwrap();
        assert_eq!(names(&session), vec!["blue"]);
    }

    #[tokio::test]
    async fn listing_implies_no_play_unless_asked() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_playlist(dir.path(), "lib.json", LIBRARY);

        let mut session = Session::new(Settings::default());
        session.apply([file.as_str(), "-l"]).await.unwrap();
        assert_eq!(session.listings, vec!["Rock/ (2 tracks)\nJazz/ (1 tracks)"]);
        assert!(!session.should_play());

        let mut session = Session::new(Settings::default());
        session.apply([file.as_str(), "-L", "--play"]).await.unwrap();
        assert!(session.listings[0].contains("  - blue"));
        assert!(session.should_play());

        let mut session = Session::new(Settings::default());
        session.apply([file.as_str(), "-np"]).await.unwrap();
        assert!(!session.should_play());
    }

    #[tokio::test]
    async fn option_values_are_checked() {
        let mut session = Session::new(Settings::default());
        let err = session.apply(["--sort"]).await.unwrap_err();
        assert!(matches!(err, Error::MissingOptionValue(o) if o == "--sort"));

        let err = session.apply(["--seed", "abc"]).await.unwrap_err();
        assert!(matches!(err, Error::InvalidOptionValue { option, value } if option == "--seed" && value == "abc"));
    }

    #[tokio::test]
    async fn unknown_options_are_ignored() {
        let mut session = Session::new(Settings::default());
        session
            .apply(["--frobnicate", "--player", "sox", "--convert-to", ".wav"])
            .await
            .unwrap();
        assert_eq!(session.settings.player.backend, "sox");
        assert_eq!(session.settings.download.convert_to.as_deref(), Some("wav"));
        assert!(!session.opened);
    }

    #[tokio::test]
    async fn self_opening_playlist_stops_at_the_depth_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loop.json");
        let json = format!(
            r#"{{"items": [], "options": ["--open", {}]}}"#,
            serde_json::to_string(&path.to_string_lossy()).unwrap()
        );
        std::fs::write(&path, json).unwrap();

        let mut session = Session::new(Settings::default());
        let err = session
            .apply([path.to_string_lossy().into_owned()])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::OpenDepthExceeded(_)));
    }

    #[tokio::test]
    async fn directories_are_crawled() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("Album")).unwrap();
        std::fs::write(dir.path().join("Album").join("a.mp3"), b"not really audio").unwrap();

        let mut session = Session::new(Settings::default());
        session
            .apply([dir.path().to_string_lossy().into_owned()])
            .await
            .unwrap();
        assert!(session.opened);
        assert!(matches!(&session.tree.items[..], [Grouplike::Group(_)]));
        assert_eq!(names(&session), vec!["a"]);
    }
}
