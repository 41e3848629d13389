// Track source - turns `<mode> <path>...` into the playlist the player walks through
// Everything is checked up front so a bad path never reaches the audio thread

use crate::error::SourceError;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How the positional paths should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Every path is an audio file, played in the given order.
    File,
    /// Accepted for compatibility; builds no playlist.
    Link,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::File => "file",
            Mode::Link => "link",
        }
    }
}

impl FromStr for Mode {
    type Err = SourceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "file" => Ok(Mode::File),
            "link" => Ok(Mode::Link),
            other => Err(SourceError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, fixed list of tracks. Only the index moves once playback starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    tracks: Vec<PathBuf>,
}

impl Playlist {
    pub fn new(tracks: Vec<PathBuf>) -> Self {
        Self { tracks }
    }

    /// Validate the raw command line and build the playlist.
    ///
    /// The whole invocation is rejected if the mode is unknown or any single
    /// path is not an existing, readable, regular file.
    pub fn from_cli(mode: &str, paths: &[PathBuf]) -> Result<Self, SourceError> {
        let mode: Mode = mode.parse()?;

        if paths.is_empty() {
            return Err(SourceError::NoPaths);
        }

        for path in paths {
            validate_path(path)?;
        }

        match mode {
            Mode::File => Ok(Self::new(paths.to_vec())),
            // No playlist-building behaviour exists for links.
            Mode::Link => Ok(Self::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Path> {
        self.tracks.get(index).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.tracks.iter().map(PathBuf::as_path)
    }

    /// Index after `index`, wrapping to the start.
    pub fn next_index(&self, index: usize) -> usize {
        if self.tracks.is_empty() {
            return 0;
        }
        (index + 1) % self.tracks.len()
    }

    /// Index before `index`, wrapping to the end.
    pub fn prev_index(&self, index: usize) -> usize {
        let len = self.tracks.len();
        if len == 0 {
            return 0;
        }
        (index % len + len - 1) % len
    }

    /// Label shown in the player for the track at `index`.
    pub fn label(&self, index: usize) -> String {
        self.get(index)
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "No track".to_string())
    }

    /// The numbered listing printed before the player starts.
    pub fn listing(&self) -> Vec<String> {
        self.tracks
            .iter()
            .enumerate()
            .map(|(i, path)| format!("{:>3}. {}", i + 1, path.display()))
            .collect()
    }
}

fn validate_path(path: &Path) -> Result<(), SourceError> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(_) => return Err(SourceError::Missing(path.to_path_buf())),
    };

    if !metadata.is_file() {
        return Err(SourceError::NotAFile(path.to_path_buf()));
    }

    File::open(path).map_err(|e| SourceError::Unreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(())
}
