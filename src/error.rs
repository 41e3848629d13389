// Error types for the library seams
// Engine errors stay on the playback thread; source errors end the process before playback starts

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything the playback engine can fail at.
///
/// Only `Init` is fatal to playback; the controller treats the rest as
/// per-track or per-operation failures.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("audio device initialization failed: {0}")]
    Init(String),

    #[error("engine used before init")]
    NotInitialized,

    #[error("no track loaded")]
    NoTrack,

    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("could not determine the length of {0}")]
    UnknownLength(PathBuf),

    #[error("failed to create output sink: {0}")]
    Sink(String),

    #[error("seek to frame {frame} failed: {reason}")]
    Seek { frame: u64, reason: String },
}

/// Rejections raised while validating the command line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("unknown mode '{0}' (expected 'file' or 'link')")]
    UnknownMode(String),

    #[error("no paths given")]
    NoPaths,

    #[error("no such file: {0}")]
    Missing(PathBuf),

    #[error("not a regular file: {0}")]
    NotAFile(PathBuf),

    #[error("cannot read {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },
}
